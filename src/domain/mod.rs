//! Domain layer: scan records, the store port and domain errors

pub mod error;
pub mod scan;

pub use error::{DomainError, DomainResult};
pub use scan::{NewScan, ScanEvent, ScanRecord, ScanRepository, MAX_LIST_LIMIT, DEFAULT_LIST_LIMIT};
