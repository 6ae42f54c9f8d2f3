//! Scan ingestion coordinator

pub mod service;

pub use service::ScanService;
