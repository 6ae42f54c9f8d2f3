pub mod model;
pub mod repository;

pub use model::{NewScan, ScanEvent, ScanRecord, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
pub use repository::ScanRepository;
