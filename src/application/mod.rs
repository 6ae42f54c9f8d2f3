//! Application layer: live fan-out and the scan ingestion coordinator

pub mod live;
pub mod scans;

pub use live::{Broadcaster, SharedSubscriberRegistry, SubscriberRegistry};
pub use scans::ScanService;
