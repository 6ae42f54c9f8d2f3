//! Scan store port

use async_trait::async_trait;

use super::model::{ScanEvent, ScanRecord};
use crate::domain::DomainResult;

/// Durable append-only store of scans.
///
/// Implementations provide their own internal synchronization.
#[async_trait]
pub trait ScanRepository: Send + Sync {
    /// Persist a scan and return the identifier assigned by the store.
    async fn insert(&self, record: ScanRecord) -> DomainResult<String>;

    /// Fetch a stored scan by its identifier.
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<ScanEvent>>;

    /// Up to `limit` scans, newest timestamp first.
    async fn list_recent(&self, limit: u64) -> DomainResult<Vec<ScanEvent>>;
}
