//! In-memory scan store for development and testing

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::{DomainResult, ScanEvent, ScanRecord, ScanRepository};

/// Scans kept in a concurrent map, keyed by generated id
#[derive(Default)]
pub struct InMemoryScanRepository {
    scans: DashMap<String, ScanEvent>,
}

impl InMemoryScanRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.scans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scans.is_empty()
    }
}

#[async_trait]
impl ScanRepository for InMemoryScanRepository {
    async fn insert(&self, record: ScanRecord) -> DomainResult<String> {
        let id = uuid::Uuid::new_v4().to_string();
        self.scans
            .insert(id.clone(), ScanEvent::from_record(id.clone(), record));
        Ok(id)
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<ScanEvent>> {
        Ok(self.scans.get(id).map(|entry| entry.value().clone()))
    }

    async fn list_recent(&self, limit: u64) -> DomainResult<Vec<ScanEvent>> {
        let mut scans: Vec<ScanEvent> = self.scans.iter().map(|e| e.value().clone()).collect();
        scans.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        scans.truncate(limit as usize);
        Ok(scans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewScan;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn insert_assigns_distinct_ids() {
        let repo = InMemoryScanRepository::new();
        let a = repo.insert(NewScan::new("aa").normalize(Utc::now())).await.unwrap();
        let b = repo.insert(NewScan::new("aa").normalize(Utc::now())).await.unwrap();

        assert_ne!(a, b);
        assert_eq!(repo.len(), 2);
    }

    #[tokio::test]
    async fn list_recent_is_newest_first() {
        let repo = InMemoryScanRepository::new();
        let now = Utc::now();
        for offset in [2, 0, 1] {
            let record = NewScan::new("aa")
                .with_timestamp(now - Duration::seconds(offset))
                .normalize(now);
            repo.insert(record).await.unwrap();
        }

        let scans = repo.list_recent(2).await.unwrap();
        assert_eq!(scans.len(), 2);
        assert_eq!(scans[0].timestamp, now);
        assert_eq!(scans[1].timestamp, now - Duration::seconds(1));
    }
}
