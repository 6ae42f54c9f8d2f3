//! SeaORM implementation of ScanRepository

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder, QuerySelect};
use tracing::debug;

use crate::domain::{DomainError, DomainResult, ScanEvent, ScanRecord, ScanRepository};
use crate::infrastructure::database::entities::scan;

pub struct SeaOrmScanRepository {
    db: DatabaseConnection,
}

impl SeaOrmScanRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Storage(format!("Database error: {}", e))
}

#[async_trait]
impl ScanRepository for SeaOrmScanRepository {
    async fn insert(&self, record: ScanRecord) -> DomainResult<String> {
        let id = uuid::Uuid::new_v4().to_string();
        scan::Entity::insert(scan::ActiveModel::from_record(id.clone(), record))
            .exec_without_returning(&self.db)
            .await
            .map_err(db_err)?;
        debug!(scan_id = %id, "Scan row inserted");
        Ok(id)
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<ScanEvent>> {
        let row = scan::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(row.map(ScanEvent::from))
    }

    async fn list_recent(&self, limit: u64) -> DomainResult<Vec<ScanEvent>> {
        let rows = scan::Entity::find()
            .order_by_desc(scan::Column::ScannedAt)
            .order_by_desc(scan::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(ScanEvent::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use sea_orm::{ConnectOptions, Database};
    use sea_orm_migration::MigratorTrait;

    use super::*;
    use crate::domain::NewScan;
    use crate::infrastructure::database::migrator::Migrator;

    async fn repository() -> SeaOrmScanRepository {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1).min_connections(1).sqlx_logging(false);
        let db = Database::connect(opt).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        SeaOrmScanRepository::new(db)
    }

    #[tokio::test]
    async fn insert_then_find_round_trips_canonical_fields() {
        let repo = repository().await;
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap();
        let record = NewScan::new("DEADBEEF")
            .with_device("esp32-a")
            .with_rssi(-48)
            .with_timestamp(ts)
            .normalize(Utc::now());

        let id = repo.insert(record).await.unwrap();
        let stored = repo.find_by_id(&id).await.unwrap().unwrap();

        assert_eq!(stored.id, id);
        assert_eq!(stored.uid, "deadbeef");
        assert_eq!(stored.device_id.as_deref(), Some("esp32-a"));
        assert_eq!(stored.rssi, Some(-48));
        assert_eq!(stored.timestamp, ts);
    }

    #[tokio::test]
    async fn find_unknown_returns_none() {
        let repo = repository().await;
        assert!(repo.find_by_id("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_recent_orders_by_timestamp_desc_and_limits() {
        let repo = repository().await;
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        for minutes in [10, 30, 20] {
            let record = NewScan::new("aa")
                .with_timestamp(base + Duration::minutes(minutes))
                .normalize(Utc::now());
            repo.insert(record).await.unwrap();
        }

        let all = repo.list_recent(50).await.unwrap();
        let stamps: Vec<_> = all.iter().map(|s| s.timestamp).collect();
        assert_eq!(
            stamps,
            vec![
                base + Duration::minutes(30),
                base + Duration::minutes(20),
                base + Duration::minutes(10),
            ]
        );

        assert_eq!(repo.list_recent(1).await.unwrap().len(), 1);
    }
}
