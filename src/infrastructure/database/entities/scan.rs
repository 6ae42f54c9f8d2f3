//! Scan entity for database

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::domain::{ScanEvent, ScanRecord};

/// One stored RFID scan
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "scans")]
pub struct Model {
    /// Store-assigned identifier (UUID v4)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Lowercase tag UID
    pub uid: String,

    pub device_id: Option<String>,

    pub rssi: Option<i32>,

    /// Observation time (client-supplied or receipt time)
    pub scanned_at: DateTime<Utc>,

    /// When the row was written
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub fn from_record(id: String, record: ScanRecord) -> Self {
        Self {
            id: Set(id),
            uid: Set(record.uid),
            device_id: Set(record.device_id),
            rssi: Set(record.rssi),
            scanned_at: Set(record.timestamp),
            created_at: Set(Utc::now()),
        }
    }
}

impl From<Model> for ScanEvent {
    fn from(m: Model) -> Self {
        ScanEvent {
            id: m.id,
            uid: m.uid,
            device_id: m.device_id,
            rssi: m.rssi,
            timestamp: m.scanned_at,
        }
    }
}
