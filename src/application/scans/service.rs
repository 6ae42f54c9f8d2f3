//! Scan ingestion and listing
//!
//! `submit` validates, normalizes, persists, reads the stored record back and
//! only then broadcasts it. A storage failure aborts before any broadcast.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info};
use validator::{Validate, ValidationErrors};

use crate::application::live::Broadcaster;
use crate::domain::{
    DomainError, DomainResult, NewScan, ScanEvent, ScanRepository, MAX_LIST_LIMIT,
};

pub struct ScanService {
    repository: Arc<dyn ScanRepository>,
    broadcaster: Broadcaster,
}

impl ScanService {
    pub fn new(repository: Arc<dyn ScanRepository>, broadcaster: Broadcaster) -> Self {
        Self {
            repository,
            broadcaster,
        }
    }

    pub fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }

    /// Ingest one scan and fan it out to live subscribers.
    ///
    /// The returned record is the canonical stored form, regardless of how
    /// many subscribers received it.
    pub async fn submit(&self, scan: NewScan) -> DomainResult<ScanEvent> {
        scan.validate()
            .map_err(|e| DomainError::Validation(validation_message(&e)))?;

        let record = scan.normalize(Utc::now());
        let uid = record.uid.clone();

        let id = self.repository.insert(record).await.map_err(|e| {
            error!(uid = %uid, error = %e, "Failed to persist scan");
            e
        })?;

        let stored = self
            .repository
            .find_by_id(&id)
            .await?
            .ok_or_else(|| {
                error!(scan_id = %id, "Scan missing right after insert");
                DomainError::Storage(format!("scan {} not readable after insert", id))
            })?;

        metrics::counter!("scans_ingested_total").increment(1);
        let report = self.broadcaster.broadcast(&stored);
        info!(
            scan_id = %stored.id,
            uid = %stored.uid,
            device_id = ?stored.device_id,
            delivered = report.delivered,
            "Scan ingested"
        );

        Ok(stored)
    }

    /// Most recent scans, newest first. `limit` must be within 1..=500.
    pub async fn list(&self, limit: i64) -> DomainResult<Vec<ScanEvent>> {
        if !(1..=MAX_LIST_LIMIT).contains(&limit) {
            debug!(limit, "Rejected scan listing limit");
            return Err(DomainError::validation(format!(
                "limit must be between 1 and {}",
                MAX_LIST_LIMIT
            )));
        }
        self.repository.list_recent(limit as u64).await
    }

    pub async fn get(&self, id: &str) -> DomainResult<ScanEvent> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                entity: "scan",
                field: "id",
                value: id.to_string(),
            })
    }
}

fn validation_message(errors: &ValidationErrors) -> String {
    let messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{}: {}", field, e.code))
            })
        })
        .collect();

    if messages.is_empty() {
        "Validation failed".to_string()
    } else {
        messages.join("; ")
    }
}
