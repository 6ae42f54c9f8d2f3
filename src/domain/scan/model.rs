//! Scan domain model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Default number of scans returned by a listing
pub const DEFAULT_LIST_LIMIT: i64 = 50;

/// Upper bound for a single listing
pub const MAX_LIST_LIMIT: i64 = 500;

/// Incoming scan as reported by a reader
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewScan {
    /// RFID tag UID as a hex string
    #[serde(default)]
    #[validate(length(min = 1, message = "uid is required"))]
    pub uid: String,
    /// Identifier of the originating reader
    #[serde(default, alias = "device_id")]
    pub device_id: Option<String>,
    /// Signal strength, if the reader reports it
    #[serde(default)]
    pub rssi: Option<i32>,
    /// Client-side observation time (ISO-8601); defaults to receipt time
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl NewScan {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            ..Default::default()
        }
    }

    pub fn with_device(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    pub fn with_rssi(mut self, rssi: i32) -> Self {
        self.rssi = Some(rssi);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Lowercase the uid and fill a missing timestamp with `received_at`.
    pub fn normalize(self, received_at: DateTime<Utc>) -> ScanRecord {
        ScanRecord {
            uid: self.uid.to_lowercase(),
            device_id: self.device_id,
            rssi: self.rssi,
            timestamp: self.timestamp.unwrap_or(received_at),
        }
    }
}

/// Normalized scan, ready to be written to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRecord {
    pub uid: String,
    pub device_id: Option<String>,
    pub rssi: Option<i32>,
    pub timestamp: DateTime<Utc>,
}

/// Canonical scan as stored and read back from the store.
///
/// This is the single representation used for API responses and for the
/// live broadcast payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScanEvent {
    /// Store-assigned identifier
    pub id: String,
    /// Lowercase tag UID
    pub uid: String,
    pub device_id: Option<String>,
    pub rssi: Option<i32>,
    /// UTC observation time
    pub timestamp: DateTime<Utc>,
}

impl ScanEvent {
    pub fn from_record(id: impl Into<String>, record: ScanRecord) -> Self {
        Self {
            id: id.into(),
            uid: record.uid,
            device_id: record.device_id,
            rssi: record.rssi,
            timestamp: record.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn normalize_lowercases_uid_and_keeps_timestamp() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let record = NewScan::new("AB12CD")
            .with_device("reader-1")
            .with_rssi(-60)
            .with_timestamp(ts)
            .normalize(Utc::now());

        assert_eq!(record.uid, "ab12cd");
        assert_eq!(record.device_id.as_deref(), Some("reader-1"));
        assert_eq!(record.rssi, Some(-60));
        assert_eq!(record.timestamp, ts);
    }

    #[test]
    fn normalize_defaults_timestamp() {
        let now = Utc::now();
        let record = NewScan::new("ff").normalize(now);
        assert_eq!(record.timestamp, now);
    }

    #[test]
    fn empty_uid_fails_validation() {
        assert!(NewScan::new("").validate().is_err());
        assert!(NewScan::new("a").validate().is_ok());
    }

    #[test]
    fn deserializes_camel_and_snake_case_device_id() {
        let camel: NewScan =
            serde_json::from_str(r#"{"uid":"AA","deviceId":"esp-1","rssi":-40}"#).unwrap();
        let snake: NewScan = serde_json::from_str(r#"{"uid":"AA","device_id":"esp-1"}"#).unwrap();

        assert_eq!(camel.device_id.as_deref(), Some("esp-1"));
        assert_eq!(camel.rssi, Some(-40));
        assert_eq!(snake.device_id.as_deref(), Some("esp-1"));
    }

    #[test]
    fn missing_uid_deserializes_as_empty() {
        let scan: NewScan = serde_json::from_str(r#"{"rssi":1}"#).unwrap();
        assert!(scan.uid.is_empty());
    }

    #[test]
    fn timestamp_with_offset_is_converted_to_utc() {
        let scan: NewScan =
            serde_json::from_str(r#"{"uid":"aa","timestamp":"2024-05-01T14:00:00+02:00"}"#)
                .unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(scan.timestamp, Some(expected));
    }

    #[test]
    fn scan_event_serializes_camel_case_with_string_timestamp() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let event = ScanEvent::from_record(
            "abc",
            NewScan::new("ab12").with_device("r1").normalize(ts),
        );
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["id"], "abc");
        assert_eq!(json["uid"], "ab12");
        assert_eq!(json["deviceId"], "r1");
        assert!(json["rssi"].is_null());
        assert_eq!(json["timestamp"], "2024-05-01T12:00:00Z");
    }
}
