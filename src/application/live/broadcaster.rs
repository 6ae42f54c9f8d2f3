//! Broadcast engine
//!
//! Pushes one serialized frame to every registered subscriber. A subscriber
//! whose transport is no longer usable is skipped and pruned after the sweep;
//! delivery failures never reach the caller.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::registry::SharedSubscriberRegistry;
use super::subscriber::{Frame, SubscriberId};
use crate::domain::ScanEvent;

/// Messages pushed to streaming clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum LiveMessage {
    /// Sent once, right after the connection is registered
    Connected {
        #[serde(rename = "subscriberId")]
        subscriber_id: SubscriberId,
    },
    /// A newly ingested scan
    Scan(ScanEvent),
}

impl LiveMessage {
    pub fn to_frame(&self) -> Result<Frame, serde_json::Error> {
        serde_json::to_string(self).map(Frame::from)
    }
}

/// Outcome of one broadcast sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub pruned: usize,
}

/// Fans scan events out to the subscriber registry
#[derive(Clone)]
pub struct Broadcaster {
    registry: SharedSubscriberRegistry,
}

impl Broadcaster {
    pub fn new(registry: SharedSubscriberRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &SharedSubscriberRegistry {
        &self.registry
    }

    /// Deliver `event` to every subscriber in the current snapshot.
    pub fn broadcast(&self, event: &ScanEvent) -> BroadcastReport {
        let message = LiveMessage::Scan(event.clone());
        let frame = match message.to_frame() {
            Ok(frame) => frame,
            Err(e) => {
                error!(scan_id = %event.id, error = %e, "Failed to serialize scan for broadcast");
                return BroadcastReport::default();
            }
        };
        self.broadcast_frame(frame)
    }

    /// One sweep over a snapshot; removals are applied after the loop.
    pub fn broadcast_frame(&self, frame: Frame) -> BroadcastReport {
        let subscribers = self.registry.snapshot();
        if subscribers.is_empty() {
            debug!("Broadcast skipped, no live subscribers");
            return BroadcastReport::default();
        }

        let mut delivered = 0;
        let mut stale = Vec::new();
        for subscriber in &subscribers {
            match subscriber.deliver(frame.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    debug!(subscriber_id = subscriber.id, error = %e, "Delivery failed");
                    stale.push(subscriber.id);
                }
            }
        }

        let pruned = stale.len();
        for id in stale {
            self.registry.remove(id);
        }

        metrics::counter!("scan_broadcast_deliveries_total").increment(delivered as u64);
        if pruned > 0 {
            metrics::counter!("scan_broadcast_failures_total").increment(pruned as u64);
            info!(delivered, pruned, "Pruned unreachable subscribers after broadcast");
        } else {
            debug!(delivered, "Broadcast delivered");
        }

        BroadcastReport { delivered, pruned }
    }
}
