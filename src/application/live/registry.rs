//! Subscriber registry: tracks live streaming connections

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::subscriber::{Frame, Subscriber, SubscriberId};

/// Default per-subscriber outbox capacity
pub const DEFAULT_OUTBOX_CAPACITY: usize = 256;

/// Thread-safe set of live subscribers
pub struct SubscriberRegistry {
    subscribers: DashMap<SubscriberId, Subscriber>,
    next_id: AtomicU64,
    outbox_capacity: usize,
}

/// Shared, reference-counted subscriber registry
pub type SharedSubscriberRegistry = Arc<SubscriberRegistry>;

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::with_outbox_capacity(DEFAULT_OUTBOX_CAPACITY)
    }

    pub fn with_outbox_capacity(outbox_capacity: usize) -> Self {
        Self {
            subscribers: DashMap::new(),
            next_id: AtomicU64::new(1),
            outbox_capacity: outbox_capacity.max(1),
        }
    }

    /// Wrap in `Arc` for shared ownership
    pub fn shared(outbox_capacity: usize) -> SharedSubscriberRegistry {
        Arc::new(Self::with_outbox_capacity(outbox_capacity))
    }

    /// Register a connection whose handshake has completed.
    ///
    /// Returns the new subscriber id and the receiving half of its outbox,
    /// which the connection task drains into the socket.
    pub fn connect(&self, remote_addr: Option<String>) -> (SubscriberId, mpsc::Receiver<Frame>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(self.outbox_capacity);
        self.add(Subscriber::new(id, tx, remote_addr));
        (id, rx)
    }

    pub fn add(&self, subscriber: Subscriber) {
        let id = subscriber.id;
        info!(
            subscriber_id = id,
            remote_addr = ?subscriber.remote_addr,
            "Registering live subscriber"
        );
        self.subscribers.insert(id, subscriber);
        self.record_gauge();
    }

    /// Remove a subscriber. Removing an absent one is a no-op.
    pub fn remove(&self, id: SubscriberId) -> bool {
        let removed = self.subscribers.remove(&id).is_some();
        if removed {
            info!(subscriber_id = id, "Unregistered live subscriber");
            self.record_gauge();
        } else {
            debug!(subscriber_id = id, "Subscriber already unregistered");
        }
        removed
    }

    /// Copy of the current subscriber set. No lock is held once this returns.
    pub fn snapshot(&self) -> Vec<Subscriber> {
        self.subscribers
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn contains(&self, id: SubscriberId) -> bool {
        self.subscribers.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Drop every subscriber; their connection tasks see the outbox close.
    pub fn clear(&self) {
        let count = self.subscribers.len();
        self.subscribers.clear();
        self.record_gauge();
        info!(count, "Closed all live subscribers");
    }

    fn record_gauge(&self) {
        metrics::gauge!("live_subscribers").set(self.subscribers.len() as f64);
    }
}

impl Default for SubscriberRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_assigns_unique_ids() {
        let registry = SubscriberRegistry::new();
        let (a, _rx_a) = registry.connect(None);
        let (b, _rx_b) = registry.connect(Some("127.0.0.1:5000".into()));

        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
        assert!(registry.contains(a) && registry.contains(b));
    }

    #[test]
    fn remove_is_idempotent() {
        let registry = SubscriberRegistry::new();
        let (id, _rx) = registry.connect(None);

        assert!(registry.remove(id));
        assert!(!registry.remove(id));
        assert!(registry.is_empty());
    }

    #[test]
    fn snapshot_is_detached_from_later_mutation() {
        let registry = SubscriberRegistry::new();
        let (a, _rx_a) = registry.connect(None);
        let (_b, _rx_b) = registry.connect(None);

        let snapshot = registry.snapshot();
        registry.remove(a);
        let (_c, _rx_c) = registry.connect(None);

        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.iter().any(|s| s.id == a));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn clear_closes_outboxes() {
        let registry = SubscriberRegistry::new();
        let (_id, mut rx) = registry.connect(None);

        registry.clear();

        assert!(registry.is_empty());
        assert_eq!(
            rx.try_recv(),
            Err(tokio::sync::mpsc::error::TryRecvError::Disconnected)
        );
    }

    #[tokio::test]
    async fn concurrent_connect_and_remove() {
        let registry = SubscriberRegistry::shared(8);
        let mut handles = Vec::new();
        for _ in 0..32 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                let (id, _rx) = registry.connect(None);
                let _ = registry.snapshot();
                registry.remove(id);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert!(registry.is_empty());
    }
}
