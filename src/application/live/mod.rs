//! Live fan-out of ingested scans to streaming subscribers
//!
//! - `registry`: concurrency-safe set of live subscribers
//! - `broadcaster`: snapshot sweep with deferred pruning

pub mod broadcaster;
pub mod registry;
pub mod subscriber;

pub use broadcaster::{BroadcastReport, Broadcaster, LiveMessage};
pub use registry::{SharedSubscriberRegistry, SubscriberRegistry, DEFAULT_OUTBOX_CAPACITY};
pub use subscriber::{DeliveryError, Frame, Subscriber, SubscriberId};
