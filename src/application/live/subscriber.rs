//! Live subscriber handle

use axum::extract::ws::Utf8Bytes;
use thiserror::Error;
use tokio::sync::mpsc;

/// Registry-unique subscriber identifier
pub type SubscriberId = u64;

/// Serialized frame shared between all subscribers of one sweep.
///
/// Clones share one buffer, so the socket writer hands it to the transport
/// without copying.
pub type Frame = Utf8Bytes;

/// The subscriber's transport can no longer be used.
///
/// A full outbox (slow reader) and a closed outbox (socket writer gone) are
/// treated the same way: the subscriber is considered gone, no retry.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("subscriber {0} is gone")]
    Gone(SubscriberId),
}

/// An open streaming connection as seen by the broadcast side.
///
/// The socket itself is owned by the connection task; the registry only keeps
/// the sending half of that task's outbox.
#[derive(Debug, Clone)]
pub struct Subscriber {
    pub id: SubscriberId,
    pub remote_addr: Option<String>,
    outbox: mpsc::Sender<Frame>,
}

impl Subscriber {
    pub fn new(id: SubscriberId, outbox: mpsc::Sender<Frame>, remote_addr: Option<String>) -> Self {
        Self {
            id,
            remote_addr,
            outbox,
        }
    }

    /// Queue a frame without waiting for the socket.
    pub fn deliver(&self, frame: Frame) -> Result<(), DeliveryError> {
        self.outbox
            .try_send(frame)
            .map_err(|_| DeliveryError::Gone(self.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deliver_queues_frame() {
        let (tx, mut rx) = mpsc::channel(4);
        let sub = Subscriber::new(1, tx, None);

        sub.deliver(Frame::from("hello")).unwrap();
        assert_eq!(rx.try_recv().unwrap().as_str(), "hello");
    }

    #[test]
    fn closed_outbox_is_gone() {
        let (tx, rx) = mpsc::channel(4);
        let sub = Subscriber::new(7, tx, None);
        drop(rx);

        assert_eq!(sub.deliver(Frame::from("x")), Err(DeliveryError::Gone(7)));
    }

    #[test]
    fn full_outbox_is_gone() {
        let (tx, _rx) = mpsc::channel(1);
        let sub = Subscriber::new(3, tx, None);

        sub.deliver(Frame::from("first")).unwrap();
        assert_eq!(sub.deliver(Frame::from("second")), Err(DeliveryError::Gone(3)));
    }
}
