//! Live scan stream for UI clients
//!
//! Each connection is registered as a subscriber once the upgrade completes.
//! Frames queued by the broadcaster are written to the socket; client messages
//! are read only to detect disconnection.

use std::net::SocketAddr;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        ConnectInfo, State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use tokio::select;
use tracing::{debug, info, warn};

use crate::application::live::{LiveMessage, SharedSubscriberRegistry};
use crate::shared::ShutdownSignal;

/// State for the live scan WebSocket handler
#[derive(Clone)]
pub struct LiveState {
    pub registry: SharedSubscriberRegistry,
    pub shutdown: ShutdownSignal,
}

/// WebSocket upgrade handler for `/ws/scans`
pub async fn ws_scans_handler(
    ws: WebSocketUpgrade,
    State(state): State<LiveState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> impl IntoResponse {
    debug!(remote_addr = %addr, "Live scan stream upgrade requested");
    ws.on_upgrade(move |socket| handle_live_socket(socket, state, addr))
}

async fn handle_live_socket(socket: WebSocket, state: LiveState, addr: SocketAddr) {
    let (id, mut outbox) = state.registry.connect(Some(addr.to_string()));
    let (mut sender, mut receiver) = socket.split();

    let welcome = LiveMessage::Connected { subscriber_id: id }.to_frame();
    let sent = match welcome {
        Ok(frame) => sender.send(Message::Text(frame)).await,
        Err(e) => {
            warn!(subscriber_id = id, error = %e, "Failed to encode welcome frame");
            Ok(())
        }
    };
    if sent.is_err() {
        state.registry.remove(id);
        return;
    }

    loop {
        select! {
            frame = outbox.recv() => {
                match frame {
                    Some(frame) => {
                        if let Err(e) = sender.send(Message::Text(frame)).await {
                            debug!(subscriber_id = id, error = %e, "Socket write failed");
                            break;
                        }
                    }
                    None => {
                        // Pruned by the broadcaster or cleared at shutdown.
                        let _ = sender.send(Message::Close(None)).await;
                        break;
                    }
                }
            }

            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        debug!(subscriber_id = id, error = %e, "Socket read failed");
                        break;
                    }
                    Some(Ok(_)) => {}
                }
            }

            _ = state.shutdown.wait() => {
                let _ = sender.send(Message::Close(None)).await;
                break;
            }
        }
    }

    state.registry.remove(id);
    info!(subscriber_id = id, remote_addr = %addr, "Live scan stream closed");
}
