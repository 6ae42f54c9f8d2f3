//! Transport adapters: REST API and live WebSocket stream

pub mod http;
pub mod ws;
