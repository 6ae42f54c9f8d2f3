//! WebSocket interfaces
//!
//! - `scans`: real-time scan stream for UI clients

pub mod scans;

pub use scans::{ws_scans_handler, LiveState};
