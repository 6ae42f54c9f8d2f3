//! # RFID Scan Service
//!
//! Ingests RFID scans posted by readers, stores them, and pushes every
//! stored scan to all connected live clients over WebSocket.
//!
//! ## Architecture
//!
//! - **domain**: scan types, repository trait and errors
//! - **application**: ingestion service, subscriber registry and broadcaster
//! - **infrastructure**: SeaORM/SQLite and in-memory scan stores
//! - **interfaces**: REST API with Swagger documentation and the live WebSocket stream
//! - **server**: process lifecycle and tracing setup

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::AppConfig;

pub use application::{Broadcaster, ScanService, SharedSubscriberRegistry, SubscriberRegistry};
pub use domain::{DomainError, NewScan, ScanEvent};
pub use infrastructure::{init_database, DatabaseConfig};
pub use interfaces::http::create_api_router;
pub use server::{init_tracing, ServerError, ServerHandle, ServerOptions};
