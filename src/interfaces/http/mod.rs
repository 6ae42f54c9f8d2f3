//! HTTP REST API interfaces
//!
//! - `handlers`: health, scans and metrics endpoints
//! - `middleware`: request metrics
//! - `router`: API router with Swagger documentation and CORS

pub mod common;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use router::{create_api_router, AppState};
