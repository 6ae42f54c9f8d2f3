//! Infrastructure layer - external concerns

pub mod database;
pub mod memory;

pub use database::{init_database, DatabaseConfig, SeaOrmScanRepository};
pub use memory::InMemoryScanRepository;
