pub mod entities;
pub mod migrator;
pub mod repositories;

pub use repositories::SeaOrmScanRepository;

use sea_orm::{Database, DatabaseConnection};
use tracing::info;

/// Default store location: a SQLite file in the working directory
pub const DEFAULT_DATABASE_URL: &str = "sqlite://./";

/// Default store/database name
pub const DEFAULT_DATABASE_NAME: &str = "rfid_scans";

/// Database configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Store connection URI (e.g. `sqlite://./`, `sqlite://./scans.db?mode=rwc`)
    pub url: String,
    /// Database name; for a SQLite directory URI this is the file stem
    pub name: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
            name: DEFAULT_DATABASE_NAME.to_string(),
        }
    }
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
        }
    }

    /// `memory://` selects the in-process store instead of a database
    pub fn is_memory(&self) -> bool {
        self.url.starts_with("memory:")
    }

    /// Full connection URL.
    ///
    /// A SQLite URI ending in `/` names a directory; the database name becomes
    /// `<dir>/<name>.db`, created on first use. Any other URI is used as given.
    pub fn connection_url(&self) -> String {
        if self.url.starts_with("sqlite:") && self.url.ends_with('/') {
            format!("{}{}.db?mode=rwc", self.url, self.name)
        } else {
            self.url.clone()
        }
    }
}

/// Initialize database connection
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection, sea_orm::DbErr> {
    let url = config.connection_url();
    info!("Connecting to database: {}", url);
    let db = Database::connect(&url).await?;
    info!("Database connected successfully");
    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_directory_url_gets_database_file() {
        let config = DatabaseConfig::default();
        assert_eq!(config.connection_url(), "sqlite://./rfid_scans.db?mode=rwc");
    }

    #[test]
    fn explicit_url_is_used_verbatim() {
        let config = DatabaseConfig::new("sqlite::memory:", "ignored");
        assert_eq!(config.connection_url(), "sqlite::memory:");
        assert!(!config.is_memory());
        assert!(DatabaseConfig::new("memory://", "x").is_memory());
    }
}
