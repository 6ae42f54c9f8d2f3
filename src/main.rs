//! RFID Scan Service
//!
//! Reads configuration from the environment (and `.env` when present).

use rfid_scans::{init_tracing, AppConfig, ServerHandle, ServerOptions};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (config, notices) = AppConfig::from_env();
    init_tracing(&config);
    for notice in &notices {
        warn!("{}", notice);
    }

    info!(
        address = %config.server.address(),
        database = %config.database.url,
        subscriber_buffer = config.subscriber_buffer,
        "Configuration loaded"
    );

    let server = match ServerHandle::start(ServerOptions::new(config)).await {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to start server: {}", e);
            return Err(e.into());
        }
    };

    server.install_signal_handler();
    server.wait().await;

    Ok(())
}
