//! Server runtime.
//!
//! [`ServerHandle`] owns the process lifecycle: store connection and
//! migrations, subscriber registry, REST + WebSocket listener, and graceful
//! teardown. The store handle is created here once and passed down
//! explicitly; nothing looks it up globally.

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::application::{Broadcaster, ScanService, SharedSubscriberRegistry, SubscriberRegistry};
use crate::config::{AppConfig, LogFormat};
use crate::domain::ScanRepository;
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::{init_database, InMemoryScanRepository, SeaOrmScanRepository};
use crate::interfaces::http::{create_api_router, AppState};
use crate::shared::{ShutdownCoordinator, ShutdownSignal};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Listener error: {0}")]
    Io(#[from] std::io::Error),
}

/// Options for starting the service.
pub struct ServerOptions {
    pub config: AppConfig,
    /// Run database migrations on startup (default: true).
    pub auto_migrate: bool,
    /// Install the Prometheus recorder and expose `/metrics` (default: true).
    pub enable_metrics: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
            enable_metrics: true,
        }
    }
}

impl ServerOptions {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }
}

/// Handle to a running service.
pub struct ServerHandle {
    pub scan_service: Arc<ScanService>,
    pub registry: SharedSubscriberRegistry,
    pub config: AppConfig,

    local_addr: SocketAddr,
    db: Option<DatabaseConnection>,
    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    /// Connect the store, build the ingestion pipeline and start listening.
    pub async fn start(opts: ServerOptions) -> Result<Self, ServerError> {
        let config = opts.config;
        info!("Starting RFID scan service...");

        let prometheus = if opts.enable_metrics {
            prometheus_handle()
        } else {
            None
        };

        // ── Store ──────────────────────────────────────────────
        let (repository, db): (Arc<dyn ScanRepository>, Option<DatabaseConnection>) =
            if config.database.is_memory() {
                warn!("Using in-memory scan store; scans are lost on restart");
                (Arc::new(InMemoryScanRepository::new()), None)
            } else {
                let db = init_database(&config.database).await?;
                if opts.auto_migrate {
                    info!("Running database migrations...");
                    Migrator::up(&db, None).await?;
                    info!("Migrations completed");
                }
                (Arc::new(SeaOrmScanRepository::new(db.clone())), Some(db))
            };

        // ── Live fan-out & ingestion ───────────────────────────
        let registry = SubscriberRegistry::shared(config.subscriber_buffer);
        let broadcaster = Broadcaster::new(registry.clone());
        let scan_service = Arc::new(ScanService::new(repository, broadcaster));

        // ── HTTP + WebSocket listener ──────────────────────────
        let shutdown = ShutdownCoordinator::new(config.server.shutdown_timeout);
        let shutdown_signal = shutdown.signal();

        let state = AppState::new(scan_service.clone(), shutdown_signal.clone());
        let router = create_api_router(state, &config.cors_origins, prometheus);

        let listener = tokio::net::TcpListener::bind(config.server.address()).await?;
        let local_addr = listener.local_addr()?;
        info!("REST API listening on http://{}", local_addr);
        info!("Live scan stream at ws://{}/ws/scans", local_addr);
        info!("Swagger UI available at http://{}/docs/", local_addr);
        info!("🚀 RFID scan service started");

        let api_shutdown = shutdown_signal.clone();
        let api_server = axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("🛑 HTTP server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("HTTP server error: {}", e);
            }
        });

        Ok(Self {
            scan_service,
            registry,
            config,
            local_addr,
            db,
            shutdown,
            api_task,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait until shutdown is triggered, then tear everything down.
    pub async fn wait(self) {
        let signal = self.shutdown.signal();
        let api_task = self.api_task;
        let registry = self.registry;
        let db = self.db;

        signal.wait().await;

        let finished = self
            .shutdown
            .cleanup(async move {
                registry.clear();

                match api_task.await {
                    Ok(()) => info!("HTTP server stopped"),
                    Err(e) => error!("HTTP server task panicked: {}", e),
                }

                if let Some(db) = db {
                    if let Err(e) = db.close().await {
                        warn!("Error closing database connection: {}", e);
                    } else {
                        info!("✅ Database connection closed");
                    }
                }
            })
            .await;

        if finished {
            info!("👋 RFID scan service shutdown complete");
        }
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        info!("🛑 Shutting down RFID scan service...");
        self.trigger_shutdown();
        self.wait().await;
    }
}

/// The global recorder can be installed once per process; later starts reuse it.
fn prometheus_handle() -> Option<PrometheusHandle> {
    static HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();
    HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                info!("📊 Prometheus metrics recorder installed");
                Some(handle)
            }
            Err(e) => {
                warn!("Metrics disabled, recorder install failed: {}", e);
                None
            }
        })
        .clone()
}

/// Initialize tracing from the application config.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}
