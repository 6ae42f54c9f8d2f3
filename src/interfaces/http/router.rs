//! API router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::FromRef,
    http::{HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::common::ApiResponse;
use super::handlers::{health, metrics, scans};
use super::middleware::track_requests;
use crate::application::{ScanService, SharedSubscriberRegistry};
use crate::config::allows_any_origin;
use crate::domain::{NewScan, ScanEvent};
use crate::interfaces::ws::{ws_scans_handler, LiveState};
use crate::shared::ShutdownSignal;

/// Unified router state; each handler extracts its own slice via `FromRef`.
#[derive(Clone)]
pub struct AppState {
    pub scan_service: Arc<ScanService>,
    pub registry: SharedSubscriberRegistry,
    pub shutdown: ShutdownSignal,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(scan_service: Arc<ScanService>, shutdown: ShutdownSignal) -> Self {
        let registry = scan_service.broadcaster().registry().clone();
        Self {
            scan_service,
            registry,
            shutdown,
            started_at: Instant::now(),
        }
    }
}

impl FromRef<AppState> for scans::ScanState {
    fn from_ref(s: &AppState) -> Self {
        scans::ScanState {
            service: Arc::clone(&s.scan_service),
        }
    }
}

impl FromRef<AppState> for health::HealthState {
    fn from_ref(s: &AppState) -> Self {
        health::HealthState {
            registry: s.registry.clone(),
            started_at: s.started_at,
        }
    }
}

impl FromRef<AppState> for LiveState {
    fn from_ref(s: &AppState) -> Self {
        LiveState {
            registry: s.registry.clone(),
            shutdown: s.shutdown.clone(),
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        scans::create_scan,
        scans::list_scans,
        scans::get_scan,
    ),
    components(
        schemas(
            ApiResponse<String>,
            NewScan,
            ScanEvent,
            health::HealthResponse,
        )
    ),
    tags(
        (name = "Health", description = "Server health check"),
        (name = "Scans", description = "RFID scan ingestion and history. Live scans stream over WebSocket at /ws/scans"),
    ),
    info(
        title = "RFID Scan Service API",
        version = "0.1.0",
        description = "Ingests RFID scans from readers and streams them to live clients",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Build the CORS layer from the configured origin list.
///
/// `*` allows any origin; entries that are not valid header values are skipped.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if allows_any_origin(origins) {
        return base.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    base.allow_origin(AllowOrigin::list(allowed))
}

/// Create the router with all routes
pub fn create_api_router(
    state: AppState,
    cors_origins: &[String],
    prometheus: Option<PrometheusHandle>,
) -> Router {
    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    let mut router = Router::new()
        .merge(swagger_routes)
        .route("/health", get(health::health_check))
        .route("/api/scans", get(scans::list_scans).post(scans::create_scan))
        .route("/api/scans/{id}", get(scans::get_scan))
        .route("/ws/scans", get(ws_scans_handler))
        .with_state(state);

    if let Some(handle) = prometheus {
        router = router.route(
            "/metrics",
            get(metrics::prometheus_metrics).with_state(metrics::MetricsState { handle }),
        );
    }

    router
        .layer(middleware::from_fn(track_requests))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
}
