//! Municipality Mirror API Server
//!
//! REST API that mirrors the IBGE municipality listing into an in-memory
//! store and exposes retrieve/update/delete operations over it.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;

pub mod error;
pub mod outcome;
mod routes;
pub mod settings;

pub use error::ApiError;
pub use outcome::Outcome;
pub use settings::ServiceConfig;

use storage::MunicipalityRepository;
use upstream::{IbgeClient, MunicipalitySource};

/// Application state shared across handlers
pub struct AppState {
    /// Municipality store
    pub repository: Arc<MunicipalityRepository>,
    /// Where ingest fetches from
    pub source: Arc<dyn MunicipalitySource>,
    /// Upstream endpoint, reported by the health check
    pub upstream_url: String,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(
        repository: MunicipalityRepository,
        source: Arc<dyn MunicipalitySource>,
        upstream_url: impl Into<String>,
    ) -> Self {
        Self {
            repository: Arc::new(repository),
            source,
            upstream_url: upstream_url.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub store: StoreStatus,
    pub upstream_url: String,
}

/// Store status
#[derive(Debug, Serialize)]
pub struct StoreStatus {
    pub name: String,
    /// `None` when the store cannot be read
    pub records: Option<usize>,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/municipios",
            post(routes::municipios::ingest)
                .get(routes::municipios::list)
                .delete(routes::municipios::delete_all),
        )
        .route(
            "/municipios/:id",
            get(routes::municipios::get_by_id)
                .put(routes::municipios::update)
                .delete(routes::municipios::delete_by_id),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (code, status, records) = match state.repository.count() {
        Ok(records) => (StatusCode::OK, "healthy", Some(records)),
        Err(err) => {
            warn!("Health check found store unavailable: {}", err);
            (StatusCode::SERVICE_UNAVAILABLE, "degraded", None)
        }
    };

    let response = HealthResponse {
        status: status.to_string(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        store: StoreStatus {
            name: state.repository.name().to_string(),
            records,
        },
        upstream_url: state.upstream_url.clone(),
    };

    (code, Json(response))
}

/// Initialize logging
pub fn init_logging(config: &ServiceConfig) -> anyhow::Result<()> {
    let builder = FmtSubscriber::builder()
        .with_max_level(config.level()?)
        .with_target(true);

    if config.log_json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

/// Run the server
pub async fn run_server(config: ServiceConfig) -> anyhow::Result<()> {
    let source = IbgeClient::new(&config.upstream_url, config.upstream_timeout())?;
    let state = Arc::new(AppState::new(
        MunicipalityRepository::new(&config.store_name),
        Arc::new(source),
        &config.upstream_url,
    ));

    let mut app = create_router(state);
    if config.metrics_enabled {
        let handle = PrometheusBuilder::new().install_recorder()?;
        app = app.route("/metrics", get(move || std::future::ready(handle.render())));
        info!("Prometheus metrics exposed on /metrics");
    }

    info!("Starting API server on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
