use axum::extract::State;
use axum::http::header;
use axum::{Json, response::IntoResponse};
use envcfg_domain::config::AppConfig;
use envcfg_domain::constants::SYSTEM_TAG;
use serde::Serialize;
use std::sync::LazyLock;
use std::time::Instant;
use utoipa::ToSchema;

static STARTED_AT: LazyLock<Instant> = LazyLock::new(Instant::now);

/// Liveness report.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always `up` while the process serves requests
    pub status: &'static str,
    /// Crate version
    pub version: &'static str,
    /// Tiers this process reports, e.g. `staging` or `none`
    pub environment: String,
    /// Seconds since the first health probe
    pub uptime: u64,
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = OK, description = "Service is up", body = HealthResponse)),
    tag = SYSTEM_TAG,
)]
pub(super) async fn health_handler(State(config): State<AppConfig>) -> impl IntoResponse {
    let report = HealthResponse {
        status: "up",
        version: env!("CARGO_PKG_VERSION"),
        environment: config.environment.classification().to_string(),
        uptime: STARTED_AT.elapsed().as_secs(),
    };

    ([(header::CACHE_CONTROL, "no-store")], Json(report))
}
