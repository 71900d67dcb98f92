use super::health;
use axum::extract::FromRef;
use envcfg_domain::config::AppConfig;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// Routes every app exposes next to its feature routes.
#[must_use]
pub fn system_router<S>() -> OpenApiRouter<S>
where
    S: Send + Sync + Clone + 'static,
    AppConfig: FromRef<S>,
{
    OpenApiRouter::<S>::new().routes(routes!(health::health_handler))
}
