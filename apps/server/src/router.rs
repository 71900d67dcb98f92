use axum::Router;
use axum::middleware::from_fn_with_state;
use envcfg_deploy::endpoint::{Endpoint, sniff_requests};
use envcfg_kernel::server::{ApiState, router::system_router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

#[derive(OpenApi)]
#[openapi(info(title = "Environment Configs"))]
struct ApiDoc;

#[allow(unreachable_pub)]
#[must_use]
pub fn init(state: ApiState, endpoint: Arc<Endpoint>) -> Router {
    let (openapi_routes, api_doc) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(system_router())
        .with_state(state)
        .split_for_parts();

    let scalar_routes = Scalar::with_url("/api", api_doc);

    // Deploy requests are answered by the sniffer and never reach a route.
    Router::new()
        .merge(openapi_routes)
        .merge(scalar_routes)
        .layer(from_fn_with_state(endpoint, sniff_requests))
        .layer(TraceLayer::new_for_http())
}
