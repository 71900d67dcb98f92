use axum::body::{Body, to_bytes};
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode, header};
use envcfg_domain::config::AppConfig;
use envcfg_domain::events::ConfigStaging;
use envcfg_event_bus::EventReceiverExt;
use envcfg_server::Server;
use std::net::SocketAddr;
use tower::ServiceExt;

fn server() -> Server {
    let mut cfg = AppConfig::default();
    cfg.access.developer_ips = vec!["198.51.100.7".to_owned()];
    cfg.environment.tier = Some("staging".to_owned());
    Server::builder().config(cfg).build().unwrap()
}

fn get(uri: &str, from: Option<[u8; 4]>) -> Request<Body> {
    let mut request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    if let Some(ip) = from {
        request.extensions_mut().insert(ConnectInfo(SocketAddr::from((ip, 51_000))));
    }
    request
}

#[tokio::test]
async fn health_reports_up() {
    let response = server().router().oneshot(get("/health", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CACHE_CONTROL].to_str().unwrap().contains("no-store"));

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "up");
    assert_eq!(json["environment"], "staging");
    assert!(json["uptime"].is_u64());
}

#[tokio::test]
async fn deploy_from_developer_runs_staging_branch() {
    let server = server();
    let mut staging = server.state().events.subscribe::<ConfigStaging>().unwrap();

    let response =
        server.router().oneshot(get("/api/deploy", Some([198, 51, 100, 7]))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(to_bytes(response.into_body(), usize::MAX).await.unwrap().is_empty());
    assert_eq!(staging.try_recv_event().unwrap().remote_addr, "198.51.100.7");
}

#[tokio::test]
async fn deploy_from_stranger_is_silent() {
    let server = server();
    let mut staging = server.state().events.subscribe::<ConfigStaging>().unwrap();

    let response =
        server.router().oneshot(get("/health?__deploy=1", Some([10, 0, 0, 1]))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(to_bytes(response.into_body(), usize::MAX).await.unwrap().is_empty());
    assert!(staging.try_recv_event().is_none());
}

#[tokio::test]
async fn api_docs_are_served() {
    let response = server().router().oneshot(get("/api", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let response = server().router().oneshot(get("/api/deployment", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[test]
fn missing_certificate_fails_build() {
    let mut cfg = AppConfig::default();
    cfg.server.ssl = Some(envcfg_domain::config::SslConfig {
        cert: "/nonexistent/cert.pem".into(),
        key: "/nonexistent/key.pem".into(),
    });

    assert!(Server::builder().config(cfg).build().is_err());
}
