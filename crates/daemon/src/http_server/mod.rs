use axum::extract::DefaultBodyLimit;
use axum::Router;
use http::header::AUTHORIZATION;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::trace::TraceLayer;
use tower_http::trace::{DefaultOnFailure, DefaultOnResponse};
use tower_http::LatencyUnit;

pub mod api;
mod config;
mod handlers;
pub mod health;

pub use config::Config;

use crate::ServiceState;

const STATUS_PREFIX: &str = "/_status";

/// Room for the JSON envelope around the largest accepted payload
const BODY_LIMIT_OVERHEAD_BYTES: usize = 16 * 1024;

/// Admin bearer tokens must never show up in request traces
fn sensitive_headers_layer() -> SetSensitiveRequestHeadersLayer {
    SetSensitiveRequestHeadersLayer::new([AUTHORIZATION])
}

/// Build the full application router: status probes, the secrets API and the
/// admin API.
pub fn router(config: &Config, state: ServiceState, max_payload_bytes: usize) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .on_response(
            DefaultOnResponse::new()
                .include_headers(false)
                .level(config.log_level)
                .latency_unit(LatencyUnit::Micros),
        )
        .on_failure(DefaultOnFailure::new().latency_unit(LatencyUnit::Micros));

    Router::new()
        .nest(STATUS_PREFIX, health::router(state.clone()))
        .merge(api::router(state.clone()))
        .fallback(handlers::not_found_handler)
        .layer(DefaultBodyLimit::max(
            max_payload_bytes + BODY_LIMIT_OVERHEAD_BYTES,
        ))
        .with_state(state)
        .layer(trace_layer)
        .layer(sensitive_headers_layer())
}

/// Serve the router on an already bound listener until shutdown is signalled.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    mut shutdown_rx: watch::Receiver<()>,
) -> Result<(), HttpServerError> {
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.changed().await;
        })
        .await?;

    Ok(())
}

/// Run the API HTTP server (serves /_status, /health, /secrets and /admin routes).
pub async fn run_api(
    config: Config,
    state: ServiceState,
    max_payload_bytes: usize,
    shutdown_rx: watch::Receiver<()>,
) -> Result<(), HttpServerError> {
    let listen_addr = config.listen_addr;
    let router = router(&config, state, max_payload_bytes);

    tracing::info!(addr = ?listen_addr, "API server listening");
    let listener = TcpListener::bind(listen_addr).await?;

    serve(listener, router, shutdown_rx).await
}

#[derive(Debug, thiserror::Error)]
pub enum HttpServerError {
    #[error("an error occurred running the HTTP server: {0}")]
    ServingFailed(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, SocketAddr};

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use common::prelude::PasscodeParams;

    use super::*;
    use crate::ServiceConfig;

    async fn test_router(admin_token: Option<&str>) -> Router {
        router_for(ServiceConfig {
            admin_token: admin_token.map(str::to_string),
            passcode: PasscodeParams::minimum(),
            ..Default::default()
        })
        .await
    }

    async fn router_for(service_config: ServiceConfig) -> Router {
        let state = ServiceState::from_config(&service_config).await.unwrap();
        let config = Config::new(
            SocketAddr::from((Ipv4Addr::LOCALHOST, 0)),
            tracing::Level::DEBUG,
        );
        router(&config, state, service_config.max_payload_bytes)
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or_default())
    }

    #[tokio::test]
    async fn test_malformed_id_is_not_found() {
        let router = test_router(None).await;
        let request = Request::get("/secrets/not-a-uuid").body(Body::empty()).unwrap();
        let (status, body) = send(router, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "not_found");
    }

    #[tokio::test]
    async fn test_create_returns_link_under_base_url() {
        let router = test_router(None).await;
        let request = Request::post("/secrets")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"secret":"hello"}"#))
            .unwrap();
        let (status, body) = send(router, request).await;
        assert_eq!(status, StatusCode::CREATED);

        let id = body["id"].as_str().unwrap();
        assert_eq!(
            body["url"],
            format!("http://127.0.0.1:3000/secrets/{}", id)
        );
    }

    #[tokio::test]
    async fn test_create_link_keeps_public_url_prefix() {
        let router = router_for(ServiceConfig {
            public_url: Some(url::Url::parse("https://example.com/burn").unwrap()),
            passcode: PasscodeParams::minimum(),
            ..Default::default()
        })
        .await;

        let request = Request::post("/secrets")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"secret":"hello"}"#))
            .unwrap();
        let (status, body) = send(router.clone(), request).await;
        assert_eq!(status, StatusCode::CREATED);

        let id = body["id"].as_str().unwrap();
        assert_eq!(
            body["url"],
            format!("https://example.com/burn/secrets/{}", id)
        );

        // the stored secret is reachable under the returned id
        let request = Request::get(format!("/secrets/{}", id))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["secret"], "hello");
    }

    #[tokio::test]
    async fn test_authorization_header_marked_sensitive() {
        async fn is_sensitive(headers: http::HeaderMap) -> String {
            headers
                .get(AUTHORIZATION)
                .map(|value| value.is_sensitive())
                .unwrap_or_default()
                .to_string()
        }

        let router = Router::new()
            .route("/", axum::routing::get(is_sensitive))
            .layer(sensitive_headers_layer());
        let request = Request::get("/")
            .header("authorization", "Bearer s3cr3t")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"true");
    }

    #[tokio::test]
    async fn test_admin_routes_hidden_without_token() {
        let router = test_router(None).await;
        let request = Request::get("/admin/secrets")
            .header("authorization", "Bearer anything")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(router, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_body_limit() {
        let router = test_router(None).await;
        let huge = format!(r#"{{"secret":"{}"}}"#, "x".repeat(1024 * 1024));
        let request = Request::post("/secrets")
            .header("content-type", "application/json")
            .body(Body::from(huge))
            .unwrap();
        let (status, _) = send(router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
