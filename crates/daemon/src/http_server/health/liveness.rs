use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;

#[tracing::instrument]
pub async fn handler() -> Response {
    let msg = serde_json::json!({"status": "ok"});
    (StatusCode::OK, Json(msg)).into_response()
}

/// `GET /health`, the probe browser clients poll
pub async fn ok_handler() -> Response {
    (StatusCode::OK, Json(serde_json::json!({"ok": true}))).into_response()
}
