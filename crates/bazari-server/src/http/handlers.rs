use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub(crate) async fn healthz_handler() -> Response {
    Json(json!({ "status": "ok" })).into_response()
}

pub(crate) async fn version_handler() -> Response {
    Json(json!({
        "name": crate::CRATE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
    }))
    .into_response()
}
