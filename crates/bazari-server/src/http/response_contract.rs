// SPDX-License-Identifier: Apache-2.0

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bazari_api::{ApiError, ApiErrorCode};
use bazari_orders::OrderError;
use bazari_store::StoreError;
use serde_json::json;
use tracing::error;

#[must_use]
pub(crate) fn api_error_status(code: ApiErrorCode) -> StatusCode {
    match code {
        ApiErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
        ApiErrorCode::Unauthenticated => StatusCode::UNAUTHORIZED,
        ApiErrorCode::Forbidden => StatusCode::FORBIDDEN,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[must_use]
pub(crate) fn api_error_response(err: ApiError) -> Response {
    let status = api_error_status(err.code);
    (status, Json(json!({ "error": err }))).into_response()
}

/// Engine failures onto the wire contract. Storage detail never reaches the
/// caller; it lands in the server log only.
#[must_use]
pub(crate) fn order_error_response(err: OrderError) -> Response {
    match err {
        OrderError::Invalid(message) => api_error_response(ApiError::invalid_request(message)),
        OrderError::UserNotFound => api_error_response(ApiError::not_found("user not found")),
        OrderError::ProductNotFound(id) => api_error_response(ApiError::new(
            ApiErrorCode::NotFound,
            format!("product not found: {id}"),
            json!({ "product": id }),
        )),
        OrderError::OrderNotFound => api_error_response(ApiError::not_found("order not found")),
        OrderError::TransitionDenied { from, to } => api_error_response(ApiError::new(
            ApiErrorCode::InvalidRequest,
            "order is in a terminal state",
            json!({ "from": from.as_str(), "to": to.as_str() }),
        )),
        OrderError::Store(err) => internal_response(&err),
    }
}

#[must_use]
pub(crate) fn internal_response(err: &StoreError) -> Response {
    error!("storage failure: {err}");
    api_error_response(ApiError::internal())
}
