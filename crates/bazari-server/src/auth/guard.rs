// SPDX-License-Identifier: Apache-2.0

use crate::auth::token::Claims;
use crate::http::response_contract::api_error_response;
use crate::AppState;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::response::Response;
use bazari_api::ApiError;
use bazari_model::{User, UserId};
use bazari_store::IdentityStore;
use tracing::{error, warn};

/// Resolves the bearer token to verified claims. No database read: the
/// signed claims alone establish identity and role for non-privileged work.
pub(crate) fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Claims, Response> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    let Some(token) = token else {
        return Err(api_error_response(ApiError::unauthenticated(
            "no token provided",
        )));
    };
    match state.tokens.verify(token) {
        Ok(claims) => Ok(claims),
        Err(err) => {
            warn!("bearer token rejected: {err}");
            Err(api_error_response(ApiError::unauthenticated("unauthorized")))
        }
    }
}

/// Re-reads the holder's role from the store on every privileged call, so a
/// revoked admin loses access immediately even while the old token is live.
pub(crate) async fn require_admin(state: &AppState, claims: &Claims) -> Result<User, Response> {
    let forbidden =
        || api_error_response(ApiError::forbidden("admin privileges required"));
    let Ok(user_id) = UserId::parse(&claims.sub) else {
        return Err(forbidden());
    };
    match state.store.find_user(&user_id).await {
        Ok(Some(user)) if user.role.is_admin() => Ok(user),
        Ok(_) => Err(forbidden()),
        Err(err) => {
            error!("admin check failed against the store: {err}");
            Err(api_error_response(ApiError::internal()))
        }
    }
}
