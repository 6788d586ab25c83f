// SPDX-License-Identifier: Apache-2.0

use crate::auth::guard;
use crate::http::response_contract::{api_error_response, internal_response};
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bazari_api::{ApiError, CreateUserRequest, UpdateUserRequest, UserDto};
use bazari_model::{Role, User, UserId};
use bazari_store::{IdentityStore, StoreError};
use chrono::Utc;
use tracing::warn;

async fn admin_gate(state: &AppState, headers: &HeaderMap) -> Result<(), Response> {
    let claims = guard::authenticate(state, headers)?;
    guard::require_admin(state, &claims).await?;
    Ok(())
}

pub(crate) async fn list_users_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    if let Err(denied) = admin_gate(&state, &headers).await {
        return denied;
    }
    match state.store.list_users().await {
        Ok(users) => {
            let payload: Vec<UserDto> = users.iter().map(UserDto::from).collect();
            Json(payload).into_response()
        }
        Err(err) => internal_response(&err),
    }
}

pub(crate) async fn create_user_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateUserRequest>,
) -> Response {
    if let Err(denied) = admin_gate(&state, &headers).await {
        return denied;
    }
    let (Some(username), Some(email), Some(password)) =
        (body.username, body.email, body.password)
    else {
        return api_error_response(ApiError::invalid_request(
            "username, email, and password are required",
        ));
    };
    let role = match body.role.as_deref() {
        None => Role::default(),
        Some(raw) => match Role::parse(raw) {
            Ok(role) => role,
            Err(err) => return api_error_response(ApiError::invalid_request(err.to_string())),
        },
    };
    let password_hash = match bcrypt::hash(&password, bcrypt::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(err) => {
            warn!("password hashing failed: {err}");
            return api_error_response(ApiError::internal());
        }
    };
    let user = User {
        id: UserId::generate(),
        username,
        email,
        password_hash: Some(password_hash),
        role,
        google_id: None,
        profile_image: None,
        verified: false,
        verification_token: None,
        order_ids: vec![],
        created_at: Utc::now(),
    };
    match state.store.insert_user(&user).await {
        Ok(()) => (StatusCode::CREATED, Json(UserDto::from(&user))).into_response(),
        Err(StoreError::Conflict(_)) => {
            api_error_response(ApiError::invalid_request("user already exists"))
        }
        Err(err) => internal_response(&err),
    }
}

pub(crate) async fn update_user_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<UpdateUserRequest>,
) -> Response {
    if let Err(denied) = admin_gate(&state, &headers).await {
        return denied;
    }
    let Ok(user_id) = UserId::parse(&id) else {
        return api_error_response(ApiError::not_found("user not found"));
    };
    let mut user = match state.store.find_user(&user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => return api_error_response(ApiError::not_found("user not found")),
        Err(err) => return internal_response(&err),
    };

    if let Some(username) = body.username {
        user.username = username;
    }
    if let Some(email) = body.email {
        user.email = email;
    }
    if let Some(raw) = body.role.as_deref() {
        match Role::parse(raw) {
            Ok(role) => user.role = role,
            Err(err) => return api_error_response(ApiError::invalid_request(err.to_string())),
        }
    }
    if let Some(image) = body.profile_image {
        user.profile_image = Some(image);
    }
    if let Some(password) = body.password {
        match bcrypt::hash(&password, bcrypt::DEFAULT_COST) {
            Ok(hash) => user.password_hash = Some(hash),
            Err(err) => {
                warn!("password hashing failed: {err}");
                return api_error_response(ApiError::internal());
            }
        }
    }

    match state.store.update_user(&user).await {
        Ok(()) => Json(UserDto::from(&user)).into_response(),
        Err(StoreError::Conflict(_)) => {
            api_error_response(ApiError::invalid_request("email already in use"))
        }
        Err(err) => internal_response(&err),
    }
}

pub(crate) async fn delete_user_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if let Err(denied) = admin_gate(&state, &headers).await {
        return denied;
    }
    let Ok(user_id) = UserId::parse(&id) else {
        return api_error_response(ApiError::not_found("user not found"));
    };
    match state.store.delete_user(&user_id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => api_error_response(ApiError::not_found("user not found")),
        Err(err) => internal_response(&err),
    }
}
