// SPDX-License-Identifier: Apache-2.0

use crate::http::response_contract::{api_error_response, internal_response};
use crate::AppState;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bazari_api::{
    ApiError, GoogleLoginRequest, LoginRequest, LoginResponse, MessageResponse, RegisterRequest,
};
use bazari_model::{Role, User, UserId};
use bazari_store::{IdentityStore, StoreError};
use chrono::Utc;
use std::collections::HashMap;
use tracing::{info, warn};

fn hash_password(password: &str) -> Result<String, Response> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST).map_err(|err| {
        warn!("password hashing failed: {err}");
        api_error_response(ApiError::internal())
    })
}

pub(crate) async fn register_handler(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Response {
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

    match state.store.find_user_by_email(&email).await {
        Ok(Some(_)) => {
            return api_error_response(ApiError::invalid_request("user already exists"))
        }
        Ok(None) => {}
        Err(err) => return internal_response(&err),
    }

    let password_hash = match hash_password(&password) {
        Ok(hash) => hash,
        Err(denied) => return denied,
    };
    let verification_token = uuid::Uuid::new_v4().simple().to_string();
    let user = User {
        id: UserId::generate(),
        username: username.clone(),
        email: email.clone(),
        password_hash: Some(password_hash),
        role,
        google_id: None,
        profile_image: None,
        verified: false,
        verification_token: Some(verification_token.clone()),
        order_ids: vec![],
        created_at: Utc::now(),
    };
    match state.store.insert_user(&user).await {
        Ok(()) => {}
        Err(StoreError::Conflict(_)) => {
            return api_error_response(ApiError::invalid_request("user already exists"))
        }
        Err(err) => return internal_response(&err),
    }

    let subject = "Welcome! Please verify your email";
    let message = format!(
        "Hello {username},\n\nPlease verify your email by visiting \
         /auth/verify-email?token={verification_token}\n"
    );
    if let Err(err) = state.mailer.send(&email, subject, &message).await {
        warn!("verification mail not delivered: {err}");
        return api_error_response(ApiError::internal());
    }
    info!(user = %user.id, "user registered");
    (
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User registered successfully. Verification email sent.".to_string(),
        }),
    )
        .into_response()
}

pub(crate) async fn verify_email_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(token) = params.get("token").filter(|t| !t.is_empty()) else {
        return api_error_response(ApiError::invalid_request("invalid or expired token"));
    };
    let user = match state.store.find_user_by_verification_token(token).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return api_error_response(ApiError::invalid_request("invalid or expired token"))
        }
        Err(err) => return internal_response(&err),
    };
    let updated = User {
        verified: true,
        verification_token: None,
        ..user
    };
    if let Err(err) = state.store.update_user(&updated).await {
        return internal_response(&err);
    }
    Json(MessageResponse {
        message: "Email verified successfully".to_string(),
    })
    .into_response()
}

pub(crate) async fn login_handler(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Response {
    let invalid_credentials =
        || api_error_response(ApiError::invalid_request("invalid credentials"));
    let (Some(email), Some(password)) = (body.email, body.password) else {
        return invalid_credentials();
    };
    let user = match state.store.find_user_by_email(&email).await {
        Ok(Some(user)) => user,
        Ok(None) => return invalid_credentials(),
        Err(err) => return internal_response(&err),
    };
    if !user.verified {
        return api_error_response(ApiError::forbidden("email not verified"));
    }
    let Some(hash) = &user.password_hash else {
        return invalid_credentials();
    };
    match bcrypt::verify(&password, hash) {
        Ok(true) => {}
        Ok(false) => return invalid_credentials(),
        Err(err) => {
            warn!("password verification failed: {err}");
            return api_error_response(ApiError::internal());
        }
    }
    let token = state.tokens.issue(&user);
    Json(LoginResponse {
        token,
        role: user.role.as_str().to_string(),
        message: "Login successful".to_string(),
    })
    .into_response()
}

/// Third-party login. First sight of a provider subject provisions an
/// account with no password hash; an existing account with the same email
/// gets the provider subject linked instead.
pub(crate) async fn google_login_handler(
    State(state): State<AppState>,
    Json(body): Json<GoogleLoginRequest>,
) -> Response {
    let Some(id_token) = body.id_token else {
        return api_error_response(ApiError::invalid_request("id token is required"));
    };
    let identity = match state.verifier.verify(&id_token).await {
        Ok(identity) => identity,
        Err(err) => {
            warn!("third-party login rejected: {err}");
            return api_error_response(ApiError::unauthenticated("unauthorized"));
        }
    };

    let existing = match state.store.find_user_by_google_id(&identity.subject).await {
        Ok(user) => user,
        Err(err) => return internal_response(&err),
    };
    let user = match existing {
        Some(user) => user,
        None => match state.store.find_user_by_email(&identity.email).await {
            Ok(Some(user)) => {
                let linked = User {
                    google_id: Some(identity.subject.clone()),
                    ..user
                };
                if let Err(err) = state.store.update_user(&linked).await {
                    return internal_response(&err);
                }
                linked
            }
            Ok(None) => {
                let user = User {
                    id: UserId::generate(),
                    username: identity.name.unwrap_or_else(|| identity.email.clone()),
                    email: identity.email.clone(),
                    password_hash: None,
                    role: Role::default(),
                    google_id: Some(identity.subject.clone()),
                    profile_image: None,
                    verified: true,
                    verification_token: None,
                    order_ids: vec![],
                    created_at: Utc::now(),
                };
                if let Err(err) = state.store.insert_user(&user).await {
                    return internal_response(&err);
                }
                info!(user = %user.id, "account provisioned from third-party login");
                user
            }
            Err(err) => return internal_response(&err),
        },
    };

    let token = state.tokens.issue(&user);
    Json(LoginResponse {
        token,
        role: user.role.as_str().to_string(),
        message: "Login successful".to_string(),
    })
    .into_response()
}
