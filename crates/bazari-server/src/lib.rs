#![forbid(unsafe_code)]
//! HTTP surface of the storefront: router, handlers, the authorization
//! gate, and startup configuration. Business rules live in `bazari-orders`;
//! this crate maps them onto the wire.

use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, patch, post, put};
use axum::Router;
use bazari_orders::OrderEngine;
use bazari_store::SqliteStore;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

mod auth;
mod config;
mod http;
mod middleware;
mod notify;

pub use auth::google::{GoogleTokenVerifier, ThirdPartyIdentity, ThirdPartyVerifier, VerifyError};
pub use auth::token::{now_unix, Claims, TokenError, TokenSigner};
pub use config::{validate_startup_config, ServerConfig, CONFIG_SCHEMA_VERSION};
pub use notify::{LogMailer, MailError, Mailer};

pub const CRATE_NAME: &str = "bazari-server";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SqliteStore>,
    pub engine: Arc<OrderEngine<SqliteStore>>,
    pub tokens: TokenSigner,
    pub config: Arc<ServerConfig>,
    pub verifier: Arc<dyn ThirdPartyVerifier>,
    pub mailer: Arc<dyn Mailer>,
    pub(crate) request_id_seed: Arc<AtomicU64>,
}

impl AppState {
    #[must_use]
    pub fn new(
        config: ServerConfig,
        store: Arc<SqliteStore>,
        verifier: Arc<dyn ThirdPartyVerifier>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let engine = Arc::new(
            OrderEngine::new(Arc::clone(&store))
                .with_transition_policy(config.transition_policy),
        );
        let tokens = TokenSigner::new(config.token_secret.clone(), config.token_ttl_secs);
        Self {
            store,
            engine,
            tokens,
            config: Arc::new(config),
            verifier,
            mailer,
            request_id_seed: Arc::new(AtomicU64::new(1)),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let max_body_bytes = state.config.max_body_bytes;
    Router::new()
        .route("/healthz", get(http::handlers::healthz_handler))
        .route("/version", get(http::handlers::version_handler))
        .route("/auth/register", post(http::auth_routes::register_handler))
        .route(
            "/auth/verify-email",
            get(http::auth_routes::verify_email_handler),
        )
        .route("/auth/login", post(http::auth_routes::login_handler))
        .route("/auth/google", post(http::auth_routes::google_login_handler))
        .route(
            "/orders",
            post(http::orders::create_order_handler).get(http::orders::list_orders_handler),
        )
        .route("/orders/:id", get(http::orders::user_orders_handler))
        .route(
            "/orders/:id/status",
            patch(http::orders::update_status_handler),
        )
        .route(
            "/users",
            get(http::users::list_users_handler).post(http::users::create_user_handler),
        )
        .route(
            "/users/:id",
            put(http::users::update_user_handler).delete(http::users::delete_user_handler),
        )
        .route(
            "/products",
            get(http::products::list_products_handler)
                .post(http::products::create_product_handler),
        )
        .route(
            "/products/:id",
            get(http::products::get_product_handler)
                .put(http::products::update_product_handler)
                .delete(http::products::delete_product_handler),
        )
        .layer(from_fn_with_state(
            state.clone(),
            middleware::request_tracing::request_tracing_middleware,
        ))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}
