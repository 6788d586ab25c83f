#![allow(dead_code)]

use async_trait::async_trait;
use bazari_server::{
    build_router, AppState, LogMailer, ServerConfig, ThirdPartyIdentity, ThirdPartyVerifier,
    VerifyError,
};
use bazari_store::{IdentityStore, SqliteStore};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;

/// Accepts exactly one token value and vouches for a fixed identity.
pub struct StaticVerifier {
    pub accepted_token: String,
    pub identity: ThirdPartyIdentity,
}

#[async_trait]
impl ThirdPartyVerifier for StaticVerifier {
    async fn verify(&self, id_token: &str) -> Result<ThirdPartyIdentity, VerifyError> {
        if id_token == self.accepted_token {
            Ok(self.identity.clone())
        } else {
            Err(VerifyError("unknown token".to_string()))
        }
    }
}

pub struct RejectingVerifier;

#[async_trait]
impl ThirdPartyVerifier for RejectingVerifier {
    async fn verify(&self, _id_token: &str) -> Result<ThirdPartyIdentity, VerifyError> {
        Err(VerifyError("verification disabled".to_string()))
    }
}

pub struct TestApp {
    pub addr: SocketAddr,
    pub base: String,
    pub store: Arc<SqliteStore>,
    pub client: reqwest::Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }
}

pub async fn spawn_app_with_verifier(verifier: Arc<dyn ThirdPartyVerifier>) -> TestApp {
    let store = Arc::new(SqliteStore::open_in_memory().expect("open store"));
    let config = ServerConfig {
        token_secret: "integration-secret".to_string(),
        ..ServerConfig::default()
    };
    let state = AppState::new(config, Arc::clone(&store), verifier, Arc::new(LogMailer));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve app");
    });

    TestApp {
        addr,
        base: format!("http://{addr}"),
        store,
        client: reqwest::Client::new(),
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with_verifier(Arc::new(RejectingVerifier)).await
}

/// Drives the whole self-service flow: register, verify the mail token
/// (read back from the store), log in. Returns the bearer token and the
/// new account's id.
pub async fn register_and_login(
    app: &TestApp,
    username: &str,
    email: &str,
    role: &str,
) -> (String, String) {
    let resp = app
        .client
        .post(app.url("/auth/register"))
        .json(&json!({
            "username": username,
            "email": email,
            "password": "correct horse",
            "role": role,
        }))
        .send()
        .await
        .expect("register request");
    assert_eq!(resp.status().as_u16(), 201, "register {username}");

    let user = app
        .store
        .find_user_by_email(email)
        .await
        .expect("store read")
        .expect("registered user present");
    let token = user
        .verification_token
        .clone()
        .expect("verification token set");

    let resp = app
        .client
        .get(app.url("/auth/verify-email"))
        .query(&[("token", token.as_str())])
        .send()
        .await
        .expect("verify request");
    assert_eq!(resp.status().as_u16(), 200, "verify {username}");

    let resp = app
        .client
        .post(app.url("/auth/login"))
        .json(&json!({ "email": email, "password": "correct horse" }))
        .send()
        .await
        .expect("login request");
    assert_eq!(resp.status().as_u16(), 200, "login {username}");
    let body: Value = resp.json().await.expect("login body");
    let bearer = body["token"].as_str().expect("token in body").to_string();
    (bearer, user.id.as_str().to_string())
}

pub async fn seed_product(app: &TestApp, id: &str, name: &str, price: f64) {
    use bazari_model::{ImageRef, Product, ProductId};
    use bazari_store::CatalogStore;

    let product = Product {
        id: ProductId::parse(id).expect("product id"),
        name: name.to_string(),
        description: String::new(),
        price,
        category: "general".to_string(),
        images: vec![ImageRef {
            public_id: format!("asset-{id}"),
            url: format!("https://assets.example/{id}"),
        }],
        created_at: chrono::Utc::now(),
    };
    app.store
        .insert_product(&product)
        .await
        .expect("seed product");
}

pub fn error_of(body: &Value) -> (&str, &str) {
    let code = body["error"]["code"].as_str().expect("error code");
    let message = body["error"]["message"].as_str().expect("error message");
    (code, message)
}
