mod support;

use bazari_server::ThirdPartyIdentity;
use bazari_store::IdentityStore;
use serde_json::{json, Value};
use std::sync::Arc;
use support::{
    error_of, register_and_login, spawn_app, spawn_app_with_verifier, StaticVerifier,
};

#[tokio::test]
async fn registration_requires_verification_before_login() {
    let app = spawn_app().await;

    let resp = app
        .client
        .post(app.url("/auth/register"))
        .json(&json!({
            "username": "alice",
            "email": "alice@example.com",
            "password": "correct horse",
        }))
        .send()
        .await
        .expect("register");
    assert_eq!(resp.status().as_u16(), 201);

    let resp = app
        .client
        .post(app.url("/auth/login"))
        .json(&json!({ "email": "alice@example.com", "password": "correct horse" }))
        .send()
        .await
        .expect("login before verify");
    assert_eq!(resp.status().as_u16(), 403);
    let body: Value = resp.json().await.expect("error body");
    assert_eq!(error_of(&body), ("Forbidden", "email not verified"));

    let resp = app
        .client
        .get(app.url("/auth/verify-email"))
        .query(&[("token", "bogus")])
        .send()
        .await
        .expect("bad verify token");
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await.expect("error body");
    assert_eq!(error_of(&body).1, "invalid or expired token");

    let token = app
        .store
        .find_user_by_email("alice@example.com")
        .await
        .expect("read")
        .expect("present")
        .verification_token
        .expect("token set");
    let resp = app
        .client
        .get(app.url("/auth/verify-email"))
        .query(&[("token", token.as_str())])
        .send()
        .await
        .expect("verify");
    assert_eq!(resp.status().as_u16(), 200);

    let resp = app
        .client
        .post(app.url("/auth/login"))
        .json(&json!({ "email": "alice@example.com", "password": "wrong" }))
        .send()
        .await
        .expect("wrong password");
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await.expect("error body");
    assert_eq!(error_of(&body).1, "invalid credentials");

    let resp = app
        .client
        .post(app.url("/auth/login"))
        .json(&json!({ "email": "alice@example.com", "password": "correct horse" }))
        .send()
        .await
        .expect("login");
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.expect("login body");
    assert_eq!(body["role"], "user");
    assert!(body["token"].as_str().expect("token").starts_with("bz1."));
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let app = spawn_app().await;
    let payload = json!({
        "username": "alice",
        "email": "alice@example.com",
        "password": "correct horse",
    });
    let resp = app
        .client
        .post(app.url("/auth/register"))
        .json(&payload)
        .send()
        .await
        .expect("first register");
    assert_eq!(resp.status().as_u16(), 201);

    let resp = app
        .client
        .post(app.url("/auth/register"))
        .json(&payload)
        .send()
        .await
        .expect("second register");
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await.expect("error body");
    assert_eq!(error_of(&body).1, "user already exists");
}

#[tokio::test]
async fn google_login_provisions_once_and_reuses_the_account() {
    let verifier = StaticVerifier {
        accepted_token: "good-token".to_string(),
        identity: ThirdPartyIdentity {
            subject: "google-77".to_string(),
            email: "carol@example.com".to_string(),
            name: Some("Carol".to_string()),
        },
    };
    let app = spawn_app_with_verifier(Arc::new(verifier)).await;

    let resp = app
        .client
        .post(app.url("/auth/google"))
        .json(&json!({ "idToken": "good-token" }))
        .send()
        .await
        .expect("first google login");
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.expect("login body");
    assert_eq!(body["role"], "user");

    let provisioned = app
        .store
        .find_user_by_google_id("google-77")
        .await
        .expect("read")
        .expect("provisioned");
    assert_eq!(provisioned.email, "carol@example.com");
    assert_eq!(provisioned.username, "Carol");
    assert!(provisioned.password_hash.is_none());
    assert!(provisioned.verified);

    let resp = app
        .client
        .post(app.url("/auth/google"))
        .json(&json!({ "idToken": "good-token" }))
        .send()
        .await
        .expect("second google login");
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(app.store.list_users().await.expect("list").len(), 1);

    let resp = app
        .client
        .post(app.url("/auth/google"))
        .json(&json!({ "idToken": "forged" }))
        .send()
        .await
        .expect("rejected google login");
    assert_eq!(resp.status().as_u16(), 401);
    let body: Value = resp.json().await.expect("error body");
    assert_eq!(error_of(&body), ("Unauthenticated", "unauthorized"));

    let resp = app
        .client
        .post(app.url("/auth/google"))
        .json(&json!({}))
        .send()
        .await
        .expect("missing id token");
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn user_administration_is_admin_only_and_hides_credentials() {
    let app = spawn_app().await;
    let (admin_token, _) = register_and_login(&app, "root", "root@example.com", "admin").await;
    let (alice_token, _) = register_and_login(&app, "alice", "alice@example.com", "user").await;

    let resp = app
        .client
        .get(app.url("/users"))
        .bearer_auth(&alice_token)
        .send()
        .await
        .expect("list as non-admin");
    assert_eq!(resp.status().as_u16(), 403);

    let resp = app
        .client
        .post(app.url("/users"))
        .bearer_auth(&admin_token)
        .json(&json!({
            "username": "bob",
            "email": "bob@example.com",
            "password": "hunter2 hunter2",
        }))
        .send()
        .await
        .expect("create user");
    assert_eq!(resp.status().as_u16(), 201);
    let created: Value = resp.json().await.expect("created body");
    let bob_id = created["id"].as_str().expect("id").to_string();
    assert!(created.get("passwordHash").is_none());
    assert!(created.get("password_hash").is_none());

    let resp = app
        .client
        .get(app.url("/users"))
        .bearer_auth(&admin_token)
        .send()
        .await
        .expect("list as admin");
    assert_eq!(resp.status().as_u16(), 200);
    let listing: Value = resp.json().await.expect("listing body");
    assert_eq!(listing.as_array().expect("array").len(), 3);

    let resp = app
        .client
        .put(app.url(&format!("/users/{bob_id}")))
        .bearer_auth(&admin_token)
        .json(&json!({ "role": "admin" }))
        .send()
        .await
        .expect("promote bob");
    assert_eq!(resp.status().as_u16(), 200);
    let updated: Value = resp.json().await.expect("updated body");
    assert_eq!(updated["role"], "admin");

    let resp = app
        .client
        .delete(app.url(&format!("/users/{bob_id}")))
        .bearer_auth(&admin_token)
        .send()
        .await
        .expect("delete bob");
    assert_eq!(resp.status().as_u16(), 204);

    let resp = app
        .client
        .delete(app.url(&format!("/users/{bob_id}")))
        .bearer_auth(&admin_token)
        .send()
        .await
        .expect("delete again");
    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
async fn catalog_writes_are_admin_only_and_reads_are_public() {
    let app = spawn_app().await;
    let (admin_token, _) = register_and_login(&app, "root", "root@example.com", "admin").await;

    let resp = app
        .client
        .post(app.url("/products"))
        .bearer_auth(&admin_token)
        .json(&json!({
            "name": "Desk Lamp",
            "price": 100.0,
            "category": "home",
        }))
        .send()
        .await
        .expect("create without images");
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await.expect("error body");
    assert_eq!(error_of(&body).1, "at least one image is required");

    let resp = app
        .client
        .post(app.url("/products"))
        .bearer_auth(&admin_token)
        .json(&json!({
            "name": "Desk Lamp",
            "price": 100.0,
            "category": "home",
            "images": [{ "public_id": "lamp", "url": "https://assets.example/lamp" }],
        }))
        .send()
        .await
        .expect("create product");
    assert_eq!(resp.status().as_u16(), 201);
    let created: Value = resp.json().await.expect("created body");
    assert_eq!(created["message"], "Product created successfully");
    let product_id = created["product"]["id"].as_str().expect("id").to_string();

    let resp = app
        .client
        .post(app.url("/products"))
        .json(&json!({ "name": "x", "price": 1.0, "category": "y" }))
        .send()
        .await
        .expect("create without token");
    assert_eq!(resp.status().as_u16(), 401);

    let resp = app
        .client
        .get(app.url("/products"))
        .send()
        .await
        .expect("public listing");
    assert_eq!(resp.status().as_u16(), 200);
    let listing: Value = resp.json().await.expect("listing body");
    assert_eq!(listing.as_array().expect("array").len(), 1);

    let resp = app
        .client
        .put(app.url(&format!("/products/{product_id}")))
        .bearer_auth(&admin_token)
        .json(&json!({ "price": -5.0 }))
        .send()
        .await
        .expect("negative price");
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await.expect("error body");
    assert_eq!(error_of(&body).1, "price must be non-negative");

    let resp = app
        .client
        .put(app.url(&format!("/products/{product_id}")))
        .bearer_auth(&admin_token)
        .json(&json!({ "price": 120.0 }))
        .send()
        .await
        .expect("update price");
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.expect("update body");
    assert_eq!(body["product"]["price"], 120.0);

    let resp = app
        .client
        .delete(app.url(&format!("/products/{product_id}")))
        .bearer_auth(&admin_token)
        .send()
        .await
        .expect("delete product");
    assert_eq!(resp.status().as_u16(), 200);

    let resp = app
        .client
        .get(app.url(&format!("/products/{product_id}")))
        .send()
        .await
        .expect("read after delete");
    assert_eq!(resp.status().as_u16(), 404);
}
