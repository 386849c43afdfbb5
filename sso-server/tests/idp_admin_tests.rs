// Identity-provider admin CRUD over the in-memory store
mod common;

use axum::http::{Method, StatusCode};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use common::{DownStore, TestApp};
use secrecy::ExposeSecret;
use serde_json::{json, Value};
use std::sync::Arc;

const IDPS: &str = "/admin/tenants/99/idps";

fn payload() -> Value {
    json!({
        "type": "oidc",
        "metadata_url": "https://login.example.com/realms/acme",
        "client_id": "gateway",
        "client_secret": "s3cr3t",
        "enabled": true
    })
}

async fn create(app: &TestApp, token: &str, body: Value) -> i64 {
    let response = app.send(Method::POST, IDPS, Some(token), Some(body)).await;
    assert_eq!(response.status, StatusCode::CREATED);
    response.body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_admin_requires_session() {
    let app = TestApp::new();

    let response = app.get(IDPS).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app.send(Method::POST, IDPS, None, Some(payload())).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .send(Method::DELETE, &format!("{IDPS}/1"), Some("garbage"), None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_encrypts_secret() {
    let app = TestApp::new();
    let token = app.session_token();

    let id = create(&app, &token, payload()).await;

    let stored = app.state.store.get(99, id).await.unwrap();
    assert_eq!(stored.provider_type, "oidc");
    assert_eq!(stored.client_id, "gateway");
    assert!(stored.enabled);
    assert_ne!(stored.client_secret_enc, b"s3cr3t");
    assert_eq!(
        app.cipher
            .decrypt_secret(&stored.client_secret_enc)
            .unwrap()
            .expose_secret(),
        "s3cr3t"
    );
}

#[tokio::test]
async fn test_list_returns_ciphertext_only() {
    let app = TestApp::new();
    let token = app.session_token();
    create(&app, &token, payload()).await;
    create(&app, &token, json!({
        "type": "saml",
        "metadata_url": "https://saml.example.com/metadata",
        "client_id": "sp",
        "client_secret": "other"
    }))
    .await;

    let response = app.send(Method::GET, IDPS, Some(&token), None).await;

    assert_eq!(response.status, StatusCode::OK);
    let items = response.body.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["type"], "oidc");
    assert_eq!(items[1]["type"], "saml");
    assert_eq!(items[1]["enabled"], false);

    let rendered = response.body.to_string();
    assert!(!rendered.contains("s3cr3t"));
    assert!(items[0].get("client_secret").is_none());

    let blob = BASE64
        .decode(items[0]["client_secret_enc"].as_str().unwrap())
        .unwrap();
    assert_eq!(
        app.cipher.decrypt_secret(&blob).unwrap().expose_secret(),
        "s3cr3t"
    );

    let created_at = items[0]["created_at"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(created_at).is_ok());
}

#[tokio::test]
async fn test_list_is_scoped_to_tenant() {
    let app = TestApp::new();
    let token = app.session_token();
    create(&app, &token, payload()).await;

    let response = app
        .send(Method::GET, "/admin/tenants/7/idps", Some(&token), None)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!([]));
}

#[tokio::test]
async fn test_get_provider() {
    let app = TestApp::new();
    let token = app.session_token();
    let id = create(&app, &token, payload()).await;

    let response = app
        .send(Method::GET, &format!("{IDPS}/{id}"), Some(&token), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["id"], id);
    assert_eq!(response.body["tenant_id"], 99);
    assert_eq!(
        response.body["metadata_url"],
        "https://login.example.com/realms/acme"
    );

    let response = app
        .send(Method::GET, &format!("{IDPS}/999"), Some(&token), None)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    // Another tenant cannot read it
    let response = app
        .send(Method::GET, &format!("/admin/tenants/7/idps/{id}"), Some(&token), None)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .send(Method::GET, &format!("{IDPS}/abc"), Some(&token), None)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_reencrypts_secret() {
    let app = TestApp::new();
    let token = app.session_token();
    let id = create(&app, &token, payload()).await;
    let before = app.state.store.get(99, id).await.unwrap();

    let mut body = payload();
    body["client_secret"] = json!("rotated");
    body["enabled"] = json!(false);
    let response = app
        .send(Method::PUT, &format!("{IDPS}/{id}"), Some(&token), Some(body))
        .await;

    assert_eq!(response.status, StatusCode::NO_CONTENT);
    let after = app.state.store.get(99, id).await.unwrap();
    assert!(!after.enabled);
    assert_ne!(after.client_secret_enc, before.client_secret_enc);
    assert_eq!(
        app.cipher
            .decrypt_secret(&after.client_secret_enc)
            .unwrap()
            .expose_secret(),
        "rotated"
    );
}

#[tokio::test]
async fn test_update_missing_provider() {
    let app = TestApp::new();
    let token = app.session_token();
    let id = create(&app, &token, payload()).await;

    let response = app
        .send(Method::PUT, &format!("{IDPS}/999"), Some(&token), Some(payload()))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .send(
            Method::PUT,
            &format!("/admin/tenants/7/idps/{id}"),
            Some(&token),
            Some(payload()),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_provider() {
    let app = TestApp::new();
    let token = app.session_token();
    let id = create(&app, &token, payload()).await;

    let response = app
        .send(Method::DELETE, &format!("/admin/tenants/7/idps/{id}"), Some(&token), None)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .send(Method::DELETE, &format!("{IDPS}/{id}"), Some(&token), None)
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = app
        .send(Method::DELETE, &format!("{IDPS}/{id}"), Some(&token), None)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_validation() {
    let app = TestApp::new();
    let token = app.session_token();

    let cases = [
        ("metadata_url", json!("not a url")),
        ("client_id", json!("")),
        ("client_secret", json!("")),
        ("type", json!("ldap")),
    ];

    for (field, value) in cases {
        let mut body = payload();
        body[field] = value;
        let response = app.send(Method::POST, IDPS, Some(&token), Some(body)).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{field} accepted");
        assert_eq!(response.body["status"], 400);
    }

    let mut body = payload();
    body.as_object_mut().unwrap().remove("client_secret");
    let response = app.send(Method::POST, IDPS, Some(&token), Some(body)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    assert!(app.state.store.list_by_tenant(99).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_store_failure_is_opaque() {
    let app = TestApp::with_store(Arc::new(DownStore));
    let token = app.session_token();

    let response = app.send(Method::GET, IDPS, Some(&token), None).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["error"], "internal server error");
}
