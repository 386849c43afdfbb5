#![allow(dead_code)]

use async_trait::async_trait;
use auth_identity::{IdentityConfig, LoginStateService, SessionTokenService};
use auth_oidc::{
    AuthFlowError, AuthResult, CallbackParams, IdToken, IdentityProvider, ProviderKind,
    ProviderRegistry,
};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use crypto::{KeyGenerator, SecretCipher};
use database_layer::{
    DatabaseError, DatabaseResult, InMemoryProviderStore, NewProviderRecord, ProviderRecord,
    ProviderStore,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sso_server::{create_app, AppState};
use std::sync::Arc;
use tower::ServiceExt;
use url::Url;

pub const TENANT_ID: i64 = 99;
pub const GOOD_CODE: &str = "good-code";
pub const JWT_SECRET: &str = "gateway-test-secret";

/// Provider that accepts a single authorization code
pub struct FakeProvider {
    pub tenant_id: i64,
}

#[async_trait]
impl IdentityProvider for FakeProvider {
    fn tenant_id(&self) -> i64 {
        self.tenant_id
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Oidc
    }

    fn auth_url(&self, state: &str) -> Url {
        let mut url = Url::parse("https://idp.example.com/authorize").unwrap();
        url.query_pairs_mut()
            .append_pair("client_id", "gateway")
            .append_pair("state", state);
        url
    }

    async fn callback(&self, params: &CallbackParams) -> Result<AuthResult, AuthFlowError> {
        if params.code()? != GOOD_CODE {
            return Err(AuthFlowError::CodeExchange("invalid_grant".to_string()));
        }

        Ok(AuthResult {
            tenant_id: self.tenant_id,
            user_id: "user123".to_string(),
            email: "user@example.com".to_string(),
            id_token: IdToken {
                raw: "header.payload.signature".to_string(),
                claims: json!({ "sub": "user123", "email": "user@example.com" }),
            },
        })
    }
}

/// Store whose database is always unreachable
pub struct DownStore;

#[async_trait]
impl ProviderStore for DownStore {
    async fn list_enabled(&self) -> DatabaseResult<Vec<ProviderRecord>> {
        Err(down())
    }

    async fn list_by_tenant(&self, _tenant_id: i64) -> DatabaseResult<Vec<ProviderRecord>> {
        Err(down())
    }

    async fn get(&self, _tenant_id: i64, _id: i64) -> DatabaseResult<ProviderRecord> {
        Err(down())
    }

    async fn create(&self, _record: &NewProviderRecord) -> DatabaseResult<i64> {
        Err(down())
    }

    async fn update(&self, _id: i64, _record: &NewProviderRecord) -> DatabaseResult<()> {
        Err(down())
    }

    async fn delete(&self, _tenant_id: i64, _id: i64) -> DatabaseResult<()> {
        Err(down())
    }

    async fn ping(&self) -> DatabaseResult<()> {
        Err(down())
    }
}

fn down() -> DatabaseError {
    DatabaseError::ConnectionFailed("connection refused".to_string())
}

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub cipher: SecretCipher,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_store(Arc::new(InMemoryProviderStore::new()))
    }

    pub fn with_store(store: Arc<dyn ProviderStore>) -> Self {
        let cipher = SecretCipher::new(&KeyGenerator::generate());
        let config = IdentityConfig::new(JWT_SECRET);

        let providers: Vec<Arc<dyn IdentityProvider>> =
            vec![Arc::new(FakeProvider { tenant_id: TENANT_ID })];
        let registry = ProviderRegistry::from_providers(providers).unwrap();

        let state = AppState::new(
            registry,
            SessionTokenService::new(&config).unwrap(),
            LoginStateService::new(&config).unwrap(),
            Arc::new(cipher.clone()),
            store,
        );

        Self {
            app: create_app(state.clone()),
            state,
            cipher,
        }
    }

    /// A session token for the fake provider's user
    pub fn session_token(&self) -> String {
        self.state
            .sessions
            .issue(TENANT_ID, "user123", "user@example.com")
            .unwrap()
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        TestResponse {
            status,
            location,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None, None).await
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: Value,
}

/// Pull the `state` query parameter out of a redirect target
pub fn state_param(location: &str) -> String {
    Url::parse(location)
        .unwrap()
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
        .unwrap()
}
