#![allow(dead_code)]

use authlink_core::{BroadcastHub, ClientConfig, CredentialPair, CredentialStore, History};
use authlink_frontend::AuthContext;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn config(server: &MockServer) -> ClientConfig {
    ClientConfig {
        api_base_url: server.uri(),
        refresh_timeout_secs: 5,
        ..ClientConfig::default()
    }
}

/// Signed access token carrying the given authorization claims
pub fn access_token(permissions: &[&str], roles: &[&str]) -> String {
    let claims = json!({
        "sub": "diego@example.com",
        "permissions": permissions,
        "roles": roles,
        "exp": 4_102_444_800u64,
    });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"not-known-to-the-client"),
    )
    .unwrap()
}

/// A browser context with its own cookies and history
pub struct Tab {
    pub auth: AuthContext,
    pub credentials: CredentialStore,
    pub history: History,
}

impl Tab {
    pub fn open(hub: &BroadcastHub, server: &MockServer) -> Self {
        let credentials = CredentialStore::new();
        let history = History::new();
        let auth = AuthContext::new(
            hub.clone(),
            credentials.clone(),
            Arc::new(history.clone()),
            &config(server),
        )
        .unwrap();
        Self {
            auth,
            credentials,
            history,
        }
    }

    /// Open a tab whose cookies already hold a signed-in pair
    pub fn signed_in(hub: &BroadcastHub, server: &MockServer, access: &str, refresh: &str) -> Self {
        let credentials = CredentialStore::new();
        credentials.save(&CredentialPair::new(access, refresh));
        let history = History::new();
        let auth = AuthContext::new(
            hub.clone(),
            credentials.clone(),
            Arc::new(history.clone()),
            &config(server),
        )
        .unwrap();
        Self {
            auth,
            credentials,
            history,
        }
    }

    pub fn stored_pair(&self) -> (Option<String>, Option<String>) {
        let stored = self.credentials.credentials();
        (stored.access_token, stored.refresh_token)
    }
}

pub async fn mount_me(server: &MockServer, token: &str) {
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("authorization", format!("Bearer {token}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "email": "diego@example.com",
            "permissions": ["users.list", "metrics.list"],
            "roles": ["administrator"],
        })))
        .mount(server)
        .await;
}

pub fn expired() -> ResponseTemplate {
    ResponseTemplate::new(401).set_body_json(json!({ "error": true, "code": "token.expired" }))
}

/// Poll `check` until it holds or a second has passed
pub async fn eventually(check: impl Fn() -> bool) -> bool {
    for _ in 0..50 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    check()
}
