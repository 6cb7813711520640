#![allow(dead_code)]

use authlink_core::{
    AuthConfig, CredentialPair, CredentialStore, Environment, History, Navigator,
    SessionTeardown,
};
use authlink_http::ApiClient;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Browser sign-out that only touches the store and the history
pub struct RecordingTeardown {
    pub credentials: CredentialStore,
    pub history: History,
    calls: AtomicUsize,
}

impl RecordingTeardown {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SessionTeardown for RecordingTeardown {
    fn sign_out(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.credentials.clear();
        self.history.push("/");
    }
}

pub fn signed_in_store() -> CredentialStore {
    let store = CredentialStore::new();
    store.save(&CredentialPair::new("T1", "R1"));
    store
}

pub fn browser_client(base_url: &str, store: &CredentialStore) -> (ApiClient, Arc<RecordingTeardown>) {
    browser_client_with_timeout(base_url, store, Duration::from_secs(5))
}

pub fn browser_client_with_timeout(
    base_url: &str,
    store: &CredentialStore,
    refresh_timeout: Duration,
) -> (ApiClient, Arc<RecordingTeardown>) {
    let teardown = Arc::new(RecordingTeardown {
        credentials: store.clone(),
        history: History::new(),
        calls: AtomicUsize::new(0),
    });
    let client = ApiClient::builder()
        .base_url(base_url)
        .credentials(store.clone())
        .environment(Environment::Browser(teardown.clone()))
        .refresh_timeout(refresh_timeout)
        .build()
        .unwrap();
    (client, teardown)
}

pub fn server_client(base_url: &str, store: &CredentialStore) -> ApiClient {
    ApiClient::builder()
        .base_url(base_url)
        .credentials(store.clone())
        .environment(Environment::Server)
        .build()
        .unwrap()
}

pub fn stored_pair(store: &CredentialStore) -> (Option<String>, Option<String>) {
    (
        store.get(AuthConfig::ACCESS_TOKEN_COOKIE),
        store.get(AuthConfig::REFRESH_TOKEN_COOKIE),
    )
}
