//! Authenticated API client

pub mod auth;
pub mod coordinator;
pub mod error;

use crate::types::ErrorBody;
use arc_swap::ArcSwapOption;
use authlink_core::{AuthConfig, ClientConfig, CredentialPair, CredentialStore, Environment};
use coordinator::RefreshCoordinator;
use error::ClientError;
use reqwest::{Client, ClientBuilder, Method, Response, StatusCode, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything needed to send a request again after a refresh
#[derive(Debug, Clone)]
struct RequestConfig {
    method: Method,
    path: String,
    body: Option<Value>,
}

/// How a response failed, as decided by [`ApiClient::intercept`]
enum Interception {
    Expired,
    Invalid(String),
    Failed(ClientError),
}

/// Request pipeline of one execution context
///
/// Cloning is cheap; every clone shares the bearer token, the credential
/// store and the refresh coordinator.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: Client,
    base_url: String,
    bearer: ArcSwapOption<String>,
    credentials: CredentialStore,
    environment: Environment,
    coordinator: RefreshCoordinator,
    refresh_timeout: Option<Duration>,
    /// Bumped whenever the session ends; work started under an older value
    /// must not touch credentials
    generation: Mutex<u64>,
}

impl ApiClient {
    /// Create a client for a server render with default configuration
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Create a client from loaded configuration
    pub fn from_config(
        config: &ClientConfig,
        credentials: CredentialStore,
        environment: Environment,
    ) -> Result<Self, ClientError> {
        let mut builder = Self::builder()
            .base_url(&config.api_base_url)
            .credentials(credentials)
            .environment(environment);
        builder.refresh_timeout = config.refresh_timeout();
        builder.timeout = config.request_timeout();
        builder.build()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.inner.credentials
    }

    pub fn environment(&self) -> &Environment {
        &self.inner.environment
    }

    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.inner.coordinator
    }

    /// Access token attached to new requests
    pub fn bearer(&self) -> Option<String> {
        self.inner.bearer.load_full().map(|token| token.as_ref().clone())
    }

    /// Replace the access token attached to new requests
    pub fn set_bearer(&self, token: Option<&str>) {
        self.inner
            .bearer
            .store(token.map(|t| Arc::new(t.to_string())));
    }

    /// End the current session for this pipeline
    ///
    /// Drops the bearer token. A refresh still in flight will discard the pair
    /// it obtains, and requests sent before this call no longer trigger a
    /// sign-out of their own.
    pub fn end_session(&self) {
        let mut generation = self.generation_lock();
        *generation += 1;
        self.set_bearer(None);
    }

    fn generation_lock(&self) -> MutexGuard<'_, u64> {
        self.inner
            .generation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn generation(&self) -> u64 {
        *self.generation_lock()
    }

    /// End the session only if it is still the one started at `generation`;
    /// returns whether this call ended it
    fn end_session_from(&self, generation: u64) -> bool {
        let mut current = self.generation_lock();
        if *current != generation {
            return false;
        }
        *current += 1;
        self.set_bearer(None);
        true
    }

    /// Send a request through the pipeline
    ///
    /// An expired access token is refreshed transparently and the request is
    /// replayed once with the new token. Any other failure is returned.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Response, ClientError> {
        let config = RequestConfig {
            method,
            path: path.to_string(),
            body,
        };

        let generation = self.generation();
        let response = self.send(&config, self.bearer().as_deref()).await?;
        match self.intercept(response).await {
            Ok(response) => Ok(response),
            Err(Interception::Expired) => self.replay_after_refresh(&config, generation).await,
            Err(Interception::Invalid(message)) => Err(self.reject_session(message, generation)),
            Err(Interception::Failed(error)) => Err(error),
        }
    }

    /// GET a JSON resource
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.request(Method::GET, path, None).await?;
        Ok(response.json().await?)
    }

    /// POST a JSON body and decode the JSON response
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let body = serde_json::to_value(body)?;
        let response = self.request(Method::POST, path, Some(body)).await?;
        Ok(response.json().await?)
    }

    /// Request builder that bypasses the pipeline (no bearer, no refresh)
    fn raw_request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.inner.base_url, path);
        self.inner.http.request(method, url)
    }

    /// Execute a raw request and handle common errors
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let message = response.text().await.unwrap_or_else(|_| status.to_string());
            Err(ClientError::from_status(status, message))
        }
    }

    async fn send(
        &self,
        config: &RequestConfig,
        token: Option<&str>,
    ) -> Result<Response, ClientError> {
        let mut request = self.raw_request(config.method.clone(), &config.path);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(body) = &config.body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    /// The single interception point every response passes through
    async fn intercept(&self, response: Response) -> Result<Response, Interception> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_else(|_| status.to_string());
        if status != StatusCode::UNAUTHORIZED {
            return Err(Interception::Failed(ClientError::from_status(status, text)));
        }

        let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
        if body.code.as_deref() == Some(AuthConfig::EXPIRED_TOKEN_CODE) {
            Err(Interception::Expired)
        } else {
            Err(Interception::Invalid(body.message.unwrap_or(text)))
        }
    }

    async fn replay_after_refresh(
        &self,
        config: &RequestConfig,
        generation: u64,
    ) -> Result<Response, ClientError> {
        let token = self.await_refresh(generation).await?;

        tracing::debug!(method = %config.method, path = %config.path, "Replaying request with refreshed token");
        let response = self.send(config, Some(&token)).await?;
        match self.intercept(response).await {
            Ok(response) => Ok(response),
            // Already replayed once; a second refresh would loop.
            Err(Interception::Expired) => Err(ClientError::TokenExpired),
            Err(Interception::Invalid(message)) => Err(self.reject_session(message, generation)),
            Err(Interception::Failed(error)) => Err(error),
        }
    }

    /// Wait for the running refresh, starting one if none is running
    async fn await_refresh(&self, generation: u64) -> Result<String, ClientError> {
        let joined = self.inner.coordinator.join().await;
        if joined.leader {
            // Runs detached so the queue is settled even if this caller is dropped.
            let client = self.clone();
            tokio::spawn(async move { client.run_refresh(generation).await });
        }

        joined.pending.wait().await.map_err(|cause| match self.inner.environment {
            Environment::Browser(_) => ClientError::RefreshFailed(cause),
            Environment::Server => ClientError::AuthToken,
        })
    }

    async fn run_refresh(&self, generation: u64) {
        if self.generation() != generation {
            tracing::debug!("Session ended before refresh started");
            self.inner
                .coordinator
                .resolve(Err(Arc::new(ClientError::SessionEnded)))
                .await;
            return;
        }

        match self.refresh_session().await {
            Ok(pair) => {
                if !self.adopt(&pair, generation) {
                    tracing::info!("Session ended during refresh, discarding new tokens");
                    self.inner
                        .coordinator
                        .resolve(Err(Arc::new(ClientError::SessionEnded)))
                        .await;
                    return;
                }
                let released = self.inner.coordinator.resolve(Ok(pair.access_token)).await;
                tracing::info!(released, "Access token refreshed");
            }
            Err(error) => {
                tracing::warn!(error = %error, "Token refresh failed");
                // Tear down first so released callers observe the signed-out state.
                if let Environment::Browser(teardown) = &self.inner.environment {
                    if self.end_session_from(generation) {
                        teardown.sign_out();
                    }
                }
                let released = self.inner.coordinator.resolve(Err(Arc::new(error))).await;
                tracing::debug!(released, "Rejected requests waiting on refresh");
            }
        }
    }

    /// Store a refreshed pair unless the session it belongs to has ended
    fn adopt(&self, pair: &CredentialPair, generation: u64) -> bool {
        let current = self.generation_lock();
        if *current != generation {
            return false;
        }
        self.inner.credentials.save(pair);
        self.set_bearer(Some(&pair.access_token));
        true
    }

    async fn refresh_session(&self) -> Result<CredentialPair, ClientError> {
        let Some(refresh_token) = self.inner.credentials.credentials().refresh_token else {
            return Err(ClientError::TokenInvalid("no refresh token stored".to_string()));
        };

        tracing::info!("Refreshing access token");
        let call = self.refresh_tokens(&refresh_token);
        let response = match self.inner.refresh_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| ClientError::RefreshTimeout(limit))??,
            None => call.await?,
        };

        Ok(response.into())
    }

    /// Terminal auth failure: sign out in a browser, signal the page in a server render
    ///
    /// Only the first rejection of a session signs out; later ones from
    /// requests of the same session just report the error.
    fn reject_session(&self, message: String, generation: u64) -> ClientError {
        match &self.inner.environment {
            Environment::Browser(teardown) => {
                if self.end_session_from(generation) {
                    tracing::warn!(%message, "Access token rejected, signing out");
                    teardown.sign_out();
                } else {
                    tracing::debug!(%message, "Access token rejected after session ended");
                }
                ClientError::TokenInvalid(message)
            }
            Environment::Server => {
                tracing::debug!(%message, "Access token rejected during server render");
                ClientError::AuthToken
            }
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .field("environment", &self.inner.environment)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ApiClient`]
pub struct ApiClientBuilder {
    base_url: Option<String>,
    credentials: Option<CredentialStore>,
    environment: Option<Environment>,
    timeout: Option<Duration>,
    refresh_timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl Default for ApiClientBuilder {
    fn default() -> Self {
        Self {
            base_url: None,
            credentials: None,
            environment: None,
            timeout: None,
            refresh_timeout: Some(DEFAULT_REFRESH_TIMEOUT),
            user_agent: None,
        }
    }
}

impl ApiClientBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Credential store the bearer token is read from and refreshed into
    pub fn credentials(mut self, credentials: CredentialStore) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Execution context; defaults to [`Environment::Server`]
    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Bound a single refresh call
    pub fn refresh_timeout(mut self, timeout: Duration) -> Self {
        self.refresh_timeout = Some(timeout);
        self
    }

    /// Let a refresh call run as long as the server takes
    pub fn without_refresh_timeout(mut self) -> Self {
        self.refresh_timeout = None;
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client
    pub fn build(self) -> Result<ApiClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        let mut client_builder = ClientBuilder::new();
        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }
        client_builder = client_builder.user_agent(
            self.user_agent
                .unwrap_or_else(|| concat!("authlink/", env!("CARGO_PKG_VERSION")).to_string()),
        );
        let http = client_builder.build()?;

        let credentials = self.credentials.unwrap_or_default();
        let bearer = ArcSwapOption::from(credentials.access_token().map(Arc::new));

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                bearer,
                credentials,
                environment: self.environment.unwrap_or(Environment::Server),
                coordinator: RefreshCoordinator::new(),
                refresh_timeout: self.refresh_timeout,
                generation: Mutex::new(0),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_base_url() {
        let result = ApiClient::builder().build();
        assert!(matches!(result, Err(ClientError::Configuration(_))));
    }

    #[test]
    fn test_bearer_read_from_store_at_construction() {
        let store = CredentialStore::new();
        store.save(&CredentialPair::new("T1", "R1"));

        let client = ApiClient::builder()
            .base_url("http://localhost:3333/")
            .credentials(store)
            .build()
            .unwrap();

        assert_eq!(client.base_url(), "http://localhost:3333");
        assert_eq!(client.bearer().as_deref(), Some("T1"));
        assert!(!client.environment().is_browser());

        client.set_bearer(Some("T2"));
        assert_eq!(client.clone().bearer().as_deref(), Some("T2"));
        client.set_bearer(None);
        assert_eq!(client.bearer(), None);
    }

    #[test]
    fn test_end_session_invalidates_older_work() {
        let store = CredentialStore::new();
        store.save(&CredentialPair::new("T1", "R1"));
        let client = ApiClient::builder()
            .base_url("http://localhost:3333")
            .credentials(store.clone())
            .build()
            .unwrap();

        let started = client.generation();
        client.end_session();

        assert_eq!(client.bearer(), None);
        assert!(!client.end_session_from(started));
        assert!(!client.adopt(&CredentialPair::new("T2", "R2"), started));
        assert_eq!(store.access_token().as_deref(), Some("T1"));

        let current = client.generation();
        assert!(client.adopt(&CredentialPair::new("T2", "R2"), current));
        assert_eq!(client.bearer().as_deref(), Some("T2"));
        assert!(client.end_session_from(current));
        assert!(!client.end_session_from(current));
    }

    #[test]
    fn test_from_config() {
        let config = ClientConfig {
            api_base_url: "https://api.example.com".to_string(),
            ..ClientConfig::default()
        };
        let client =
            ApiClient::from_config(&config, CredentialStore::new(), Environment::Server).unwrap();
        assert_eq!(client.base_url(), "https://api.example.com");
        assert_eq!(client.bearer(), None);
    }
}
