//! One server-render invocation

use authlink_core::{ClientConfig, CredentialStore, Environment};
use authlink_http::{ApiClient, ClientError};
use std::sync::Arc;

/// Cookies and configuration of a single render
///
/// Clones share the cookie jar, so a clone kept by the caller sees every
/// cookie the page loader or the guard changed.
#[derive(Debug, Clone)]
pub struct ServerContext {
    credentials: CredentialStore,
    config: Arc<ClientConfig>,
}

impl ServerContext {
    pub fn new(credentials: CredentialStore, config: ClientConfig) -> Self {
        Self {
            credentials,
            config: Arc::new(config),
        }
    }

    /// Context for a request carrying the given `Cookie` header
    pub fn from_cookie_header(header: &str, config: ClientConfig) -> Self {
        Self::new(CredentialStore::from_cookie_header(header), config)
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Pipeline for this render only
    ///
    /// Never shared with other renders; auth failures surface as
    /// [`ClientError::AuthToken`] instead of a browser sign-out.
    pub fn api_client(&self) -> Result<ApiClient, ClientError> {
        ApiClient::from_config(&self.config, self.credentials.clone(), Environment::Server)
    }

    /// `Set-Cookie` values to send back with the rendered page
    pub fn set_cookie_headers(&self) -> Vec<String> {
        self.credentials.set_cookie_headers()
    }
}
