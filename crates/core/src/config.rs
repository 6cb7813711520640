//! Client configuration

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fixed protocol constants shared by the browser and the server renderer
pub struct AuthConfig;

impl AuthConfig {
    /// Cookie holding the access token
    pub const ACCESS_TOKEN_COOKIE: &'static str = "authtoken";

    /// Cookie holding the refresh token
    pub const REFRESH_TOKEN_COOKIE: &'static str = "authrefreshtoken";

    /// Absolute lifetime of both cookies
    pub const COOKIE_MAX_AGE: Duration = Duration::from_secs(60 * 60 * 24 * 30); // 30 days

    pub const COOKIE_PATH: &'static str = "/";

    /// Broadcast topic for cross-context session events
    pub const AUTH_CHANNEL: &'static str = "auth";

    /// Error code the API sends with a 401 when the access token merely expired
    pub const EXPIRED_TOKEN_CODE: &'static str = "token.expired";
}

/// Runtime configuration for API clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the authentication API
    pub api_base_url: String,

    /// Upper bound for one `/refresh` call, in seconds (0 disables the bound)
    pub refresh_timeout_secs: u64,

    /// Per-request timeout in seconds (0 disables the timeout)
    pub request_timeout_secs: u64,

    /// Route for signed-out users
    pub landing_route: String,

    /// Default route for signed-in users
    pub protected_route: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3333".to_string(),
            refresh_timeout_secs: 30,
            request_timeout_secs: 0,
            landing_route: "/".to_string(),
            protected_route: "/dashboard".to_string(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from file, with `AUTHLINK_` environment overrides
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be read or parsed
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> CoreResult<Self> {
        let settings = Self::builder_with_defaults()?
            .add_source(config::File::from(path.as_ref()))
            .add_source(config::Environment::with_prefix("AUTHLINK"))
            .build()?;

        settings.try_deserialize::<Self>()?.validated()
    }

    /// Load configuration with defaults and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables cannot be parsed
    pub fn from_env() -> CoreResult<Self> {
        let settings = Self::builder_with_defaults()?
            .add_source(config::Environment::with_prefix("AUTHLINK"))
            .build()?;

        settings.try_deserialize::<Self>()?.validated()
    }

    /// Reject settings no client can work with
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] for an empty API base URL or a
    /// route that is not absolute
    pub fn validated(self) -> CoreResult<Self> {
        if self.api_base_url.trim().is_empty() {
            return Err(CoreError::invalid_config("api_base_url must not be empty"));
        }
        for (key, route) in [
            ("landing_route", &self.landing_route),
            ("protected_route", &self.protected_route),
        ] {
            if !route.starts_with('/') {
                return Err(CoreError::invalid_config(format!(
                    "{key} must start with '/', got {route:?}"
                )));
            }
        }
        Ok(self)
    }

    fn builder_with_defaults()
    -> CoreResult<config::ConfigBuilder<config::builder::DefaultState>> {
        let defaults = Self::default();

        Ok(config::Config::builder()
            .set_default("api_base_url", defaults.api_base_url)?
            .set_default("refresh_timeout_secs", defaults.refresh_timeout_secs)?
            .set_default("request_timeout_secs", defaults.request_timeout_secs)?
            .set_default("landing_route", defaults.landing_route)?
            .set_default("protected_route", defaults.protected_route)?)
    }

    /// Bound on a refresh call, if any
    pub fn refresh_timeout(&self) -> Option<Duration> {
        (self.refresh_timeout_secs > 0).then(|| Duration::from_secs(self.refresh_timeout_secs))
    }

    /// Per-request timeout, if any
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}
