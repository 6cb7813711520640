//! Cookie-backed credential storage
//!
//! The same store type serves both execution contexts: a browser tab owns one
//! for its document cookies, and every server render builds one from the
//! incoming `Cookie` header. Changes made during a render are collected as
//! `Set-Cookie` values for the response.

use crate::config::AuthConfig;
use crate::types::CredentialPair;
use cookie::{Cookie, CookieJar};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Attributes applied when writing a cookie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieOptions {
    pub max_age: Duration,
    pub path: String,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            max_age: AuthConfig::COOKIE_MAX_AGE,
            path: AuthConfig::COOKIE_PATH.to_string(),
        }
    }
}

/// Snapshot of the two credential cookies; either may be missing
#[derive(Clone, Default, PartialEq, Eq)]
pub struct StoredCredentials {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl std::fmt::Debug for StoredCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredCredentials")
            .field("access_token", &self.access_token.as_ref().map(|_| "<set>"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<set>"))
            .finish()
    }
}

/// Credential store shared by everything running in one execution context
#[derive(Clone, Default)]
pub struct CredentialStore {
    jar: Arc<Mutex<CookieJar>>,
}

impl CredentialStore {
    /// Create an empty store (a fresh browser context)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store for one server render from its `Cookie` request header
    pub fn from_cookie_header(header: &str) -> Self {
        let mut jar = CookieJar::new();
        for parsed in Cookie::split_parse(header.to_owned()) {
            match parsed {
                Ok(cookie) => jar.add_original(cookie.into_owned()),
                Err(e) => tracing::debug!("Skipping malformed cookie: {e}"),
            }
        }
        Self {
            jar: Arc::new(Mutex::new(jar)),
        }
    }

    fn jar(&self) -> MutexGuard<'_, CookieJar> {
        self.jar.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read a cookie value
    pub fn get(&self, name: &str) -> Option<String> {
        self.jar().get(name).map(|c| c.value().to_string())
    }

    /// Write a cookie value
    pub fn set(&self, name: &str, value: &str, options: &CookieOptions) {
        let max_age = cookie::time::Duration::try_from(options.max_age)
            .unwrap_or(cookie::time::Duration::MAX);
        let cookie = Cookie::build((name.to_string(), value.to_string()))
            .path(options.path.clone())
            .max_age(max_age)
            .build();
        self.jar().add(cookie);
    }

    /// Remove a cookie
    pub fn destroy(&self, name: &str) {
        let removal = Cookie::build(name.to_string())
            .path(AuthConfig::COOKIE_PATH)
            .build();
        self.jar().remove(removal);
    }

    /// Read both credential cookies
    pub fn credentials(&self) -> StoredCredentials {
        let jar = self.jar();
        let value = |name| jar.get(name).map(|c| c.value().to_string());
        StoredCredentials {
            access_token: value(AuthConfig::ACCESS_TOKEN_COOKIE),
            refresh_token: value(AuthConfig::REFRESH_TOKEN_COOKIE),
        }
    }

    pub fn access_token(&self) -> Option<String> {
        self.get(AuthConfig::ACCESS_TOKEN_COOKIE)
    }

    /// Write both tokens under a single lock
    pub fn save(&self, pair: &CredentialPair) {
        let options = CookieOptions::default();
        let max_age = cookie::time::Duration::try_from(options.max_age)
            .unwrap_or(cookie::time::Duration::MAX);

        let mut jar = self.jar();
        for (name, value) in [
            (AuthConfig::ACCESS_TOKEN_COOKIE, &pair.access_token),
            (AuthConfig::REFRESH_TOKEN_COOKIE, &pair.refresh_token),
        ] {
            jar.add(
                Cookie::build((name, value.clone()))
                    .path(options.path.clone())
                    .max_age(max_age)
                    .build(),
            );
        }
    }

    /// Destroy both tokens under a single lock
    pub fn clear(&self) {
        let mut jar = self.jar();
        for name in [
            AuthConfig::ACCESS_TOKEN_COOKIE,
            AuthConfig::REFRESH_TOKEN_COOKIE,
        ] {
            jar.remove(Cookie::build(name).path(AuthConfig::COOKIE_PATH).build());
        }
    }

    /// `Set-Cookie` header values for every change made through this store
    pub fn set_cookie_headers(&self) -> Vec<String> {
        self.jar().delta().map(ToString::to_string).collect()
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("credentials", &self.credentials())
            .finish()
    }
}
