//! Authlink core types and utilities

pub mod access;
pub mod channel;
pub mod config;
pub mod cookies;
pub mod environment;
pub mod error;
pub mod tracing;
pub mod types;

pub use access::{Requirements, TokenClaims, authorize, decode_unverified};
pub use channel::{AuthChannel, AuthEvent, BroadcastHub, Notifier, Subscription};
pub use config::{AuthConfig, ClientConfig};
pub use cookies::{CookieOptions, CredentialStore, StoredCredentials};
pub use environment::{Environment, History, Navigator, SessionTeardown};
pub use error::{CoreError, CoreResult};
pub use types::{CredentialPair, Session};
