//! Browser session handling and server-render page gating for Authlink

pub mod auth;
pub mod ssr;

pub use auth::{AuthContext, BrowserSession};
pub use ssr::{PageLoader, PageOutcome, Redirect, ServerContext, SessionGate};
