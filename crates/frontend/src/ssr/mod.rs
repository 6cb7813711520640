//! Server-render support: per-render context and the page guard

pub mod context;
pub mod guard;

pub use context::ServerContext;
pub use guard::{PageLoader, PageOutcome, Redirect, SessionGate};
