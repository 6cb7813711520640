//! Authentication state of one browser context

pub mod context;
pub mod session;

pub use context::AuthContext;
pub use session::BrowserSession;
