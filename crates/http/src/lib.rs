//! Authlink HTTP client
//!
//! An authenticated request pipeline that refreshes expired access tokens
//! transparently: concurrent requests that fail while a refresh is running are
//! parked and replayed once it completes.

pub mod client;
pub mod types;

pub use client::coordinator::RefreshCoordinator;
pub use client::error::ClientError;
pub use client::{ApiClient, ApiClientBuilder};
