//! Authorization gating on token claims

pub mod claims;
pub mod permissions;

pub use claims::{TokenClaims, decode_unverified};
pub use permissions::{Requirements, authorize};
