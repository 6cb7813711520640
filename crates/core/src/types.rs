use crate::access::{Requirements, TokenClaims, authorize};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The authenticated identity of one browser context.
///
/// Lives only in memory; it is rebuilt from `/sessions` or `/me` responses
/// and dropped on sign-out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub email: String,
    pub permissions: BTreeSet<String>,
    pub roles: BTreeSet<String>,
}

impl Session {
    pub fn new(
        email: impl Into<String>,
        permissions: impl IntoIterator<Item = String>,
        roles: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            email: email.into(),
            permissions: permissions.into_iter().collect(),
            roles: roles.into_iter().collect(),
        }
    }

    /// Check this session against a set of requirements
    pub fn satisfies(&self, required: &Requirements) -> bool {
        let claims = TokenClaims {
            permissions: self.permissions.iter().cloned().collect(),
            roles: self.roles.iter().cloned().collect(),
        };
        authorize(&claims, required)
    }
}

/// Access and refresh token, always written and cleared together.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl CredentialPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

// Token values stay out of logs.
impl std::fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}
