use super::claims::TokenClaims;
use serde::{Deserialize, Serialize};

/// Permissions and roles a page or component requires.
///
/// `None` for a dimension means nothing is required there.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirements {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
}

impl Requirements {
    /// Require every one of the given permissions
    pub fn permissions<I, S>(permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::default().with_permissions(permissions)
    }

    /// Require every one of the given roles
    pub fn roles<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::default().with_roles(roles)
    }

    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = Some(permissions.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = Some(roles.into_iter().map(Into::into).collect());
        self
    }
}

/// Check claims against requirements.
///
/// Each required dimension is an AND over its entries: a single missing
/// permission (or role) fails the whole check.
pub fn authorize(claims: &TokenClaims, required: &Requirements) -> bool {
    let has_all = |granted: &[String], wanted: &Option<Vec<String>>| match wanted {
        Some(wanted) => wanted.iter().all(|w| granted.contains(w)),
        None => true,
    };

    has_all(&claims.permissions, &required.permissions) && has_all(&claims.roles, &required.roles)
}
