//! Request and response bodies of the authentication API

use authlink_core::{CredentialPair, Session};
use serde::{Deserialize, Serialize};

/// Sign-in request (`POST /sessions`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Sign-in response
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    pub token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl SignInResponse {
    pub fn credentials(&self) -> CredentialPair {
        CredentialPair::new(&self.token, &self.refresh_token)
    }

    /// Session for the account that just signed in
    pub fn session(&self, email: impl Into<String>) -> Session {
        Session::new(email, self.permissions.clone(), self.roles.clone())
    }
}

impl std::fmt::Debug for SignInResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignInResponse")
            .field("permissions", &self.permissions)
            .field("roles", &self.roles)
            .finish_non_exhaustive()
    }
}

/// Refresh request (`POST /refresh`)
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Refresh response
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub token: String,
    pub refresh_token: String,
}

impl From<RefreshResponse> for CredentialPair {
    fn from(response: RefreshResponse) -> Self {
        Self::new(response.token, response.refresh_token)
    }
}

/// Current user (`GET /me`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    pub email: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl From<MeResponse> for Session {
    fn from(me: MeResponse) -> Self {
        Self::new(me.email, me.permissions, me.roles)
    }
}

/// Error body the API attaches to failed requests
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_refresh_wire_format() {
        let request = RefreshRequest {
            refresh_token: "R1".to_string(),
        };
        assert_eq!(serde_json::to_value(&request).unwrap(), json!({ "refreshToken": "R1" }));

        let response: RefreshResponse =
            serde_json::from_value(json!({ "token": "T2", "refreshToken": "R2" })).unwrap();
        let pair = CredentialPair::from(response);
        assert_eq!(pair, CredentialPair::new("T2", "R2"));
    }

    #[test]
    fn test_sign_in_response_builds_session() {
        let response: SignInResponse = serde_json::from_value(json!({
            "token": "T1",
            "refreshToken": "R1",
            "permissions": ["users.list"],
            "roles": ["editor"],
        }))
        .unwrap();

        let session = response.session("diego@example.com");
        assert_eq!(session.email, "diego@example.com");
        assert!(session.permissions.contains("users.list"));
        assert!(session.roles.contains("editor"));
        assert!(!format!("{response:?}").contains("T1"));
    }

    #[test]
    fn test_error_body_tolerates_unknown_shapes() {
        let body: ErrorBody = serde_json::from_value(json!({ "code": "token.expired" })).unwrap();
        assert_eq!(body.code.as_deref(), Some("token.expired"));

        let body: ErrorBody =
            serde_json::from_value(json!({ "error": true, "message": "Token invalid." }))
                .unwrap();
        assert_eq!(body.code, None);
        assert_eq!(body.message.as_deref(), Some("Token invalid."));
    }
}
