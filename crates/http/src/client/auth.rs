//! Authentication API client methods

use super::{ApiClient, ClientError};
use crate::types::{MeResponse, RefreshRequest, RefreshResponse, SignInRequest, SignInResponse};
use reqwest::Method;

impl ApiClient {
    /// Exchange email and password for a credential pair
    ///
    /// Sent outside the pipeline: a rejected password is not a session problem.
    pub async fn sign_in(&self, request: &SignInRequest) -> Result<SignInResponse, ClientError> {
        let req = self.raw_request(Method::POST, "/sessions").json(request);
        self.execute(req).await
    }

    /// Fetch the account behind the current access token
    pub async fn me(&self) -> Result<MeResponse, ClientError> {
        self.get_json("/me").await
    }

    /// Trade a refresh token for a new credential pair
    ///
    /// Never intercepted; any non-2xx status is a refresh failure.
    pub async fn refresh_tokens(&self, refresh_token: &str) -> Result<RefreshResponse, ClientError> {
        let req = self
            .raw_request(Method::POST, "/refresh")
            .json(&RefreshRequest {
                refresh_token: refresh_token.to_string(),
            });
        self.execute(req).await
    }
}
