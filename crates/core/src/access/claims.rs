//! Optimistic claim decoding
//!
//! Claims are read WITHOUT verifying the token signature or expiry. The result
//! is only good for UX gating (hiding pages a user cannot use anyway); the API
//! re-validates every token it receives and stays the authority.

use crate::error::CoreResult;
use jsonwebtoken::{DecodingKey, Validation, decode, decode_header};
use serde::{Deserialize, Serialize};

/// Claims the access token carries for authorization
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Decode the claims of a JWT access token without checking its signature
pub fn decode_unverified(token: &str) -> CoreResult<TokenClaims> {
    let header = decode_header(token)?;

    let mut validation = Validation::new(header.alg);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(data.claims)
}
