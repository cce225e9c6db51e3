//! Identity token verification.
//!
//! Users authenticate against an external identity provider which issues
//! HS256-signed JWTs. The backend only verifies those tokens and trusts the
//! `sub` claim as the user ID; it never manages sessions or credentials.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error type for identity token operations.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Failed to encode token: {0}")]
    EncodingError(String),

    #[error("Failed to decode token: {0}")]
    DecodingError(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid subject in token")]
    InvalidSubject,

    #[error("Identity secret must not be empty")]
    EmptySecret,
}

/// Claims carried by an identity token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer, checked when the verifier is configured with one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Optional display name supplied by the identity provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Verifies identity tokens with a secret shared with the identity provider.
#[derive(Clone)]
pub struct IdentityVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: Option<String>,
    leeway_secs: u64,
}

impl std::fmt::Debug for IdentityVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityVerifier")
            .field("issuer", &self.issuer)
            .field("leeway_secs", &self.leeway_secs)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl IdentityVerifier {
    /// Creates a verifier from the shared secret.
    ///
    /// # Arguments
    /// * `secret` - HS256 secret shared with the identity provider
    /// * `issuer` - Expected `iss` claim, if any
    /// * `leeway_secs` - Clock skew tolerance when checking expiry
    pub fn new(secret: &str, issuer: Option<String>, leeway_secs: u64) -> Result<Self, IdentityError> {
        if secret.is_empty() {
            return Err(IdentityError::EmptySecret);
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.filter(|iss| !iss.is_empty()),
            leeway_secs,
        })
    }

    /// Issues a token for the given user.
    ///
    /// Production tokens come from the identity provider; this is used by
    /// development tooling and integration tests that share the secret.
    pub fn issue(&self, user_id: Uuid, ttl_secs: i64) -> Result<String, IdentityError> {
        let now = Utc::now();
        let claims = IdentityClaims {
            sub: user_id.to_string(),
            exp: (now + Duration::seconds(ttl_secs)).timestamp(),
            iat: now.timestamp(),
            iss: self.issuer.clone(),
            name: None,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| IdentityError::EncodingError(e.to_string()))
    }

    /// Verifies a token and returns its claims.
    pub fn verify(&self, token: &str) -> Result<IdentityClaims, IdentityError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = self.leeway_secs;
        if let Some(ref issuer) = self.issuer {
            validation.set_issuer(&[issuer]);
        }

        let token_data =
            decode::<IdentityClaims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => IdentityError::TokenExpired,
                    jsonwebtoken::errors::ErrorKind::InvalidToken
                    | jsonwebtoken::errors::ErrorKind::InvalidSignature
                    | jsonwebtoken::errors::ErrorKind::InvalidIssuer => IdentityError::InvalidToken,
                    _ => IdentityError::DecodingError(e.to_string()),
                }
            })?;

        Ok(token_data.claims)
    }

    /// Verifies a token and returns the authenticated user ID.
    pub fn authenticate(&self, token: &str) -> Result<Uuid, IdentityError> {
        let claims = self.verify(token)?;
        Uuid::parse_str(&claims.sub).map_err(|_| IdentityError::InvalidSubject)
    }
}
