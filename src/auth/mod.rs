pub mod ownership;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use ownership::authorize;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

impl Claims {
    pub fn new(subject: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: subject.into(),
            exp: (now + ttl).timestamp(),
            iat: Some(now.timestamp()),
            jti: Some(Uuid::new_v4().to_string()),
        }
    }
}

/// Caller identity for the lifetime of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
}

/// Expired, tampered and malformed tokens all collapse into `InvalidToken`.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Unauthorized: Missing token")]
    MissingToken,

    #[error("Unauthorized: Invalid token")]
    InvalidToken,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
}

/// Verifies bearer credentials against the process-wide HMAC secret.
#[derive(Clone)]
pub struct JwtVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Tokens are rejected the second they expire
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Validate a raw `Authorization` header value and extract the caller identity
    pub fn verify(&self, header_value: Option<&str>) -> Result<Identity, AuthError> {
        let token = extract_bearer_token(header_value)?;

        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            tracing::debug!("JWT rejected: {}", e);
            AuthError::InvalidToken
        })?;

        Ok(Identity { id: token_data.claims.sub })
    }

    /// Sign a credential for `subject` valid for `ttl`
    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<String, AuthError> {
        self.encode(&Claims::new(subject, ttl))
    }

    pub fn encode(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }
}

/// Extract JWT token from an Authorization header value
fn extract_bearer_token(header_value: Option<&str>) -> Result<&str, AuthError> {
    let token = header_value
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(AuthError::MissingToken)?;

    Ok(token.trim())
}
