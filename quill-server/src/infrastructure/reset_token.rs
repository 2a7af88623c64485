use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum ResetTokenError {
    #[error("reset token encode failed")]
    Encode(#[source] jsonwebtoken::errors::Error),

    #[error("reset token is malformed or its signature does not verify")]
    Decode(#[source] jsonwebtoken::errors::Error),

    #[error("token was not issued for password reset")]
    WrongPurpose,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResetClaims {
    pub(crate) user_id: i64,
    pub(crate) purpose: String,
    pub(crate) iat: i64,
    pub(crate) exp: i64,
}

impl ResetClaims {
    /// `None` when `issued_at + ttl` is past the representable range.
    pub(crate) fn new(user_id: i64, issued_at: DateTime<Utc>, ttl: Duration) -> Option<Self> {
        let expires_at = issued_at.checked_add_signed(ttl)?;
        Some(Self {
            user_id,
            purpose: ResetTokenSigner::PURPOSE.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        })
    }

    pub(crate) fn ttl_seconds(&self) -> i64 {
        self.exp - self.iat
    }
}

/// HMAC-SHA256 signing of reset claims. Only the signature and the purpose
/// are checked here; expiry is decided by the caller against its own clock.
pub(crate) struct ResetTokenSigner {
    secret: String,
}

impl ResetTokenSigner {
    pub(crate) const PURPOSE: &'static str = "password_reset";

    pub(crate) fn new(secret: &str) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    pub(crate) fn sign(&self, claims: &ResetClaims) -> Result<String, ResetTokenError> {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(ResetTokenError::Encode)
    }

    pub(crate) fn decode(&self, token: &str) -> Result<ResetClaims, ResetTokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let claims = decode::<ResetClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(ResetTokenError::Decode)?
        .claims;

        if claims.purpose != Self::PURPOSE {
            return Err(ResetTokenError::WrongPurpose);
        }
        Ok(claims)
    }
}
