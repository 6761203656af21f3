//! JWT verification
//!
//! Tokens are issued by the account service; this side only checks the
//! signature and expiry and extracts the acting user. Tokens carrying the
//! [`SERVICE_SCOPE`] scope belong to another subsystem rather than an end user.

use binge_core::Snowflake;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Scope claim of subsystem credentials
pub const SERVICE_SCOPE: &str = "service";

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl Claims {
    /// Get the user ID as a Snowflake
    ///
    /// # Errors
    /// Returns an error if the subject is not a positive Snowflake
    pub fn user_id(&self) -> Result<Snowflake, AppError> {
        Snowflake::parse(&self.sub).map_err(|_| AppError::InvalidToken)
    }

    pub fn is_service(&self) -> bool {
        self.scope.as_deref() == Some(SERVICE_SCOPE)
    }
}

/// Verifies HS256 bearer tokens against a shared secret
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    encoding_key: EncodingKey,
}

impl TokenVerifier {
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Decode and validate a token, returning the acting user
    ///
    /// # Errors
    /// Returns `TokenExpired` or `InvalidToken`
    pub fn verify(&self, token: &str) -> Result<Snowflake, AppError> {
        self.verify_claims(token)?.user_id()
    }

    /// Decode and validate a token, returning all of its claims
    ///
    /// # Errors
    /// Returns `TokenExpired` or `InvalidToken`
    pub fn verify_claims(&self, token: &str) -> Result<Claims, AppError> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default()).map_err(
            |e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::InvalidToken,
            },
        )?;
        data.claims.user_id()?;
        Ok(data.claims)
    }

    /// Sign a token with the shared secret (operator tooling and tests)
    ///
    /// # Errors
    /// Returns an internal error if encoding fails
    pub fn sign(&self, user_id: Snowflake, ttl: Duration) -> Result<String, AppError> {
        self.issue(user_id, ttl, None)
    }

    /// Sign a subsystem credential; `caller_id` identifies the calling service
    ///
    /// # Errors
    /// Returns an internal error if encoding fails
    pub fn sign_service(&self, caller_id: Snowflake, ttl: Duration) -> Result<String, AppError> {
        self.issue(caller_id, ttl, Some(SERVICE_SCOPE))
    }

    fn issue(
        &self,
        subject: Snowflake,
        ttl: Duration,
        scope: Option<&str>,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            scope: scope.map(str::to_string),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(anyhow::anyhow!("failed to encode JWT: {e}")))
    }
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier").finish_non_exhaustive()
    }
}
