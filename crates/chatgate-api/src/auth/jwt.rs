//! Session token issuance and verification
//!
//! Session tokens are HS256-signed JWTs whose subject is the username.
//! Verification is stateless: a token is accepted iff its signature matches
//! the server secret, its issuer matches, and its `exp` has not passed.

use chatgate_core::{AuthConfig, AuthError};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use uuid::Uuid;

/// JWT claims embedded in a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Token issuer
    pub iss: String,
    /// Subject - username
    pub sub: String,
    /// Unique token identifier
    pub jti: String,
    /// Issued at (seconds since the Unix epoch)
    pub iat: u64,
    /// Expiration (seconds since the Unix epoch)
    pub exp: u64,
}

/// JWT token generation and validation errors
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to encode JWT: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid token format")]
    InvalidToken,

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("System time error: {0}")]
    SystemTimeError(#[from] std::time::SystemTimeError),
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::InvalidToken | JwtError::ExpiredToken | JwtError::InvalidSignature => {
                AuthError::InvalidToken(err.to_string())
            }
            JwtError::EncodingError(_) | JwtError::SystemTimeError(_) => {
                AuthError::Internal(err.to_string())
            }
        }
    }
}

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for HMAC signing
    pub secret: Arc<str>,
    /// Token lifetime in milliseconds, shared with the cookie max-age
    pub expiration_ms: u64,
    /// Token issuer identifier
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        AuthConfig::default().into()
    }
}

impl From<AuthConfig> for JwtConfig {
    fn from(config: AuthConfig) -> Self {
        Self {
            secret: Arc::from(config.secret),
            expiration_ms: config.expiration_ms,
            issuer: config.issuer,
        }
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[redacted]")
            .field("expiration_ms", &self.expiration_ms)
            .field("issuer", &self.issuer)
            .finish()
    }
}

impl JwtConfig {
    /// Token lifetime in whole seconds, rounded up
    pub fn expiration_secs(&self) -> u64 {
        self.expiration_ms.div_ceil(1000)
    }
}

/// Issues and verifies session tokens
///
/// Handlers and the context extractor only see this trait, so the signing
/// scheme and its secret are injected rather than read from ambient state.
pub trait TokenIssuer: Send + Sync {
    /// Produce a signed token for `username`
    fn issue(&self, username: &str) -> Result<String, JwtError>;

    /// Return the username a valid, unexpired token was issued for
    fn verify(&self, token: &str) -> Result<String, JwtError>;

    /// How long an issued token stays valid, in whole seconds to match `exp`
    fn lifetime(&self) -> Duration;
}

/// HS256 JWT implementation of [`TokenIssuer`]
pub struct JwtIssuer {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtIssuer {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    /// Issue a token as if the current time were `now` (Unix seconds)
    pub fn issue_at(&self, username: &str, now: u64) -> Result<String, JwtError> {
        let claims = Claims {
            iss: self.config.issuer.clone(),
            sub: username.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + self.config.expiration_secs(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Verify a token as if the current time were `now` (Unix seconds)
    pub fn verify_at(&self, token: &str, now: u64) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        // Expiry is checked below against `now`, with no leeway
        validation.validate_exp = false;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(
            |e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::InvalidToken,
            },
        )?;

        if now >= token_data.claims.exp {
            return Err(JwtError::ExpiredToken);
        }

        Ok(token_data.claims)
    }
}

impl TokenIssuer for JwtIssuer {
    fn issue(&self, username: &str) -> Result<String, JwtError> {
        self.issue_at(username, unix_now()?)
    }

    fn verify(&self, token: &str) -> Result<String, JwtError> {
        self.verify_at(token, unix_now()?).map(|claims| claims.sub)
    }

    fn lifetime(&self) -> Duration {
        Duration::from_secs(self.config.expiration_secs())
    }
}

fn unix_now() -> Result<u64, JwtError> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}
