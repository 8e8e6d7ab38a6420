//! JWT utilities for token generation and validation
//!
//! Access tokens are signed with HS256 and live for one hour by default.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default access token expiration time (1 hour)
const ACCESS_TOKEN_EXPIRATION_MINUTES: i64 = 60;

/// Default token issuer
const DEFAULT_ISSUER: &str = "gadgetvault";

/// Subject line carried by every access token
const TOKEN_SUBJECT_PURPOSE: &str = "Token to access API";

/// JWT configuration
#[derive(Clone)]
#[cfg_attr(test, derive(Debug))]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Access token expiration in minutes
    pub access_token_expiration_minutes: i64,
    /// Token issuer
    pub issuer: String,
}

impl JwtConfig {
    /// Create a new JWT configuration
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            access_token_expiration_minutes: ACCESS_TOKEN_EXPIRATION_MINUTES,
            issuer: DEFAULT_ISSUER.to_string(),
        }
    }

    /// Set access token expiration
    pub fn access_token_expiration(mut self, minutes: i64) -> Self {
        self.access_token_expiration_minutes = minutes;
        self
    }

    /// Set issuer
    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }
}

/// JWT errors
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Token encoding failed: {0}")]
    EncodingError(String),

    #[error("Token decoding failed: {0}")]
    DecodingError(String),

    #[error("Token expired")]
    Expired,

    #[error("Invalid token")]
    InvalidToken,
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            ErrorKind::InvalidToken
            | ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidIssuer => JwtError::InvalidToken,
            _ => JwtError::DecodingError(err.to_string()),
        }
    }
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// User email
    pub email: String,
    /// Purpose of the token
    pub purpose: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issuer
    pub iss: String,
    /// JWT ID
    pub jti: String,
}

impl Claims {
    /// Get user ID as UUID
    pub fn user_id(&self) -> Result<Uuid, JwtError> {
        Uuid::parse_str(&self.sub).map_err(|_| JwtError::InvalidToken)
    }
}

/// A signed access token and its expiry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub token: String,
    /// Expiration (Unix timestamp)
    pub expires_at: i64,
}

/// JWT service for token operations
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    /// Create a new JWT service
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Generate an access token for a user
    pub fn generate_access_token(
        &self,
        user_id: Uuid,
        email: &str,
    ) -> Result<AccessToken, JwtError> {
        let now = Utc::now();
        let exp = now + Duration::minutes(self.config.access_token_expiration_minutes);

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            purpose: TOKEN_SUBJECT_PURPOSE.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: self.config.issuer.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))?;

        Ok(AccessToken {
            token,
            expires_at: exp.timestamp(),
        })
    }

    /// Validate and decode an access token
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)?;

        Ok(token_data.claims)
    }
}
