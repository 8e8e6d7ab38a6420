//! Authentication service
//!
//! Registration, login and access token resolution. Coordinates between the
//! user repository and the JWT service.

use crate::core::auth::jwt::{JwtError, JwtService};
use crate::core::db::models::{User, UserResponse};
use crate::core::db::repositories::{UserRepository, UserRepositoryError};

/// Authentication service error types
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Please provide all the fields ({0})")]
    MissingFields(&'static str),

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("User email already registered")]
    EmailAlreadyExists,

    #[error("Email or password is invalid")]
    InvalidCredentials,

    #[error("Access token required")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<UserRepositoryError> for AuthError {
    fn from(err: UserRepositoryError) -> Self {
        match err {
            UserRepositoryError::EmailAlreadyExists => AuthError::EmailAlreadyExists,
            _ => AuthError::InternalError(err.to_string()),
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::TokenExpired,
            JwtError::InvalidToken | JwtError::DecodingError(_) => AuthError::InvalidToken,
            _ => AuthError::InternalError(err.to_string()),
        }
    }
}

/// Registration request data
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login request data
#[derive(Debug, Clone, serde::Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Successful login: user data plus access token
#[derive(Debug, Clone, serde::Serialize)]
pub struct LoginResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub expires_at: i64,
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_service: JwtService,
}

impl AuthService {
    /// Create a new authentication service
    pub fn new(user_repo: UserRepository, jwt_service: JwtService) -> Self {
        Self {
            user_repo,
            jwt_service,
        }
    }

    /// Validate email format
    fn validate_email(email: &str) -> Result<(), AuthError> {
        let Some((local, domain)) = email.split_once('@') else {
            return Err(AuthError::InvalidEmail);
        };

        if local.is_empty() || domain.contains('@') || !domain.contains('.') {
            return Err(AuthError::InvalidEmail);
        }

        if domain.split('.').any(|part| part.is_empty()) {
            return Err(AuthError::InvalidEmail);
        }

        Ok(())
    }

    fn validate_registration(request: &RegisterRequest) -> Result<(), AuthError> {
        if request.name.trim().is_empty()
            || request.email.trim().is_empty()
            || request.password.is_empty()
        {
            return Err(AuthError::MissingFields("name, email, password"));
        }

        Self::validate_email(request.email.trim())
    }

    /// Register a new user
    pub async fn register(&self, request: RegisterRequest) -> Result<UserResponse, AuthError> {
        Self::validate_registration(&request)?;

        let user = self
            .user_repo
            .create(request.name.trim(), request.email.trim(), &request.password)
            .await?;

        Ok(user.into())
    }

    /// Login an existing user.
    ///
    /// Unknown email and wrong password produce the same error.
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AuthError> {
        if request.email.trim().is_empty() || request.password.is_empty() {
            return Err(AuthError::MissingFields("email, password"));
        }

        let user = self
            .user_repo
            .authenticate(request.email.trim(), &request.password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let access = self.jwt_service.generate_access_token(user.id, &user.email)?;

        Ok(LoginResponse {
            user: user.into(),
            access_token: access.token,
            expires_at: access.expires_at,
        })
    }

    /// Resolve an access token to a user that still exists
    pub async fn authenticate(&self, access_token: &str) -> Result<User, AuthError> {
        let claims = self.jwt_service.validate_access_token(access_token)?;
        let user_id = claims.user_id()?;

        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(name: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    // ========================================================================
    // Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_email_valid() {
        assert!(AuthService::validate_email("user@example.com").is_ok());
        assert!(AuthService::validate_email("user.name@example.com").is_ok());
        assert!(AuthService::validate_email("user+tag@example.co.uk").is_ok());
    }

    #[test]
    fn test_validate_email_invalid() {
        assert!(AuthService::validate_email("").is_err());
        assert!(AuthService::validate_email("invalid").is_err());
        assert!(AuthService::validate_email("@example.com").is_err());
        assert!(AuthService::validate_email("user@").is_err());
        assert!(AuthService::validate_email("user@example").is_err());
        assert!(AuthService::validate_email("user@@example.com").is_err());
        assert!(AuthService::validate_email("user@example.").is_err());
    }

    #[test]
    fn test_registration_requires_all_fields() {
        for request in [
            register("", "a@b.co", "pw"),
            register("Ethan", "", "pw"),
            register("Ethan", "a@b.co", ""),
            register("   ", "a@b.co", "pw"),
        ] {
            assert!(matches!(
                AuthService::validate_registration(&request),
                Err(AuthError::MissingFields(_))
            ));
        }
    }

    #[test]
    fn test_registration_checks_email_format() {
        assert!(matches!(
            AuthService::validate_registration(&register("Ethan", "ethan", "pw")),
            Err(AuthError::InvalidEmail)
        ));
        assert!(AuthService::validate_registration(&register("Ethan", "ethan@imf.gov", "pw")).is_ok());
    }

    // ========================================================================
    // Error Conversion Tests
    // ========================================================================

    #[test]
    fn test_auth_error_display() {
        assert_eq!(
            AuthError::MissingFields("name, email, password").to_string(),
            "Please provide all the fields (name, email, password)"
        );
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "Email or password is invalid"
        );
        assert_eq!(AuthError::MissingToken.to_string(), "Access token required");
    }

    #[test]
    fn test_auth_error_from_user_repository_error() {
        let err: AuthError = UserRepositoryError::EmailAlreadyExists.into();
        assert!(matches!(err, AuthError::EmailAlreadyExists));

        let err: AuthError = UserRepositoryError::HashingError("boom".to_string()).into();
        assert!(matches!(err, AuthError::InternalError(_)));
    }

    #[test]
    fn test_auth_error_from_jwt_error() {
        let err: AuthError = JwtError::Expired.into();
        assert!(matches!(err, AuthError::TokenExpired));

        let err: AuthError = JwtError::InvalidToken.into();
        assert!(matches!(err, AuthError::InvalidToken));

        let err: AuthError = JwtError::EncodingError("boom".to_string()).into();
        assert!(matches!(err, AuthError::InternalError(_)));
    }

    // ========================================================================
    // Request Deserialization Tests
    // ========================================================================

    #[test]
    fn test_register_request_deserialization() {
        let json = r#"{"name": "Ethan Hunt", "email": "ethan@imf.gov", "password": "Pa55word"}"#;

        let request: RegisterRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.name, "Ethan Hunt");
        assert_eq!(request.email, "ethan@imf.gov");
        assert_eq!(request.password, "Pa55word");
    }

    #[test]
    fn test_missing_fields_deserialize_as_empty() {
        let request: LoginRequest = serde_json::from_str(r#"{"email": "ethan@imf.gov"}"#).unwrap();
        assert!(request.password.is_empty());
    }
}
