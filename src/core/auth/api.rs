//! Auth API endpoints
//!
//! - POST /api/auth/register - Register a new user
//! - POST /api/auth/login - Login and get an access token
//! - GET /api/auth/me - Get current user info

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;

use crate::core::auth::{AuthError, AuthService, LoginRequest, LoginResponse, RegisterRequest};
use crate::core::db::models::UserResponse;

/// Auth API state containing the auth service
#[derive(Clone)]
pub struct AuthApiState {
    pub auth_service: AuthService,
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl ApiError {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }
}

impl AuthError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AuthError::MissingFields(_) => (StatusCode::UNPROCESSABLE_ENTITY, "MISSING_FIELDS"),
            AuthError::InvalidEmail => (StatusCode::BAD_REQUEST, "INVALID_EMAIL"),
            AuthError::EmailAlreadyExists => (StatusCode::CONFLICT, "EMAIL_EXISTS"),
            AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "INVALID_TOKEN"),
            AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED"),
            AuthError::InternalError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

/// Convert AuthError to API response
impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        if let AuthError::InternalError(ref e) = self {
            tracing::error!("Auth internal error: {}", e);
        }

        (status, Json(ApiError::new(self.to_string(), code))).into_response()
    }
}

/// Response for a successful registration
#[derive(Debug, Serialize)]
pub struct RegisterApiResponse {
    pub message: String,
    pub user: UserResponse,
}

/// Response for a successful login
#[derive(Debug, Serialize)]
pub struct LoginApiResponse {
    pub message: String,
    #[serde(flatten)]
    pub login: LoginResponse,
}

/// Create the auth API router
pub fn auth_api_router(state: AuthApiState) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route("/api/auth/register", post(register_handler))
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/me", get(me_handler))
        .with_state(state)
}

/// POST /api/auth/register
async fn register_handler(
    State(state): State<Arc<AuthApiState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterApiResponse>), AuthError> {
    tracing::info!("Registration attempt for email: {}", request.email);

    let user = state.auth_service.register(request).await?;

    tracing::info!("User registered successfully: {}", user.email);

    Ok((
        StatusCode::CREATED,
        Json(RegisterApiResponse {
            message: "User registered successfully.".to_string(),
            user,
        }),
    ))
}

/// POST /api/auth/login
async fn login_handler(
    State(state): State<Arc<AuthApiState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginApiResponse>, AuthError> {
    tracing::info!("Login attempt for email: {}", request.email);

    let login = state.auth_service.login(request).await?;

    tracing::info!("User logged in successfully: {}", login.user.email);

    Ok(Json(LoginApiResponse {
        message: "User logged in successfully.".to_string(),
        login,
    }))
}

/// GET /api/auth/me
async fn me_handler(
    State(state): State<Arc<AuthApiState>>,
    headers: HeaderMap,
) -> Result<Json<UserResponse>, AuthError> {
    let token = extract_bearer_token(&headers)?;

    let user = state.auth_service.authenticate(&token).await?;

    Ok(Json(user.into()))
}

/// Extract Bearer token from Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidToken)?
        .trim();

    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }

    Ok(token.to_string())
}
