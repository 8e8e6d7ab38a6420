//! Gadget API endpoints
//!
//! All routes require a Bearer access token.
//! - GET /api/gadgets - List gadgets (optional ?status= filter)
//! - POST /api/gadgets - Create a gadget with a random codename
//! - PATCH /api/gadgets/:id - Update name and/or status
//! - DELETE /api/gadgets/:id - Decommission a gadget
//! - POST /api/gadgets/:id/self-destruct - Request destruction, code sent out of band
//! - POST /api/gadgets/:id/confirm-destruct - Confirm destruction with the code

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::names;
use crate::core::auth::{AuthError, AuthService, extract_bearer_token};
use crate::core::db::models::{CreateGadget, Gadget, GadgetStatus, UpdateGadget, User};
use crate::core::db::repositories::{GadgetRepository, GadgetRepositoryError};
use crate::core::destruction::{DestructionCoordinator, DestructionError};

/// Attempts at a plain codename before falling back to a suffixed one
const NAME_ATTEMPTS: usize = 5;

/// Gadget API state
#[derive(Clone)]
pub struct GadgetApiState {
    pub gadget_repo: GadgetRepository,
    pub auth_service: AuthService,
    pub coordinator: DestructionCoordinator,
    /// Return confirmation codes in the self-destruct response (development only)
    pub echo_destruction_code: bool,
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_attempts: Option<u32>,
}

impl ApiError {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            remaining_attempts: None,
        }
    }
}

/// Gadget API error types
#[derive(Debug, thiserror::Error)]
pub enum GadgetApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Gadget not found")]
    NotFound,

    #[error("{0}")]
    InvalidState(&'static str),

    #[error("Please provide at least one field (name or status) to update")]
    NothingToUpdate,

    #[error("{0}")]
    InvalidStatus(String),

    #[error("Gadget name must be unique")]
    NameAlreadyExists,

    #[error(transparent)]
    Destruction(#[from] DestructionError),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<GadgetRepositoryError> for GadgetApiError {
    fn from(err: GadgetRepositoryError) -> Self {
        match err {
            GadgetRepositoryError::NotFound => GadgetApiError::NotFound,
            GadgetRepositoryError::NameAlreadyExists => GadgetApiError::NameAlreadyExists,
            GadgetRepositoryError::AlreadyDestroyed => {
                GadgetApiError::InvalidState("Gadget is already destroyed")
            }
            GadgetRepositoryError::DatabaseError(e) => GadgetApiError::InternalError(e.to_string()),
        }
    }
}

/// HTTP status and stable reason code for each destruction outcome
pub fn destruction_status(err: &DestructionError) -> (StatusCode, &'static str) {
    match err {
        DestructionError::GadgetNotFound => (StatusCode::NOT_FOUND, "GADGET_NOT_FOUND"),
        DestructionError::NoPendingDestruction => {
            (StatusCode::NOT_FOUND, "NO_PENDING_DESTRUCTION")
        }
        DestructionError::AlreadyDestroyed => (StatusCode::BAD_REQUEST, "ALREADY_DESTROYED"),
        DestructionError::MissingCode => (StatusCode::BAD_REQUEST, "CONFIRMATION_CODE_REQUIRED"),
        DestructionError::Expired => (StatusCode::BAD_REQUEST, "CONFIRMATION_EXPIRED"),
        DestructionError::AttemptsExhausted => (StatusCode::BAD_REQUEST, "ATTEMPTS_EXHAUSTED"),
        DestructionError::CodeMismatch { .. } => (StatusCode::BAD_REQUEST, "CODE_MISMATCH"),
        DestructionError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        DestructionError::Notification(_) => (StatusCode::BAD_GATEWAY, "NOTIFICATION_FAILED"),
    }
}

impl IntoResponse for GadgetApiError {
    fn into_response(self) -> Response {
        if let GadgetApiError::Auth(e) = self {
            return e.into_response();
        }

        let (status, code) = match &self {
            GadgetApiError::Auth(e) => e.status_and_code(),
            GadgetApiError::NotFound => (StatusCode::NOT_FOUND, "GADGET_NOT_FOUND"),
            GadgetApiError::InvalidState(_) => (StatusCode::BAD_REQUEST, "INVALID_STATE"),
            GadgetApiError::NothingToUpdate => {
                (StatusCode::UNPROCESSABLE_ENTITY, "NOTHING_TO_UPDATE")
            }
            GadgetApiError::InvalidStatus(_) => (StatusCode::BAD_REQUEST, "INVALID_STATUS"),
            GadgetApiError::NameAlreadyExists => (StatusCode::CONFLICT, "NAME_ALREADY_EXISTS"),
            GadgetApiError::Destruction(e) => destruction_status(e),
            GadgetApiError::InternalError(e) => {
                tracing::error!("Gadget API internal error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let mut body = ApiError::new(self.to_string(), code);
        if let GadgetApiError::Destruction(DestructionError::CodeMismatch { remaining_attempts }) =
            &self
        {
            body.remaining_attempts = Some(*remaining_attempts);
        }

        (status, Json(body)).into_response()
    }
}

// ============================================================================
// Request/Response DTOs
// ============================================================================

/// Query parameters for listing gadgets
#[derive(Debug, Deserialize, Default)]
pub struct ListGadgetsQuery {
    pub status: Option<String>,
}

/// Request for updating a gadget
#[derive(Debug, Deserialize, Default)]
pub struct UpdateGadgetRequest {
    pub name: Option<String>,
    pub status: Option<String>,
}

/// Request for confirming a destruction.
///
/// The code may arrive as a JSON string or a bare number.
#[derive(Debug, Deserialize, Default)]
pub struct ConfirmDestructionRequest {
    #[serde(default, alias = "confirmationCode")]
    pub confirmation_code: Option<serde_json::Value>,
}

impl ConfirmDestructionRequest {
    pub fn code(self) -> Option<String> {
        match self.confirmation_code? {
            serde_json::Value::String(code) => Some(code),
            serde_json::Value::Number(code) => Some(code.to_string()),
            _ => None,
        }
    }
}

/// Gadget with a freshly rolled mission success estimate
#[derive(Debug, Serialize)]
pub struct GadgetView {
    #[serde(flatten)]
    pub gadget: Gadget,
    pub success_probability: String,
}

#[derive(Debug, Serialize)]
pub struct GadgetListResponse {
    pub message: String,
    pub count: usize,
    pub gadgets: Vec<GadgetView>,
}

#[derive(Debug, Serialize)]
pub struct GadgetResponse {
    pub message: String,
    pub gadget: Gadget,
}

#[derive(Debug, Serialize)]
pub struct BeginDestructionResponse {
    pub message: String,
    pub expires_in_seconds: i64,
    pub expires_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation_code: Option<String>,
}

// ============================================================================
// Validation
// ============================================================================

/// Parse the optional `?status=` filter
pub fn parse_status_filter(status: Option<&str>) -> Result<Option<GadgetStatus>, GadgetApiError> {
    match status.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(raw) => raw.parse::<GadgetStatus>().map(Some).map_err(|_| {
            GadgetApiError::InvalidStatus(format!(
                "Invalid status. Must be one of: {}",
                GadgetStatus::allowed_values()
            ))
        }),
    }
}

/// Turn an update request into the changes to apply to `current`.
///
/// Destroying is not an update: only the self-destruct sequence may set `Destroyed`.
pub fn plan_update(
    current: &Gadget,
    request: &UpdateGadgetRequest,
    now: DateTime<Utc>,
) -> Result<UpdateGadget, GadgetApiError> {
    if current.status.is_terminal() {
        return Err(GadgetApiError::InvalidState(
            "Gadget is destroyed! It can't be updated.",
        ));
    }

    let name = request
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());
    let status = request
        .status
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    if name.is_none() && status.is_none() {
        return Err(GadgetApiError::NothingToUpdate);
    }

    let status = status
        .map(|raw| {
            raw.parse::<GadgetStatus>().map_err(|_| {
                GadgetApiError::InvalidStatus(format!(
                    "Invalid status value. Must be one of: {}",
                    GadgetStatus::allowed_values()
                ))
            })
        })
        .transpose()?;

    if status == Some(GadgetStatus::Destroyed) {
        return Err(GadgetApiError::InvalidStatus(
            "Gadgets can only be destroyed through the self-destruct sequence".to_string(),
        ));
    }

    let decommissioned_at = match status {
        Some(GadgetStatus::Decommissioned) => Some(Some(now)),
        Some(_) if current.status == GadgetStatus::Decommissioned => Some(None),
        _ => None,
    };

    Ok(UpdateGadget {
        name: name.map(str::to_string),
        status,
        decommissioned_at,
    })
}

/// Check that `current` may be decommissioned
pub fn check_decommission(current: &Gadget) -> Result<(), GadgetApiError> {
    match current.status {
        GadgetStatus::Destroyed => Err(GadgetApiError::InvalidState(
            "Gadget is already destroyed! It can't be decommissioned.",
        )),
        GadgetStatus::Decommissioned => Err(GadgetApiError::InvalidState(
            "Gadget is already decommissioned.",
        )),
        _ => Ok(()),
    }
}

/// Read the confirmation code from a request body.
///
/// An empty or unreadable body, or a code that is neither a string nor a
/// number, counts as no code. A missing pending request is therefore still
/// reported before a missing code.
pub fn parse_confirmation_code(body: &[u8]) -> Option<String> {
    if body.is_empty() {
        return None;
    }
    serde_json::from_slice::<ConfirmDestructionRequest>(body)
        .ok()
        .and_then(ConfirmDestructionRequest::code)
}

// ============================================================================
// Router
// ============================================================================

/// Create the gadget API router
pub fn gadget_api_router(state: GadgetApiState) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route("/api/gadgets", get(list_gadgets_handler))
        .route("/api/gadgets", post(create_gadget_handler))
        .route("/api/gadgets/{id}", patch(update_gadget_handler))
        .route("/api/gadgets/{id}", delete(decommission_gadget_handler))
        .route(
            "/api/gadgets/{id}/self-destruct",
            post(begin_destruction_handler),
        )
        .route(
            "/api/gadgets/{id}/confirm-destruct",
            post(confirm_destruction_handler),
        )
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/gadgets
async fn list_gadgets_handler(
    State(state): State<Arc<GadgetApiState>>,
    headers: HeaderMap,
    Query(query): Query<ListGadgetsQuery>,
) -> Result<Json<GadgetListResponse>, GadgetApiError> {
    authenticate(&state, &headers).await?;

    let status = parse_status_filter(query.status.as_deref())?;
    tracing::debug!("Listing gadgets, status filter: {:?}", status);

    let gadgets = state.gadget_repo.list(status).await?;

    let mut rng = rand::thread_rng();
    let gadgets: Vec<GadgetView> = gadgets
        .into_iter()
        .map(|gadget| GadgetView {
            gadget,
            success_probability: format!("{}%", names::success_probability(&mut rng)),
        })
        .collect();

    let message = match status {
        Some(status) => format!("Gadgets with status '{}' fetched successfully.", status),
        None => "All gadgets fetched successfully.".to_string(),
    };

    Ok(Json(GadgetListResponse {
        message,
        count: gadgets.len(),
        gadgets,
    }))
}

/// POST /api/gadgets
async fn create_gadget_handler(
    State(state): State<Arc<GadgetApiState>>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<GadgetResponse>), GadgetApiError> {
    let user = authenticate(&state, &headers).await?;

    for attempt in 0..=NAME_ATTEMPTS {
        let name = {
            let mut rng = rand::thread_rng();
            if attempt < NAME_ATTEMPTS {
                names::generate_name(&mut rng)
            } else {
                names::generate_suffixed_name(&mut rng)
            }
        };

        let dto = CreateGadget {
            name,
            owner_id: Some(user.id),
        };

        match state.gadget_repo.create(&dto).await {
            Ok(gadget) => {
                tracing::info!("Gadget created: {} ({})", gadget.name, gadget.id);
                return Ok((
                    StatusCode::CREATED,
                    Json(GadgetResponse {
                        message: "Gadget created successfully.".to_string(),
                        gadget,
                    }),
                ));
            }
            Err(GadgetRepositoryError::NameAlreadyExists) => {
                tracing::debug!("Codename '{}' taken, rolling again", dto.name);
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(GadgetApiError::NameAlreadyExists)
}

/// PATCH /api/gadgets/:id
async fn update_gadget_handler(
    State(state): State<Arc<GadgetApiState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<UpdateGadgetRequest>,
) -> Result<Json<GadgetResponse>, GadgetApiError> {
    authenticate(&state, &headers).await?;

    let gadget = state
        .gadget_repo
        .find_by_id(id)
        .await?
        .ok_or(GadgetApiError::NotFound)?;

    let updates = plan_update(&gadget, &request, Utc::now())?;

    if let Some(ref name) = updates.name {
        let taken = state.gadget_repo.find_by_name(name).await?;
        if taken.is_some_and(|existing| existing.id != id) {
            return Err(GadgetApiError::NameAlreadyExists);
        }
    }

    let gadget = state.gadget_repo.update(id, &updates).await?;

    tracing::info!("Gadget updated: {} ({})", gadget.name, gadget.status);

    Ok(Json(GadgetResponse {
        message: "Gadget updated successfully.".to_string(),
        gadget,
    }))
}

/// DELETE /api/gadgets/:id
async fn decommission_gadget_handler(
    State(state): State<Arc<GadgetApiState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<GadgetResponse>, GadgetApiError> {
    authenticate(&state, &headers).await?;

    let gadget = state
        .gadget_repo
        .find_by_id(id)
        .await?
        .ok_or(GadgetApiError::NotFound)?;

    check_decommission(&gadget)?;

    let gadget = state.gadget_repo.decommission(id, Utc::now()).await?;

    tracing::info!("Gadget decommissioned: {}", gadget.id);

    Ok(Json(GadgetResponse {
        message: "Gadget decommissioned successfully.".to_string(),
        gadget,
    }))
}

/// POST /api/gadgets/:id/self-destruct
async fn begin_destruction_handler(
    State(state): State<Arc<GadgetApiState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<BeginDestructionResponse>, GadgetApiError> {
    let user = authenticate(&state, &headers).await?;
    tracing::info!("Destruction of gadget {} requested by {}", id, user.id);

    let ticket = state.coordinator.begin(id).await?;

    Ok(Json(BeginDestructionResponse {
        message: "Gadget destruction has been initiated. Please confirm your code.".to_string(),
        expires_in_seconds: ticket.expires_in_seconds,
        expires_at: ticket.expires_at,
        confirmation_code: state.echo_destruction_code.then_some(ticket.code),
    }))
}

/// POST /api/gadgets/:id/confirm-destruct
async fn confirm_destruction_handler(
    State(state): State<Arc<GadgetApiState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<GadgetResponse>, GadgetApiError> {
    authenticate(&state, &headers).await?;

    let code = parse_confirmation_code(&body);
    let gadget = state.coordinator.confirm(id, code.as_deref()).await?;

    Ok(Json(GadgetResponse {
        message: "Gadget has been successfully destroyed.".to_string(),
        gadget,
    }))
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Resolve the caller from the Authorization header
async fn authenticate(state: &GadgetApiState, headers: &HeaderMap) -> Result<User, GadgetApiError> {
    let token = extract_bearer_token(headers)?;
    Ok(state.auth_service.authenticate(&token).await?)
}

// ============================================================================
// Tests
// ============================================================================
