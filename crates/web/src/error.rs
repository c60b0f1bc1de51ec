use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use clarifier::ClarifierError;
use engine::{DomainError, EngineError, StorageError};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Web layer errors
#[derive(Debug)]
pub enum WebError {
    Engine(EngineError),
    Clarifier(ClarifierError),
    Validation(ValidationErrors),
    BadRequest(String),
    Unauthorized,
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Engine(e) => write!(f, "Engine error: {}", e),
            Self::Clarifier(e) => write!(f, "Rule clarifier error: {}", e),
            Self::Validation(e) => write!(f, "Validation error: {}", e),
            Self::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            Self::Unauthorized => write!(f, "Unauthorized"),
        }
    }
}

fn domain_code(error: &DomainError) -> &'static str {
    match error {
        DomainError::InvalidTransition { .. } => "InvalidTransition",
        DomainError::MatchNotActive { .. } => "MatchNotActive",
        DomainError::InvalidTimerTransition { .. } => "InvalidTimerTransition",
        DomainError::RoundLimitExceeded { .. } => "RoundLimitExceeded",
        DomainError::NoVenues => "NoVenues",
        DomainError::DuplicateVenue(_) => "DuplicateVenue",
        DomainError::EventIdConflict(_) => "EventIdConflict",
        DomainError::InvalidEvent(_) => "InvalidEvent",
        DomainError::InvalidSchedule(_) => "InvalidSchedule",
    }
}

fn domain_status(error: &DomainError) -> StatusCode {
    match error {
        DomainError::InvalidTransition { .. }
        | DomainError::MatchNotActive { .. }
        | DomainError::InvalidTimerTransition { .. }
        | DomainError::RoundLimitExceeded { .. }
        | DomainError::EventIdConflict(_) => StatusCode::CONFLICT,
        DomainError::NoVenues
        | DomainError::DuplicateVenue(_)
        | DomainError::InvalidEvent(_)
        | DomainError::InvalidSchedule(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status_code, body) = match &self {
            Self::Engine(EngineError::Domain(e)) => (
                domain_status(e),
                json!({
                    "error": e.to_string(),
                    "code": domain_code(e)
                }),
            ),
            Self::Engine(EngineError::Storage(StorageError::NotFound)) => (
                StatusCode::NOT_FOUND,
                json!({
                    "error": "Resource not found"
                }),
            ),
            Self::Engine(EngineError::Storage(
                e @ (StorageError::ConstraintViolation(_) | StorageError::VersionConflict { .. }),
            )) => (
                StatusCode::CONFLICT,
                json!({
                    "error": e.to_string()
                }),
            ),
            Self::Engine(EngineError::Storage(e @ StorageError::Database(_))) => {
                tracing::error!("Storage error: {:?}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    json!({
                        "error": "Match store is unavailable, please retry"
                    }),
                )
            }
            Self::Engine(EngineError::Storage(e)) => {
                tracing::error!("Storage error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "An internal error occurred"
                    }),
                )
            }
            Self::Clarifier(e) if !e.is_upstream() => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": e.to_string()
                }),
            ),
            Self::Clarifier(e) => {
                tracing::error!("Rule clarifier failed: {:?}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    json!({
                        "error": "Rule clarifier is unavailable, please retry"
                    }),
                )
            }
            Self::Validation(errors) => {
                let field_errors: Vec<String> = errors
                    .field_errors()
                    .iter()
                    .flat_map(|(field, errors)| {
                        errors.iter().map(move |e| {
                            format!(
                                "{}: {}",
                                field,
                                e.message
                                    .as_ref()
                                    .map(|m| m.to_string())
                                    .unwrap_or_else(|| e.code.to_string())
                            )
                        })
                    })
                    .collect();

                (
                    StatusCode::BAD_REQUEST,
                    json!({
                        "error": "Validation failed",
                        "details": field_errors
                    }),
                )
            }
            Self::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": msg
                }),
            ),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({
                    "error": "Unauthorized"
                }),
            ),
        };

        (status_code, Json(body)).into_response()
    }
}

impl From<EngineError> for WebError {
    fn from(error: EngineError) -> Self {
        Self::Engine(error)
    }
}

impl From<ClarifierError> for WebError {
    fn from(error: ClarifierError) -> Self {
        Self::Clarifier(error)
    }
}

impl From<ValidationErrors> for WebError {
    fn from(error: ValidationErrors) -> Self {
        Self::Validation(error)
    }
}

pub type WebResult<T> = Result<T, WebError>;
