use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use drive_core::FieldError;
use drive_reservation::{HoldError, ReservationError};
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    AuthorizationError(String),
    BadRequest(String),
    Validation(Vec<FieldError>),
    NotFoundError(String),
    ConflictError(String),
    /// The hold existed but its window has closed.
    GoneError(String),
    /// A response already shaped from the backend's answer.
    Relayed(Response),
    InternalServerError(String),
    Anyhow(anyhow::Error),
}

impl AppError {
    pub fn from_hold(err: HoldError) -> Self {
        let message = err.to_string();
        match err {
            HoldError::NotFound(_) => AppError::NotFoundError(message),
            HoldError::Expired { .. } => AppError::GoneError(message),
            HoldError::Overridden { .. }
            | HoldError::AlreadyFirm(_)
            | HoldError::Cancelled(_)
            | HoldError::Conflict { .. } => {
                AppError::ConflictError(message)
            }
        }
    }

    pub fn from_reservation(err: ReservationError) -> Self {
        let message = err.to_string();
        match err {
            ReservationError::NotFound(_) => AppError::NotFoundError(message),
            ReservationError::InvalidTransition { .. } => AppError::ConflictError(message),
            ReservationError::Malformed(_) => AppError::InternalServerError(message),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Relayed(response) => return response,
            AppError::Validation(fields) => {
                let body = Json(json!({
                    "error": "Please correct the highlighted fields.",
                    "fields": fields,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::AuthorizationError(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::GoneError(msg) => (StatusCode::GONE, msg),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Anyhow(err.into())
    }
}
