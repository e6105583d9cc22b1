use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use racelink_api_types::{ErrorResponse, FieldError, ValidationErrorResponse};

use crate::repository::RepoError;

/// Where unauthenticated requests are redirected.
pub const LOGIN_PATH: &str = "/accounts/login/";

/// Handler-facing error. Validation failures carry every rejected field so
/// the caller can redisplay the whole form at once.
#[derive(Debug)]
pub enum ApiError {
    NotFound { entity: &'static str },
    Validation(Vec<FieldError>),
    Unauthorized,
    Internal(anyhow::Error),
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound { entity } => ApiError::NotFound { entity },
            RepoError::Duplicate { field } => ApiError::Validation(vec![FieldError::new(
                field,
                format!("a record with this {field} already exists"),
            )]),
            RepoError::UnknownReference { entity, field } => {
                ApiError::Validation(vec![FieldError::new(field, format!("unknown {entity}"))])
            }
            other => ApiError::Internal(anyhow::Error::new(other)),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound { entity } => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    code: "NOT_FOUND".to_string(),
                    message: format!("{entity} not found"),
                }),
            )
                .into_response(),
            ApiError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ValidationErrorResponse { errors }),
            )
                .into_response(),
            ApiError::Unauthorized => Redirect::to(LOGIN_PATH).into_response(),
            ApiError::Internal(err) => {
                tracing::error!(error = %err, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        code: "INTERNAL_ERROR".to_string(),
                        message: "an internal error occurred".to_string(),
                    }),
                )
                    .into_response()
            }
        }
    }
}
