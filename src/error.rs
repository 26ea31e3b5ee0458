use std::collections::HashMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::{password::PasswordError, repository::RepositoryError};

/// ApiError
///
/// Every failure a board handler can surface. Wrong delete passwords are not in here:
/// they are an ordinary `200 incorrect password` answer, see `handlers::DeleteOutcome`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body or query could not be decoded into the expected shape.
    #[error("{0}")]
    BadRequest(String),

    /// The payload decoded but failed field validation.
    #[error("validation failed")]
    Validation(HashMap<String, Vec<String>>),

    /// The addressed thread or reply does not exist on this board.
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

/// Serialized error body: `{"error": "...", "details": {...}}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Vec<String>>>,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Repository(_) | ApiError::Password(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let details = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let messages = errs
                    .iter()
                    .map(|e| match &e.message {
                        Some(message) => message.to_string(),
                        None => e.code.to_string(),
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();
        ApiError::Validation(details)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match self {
            ApiError::Validation(details) => ErrorBody {
                error: "validation failed".to_string(),
                details: Some(details),
            },
            ApiError::Repository(ref e) => {
                tracing::error!("store failure: {:?}", e);
                ErrorBody {
                    error: "internal server error".to_string(),
                    details: None,
                }
            }
            ApiError::Password(ref e) => {
                tracing::error!("password hashing failure: {:?}", e);
                ErrorBody {
                    error: "internal server error".to_string(),
                    details: None,
                }
            }
            other => ErrorBody {
                error: other.to_string(),
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}
