use std::collections::BTreeMap;

use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

use crate::domain::error::DomainError;
use crate::infrastructure::media::MediaError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::BadRequest(err.body_text())
    }
}

pub(crate) type AppResult<T> = Result<T, AppError>;

/// Response extension set on every 500 produced from an [`AppError`]; the
/// server error layer swaps such responses for the rendered 500 page.
#[derive(Debug, Clone, Copy)]
pub(crate) struct UnexpectedFailure;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    fields: BTreeMap<String, Vec<String>>,
}

impl ErrorBody {
    fn message(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            fields: BTreeMap::new(),
        }
    }

    fn field(field: &str, message: impl Into<String>) -> Self {
        Self {
            error: "validation failed".to_string(),
            fields: BTreeMap::from([(field.to_string(), vec![message.into()])]),
        }
    }
}

fn field_errors(err: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    err.field_errors()
        .into_iter()
        .map(|(field, errors)| {
            let messages = errors
                .iter()
                .map(|e| match &e.message {
                    Some(message) => message.to_string(),
                    None => e.code.to_string(),
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

fn internal(cause: &dyn std::fmt::Display) -> (StatusCode, ErrorBody) {
    error!(error = %cause, "request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorBody::message("internal error"),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Domain(err) => match err {
                DomainError::Validation { field, message } => {
                    (StatusCode::BAD_REQUEST, ErrorBody::field(field, *message))
                }
                DomainError::AlreadyExists(field) => (
                    StatusCode::CONFLICT,
                    ErrorBody {
                        error: err.to_string(),
                        fields: BTreeMap::from([(
                            field.to_string(),
                            vec!["is already taken".to_string()],
                        )]),
                    },
                ),
                DomainError::InvalidCredentials => {
                    (StatusCode::UNAUTHORIZED, ErrorBody::message(err.to_string()))
                }
                DomainError::NotFound { .. } => {
                    (StatusCode::NOT_FOUND, ErrorBody::message(err.to_string()))
                }
                DomainError::Forbidden => {
                    (StatusCode::FORBIDDEN, ErrorBody::message(err.to_string()))
                }
                DomainError::Unexpected(_) => internal(err),
            },
            AppError::Validation(err) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: "validation failed".to_string(),
                    fields: field_errors(err),
                },
            ),
            AppError::Media(MediaError::Io(err)) => internal(err),
            AppError::Media(err) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::field("image", err.to_string()),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorBody::message(msg.clone())),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, ErrorBody::message("unauthorized")),
            AppError::Internal(err) => internal(err),
        };

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            response.extensions_mut().insert(UnexpectedFailure);
        }
        response
    }
}
