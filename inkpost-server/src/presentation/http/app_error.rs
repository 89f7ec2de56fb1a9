use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;
use validator::ValidationErrors;

use crate::domain::error::DomainError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("request body is too large")]
    PayloadTooLarge,

    #[error("no token, authorization denied")]
    Unauthenticated,

    #[error("token is not valid")]
    InvalidCredential,

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

pub(crate) type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ErrorBody {
    pub(crate) error: String,
    pub(crate) code: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) fields: Vec<FieldError>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct FieldError {
    pub(crate) field: String,
    pub(crate) message: String,
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return AppError::PayloadTooLarge;
        }
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Domain(err) => match err {
                DomainError::Validation { .. } => (StatusCode::BAD_REQUEST, "validation"),
                DomainError::AlreadyExists(_) => (StatusCode::BAD_REQUEST, "conflict"),
                DomainError::InvalidCredentials => {
                    (StatusCode::BAD_REQUEST, "invalid_credentials")
                }
                DomainError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
                DomainError::Forbidden => (StatusCode::UNAUTHORIZED, "forbidden"),
                DomainError::Unexpected(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
            },
            AppError::Validation(_) | AppError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, "validation")
            }
            AppError::PayloadTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, "validation"),
            AppError::Unauthenticated => (StatusCode::UNAUTHORIZED, "unauthenticated"),
            AppError::InvalidCredential => (StatusCode::UNAUTHORIZED, "invalid_credential"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        }
    }

    fn into_body(self, code: &'static str) -> ErrorBody {
        let (error, fields) = match self {
            AppError::Domain(DomainError::Unexpected(detail)) => {
                error!(%detail, "unexpected domain error");
                ("internal error".to_string(), Vec::new())
            }
            AppError::Internal(err) => {
                error!(error = ?err, "internal error");
                ("internal error".to_string(), Vec::new())
            }
            AppError::Domain(DomainError::Validation { field, message }) => (
                format!("invalid {field}: {message}"),
                vec![FieldError {
                    field: field.to_string(),
                    message: message.to_string(),
                }],
            ),
            AppError::Validation(errors) => {
                let fields = collect_field_errors(&errors);
                ("validation failed".to_string(), fields)
            }
            other => (other.to_string(), Vec::new()),
        };

        ErrorBody {
            error,
            code,
            fields,
        }
    }
}

fn collect_field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |err| FieldError {
                field: field.to_string(),
                message: err
                    .message
                    .as_ref()
                    .map(|message| message.to_string())
                    .unwrap_or_else(|| err.code.to_string()),
            })
        })
        .collect();
    fields.sort_by(|a, b| a.field.cmp(&b.field));
    fields
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        (status, Json(self.into_body(code))).into_response()
    }
}
