use crate::domain::errors::{DomainError, FieldError};
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::WithRejection;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unauthorized,
    Forbidden(String),
    Internal(String),
    Conflict(String),
    TooManyRequests(String),
    Unprocessable {
        message: String,
        errors: Vec<FieldError>,
    },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized => write!(f, "Unauthorized"),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::TooManyRequests(msg) => write!(f, "Too many requests: {}", msg),
            ApiError::Unprocessable { message, .. } => write!(f, "Unprocessable: {}", message),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string(), None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, None),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg, None),
            ApiError::TooManyRequests(msg) => (StatusCode::TOO_MANY_REQUESTS, msg, None),
            ApiError::Unprocessable { message, errors } => {
                (StatusCode::UNPROCESSABLE_ENTITY, message, Some(errors))
            }
        };

        let body = match errors {
            Some(errors) => json!({
                "error": status.canonical_reason().unwrap_or("Error"),
                "message": message,
                "errors": errors,
            }),
            None => json!({
                "error": status.canonical_reason().unwrap_or("Error"),
                "message": message,
            }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::from(DomainError::from(err))
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound(msg) => ApiError::NotFound(msg),
            DomainError::ValidationError(msg) => ApiError::Unprocessable {
                message: msg,
                errors: Vec::new(),
            },
            DomainError::InvalidFields(errors) => ApiError::Unprocessable {
                message: "The given data was invalid".to_string(),
                errors,
            },
            err @ DomainError::DuplicateCertificate => ApiError::Conflict(err.to_string()),
            err @ DomainError::CertificateCodeCollision => ApiError::Conflict(err.to_string()),
            DomainError::Conflict(msg) => ApiError::Conflict(msg),
            DomainError::Forbidden(msg) => ApiError::Forbidden(msg),
            DomainError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

/// Body rejections (missing fields, unparseable dates, wrong content type) still answer in
/// the JSON error shape instead of axum's plain-text default.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => {
                let detail = err.body_text();
                ApiError::Unprocessable {
                    message: "The given data was invalid".to_string(),
                    errors: vec![FieldError::new(rejected_field(&detail), detail)],
                }
            }
            other => ApiError::BadRequest(other.body_text()),
        }
    }
}

/// Best-effort name of the offending field in a body deserialization error.
///
/// serde reports a missing field as "missing field `name`" and a bad value as
/// "name: <reason>", after axum's own prefix.
fn rejected_field(detail: &str) -> String {
    if let Some(start) = detail.find("missing field `") {
        let rest = &detail[start + "missing field `".len()..];
        if let Some(end) = rest.find('`') {
            return rest[..end].to_string();
        }
    }

    let reason = detail
        .split_once("target type: ")
        .map(|(_, rest)| rest)
        .unwrap_or(detail);
    if let Some((path, _)) = reason.split_once(": ") {
        let field = path.rsplit('.').next().unwrap_or(path);
        if !field.is_empty() && field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return field.to_string();
        }
    }

    "body".to_string()
}

pub type ApiResult<T> = Result<T, ApiError>;

/// `Json<T>` whose rejection is an [`ApiError`].
pub type JsonBody<T> = WithRejection<Json<T>, ApiError>;
