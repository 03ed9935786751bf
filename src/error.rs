// HTTP API Error Types
use axum::{
    extract::{multipart::MultipartError, rejection::BytesRejection},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::database::StoreError;
use crate::validation::ValidationError;

pub const UPLOAD_MISSING_MESSAGE: &str = "No photo file uploaded.";
pub const UPLOAD_TYPE_MESSAGE: &str = "Error: The uploaded file must be a JPG or a PNG image.";

/// Every failure a request can end in.
///
/// Handlers and extractors only construct these; the error normalizer
/// middleware decides how they are rendered.
#[derive(Debug, Clone)]
pub enum ApiError {
    // 400 Bad Request
    MalformedBody(String),
    UploadMissing,

    // 401 Unauthorized
    Unauthorized,

    // 404 Not Found
    ResourceNotFound(String),
    RouteNotFound(String),

    // 413 Payload Too Large
    PayloadTooLarge,

    // 422 Unprocessable Entity
    Validation(ValidationError),

    // 500 Internal Server Error
    UploadType,
    Internal {
        message: String,
        detail: Option<String>,
    },
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MalformedBody(_) | ApiError::UploadMissing => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::ResourceNotFound(_) | ApiError::RouteNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::UploadType | ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::MalformedBody(msg) => msg,
            ApiError::UploadMissing => UPLOAD_MISSING_MESSAGE,
            ApiError::Unauthorized => "Unauthorized",
            ApiError::ResourceNotFound(msg) => msg,
            ApiError::RouteNotFound(msg) => msg,
            ApiError::PayloadTooLarge => "Payload Too Large",
            ApiError::Validation(_) => "Validation Error",
            ApiError::UploadType => UPLOAD_TYPE_MESSAGE,
            ApiError::Internal { message, .. } => message,
        }
    }

    /// Internal detail, only ever rendered when error detail is enabled.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Internal { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// Stable code for logs
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::MalformedBody(_) => "MALFORMED_BODY",
            ApiError::UploadMissing => "UPLOAD_MISSING",
            ApiError::Unauthorized => "UNAUTHORIZED",
            ApiError::ResourceNotFound(_) => "RESOURCE_NOT_FOUND",
            ApiError::RouteNotFound(_) => "ROUTE_NOT_FOUND",
            ApiError::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ApiError::Validation(_) => "VALIDATION_FAILURE",
            ApiError::UploadType => "UPLOAD_TYPE",
            ApiError::Internal { .. } => "UNHANDLED_FAULT",
        }
    }

    /// JSON error envelope: `{errors: {...}}` for validation failures,
    /// `{message}` (plus `detail` when requested) for everything else.
    pub fn to_json(&self, include_detail: bool) -> Value {
        match self {
            ApiError::Validation(errors) => json!({ "errors": errors.to_json() }),
            _ => {
                let mut body = json!({ "message": self.message() });
                if let (true, Some(detail)) = (include_detail, self.detail()) {
                    body["detail"] = json!(detail);
                }
                body
            }
        }
    }
}

// Constructors
impl ApiError {
    pub fn malformed_body(message: impl Into<String>) -> Self {
        ApiError::MalformedBody(message.into())
    }

    pub fn resource_not_found(message: impl Into<String>) -> Self {
        ApiError::ResourceNotFound(message.into())
    }

    /// `Cannot <METHOD> <path>`, the same text for every unmatched request.
    pub fn route_not_found(method: &Method, path: &str) -> Self {
        ApiError::RouteNotFound(format!("Cannot {} {}", method, path))
    }

    pub fn internal(message: impl Into<String>, detail: impl Into<String>) -> Self {
        ApiError::Internal {
            message: message.into(),
            detail: Some(detail.into()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => ApiError::resource_not_found(format!("Planet {} not found", id)),
            StoreError::ConstraintViolation(msg) => ApiError::internal("Constraint violation", msg),
            StoreError::Sqlx(sqlx_err) => ApiError::internal("Database error occurred", sqlx_err.to_string()),
        }
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else {
            ApiError::malformed_body(rejection.body_text())
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else {
            ApiError::malformed_body(err.body_text())
        }
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::internal("Failed to store uploaded file", err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// The default rendering is plain JSON without detail. The error itself rides
// along in the response extensions so the normalizer can re-render it.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status_code(), Json(self.to_json(false))).into_response();
        response.extensions_mut().insert(self);
        response
    }
}
