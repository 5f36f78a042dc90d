//! Tagged error kinds, the canonical error body, and the error writer.
//!
//! Mirrors the shape of an application-error-to-HTTP-response mapper (the
//! kind of thing `masterror` is for), but kept in the teacher's manual-impl
//! style: a plain enum, hand-written `Display`, no derive macro of our own.
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::content::mediatypes::ApplicationJson;
use crate::content::Serialize as ContentSerialize;
use crate::request::RawRequest;
use crate::response::{self, Response};

/// One field-level validation failure (spec.md §3).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
            rule: None,
            value: None,
        }
    }
    pub fn with_rule(mut self, rule: &str) -> Self {
        self.rule = Some(rule.to_string());
        self
    }
    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }
}

/// Tagged error kinds (spec.md §4.C, status mapping in §7).
#[derive(Debug)]
pub enum ErrorKind {
    BindingError { field: String, reason: String },
    MalformedBody { syntactic: bool, reason: String },
    ValidationFailure(Vec<FieldError>),
    UnsupportedMediaType(Option<String>),
    AuthenticationFailure(String),
    Forbidden(String),
    NotFound,
    MethodNotAllowed,
    Conflict(String),
    UnprocessableEntity(String),
    InternalError(String),
    CustomError {
        status: u16,
        message: String,
        details: Option<Value>,
    },
}

impl ErrorKind {
    /// HTTP status this error kind maps to (spec.md §7).
    pub fn status(&self) -> u16 {
        match self {
            Self::BindingError { .. } => 400,
            Self::MalformedBody { syntactic, .. } => {
                if *syntactic {
                    400
                } else {
                    422
                }
            }
            Self::ValidationFailure(_) => 400,
            Self::UnsupportedMediaType(_) => 415,
            Self::AuthenticationFailure(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound => 404,
            Self::MethodNotAllowed => 405,
            Self::Conflict(_) => 409,
            Self::UnprocessableEntity(_) => 422,
            Self::InternalError(_) => 500,
            Self::CustomError { status, .. } => *status,
        }
    }
    /// The public message, safe to show a client.
    pub fn public_message(&self) -> String {
        match self {
            Self::BindingError { field, reason } => format!("failed to bind field '{}': {}", field, reason),
            Self::MalformedBody { reason, .. } => format!("malformed request body: {}", reason),
            Self::ValidationFailure(_) => "Request validation failed".to_string(),
            Self::UnsupportedMediaType(Some(mt)) => format!("unsupported media type: {}", mt),
            Self::UnsupportedMediaType(None) => "unsupported media type".to_string(),
            Self::AuthenticationFailure(reason) => reason.clone(),
            Self::Forbidden(reason) => reason.clone(),
            Self::NotFound => "not found".to_string(),
            Self::MethodNotAllowed => "method not allowed".to_string(),
            Self::Conflict(reason) => reason.clone(),
            Self::UnprocessableEntity(reason) => reason.clone(),
            Self::InternalError(_) => "Internal Server Error".to_string(),
            Self::CustomError { message, .. } => message.clone(),
        }
    }
    /// Structured detail payload, if any (field errors for validation).
    pub fn details(&self) -> Option<Value> {
        match self {
            Self::ValidationFailure(errors) => serde_json::to_value(errors).ok(),
            Self::CustomError { details, .. } => details.clone(),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.public_message(), self.status())
    }
}

/// An error flowing through the request pipeline: a tagged kind plus an
/// optional internal cause. The cause is logged by the error writer but
/// never serialized into the response body.
#[derive(Debug)]
pub struct ApiError {
    pub kind: ErrorKind,
    pub cause: Option<String>,
}

impl ApiError {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, cause: None }
    }
    pub fn with_cause(mut self, cause: impl fmt::Display) -> Self {
        self.cause = Some(cause.to_string());
        self
    }

    pub fn binding(field: &str, reason: &str) -> Self {
        Self::new(ErrorKind::BindingError {
            field: field.to_string(),
            reason: reason.to_string(),
        })
    }
    pub fn malformed_body(syntactic: bool, reason: &str) -> Self {
        Self::new(ErrorKind::MalformedBody {
            syntactic,
            reason: reason.to_string(),
        })
    }
    pub fn validation(errors: Vec<FieldError>) -> Self {
        Self::new(ErrorKind::ValidationFailure(errors))
    }
    pub fn unsupported_media_type(media_type: Option<String>) -> Self {
        Self::new(ErrorKind::UnsupportedMediaType(media_type))
    }
    pub fn authentication(reason: &str) -> Self {
        Self::new(ErrorKind::AuthenticationFailure(reason.to_string()))
    }
    pub fn forbidden(reason: &str) -> Self {
        Self::new(ErrorKind::Forbidden(reason.to_string()))
    }
    pub fn not_found() -> Self {
        Self::new(ErrorKind::NotFound)
    }
    pub fn method_not_allowed() -> Self {
        Self::new(ErrorKind::MethodNotAllowed)
    }
    pub fn conflict(reason: &str) -> Self {
        Self::new(ErrorKind::Conflict(reason.to_string()))
    }
    pub fn unprocessable(reason: &str) -> Self {
        Self::new(ErrorKind::UnprocessableEntity(reason.to_string()))
    }
    pub fn internal(reason: impl fmt::Display) -> Self {
        Self::new(ErrorKind::InternalError(reason.to_string())).with_cause(reason)
    }
    pub fn custom(status: u16, message: &str, details: Option<Value>) -> Self {
        Self::new(ErrorKind::CustomError {
            status,
            message: message.to_string(),
            details,
        })
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

/// The canonical JSON error body (spec.md §3).
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub timestamp: String,
    pub status: u16,
    pub error: String,
    pub path: String,
    pub method: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "requestId")]
    pub request_id: Option<String>,
}

impl ContentSerialize<ApplicationJson> for ErrorBody {
    fn serialize(self) -> Result<Vec<u8>, crate::content::SerializationError> {
        serde_json::to_vec(&self)
            .map_err(|e| crate::content::SerializationError::new(&e.to_string()))
    }
}

/// Build the canonical error response for `err`, logging it exactly once at
/// error level with the internal cause. `request_id` is the correlation id
/// from the request context (spec.md §3, §4.C).
///
/// `ErrorBody`/`Response<Vec<u8>>` are immutable values, not a streaming
/// writer: unlike a typical `ResponseWriter`, there is no partially-written
/// state this function could clobber, so (unlike spec.md §4.C's abstract
/// writer) calling it twice just builds the same value twice. The "write
/// exactly once" guarantee lives at the transport boundary instead, where
/// the finished `Response` is serialized onto the connection a single time
/// (see `server::tcp::TcpServer`).
pub fn write_error(request: &RawRequest, request_id: Option<&str>, err: ApiError) -> Response<Vec<u8>> {
    let status = err.kind.status();
    let body = ErrorBody {
        timestamp: chrono::Utc::now().to_rfc3339(),
        status,
        error: response::status::default(status),
        path: request.path.clone(),
        method: request.method.to_string(),
        message: err.kind.public_message(),
        details: err.kind.details(),
        request_id: request_id.map(|s| s.to_string()),
    };
    match &err.cause {
        Some(cause) => log::error!(
            "error {} {} -> {} {}: {} (cause: {})",
            request.method, request.path, status, body.error, body.message, cause
        ),
        None => log::error!(
            "error {} {} -> {} {}: {}",
            request.method, request.path, status, body.error, body.message
        ),
    }
    let bytes = match ContentSerialize::<ApplicationJson>::serialize(body) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::error!("failed to serialize canonical error body: {}", e);
            b"{\"error\":\"Internal Server Error\"}".to_vec()
        }
    };
    Response::new(status)
        .with_payload(bytes)
        .with_header("Content-Type", "application/json")
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::request::Request;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ErrorKind::BindingError { field: "x".into(), reason: "y".into() }.status(), 400);
        assert_eq!(ErrorKind::MalformedBody { syntactic: true, reason: "".into() }.status(), 400);
        assert_eq!(ErrorKind::MalformedBody { syntactic: false, reason: "".into() }.status(), 422);
        assert_eq!(ErrorKind::NotFound.status(), 404);
        assert_eq!(ErrorKind::CustomError { status: 418, message: "".into(), details: None }.status(), 418);
    }

    #[test]
    fn test_write_error_includes_request_id_and_message() {
        let request: RawRequest = Request::default();
        let response = write_error(&request, Some("req-1"), ApiError::validation(vec![
            FieldError::new("name", "name is required"),
        ]));
        assert_eq!(response.status_code, 400);
        let body = response.payload.unwrap();
        let parsed: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["message"], "Request validation failed");
        assert_eq!(parsed["requestId"], "req-1");
        assert_eq!(parsed["details"][0]["field"], "name");
    }

    #[test]
    fn test_write_error_idempotent_pure() {
        let request: RawRequest = Request::default();
        let a = write_error(&request, Some("r"), ApiError::not_found());
        let b = write_error(&request, Some("r"), ApiError::not_found());
        assert_eq!(a.status_code, b.status_code);
        assert_eq!(a.payload, b.payload);
    }
}
