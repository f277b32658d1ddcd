//! Error types for the `zoom-api` layer.
//!
//! Errors are modeled as a tree with `zoom_api::error::Error` as the root, holding an
//! `error_kind` that says what went wrong and an optional `source` with the original
//! error. Errors from `zoom-auth` are translated at the boundary so callers only need
//! this crate's types.
use serde::Deserialize;
use std::error::Error as StdError;
use std::fmt;
use zoom_auth::error::{
    Error as AuthError, ErrorKind as AuthErrorKind, HttpErrorKind as AuthHttpErrorKind,
    OAuthErrorKind,
};

/// Top-level error type returned by every client operation.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ApiErrorKind,
}

/// Enum representing the major categories of errors a client call can produce.
#[derive(Debug, PartialEq)]
pub enum ApiErrorKind {
    /// The token endpoint rejected an exchange or refresh. Not retried.
    Authentication(AuthErrorKind),
    /// Pre-flight validation failed; no request was sent.
    Validation(ValidationErrorKind),
    Http(HttpErrorKind),
    /// A 2xx response body did not match the expected shape.
    Deserialization,
    /// The caller's cancellation token fired.
    Cancelled,
}

#[derive(Debug, PartialEq)]
pub enum ValidationErrorKind {
    /// A numeric argument (e.g. records per page) is outside its documented bounds.
    OutOfRange,
    /// A required collection is empty, too large, or an argument is malformed.
    InvalidArgument,
}

#[derive(Debug, PartialEq)]
pub enum HttpErrorKind {
    /// Non-2xx response that was not handled by the token refresh path.
    Status(StatusError),
    Network,
    BuilderFailed,
}

/// A non-success response from the Zoom API.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusError {
    pub status: u16,
    /// Zoom error code from the response body, if any.
    pub code: Option<i64>,
    /// Zoom error message from the response body, if any.
    pub message: Option<String>,
    /// Raw response body.
    pub body: String,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
}

impl StatusError {
    /// Build from a response status and raw body, parsing Zoom's `{code, message}` shape.
    pub fn from_parts(status: u16, body: &[u8]) -> Self {
        let payload: ErrorPayload = serde_json::from_slice(body).unwrap_or_default();
        Self {
            status,
            code: payload.code,
            message: payload.message,
            body: String::from_utf8_lossy(body).into_owned(),
        }
    }
}

impl Error {
    /// The HTTP status error, if this is one.
    pub fn status(&self) -> Option<&StatusError> {
        match &self.error_kind {
            ApiErrorKind::Http(HttpErrorKind::Status(status)) => Some(status),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.error_kind == ApiErrorKind::Cancelled
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ApiErrorKind::Authentication(kind) => write!(f, "Authentication error: {:?}", kind)?,
            ApiErrorKind::Validation(kind) => write!(f, "Validation error: {:?}", kind)?,
            ApiErrorKind::Http(HttpErrorKind::Status(status)) => write!(
                f,
                "Zoom API returned HTTP {}: {}",
                status.status,
                status.message.as_deref().unwrap_or(&status.body)
            )?,
            ApiErrorKind::Http(kind) => write!(f, "HTTP error: {:?}", kind)?,
            ApiErrorKind::Deserialization => write!(f, "Unexpected response body")?,
            ApiErrorKind::Cancelled => write!(f, "Operation cancelled")?,
        }
        if let Some(source) = &self.source {
            write!(f, " ({})", source)?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<StatusError> for Error {
    fn from(status: StatusError) -> Self {
        Error {
            source: None,
            error_kind: ApiErrorKind::Http(HttpErrorKind::Status(status)),
        }
    }
}

// This is where we translate errors from the `zoom-auth` layer to this layer.
impl From<AuthError> for Error {
    fn from(err: AuthError) -> Self {
        let error_kind = match &err.error_kind {
            AuthErrorKind::Http(AuthHttpErrorKind::BuilderFailed) => {
                ApiErrorKind::Http(HttpErrorKind::BuilderFailed)
            }
            AuthErrorKind::Http(_) | AuthErrorKind::OAuth(OAuthErrorKind::Network) => {
                ApiErrorKind::Http(HttpErrorKind::Network)
            }
            kind => ApiErrorKind::Authentication(kind.clone()),
        };
        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // Errors that result from building the request, before any network call.
        let error_kind = if err.is_builder() {
            ApiErrorKind::Http(HttpErrorKind::BuilderFailed)
        } else {
            ApiErrorKind::Http(HttpErrorKind::Network)
        };
        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

impl From<reqwest_middleware::Error> for Error {
    fn from(err: reqwest_middleware::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ApiErrorKind::Http(HttpErrorKind::Network),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ApiErrorKind::Deserialization,
        }
    }
}

/// Helper function to create validation errors.
pub fn validation_error(kind: ValidationErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ApiErrorKind::Validation(kind),
    }
}

/// Helper function to create the cancellation error.
pub fn cancelled() -> Error {
    Error {
        source: None,
        error_kind: ApiErrorKind::Cancelled,
    }
}
