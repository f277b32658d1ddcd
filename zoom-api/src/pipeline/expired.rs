//! Detection of Zoom's "access token is expired" response.

use regex::Regex;

use crate::error::{Error, StatusError, ValidationErrorKind};

/// Default pattern matched against the Zoom error message of a 401 response.
pub const DEFAULT_EXPIRED_TOKEN_PATTERN: &str = r"(?i)access\s+token\s+is\s+expired";

/// Decides whether a 401 response means the session token expired.
///
/// Matching is pattern based so small wording changes on Zoom's side don't
/// break refresh. A response matches when its status is 401 and either its
/// error code is one of `codes` or `pattern` matches its message (or the raw
/// body when the message is absent).
#[derive(Debug, Clone)]
pub struct ExpiredTokenMatcher {
    pattern: Regex,
    codes: Vec<i64>,
}

impl ExpiredTokenMatcher {
    pub fn new(pattern: &str) -> Result<Self, Error> {
        let pattern = Regex::new(pattern).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: crate::error::ApiErrorKind::Validation(ValidationErrorKind::InvalidArgument),
        })?;
        Ok(Self {
            pattern,
            codes: Vec::new(),
        })
    }

    /// Also treat these Zoom error codes as "expired".
    pub fn with_codes(mut self, codes: Vec<i64>) -> Self {
        self.codes = codes;
        self
    }

    pub fn matches(&self, status: &StatusError) -> bool {
        if status.status != 401 {
            return false;
        }
        if status.code.is_some_and(|code| self.codes.contains(&code)) {
            return true;
        }
        let text = status.message.as_deref().unwrap_or(&status.body);
        self.pattern.is_match(text)
    }
}
