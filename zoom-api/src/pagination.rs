//! Paging request parameters and paged responses shared by every list endpoint.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{validation_error, Error, ValidationErrorKind};
use crate::pipeline::ApiRequest;

pub const DEFAULT_RECORDS_PER_PAGE: u32 = 30;
pub const MAX_RECORDS_PER_PAGE: u32 = 300;

/// Position within a paged listing.
///
/// Zoom deprecated page numbers in favour of opaque paging tokens, but some
/// endpoints still accept both. A request carries exactly one style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCursor {
    /// `next_page_token` from the previous page; `None` requests the first page.
    Token(Option<String>),
    /// Legacy 1-based page number.
    Number(u32),
}

/// Paging parameters for one list call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub records_per_page: u32,
    pub cursor: PageCursor,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(DEFAULT_RECORDS_PER_PAGE)
    }
}

impl PageRequest {
    /// First page using token paging.
    pub fn first(records_per_page: u32) -> Self {
        Self {
            records_per_page,
            cursor: PageCursor::Token(None),
        }
    }

    /// Page following the one that returned `next_page_token`.
    pub fn next(records_per_page: u32, next_page_token: impl Into<String>) -> Self {
        Self {
            records_per_page,
            cursor: PageCursor::Token(Some(next_page_token.into())),
        }
    }

    /// A specific page using legacy page numbers.
    pub fn page_number(records_per_page: u32, page_number: u32) -> Self {
        Self {
            records_per_page,
            cursor: PageCursor::Number(page_number),
        }
    }

    /// Check the bounds before any request is sent.
    pub fn validate(&self, max_records_per_page: u32) -> Result<(), Error> {
        if self.records_per_page < 1 || self.records_per_page > max_records_per_page {
            return Err(validation_error(
                ValidationErrorKind::OutOfRange,
                &format!(
                    "records_per_page must be between 1 and {}, got {}",
                    max_records_per_page, self.records_per_page
                ),
            ));
        }
        if self.cursor == PageCursor::Number(0) {
            return Err(validation_error(
                ValidationErrorKind::OutOfRange,
                "page_number must be 1 or greater",
            ));
        }
        Ok(())
    }

    /// Add `page_size` and the cursor to the query string.
    pub fn apply(&self, request: ApiRequest) -> ApiRequest {
        let request = request.query("page_size", self.records_per_page);
        match &self.cursor {
            PageCursor::Token(Some(token)) if !token.is_empty() => {
                request.query("next_page_token", token)
            }
            PageCursor::Token(_) => request,
            PageCursor::Number(number) => request.query("page_number", number),
        }
    }
}

/// One page of a list response.
#[derive(Debug, Clone, PartialEq)]
pub struct PagedResult<T> {
    pub records: Vec<T>,
    pub records_per_page: u32,
    pub total_records: Option<u64>,
    pub page_number: Option<u32>,
    pub page_count: Option<u32>,
    pub next_page_token: Option<String>,
    /// True iff a non-empty `next_page_token` was returned.
    pub more_records_available: bool,
    /// Start of the reported date range, for date-bounded listings.
    pub from: Option<String>,
    /// End of the reported date range, for date-bounded listings.
    pub to: Option<String>,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    page_size: Option<u32>,
    #[serde(default)]
    total_records: Option<u64>,
    #[serde(default)]
    page_number: Option<u32>,
    #[serde(default)]
    page_count: Option<u32>,
    #[serde(default)]
    next_page_token: Option<String>,
    #[serde(default)]
    from: Option<String>,
    #[serde(default)]
    to: Option<String>,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

impl<T: DeserializeOwned> PagedResult<T> {
    /// Parse a list response whose records live under `records_key`.
    ///
    /// A missing or `null` records array is an empty page, not an error.
    pub fn from_json(body: &[u8], records_key: &str, requested: &PageRequest) -> Result<Self, Error> {
        let mut envelope: Envelope = serde_json::from_slice(body)?;

        let records = match envelope.rest.remove(records_key) {
            None | Some(Value::Null) => Vec::new(),
            Some(value) => serde_json::from_value(value)?,
        };

        let next_page_token = envelope.next_page_token.filter(|token| !token.is_empty());

        Ok(Self {
            records,
            records_per_page: envelope.page_size.unwrap_or(requested.records_per_page),
            total_records: envelope.total_records,
            page_number: envelope.page_number,
            page_count: envelope.page_count,
            more_records_available: next_page_token.is_some(),
            next_page_token,
            from: envelope.from,
            to: envelope.to,
        })
    }
}

impl<T> PagedResult<T> {
    /// Request for the following page, if there is one.
    pub fn next_page(&self) -> Option<PageRequest> {
        self.next_page_token
            .as_ref()
            .map(|token| PageRequest::next(self.records_per_page, token.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Record {
        id: String,
    }

    #[test]
    fn test_token_marks_more_records_available() {
        let body = br#"{"page_size":2,"total_records":5,"next_page_token":"abc","users":[{"id":"a"},{"id":"b"}]}"#;
        let page: PagedResult<Record> =
            PagedResult::from_json(body, "users", &PageRequest::first(2)).unwrap();

        assert!(page.more_records_available);
        assert_eq!(page.next_page_token.as_deref(), Some("abc"));
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.total_records, Some(5));
        assert_eq!(page.next_page(), Some(PageRequest::next(2, "abc")));
    }

    #[test]
    fn test_empty_or_absent_token_means_last_page() {
        let empty = br#"{"page_size":30,"next_page_token":"","users":[{"id":"a"}]}"#;
        let page: PagedResult<Record> =
            PagedResult::from_json(empty, "users", &PageRequest::default()).unwrap();
        assert!(!page.more_records_available);
        assert_eq!(page.next_page_token, None);
        assert_eq!(page.next_page(), None);

        let absent = br#"{"page_size":30,"users":[{"id":"a"}]}"#;
        let page: PagedResult<Record> =
            PagedResult::from_json(absent, "users", &PageRequest::default()).unwrap();
        assert!(!page.more_records_available);
    }

    #[test]
    fn test_empty_records_is_not_an_error() {
        let body = br#"{"from":"2024-01-01","to":"2024-01-31","page_size":30,"total_records":0,"next_page_token":"","meetings":[]}"#;
        let page: PagedResult<Record> =
            PagedResult::from_json(body, "meetings", &PageRequest::default()).unwrap();
        assert!(page.records.is_empty());
        assert_eq!(page.from.as_deref(), Some("2024-01-01"));
        assert_eq!(page.to.as_deref(), Some("2024-01-31"));

        let missing = br#"{"page_size":30}"#;
        let page: PagedResult<Record> =
            PagedResult::from_json(missing, "meetings", &PageRequest::default()).unwrap();
        assert!(page.records.is_empty());

        let null = br#"{"page_size":30,"meetings":null}"#;
        let page: PagedResult<Record> =
            PagedResult::from_json(null, "meetings", &PageRequest::default()).unwrap();
        assert!(page.records.is_empty());
    }

    #[test]
    fn test_legacy_page_number_fields() {
        let body = br#"{"page_count":4,"page_number":2,"page_size":10,"total_records":35,"users":[]}"#;
        let page: PagedResult<Record> =
            PagedResult::from_json(body, "users", &PageRequest::page_number(10, 2)).unwrap();
        assert_eq!(page.page_number, Some(2));
        assert_eq!(page.page_count, Some(4));
        assert!(!page.more_records_available);
    }

    #[test]
    fn test_validate_bounds() {
        assert!(PageRequest::first(300).validate(300).is_ok());
        let err = PageRequest::first(500).validate(300).unwrap_err();
        assert_eq!(
            err.error_kind,
            crate::error::ApiErrorKind::Validation(ValidationErrorKind::OutOfRange)
        );
        assert!(PageRequest::first(0).validate(300).is_err());
        assert!(PageRequest::page_number(30, 0).validate(300).is_err());
    }

    #[test]
    fn test_apply_uses_one_cursor_style() {
        let request = PageRequest::next(50, "tok").apply(ApiRequest::get("/users"));
        assert_eq!(
            request.query_pairs(),
            &[
                ("page_size".to_string(), "50".to_string()),
                ("next_page_token".to_string(), "tok".to_string())
            ]
        );

        let request = PageRequest::page_number(50, 3).apply(ApiRequest::get("/users"));
        assert_eq!(
            request.query_pairs(),
            &[
                ("page_size".to_string(), "50".to_string()),
                ("page_number".to_string(), "3".to_string())
            ]
        );

        let request = PageRequest::first(50).apply(ApiRequest::get("/users"));
        assert_eq!(request.query_pairs().len(), 1);
    }
}
