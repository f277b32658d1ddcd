//! Zoom client construction and resource accessors.

use std::sync::Arc;
use std::time::Duration;

use log::*;
use zoom_auth::credentials::Credentials;
use zoom_auth::http::{HttpClientBuilder, HttpClientConfig};
use zoom_auth::oauth::providers::zoom::{self, DEFAULT_TOKEN_URL};
use zoom_auth::oauth::token::{Cache, TokenRefreshedHandler};

use crate::error::Error;
use crate::pipeline::{
    Dispatcher, ExpiredTokenMatcher, Pipeline, DEFAULT_API_BASE_URL, DEFAULT_EXPIRED_TOKEN_PATTERN,
};
use crate::resources::{CloudRecordings, Dashboards, Meetings, Users, Webinars};

/// Options applied when building a [`ZoomClient`].
#[derive(Clone)]
pub struct ClientOptions {
    pub api_base_url: String,
    pub token_url: String,
    pub http: HttpClientConfig,
    pub expired_token_pattern: String,
    pub expired_token_codes: Vec<i64>,
    pub on_token_refreshed: Option<TokenRefreshedHandler>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            http: HttpClientConfig::default(),
            expired_token_pattern: DEFAULT_EXPIRED_TOKEN_PATTERN.to_string(),
            expired_token_codes: Vec::new(),
            on_token_refreshed: None,
        }
    }
}

impl ClientOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http.timeout = timeout;
        self
    }

    /// Retries for network errors, 5xx and 429 responses. Zero disables them.
    pub fn with_max_transient_retries(mut self, max_retries: u32) -> Self {
        self.http.max_retries = max_retries;
        self
    }

    /// Regular expression matched against the message of a 401 response.
    pub fn with_expired_token_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.expired_token_pattern = pattern.into();
        self
    }

    /// Zoom error codes that also mean "expired" on a 401 response.
    pub fn with_expired_token_codes(mut self, codes: Vec<i64>) -> Self {
        self.expired_token_codes = codes;
        self
    }

    /// Called with the new tokens after every successful refresh.
    pub fn with_token_refreshed_handler(mut self, handler: TokenRefreshedHandler) -> Self {
        self.on_token_refreshed = Some(handler);
        self
    }
}

impl std::fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientOptions")
            .field("api_base_url", &self.api_base_url)
            .field("token_url", &self.token_url)
            .field("http", &self.http)
            .field("expired_token_pattern", &self.expired_token_pattern)
            .field("expired_token_codes", &self.expired_token_codes)
            .field("on_token_refreshed", &self.on_token_refreshed.is_some())
            .finish()
    }
}

/// Client for the Zoom REST API.
///
/// Cloning is cheap; clones share the session token, so a refresh performed
/// by one request is seen by all of them.
#[derive(Clone)]
pub struct ZoomClient {
    pipeline: Arc<Pipeline>,
}

impl ZoomClient {
    /// Create a client with default options.
    pub fn new(credentials: Credentials) -> Result<Self, Error> {
        Self::with_options(credentials, ClientOptions::default())
    }

    pub fn with_options(credentials: Credentials, options: ClientOptions) -> Result<Self, Error> {
        let http_client = HttpClientBuilder::new()
            .with_config(options.http.clone())
            .build()?;

        let provider = zoom::Provider::new(credentials, http_client.clone())
            .with_token_url(options.token_url);

        debug!(
            "Creating Zoom client using {} grant against {}",
            provider.credentials().grant_type().as_str(),
            options.api_base_url
        );

        let mut cache = Cache::new(Arc::new(provider));
        if let Some(handler) = options.on_token_refreshed {
            cache = cache.with_refresh_handler(handler);
        }

        let expired_token = ExpiredTokenMatcher::new(&options.expired_token_pattern)?
            .with_codes(options.expired_token_codes);

        let pipeline = Pipeline::new(
            Dispatcher::new(http_client, options.api_base_url),
            Arc::new(cache),
            expired_token,
        );

        Ok(Self {
            pipeline: Arc::new(pipeline),
        })
    }

    /// The request pipeline, for endpoints without a resource wrapper.
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn users(&self) -> Users<'_> {
        Users::new(&self.pipeline)
    }

    pub fn meetings(&self) -> Meetings<'_> {
        Meetings::new(&self.pipeline)
    }

    pub fn webinars(&self) -> Webinars<'_> {
        Webinars::new(&self.pipeline)
    }

    pub fn cloud_recordings(&self) -> CloudRecordings<'_> {
        CloudRecordings::new(&self.pipeline)
    }

    pub fn dashboards(&self) -> Dashboards<'_> {
        Dashboards::new(&self.pipeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ApiErrorKind, ValidationErrorKind};

    #[test]
    fn test_default_options() {
        let options = ClientOptions::default();
        assert_eq!(options.api_base_url, "https://api.zoom.us/v2");
        assert_eq!(options.token_url, "https://api.zoom.us/oauth/token");
        assert!(options.expired_token_codes.is_empty());
    }

    #[test]
    fn test_invalid_expired_token_pattern_fails_construction() {
        let result = ZoomClient::with_options(
            Credentials::access_token("token"),
            ClientOptions::new().with_expired_token_pattern("[oops"),
        );
        assert_eq!(
            result.err().map(|e| e.error_kind),
            Some(ApiErrorKind::Validation(ValidationErrorKind::InvalidArgument))
        );
    }
}
