//! Single request/response round trip against the Zoom API.

use log::*;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use zoom_auth::http::HttpClient;

use crate::error::{cancelled, validation_error, Error, ValidationErrorKind};

/// Default Zoom REST API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://api.zoom.us/v2";

/// A request to send through the pipeline.
///
/// Kept intact between the first attempt and the retry so both send the same
/// method, URL and body.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Vec<u8>>,
    override_token: Option<SecretString>,
}

impl ApiRequest {
    /// Create a request for a path relative to the API base URL, or an absolute URL.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            override_token: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a query string parameter.
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Append a query string parameter when a value is present.
    pub fn query_opt<V: ToString>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    /// Set a JSON request body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, Error> {
        self.body = Some(serde_json::to_vec(body).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: crate::error::ApiErrorKind::Validation(ValidationErrorKind::InvalidArgument),
        })?);
        Ok(self)
    }

    /// Use a caller-managed bearer token for this call instead of the session token.
    pub fn override_token(mut self, token: Option<SecretString>) -> Self {
        self.override_token = token;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn override_token_ref(&self) -> Option<&SecretString> {
        self.override_token.as_ref()
    }
}

/// Raw response from one round trip.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Deserialize the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        serde_json::from_slice(&self.body).map_err(|e| {
            warn!("Failed to parse Zoom response: {:?}", e);
            Error::from(e)
        })
    }
}

/// Sends exactly one HTTP request per call.
///
/// Transport failures surface as network errors; transient retries happen in
/// the HTTP client's middleware underneath, never here.
pub struct Dispatcher {
    client: HttpClient,
    base_url: String,
}

impl Dispatcher {
    pub fn new(client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether the session token may be sent to `path`.
    ///
    /// Relative paths always resolve against the API base URL. Absolute URLs
    /// must point at the API host, `zoom.us` or a subdomain of `zoom.us`.
    pub fn accepts_session_token(&self, path: &str) -> bool {
        if !is_absolute(path) {
            return true;
        }
        let Some(host) = host_of(path) else {
            return false;
        };
        host == "zoom.us"
            || host.ends_with(".zoom.us")
            || host_of(&self.base_url).is_some_and(|api_host| api_host == host)
    }

    fn url_for(&self, path: &str) -> String {
        if is_absolute(path) {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Send `request` authenticated with `bearer`.
    ///
    /// Dropping the in-flight call when `cancel` fires aborts it.
    pub async fn send(
        &self,
        request: &ApiRequest,
        bearer: &SecretString,
        cancel: &CancellationToken,
    ) -> Result<RawResponse, Error> {
        let url = self.url_for(&request.path);

        let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", bearer.expose_secret()))
            .map_err(|e| {
                warn!("Failed to create auth header: {:?}", e);
                Error {
                    source: Some(Box::new(e)),
                    error_kind: crate::error::ApiErrorKind::Validation(
                        ValidationErrorKind::InvalidArgument,
                    ),
                }
            })?;
        auth_value.set_sensitive(true);

        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .header(AUTHORIZATION, auth_value);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder
                .header(CONTENT_TYPE, "application/json")
                .body(body.clone());
        }

        debug!("{} {}", request.method, url);

        let exchange = async {
            let response = builder.send().await.map_err(|e| {
                warn!("Request to Zoom failed: {:?}", e);
                Error::from(e)
            })?;
            let status = response.status();
            let headers = response.headers().clone();
            let body = response.bytes().await?.to_vec();
            Ok::<_, Error>(RawResponse {
                status,
                headers,
                body,
            })
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(cancelled()),
            result = exchange => result,
        }
    }
}

fn is_absolute(path: &str) -> bool {
    path.starts_with("https://") || path.starts_with("http://")
}

fn host_of(url: &str) -> Option<String> {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|url| url.host_str().map(|host| host.to_ascii_lowercase()))
}

/// Encode a caller-supplied identifier for use as a path segment.
pub fn path_segment(value: &str) -> Result<String, Error> {
    if value.trim().is_empty() {
        return Err(validation_error(
            ValidationErrorKind::InvalidArgument,
            "Identifier must not be empty",
        ));
    }
    Ok(urlencoding::encode(value).into_owned())
}
