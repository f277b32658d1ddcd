//! Authenticated request execution with transparent refresh-and-retry.

use std::sync::Arc;

use log::*;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use zoom_auth::oauth::token::{Cache, Tokens};

use super::dispatcher::{ApiRequest, Dispatcher, RawResponse};
use super::expired::ExpiredTokenMatcher;
use crate::error::{cancelled, validation_error, Error, StatusError, ValidationErrorKind};
use crate::pagination::{PageRequest, PagedResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttemptState {
    Initial,
    Retried,
}

/// Runs requests through the dispatcher with the session token and retries a
/// request exactly once after refreshing an expired token.
pub struct Pipeline {
    dispatcher: Dispatcher,
    tokens: Arc<Cache>,
    expired_token: ExpiredTokenMatcher,
}

impl Pipeline {
    pub fn new(dispatcher: Dispatcher, tokens: Arc<Cache>, expired_token: ExpiredTokenMatcher) -> Self {
        Self {
            dispatcher,
            tokens,
            expired_token,
        }
    }

    /// The shared session token cache.
    pub fn tokens(&self) -> &Arc<Cache> {
        &self.tokens
    }

    /// Execute a request and return its successful response.
    ///
    /// Any non-2xx response that is not consumed by the refresh path comes back
    /// as an HTTP status error carrying the status and body.
    pub async fn execute(
        &self,
        request: &ApiRequest,
        cancel: &CancellationToken,
    ) -> Result<RawResponse, Error> {
        if cancel.is_cancelled() {
            return Err(cancelled());
        }

        // Override tokens are caller managed: one attempt, no refresh.
        if let Some(token) = request.override_token_ref() {
            let response = self.dispatcher.send(request, token, cancel).await?;
            return into_success(response);
        }

        if !self.dispatcher.accepts_session_token(request.path()) {
            warn!("Refusing to send the session token outside Zoom: {}", request.path());
            return Err(validation_error(
                ValidationErrorKind::InvalidArgument,
                "Session token is only sent to the API host or zoom.us",
            ));
        }

        let mut state = AttemptState::Initial;
        let mut session = self.session_token(cancel).await?;

        loop {
            let response = self
                .dispatcher
                .send(request, &session.access_token, cancel)
                .await?;

            if response.status.is_success() {
                return Ok(response);
            }

            let status = StatusError::from_parts(response.status.as_u16(), &response.body);

            if state == AttemptState::Retried
                || !self.tokens.can_refresh()
                || !self.expired_token.matches(&status)
            {
                if state == AttemptState::Retried && status.status == 401 {
                    warn!("Request was rejected again after refreshing the session token");
                }
                return Err(status.into());
            }

            if cancel.is_cancelled() {
                return Err(cancelled());
            }

            info!("Session token expired, refreshing and retrying {} {}", request.method(), request.path());
            session = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(cancelled()),
                refreshed = self.tokens.refresh_after(&session) => refreshed.map_err(|e| {
                    warn!("Failed to refresh session token: {}", e);
                    Error::from(e)
                })?,
            };
            state = AttemptState::Retried;
        }
    }

    /// Execute a request and deserialize its JSON body.
    pub async fn execute_json<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
        cancel: &CancellationToken,
    ) -> Result<T, Error> {
        self.execute(request, cancel).await?.json()
    }

    /// Validate paging, execute a list request and parse one page.
    pub async fn execute_paged<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        records_key: &str,
        page: &PageRequest,
        max_records_per_page: u32,
        cancel: &CancellationToken,
    ) -> Result<PagedResult<T>, Error> {
        page.validate(max_records_per_page)?;
        let request = page.apply(request);
        let response = self.execute(&request, cancel).await?;
        PagedResult::from_json(&response.body, records_key, page)
    }

    async fn session_token(&self, cancel: &CancellationToken) -> Result<Arc<Tokens>, Error> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(cancelled()),
            tokens = self.tokens.get_valid_token() => Ok(tokens?),
        }
    }
}

fn into_success(response: RawResponse) -> Result<RawResponse, Error> {
    if response.status.is_success() {
        Ok(response)
    } else {
        Err(StatusError::from_parts(response.status.as_u16(), &response.body).into())
    }
}
