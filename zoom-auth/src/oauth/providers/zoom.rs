//! Zoom OAuth provider implementation.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::CONTENT_TYPE;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::credentials::{Credentials, GrantType};
use crate::error::{oauth_error, token_error, Error, ErrorKind, OAuthErrorKind, TokenErrorKind};
use crate::http::HttpClient;
use crate::oauth::token::{RefreshResult, TokenResponse, Tokens};

/// Default Zoom token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://api.zoom.us/oauth/token";

/// Error body returned by the Zoom token endpoint.
#[derive(Debug, Default, Deserialize)]
struct TokenErrorResponse {
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Zoom OAuth provider.
///
/// Talks to the Zoom token endpoint for every supported grant type:
/// - Server-to-Server (`account_credentials`), refreshed by a fresh exchange
/// - Authorization code, refreshed with the (rotating) refresh token
/// - Refresh token, resumed from a stored refresh token
/// - Client credentials, refreshed by a fresh exchange
/// - Pre-supplied access token, never refreshed
///
/// Grant parameters go in the query string and the client id/secret in HTTP
/// Basic authentication.
pub struct Provider {
    credentials: Credentials,
    token_url: String,
    http_client: HttpClient,
}

impl Provider {
    /// Create a new Zoom OAuth provider.
    ///
    /// # Arguments
    ///
    /// * `credentials` - The connection credentials
    /// * `http_client` - HTTP client used for token endpoint calls
    pub fn new(credentials: Credentials, http_client: HttpClient) -> Self {
        Self {
            credentials,
            token_url: DEFAULT_TOKEN_URL.to_string(),
            http_client,
        }
    }

    /// Override the token endpoint URL.
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// Get the active credentials.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    async fn request_token(
        &self,
        params: &[(&str, &str)],
        failure: OAuthErrorKind,
    ) -> Result<Tokens, Error> {
        let (client_id, client_secret) = self.credentials.client().ok_or_else(|| {
            token_error(
                TokenErrorKind::NotRefreshable,
                "Credentials carry no OAuth client",
            )
        })?;

        let response = self
            .http_client
            .post(&self.token_url)
            .basic_auth(client_id, Some(client_secret.expose_secret()))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .query(params)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to reach Zoom token endpoint: {:?}", e);
                Error {
                    source: Some(Box::new(e)),
                    error_kind: ErrorKind::OAuth(OAuthErrorKind::Network),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = failure_reason(&body);
            warn!("Zoom token endpoint returned {}: {}", status, reason);
            return Err(oauth_error(
                failure,
                &format!("Token endpoint returned {}: {}", status, reason),
            ));
        }

        let issued_at = Utc::now();
        let payload: TokenResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse Zoom token response: {:?}", e);
            Error {
                source: Some(Box::new(e)),
                error_kind: ErrorKind::OAuth(OAuthErrorKind::InvalidResponse),
            }
        })?;

        Ok(payload.into_tokens(issued_at))
    }

    async fn exchange_refresh_token(
        &self,
        refresh_token: &SecretString,
        failure: OAuthErrorKind,
    ) -> Result<RefreshResult, Error> {
        let mut tokens = self
            .request_token(
                &[
                    ("grant_type", GrantType::RefreshToken.as_str()),
                    ("refresh_token", refresh_token.expose_secret()),
                ],
                failure,
            )
            .await?;

        let rotated = tokens
            .refresh_token
            .as_ref()
            .is_some_and(|issued| issued.expose_secret() != refresh_token.expose_secret());

        if tokens.refresh_token.is_none() {
            // Keep using the refresh token we already have
            tokens.refresh_token = Some(refresh_token.clone());
        }

        if rotated {
            Ok(RefreshResult::with_rotation(tokens))
        } else {
            Ok(RefreshResult::no_rotation(tokens))
        }
    }
}

fn failure_reason(body: &str) -> String {
    let parsed: TokenErrorResponse = serde_json::from_str(body).unwrap_or_default();
    parsed
        .reason
        .or(parsed.error)
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl crate::oauth::Provider for Provider {
    fn grant_type(&self) -> GrantType {
        self.credentials.grant_type()
    }

    async fn initial_token(&self) -> Result<Tokens, Error> {
        let failure = OAuthErrorKind::TokenExchangeFailed;
        match &self.credentials {
            Credentials::ServerToServer { account_id, .. } => {
                self.request_token(
                    &[
                        ("grant_type", GrantType::AccountCredentials.as_str()),
                        ("account_id", account_id.as_str()),
                    ],
                    failure,
                )
                .await
            }
            Credentials::ClientCredentials { .. } => {
                self.request_token(
                    &[("grant_type", GrantType::ClientCredentials.as_str())],
                    failure,
                )
                .await
            }
            Credentials::AuthorizationCode {
                authorization_code,
                redirect_uri,
                code_verifier,
                ..
            } => {
                let mut params = vec![
                    ("grant_type", GrantType::AuthorizationCode.as_str()),
                    ("code", authorization_code.expose_secret()),
                    ("redirect_uri", redirect_uri.as_str()),
                ];
                if let Some(verifier) = code_verifier {
                    params.push(("code_verifier", verifier.expose_secret()));
                }
                self.request_token(&params, failure).await
            }
            Credentials::RefreshToken {
                refresh_token,
                access_token: Some(access_token),
                ..
            } => {
                debug!("Using access token supplied with refresh token credentials");
                let mut tokens = Tokens::bearer(access_token.clone());
                tokens.refresh_token = Some(refresh_token.clone());
                Ok(tokens)
            }
            Credentials::RefreshToken {
                refresh_token,
                access_token: None,
                ..
            } => Ok(self
                .exchange_refresh_token(refresh_token, failure)
                .await?
                .tokens),
            Credentials::AccessToken { access_token } => Ok(Tokens::bearer(access_token.clone())),
        }
    }

    async fn refresh_token(&self, current: &Tokens) -> Result<RefreshResult, Error> {
        let failure = OAuthErrorKind::TokenRefreshFailed;
        match &self.credentials {
            Credentials::ServerToServer { account_id, .. } => {
                let tokens = self
                    .request_token(
                        &[
                            ("grant_type", GrantType::AccountCredentials.as_str()),
                            ("account_id", account_id.as_str()),
                        ],
                        failure,
                    )
                    .await?;
                Ok(RefreshResult::no_rotation(tokens))
            }
            Credentials::ClientCredentials { .. } => {
                let tokens = self
                    .request_token(
                        &[("grant_type", GrantType::ClientCredentials.as_str())],
                        failure,
                    )
                    .await?;
                Ok(RefreshResult::no_rotation(tokens))
            }
            Credentials::AuthorizationCode { .. } => {
                let refresh_token = current.refresh_token.as_ref().ok_or_else(|| {
                    token_error(
                        TokenErrorKind::MissingRefreshToken,
                        "No refresh token available",
                    )
                })?;
                self.exchange_refresh_token(refresh_token, failure).await
            }
            Credentials::RefreshToken { refresh_token, .. } => {
                let refresh_token = current.refresh_token.as_ref().unwrap_or(refresh_token);
                self.exchange_refresh_token(refresh_token, failure).await
            }
            Credentials::AccessToken { .. } => Err(token_error(
                TokenErrorKind::NotRefreshable,
                "Access token credentials cannot be refreshed",
            )),
        }
    }

    fn can_refresh(&self) -> bool {
        self.credentials.can_refresh()
    }
}
