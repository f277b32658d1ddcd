//! OAuth token types.

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// Tokens are treated as expired this long before their actual expiry.
const EXPIRY_BUFFER_MINUTES: i64 = 5;

/// OAuth tokens with metadata.
#[derive(Debug, Clone)]
pub struct Tokens {
    /// Access token for API requests.
    pub access_token: SecretString,
    /// Refresh token for obtaining new access tokens.
    pub refresh_token: Option<SecretString>,
    /// When the access token expires, if known.
    pub expires_at: Option<DateTime<Utc>>,
    /// Token type (usually "bearer").
    pub token_type: String,
    /// Granted scopes.
    pub scopes: Vec<String>,
}

impl Tokens {
    /// Tokens holding a bare access token with unknown expiry.
    pub fn bearer(access_token: SecretString) -> Self {
        Self {
            access_token,
            refresh_token: None,
            expires_at: None,
            token_type: "bearer".to_string(),
            scopes: vec![],
        }
    }

    /// Check if the access token is expired or about to expire soon.
    ///
    /// Returns true if token is expired or will expire within 5 minutes.
    /// Tokens with unknown expiry are never considered expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .map(|expires| expires <= Utc::now() + Duration::minutes(EXPIRY_BUFFER_MINUTES))
            .unwrap_or(false)
    }

    /// Get the remaining time until expiration.
    pub fn time_until_expiry(&self) -> Option<Duration> {
        self.expires_at.map(|expires| expires - Utc::now())
    }

    /// Returns true if both hold the same access token.
    pub fn same_access_token(&self, other: &Tokens) -> bool {
        self.access_token.expose_secret() == other.access_token.expose_secret()
    }
}

/// Result of a token refresh operation.
#[derive(Debug, Clone)]
pub struct RefreshResult {
    /// The new tokens.
    pub tokens: Tokens,
    /// True if the refresh token was rotated (Zoom behavior).
    pub refresh_token_rotated: bool,
}

impl RefreshResult {
    /// Create a refresh result with no rotation.
    pub fn no_rotation(tokens: Tokens) -> Self {
        Self {
            tokens,
            refresh_token_rotated: false,
        }
    }

    /// Create a refresh result with rotation.
    pub fn with_rotation(tokens: Tokens) -> Self {
        Self {
            tokens,
            refresh_token_rotated: true,
        }
    }
}

/// Successful response body of the Zoom token endpoint.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub scope: Option<String>,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl TokenResponse {
    /// Convert into tokens, anchoring `expires_in` at `issued_at`.
    pub fn into_tokens(self, issued_at: DateTime<Utc>) -> Tokens {
        Tokens {
            access_token: SecretString::from(self.access_token),
            refresh_token: self
                .refresh_token
                .filter(|token| !token.is_empty())
                .map(SecretString::from),
            expires_at: self
                .expires_in
                .map(|seconds| issued_at + Duration::seconds(seconds)),
            token_type: self.token_type,
            scopes: self
                .scope
                .map(|scope| scope.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens_expiring_at(expires_at: Option<DateTime<Utc>>) -> Tokens {
        Tokens {
            access_token: SecretString::from("test"),
            refresh_token: None,
            expires_at,
            token_type: "bearer".to_string(),
            scopes: vec![],
        }
    }

    #[test]
    fn test_token_not_expired() {
        let tokens = tokens_expiring_at(Some(Utc::now() + Duration::hours(1)));
        assert!(!tokens.is_expired());
    }

    #[test]
    fn test_token_expired() {
        let tokens = tokens_expiring_at(Some(Utc::now() - Duration::hours(1)));
        assert!(tokens.is_expired());
    }

    #[test]
    fn test_token_expiring_soon() {
        let tokens = tokens_expiring_at(Some(Utc::now() + Duration::minutes(3)));
        assert!(tokens.is_expired());

        let remaining = tokens.time_until_expiry().unwrap();
        assert!(remaining > Duration::minutes(2) && remaining <= Duration::minutes(3));
    }

    #[test]
    fn test_token_with_unknown_expiry_is_not_expired() {
        let tokens = tokens_expiring_at(None);
        assert!(!tokens.is_expired());
        assert!(tokens.time_until_expiry().is_none());
    }

    #[test]
    fn test_token_response_into_tokens() {
        let response: TokenResponse = serde_json::from_str(
            r#"{
                "access_token": "abc",
                "token_type": "bearer",
                "refresh_token": "def",
                "expires_in": 3599,
                "scope": "user:read meeting:write"
            }"#,
        )
        .unwrap();

        let issued_at = Utc::now();
        let tokens = response.into_tokens(issued_at);

        assert_eq!(tokens.access_token.expose_secret(), "abc");
        assert_eq!(
            tokens.refresh_token.as_ref().map(|t| t.expose_secret().to_string()),
            Some("def".to_string())
        );
        assert_eq!(tokens.expires_at, Some(issued_at + Duration::seconds(3599)));
        assert_eq!(tokens.scopes, vec!["user:read", "meeting:write"]);
    }

    #[test]
    fn test_token_response_without_refresh_token() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token": "abc", "expires_in": 3600}"#).unwrap();
        let tokens = response.into_tokens(Utc::now());

        assert!(tokens.refresh_token.is_none());
        assert_eq!(tokens.token_type, "bearer");
        assert!(tokens.scopes.is_empty());
    }

    #[test]
    fn test_same_access_token() {
        let a = Tokens::bearer(SecretString::from("one"));
        let b = Tokens::bearer(SecretString::from("one"));
        let c = Tokens::bearer(SecretString::from("two"));
        assert!(a.same_access_token(&b));
        assert!(!a.same_access_token(&c));
    }
}
