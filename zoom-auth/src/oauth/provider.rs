//! OAuth provider trait.

use async_trait::async_trait;

use super::token::{RefreshResult, Tokens};
use crate::credentials::GrantType;
use crate::error::Error;

/// Trait for credential providers that obtain and refresh access tokens.
///
/// Implementations handle grant-specific token endpoint calls:
/// - The initial exchange (or returning a pre-supplied token)
/// - Token refresh (including rotating refresh tokens for Zoom)
#[async_trait]
pub trait Provider: Send + Sync {
    /// Get the grant type of the active credentials.
    fn grant_type(&self) -> GrantType;

    /// Obtain the first access token for a client.
    ///
    /// Returns the token supplied at construction, or performs the
    /// grant-specific exchange.
    async fn initial_token(&self) -> Result<Tokens, Error>;

    /// Obtain a new access token to replace `current`.
    ///
    /// # Arguments
    ///
    /// * `current` - The tokens being replaced; carries the refresh token for
    ///   grants that use one.
    ///
    /// # Returns
    ///
    /// Refresh result with new tokens and indication if refresh token rotated.
    async fn refresh_token(&self, current: &Tokens) -> Result<RefreshResult, Error>;

    /// Returns true if this provider can obtain new tokens on its own.
    fn can_refresh(&self) -> bool {
        true
    }
}
