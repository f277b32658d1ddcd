//! Session token cache with single-flight refresh.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use super::Tokens;
use crate::error::{token_error, Error, TokenErrorKind};
use crate::oauth::Provider;

/// Callback invoked with the new tokens after every successful refresh.
///
/// Hosts use it to persist rotated refresh tokens.
pub type TokenRefreshedHandler = Arc<dyn Fn(&Tokens) + Send + Sync>;

/// Holder of the current session token for one client.
///
/// All requests on a client share one cache. Refreshes are serialized behind
/// `refresh_lock`: when several concurrent requests see the same token
/// rejected, the first one refreshes and the others reuse its result instead of
/// hitting the token endpoint again. Zoom rotates refresh tokens, so a second
/// refresh with the already-consumed refresh token would fail.
pub struct Cache {
    provider: Arc<dyn Provider>,
    current: RwLock<Option<Arc<Tokens>>>,
    refresh_lock: Mutex<()>,
    on_refreshed: Option<TokenRefreshedHandler>,
}

impl Cache {
    /// Create an empty cache backed by the given provider.
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            current: RwLock::new(None),
            refresh_lock: Mutex::new(()),
            on_refreshed: None,
        }
    }

    /// Set the callback invoked after each successful refresh.
    pub fn with_refresh_handler(mut self, handler: TokenRefreshedHandler) -> Self {
        self.on_refreshed = Some(handler);
        self
    }

    /// Returns true if the provider can obtain new tokens on its own.
    pub fn can_refresh(&self) -> bool {
        self.provider.can_refresh()
    }

    /// Get the current tokens, if any have been obtained yet.
    pub async fn get(&self) -> Option<Arc<Tokens>> {
        self.current.read().await.clone()
    }

    /// Get a usable session token.
    ///
    /// This method:
    /// 1. Returns the cached token if it is not known to be expired
    /// 2. Obtains the initial token on first use
    /// 3. Refreshes proactively if the known expiry is within the buffer
    pub async fn get_valid_token(&self) -> Result<Arc<Tokens>, Error> {
        if let Some(tokens) = self.get().await {
            if !tokens.is_expired() || !self.can_refresh() {
                return Ok(tokens);
            }
            if let Some(remaining) = tokens.time_until_expiry() {
                debug!(
                    "Session token expires in {}s, refreshing",
                    remaining.num_seconds()
                );
            }
            return self.refresh_after(&tokens).await;
        }

        let _guard = self.refresh_lock.lock().await;

        // Double-check: a concurrent request may have obtained it while we waited
        if let Some(tokens) = self.get().await {
            return Ok(tokens);
        }

        debug!(
            "Requesting initial token using {} grant",
            self.provider.grant_type().as_str()
        );
        let tokens = Arc::new(self.provider.initial_token().await?);
        *self.current.write().await = Some(Arc::clone(&tokens));

        Ok(tokens)
    }

    /// Replace `stale` with a newly issued token.
    ///
    /// Only one refresh runs at a time. If the cached token no longer matches
    /// `stale`, another request already refreshed and its token is returned
    /// without calling the provider.
    ///
    /// # Arguments
    ///
    /// * `stale` - The tokens the caller saw rejected or expiring
    pub async fn refresh_after(&self, stale: &Tokens) -> Result<Arc<Tokens>, Error> {
        if !self.can_refresh() {
            return Err(token_error(
                TokenErrorKind::NotRefreshable,
                "Credentials do not support token refresh",
            ));
        }

        let _guard = self.refresh_lock.lock().await;

        let current = self.get().await;
        if let Some(current) = &current {
            if !current.same_access_token(stale) {
                debug!("Token was refreshed by another request");
                return Ok(Arc::clone(current));
            }
        }

        let basis = current.as_deref().unwrap_or(stale);
        let refresh_result = self.provider.refresh_token(basis).await?;

        if refresh_result.refresh_token_rotated {
            debug!("Refresh token was rotated");
        }

        let fresh = Arc::new(refresh_result.tokens);
        let installed = self.replace_if_still_current(stale, Arc::clone(&fresh)).await;

        if Arc::ptr_eq(&installed, &fresh) {
            debug!("Session token refreshed successfully");
            if let Some(handler) = &self.on_refreshed {
                handler(&installed);
            }
        }

        Ok(installed)
    }

    /// Install `new` only if the cache still holds `old` (or nothing).
    ///
    /// Returns whichever tokens are cached afterwards, so a loser of the race
    /// adopts the winner's token rather than overwriting it.
    pub async fn replace_if_still_current(&self, old: &Tokens, new: Arc<Tokens>) -> Arc<Tokens> {
        let mut slot = self.current.write().await;
        match slot.as_ref() {
            Some(current) if !current.same_access_token(old) => Arc::clone(current),
            _ => {
                *slot = Some(Arc::clone(&new));
                new
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::GrantType;
    use crate::oauth::token::RefreshResult;
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use secrecy::{ExposeSecret, SecretString};
    use std::sync::atomic::{AtomicUsize, Ordering};

    // Mock provider issuing "token-1", "token-2", ... and counting calls
    struct MockProvider {
        initial_calls: AtomicUsize,
        refresh_calls: AtomicUsize,
        refreshable: bool,
        initial_expires_in: Option<Duration>,
    }

    impl MockProvider {
        fn new() -> Self {
            Self {
                initial_calls: AtomicUsize::new(0),
                refresh_calls: AtomicUsize::new(0),
                refreshable: true,
                initial_expires_in: Some(Duration::hours(1)),
            }
        }
    }

    fn tokens(access: &str, expires_in: Option<Duration>) -> Tokens {
        Tokens {
            access_token: SecretString::from(access),
            refresh_token: Some(SecretString::from(format!("refresh-{}", access))),
            expires_at: expires_in.map(|d| Utc::now() + d),
            token_type: "bearer".to_string(),
            scopes: vec![],
        }
    }

    #[async_trait]
    impl Provider for MockProvider {
        fn grant_type(&self) -> GrantType {
            GrantType::RefreshToken
        }

        async fn initial_token(&self) -> Result<Tokens, Error> {
            self.initial_calls.fetch_add(1, Ordering::SeqCst);
            Ok(tokens("token-0", self.initial_expires_in))
        }

        async fn refresh_token(&self, _current: &Tokens) -> Result<RefreshResult, Error> {
            let n = self.refresh_calls.fetch_add(1, Ordering::SeqCst) + 1;
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            Ok(RefreshResult::with_rotation(tokens(
                &format!("token-{}", n),
                Some(Duration::hours(1)),
            )))
        }

        fn can_refresh(&self) -> bool {
            self.refreshable
        }
    }

    #[tokio::test]
    async fn test_initial_token_is_obtained_once() {
        let provider = Arc::new(MockProvider::new());
        let cache = Cache::new(provider.clone());

        let first = cache.get_valid_token().await.unwrap();
        let second = cache.get_valid_token().await.unwrap();

        assert_eq!(first.access_token.expose_secret(), "token-0");
        assert!(first.same_access_token(&second));
        assert_eq!(provider.initial_calls.load(Ordering::SeqCst), 1);
        assert_eq!(provider.refresh_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_expired_token_is_refreshed_proactively() {
        let mut provider = MockProvider::new();
        provider.initial_expires_in = Some(Duration::minutes(1));
        let provider = Arc::new(provider);
        let cache = Cache::new(provider.clone());

        // The initial token is inside the expiry buffer once cached
        cache.get_valid_token().await.unwrap();
        let refreshed = cache.get_valid_token().await.unwrap();

        assert_eq!(refreshed.access_token.expose_secret(), "token-1");
        assert_eq!(provider.refresh_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_refresh_after_same_token_calls_provider_once() {
        let provider = Arc::new(MockProvider::new());
        let cache = Arc::new(Cache::new(provider.clone()));
        let stale = cache.get_valid_token().await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            let stale = Arc::clone(&stale);
            handles.push(tokio::spawn(async move {
                cache.refresh_after(&stale).await.unwrap()
            }));
        }

        for handle in handles {
            let tokens = handle.await.unwrap();
            assert_eq!(tokens.access_token.expose_secret(), "token-1");
        }
        assert_eq!(provider.refresh_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_replace_if_still_current_keeps_winner() {
        let provider = Arc::new(MockProvider::new());
        let cache = Cache::new(provider);
        let original = cache.get_valid_token().await.unwrap();

        let winner = Arc::new(tokens("winner", None));
        let loser = Arc::new(tokens("loser", None));

        let installed = cache
            .replace_if_still_current(&original, Arc::clone(&winner))
            .await;
        assert!(Arc::ptr_eq(&installed, &winner));

        // Second replacement was computed from the original token and must not win
        let installed = cache.replace_if_still_current(&original, loser).await;
        assert_eq!(installed.access_token.expose_secret(), "winner");
        assert_eq!(
            cache.get().await.unwrap().access_token.expose_secret(),
            "winner"
        );
    }

    #[tokio::test]
    async fn test_refresh_handler_receives_new_tokens() {
        let provider = Arc::new(MockProvider::new());
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let cache = Cache::new(provider).with_refresh_handler(Arc::new(move |tokens: &Tokens| {
            sink.lock()
                .unwrap()
                .push(tokens.access_token.expose_secret().to_string());
        }));

        let stale = cache.get_valid_token().await.unwrap();
        cache.refresh_after(&stale).await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["token-1".to_string()]);
    }

    #[tokio::test]
    async fn test_non_refreshable_provider() {
        let mut provider = MockProvider::new();
        provider.refreshable = false;
        provider.initial_expires_in = Some(Duration::minutes(-10));
        let provider = Arc::new(provider);
        let cache = Cache::new(provider.clone());

        // Expired but not refreshable: returned as-is
        cache.get_valid_token().await.unwrap();
        let tokens = cache.get_valid_token().await.unwrap();
        assert_eq!(tokens.access_token.expose_secret(), "token-0");

        let result = cache.refresh_after(&tokens).await;
        assert!(matches!(
            result,
            Err(Error {
                error_kind: crate::error::ErrorKind::Token(TokenErrorKind::NotRefreshable),
                ..
            })
        ));
        assert_eq!(provider.refresh_calls.load(Ordering::SeqCst), 0);
    }
}
