//! OAuth token caching with single-flight refresh.

mod cache;
mod tokens;

pub use cache::{Cache, TokenRefreshedHandler};
pub use tokens::{RefreshResult, TokenResponse, Tokens};
