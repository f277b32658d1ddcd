//! # zoom-auth
//!
//! Authentication foundation for the Zoom REST client:
//! - Credential descriptors for every supported OAuth grant type
//! - The Zoom token endpoint provider (initial exchange and refresh)
//! - A shared token cache with single-flight refresh
//! - HTTP client building with transient-retry middleware
//! - Webhook signature validation
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use zoom_auth::{
//!     credentials::Credentials,
//!     http::HttpClientBuilder,
//!     oauth::{providers::zoom, token::Cache},
//! };
//!
//! let http_client = HttpClientBuilder::new().build()?;
//! let provider = zoom::Provider::new(
//!     Credentials::server_to_server("client-id", "client-secret", "account-id"),
//!     http_client,
//! );
//! let cache = Cache::new(Arc::new(provider));
//! let token = cache.get_valid_token().await?;
//! ```

pub mod credentials;
pub mod error;
pub mod http;
pub mod oauth;
pub mod webhook;

// Re-export commonly used types
pub use credentials::{Credentials, GrantType};
pub use error::{Error, ErrorKind};
