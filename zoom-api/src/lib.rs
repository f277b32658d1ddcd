//! # zoom-api
//!
//! Typed client for the Zoom REST API.
//!
//! Every call goes through one pipeline: the request is sent with the session
//! token from a shared cache (or a per-call override token), an expired session
//! token is refreshed and the request re-sent exactly once, and list responses
//! are parsed into [`PagedResult`]s.
//!
//! ```rust,ignore
//! use tokio_util::sync::CancellationToken;
//! use zoom_api::{Credentials, PageRequest, UserStatus, ZoomClient};
//!
//! let client = ZoomClient::new(Credentials::server_to_server("id", "secret", "account"))?;
//! let page = client
//!     .users()
//!     .list(UserStatus::Active, &PageRequest::first(100), &CancellationToken::new())
//!     .await?;
//! ```

pub mod client;
pub mod error;
pub mod pagination;
pub mod pipeline;
pub mod resources;

pub use client::{ClientOptions, ZoomClient};
pub use error::{ApiErrorKind, Error, StatusError};
pub use pagination::{PageCursor, PageRequest, PagedResult};
pub use resources::*;

pub use tokio_util::sync::CancellationToken;
pub use zoom_auth::credentials::{Credentials, GrantType};
pub use zoom_auth::oauth::providers::zoom::DEFAULT_TOKEN_URL;
pub use zoom_auth::oauth::token::{TokenRefreshedHandler, Tokens};
pub use zoom_auth::webhook::{UrlValidationResponse, WebhookValidator, ZoomSignatureValidator};
