//! The authenticated request pipeline every resource call goes through.
//!
//! A request is sent once by the [`Dispatcher`], either with the caller's
//! override token or the session token from the shared cache. When the session
//! token is rejected as expired, [`Pipeline`] refreshes it and sends the
//! identical request one more time.

mod dispatcher;
mod expired;
mod retry;

pub use dispatcher::{path_segment, ApiRequest, Dispatcher, RawResponse, DEFAULT_API_BASE_URL};
pub use expired::{ExpiredTokenMatcher, DEFAULT_EXPIRED_TOKEN_PATTERN};
pub use retry::Pipeline;
