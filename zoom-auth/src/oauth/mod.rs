//! OAuth 2.0 authentication infrastructure.
//!
//! Provides the Zoom token endpoint provider and the shared token cache.

mod provider;

pub mod providers;
pub mod token;

pub use provider::Provider;
