//! Host-side plumbing for running the Zoom client: configuration and logging.

pub mod config;
pub mod logging;
