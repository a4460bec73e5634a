//! Error types for client signal collection
//!
//! Host failures never escape a probe boundary; they are converted to the
//! probe's fallback value. `SignalError` covers the outer surfaces
//! (configuration, FFI, CLI) where a caller can act on the failure.

use thiserror::Error;

/// Errors reported by a host implementation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("Host API unavailable: {0}")]
    Unavailable(String),

    #[error("Host API call failed: {0}")]
    CallFailed(String),
}

/// Errors surfaced by configuration loading and the embedding surfaces
#[derive(Debug, Error)]
pub enum SignalError {
    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid page event: {0}")]
    InvalidEvent(String),
}
