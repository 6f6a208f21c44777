use std::time::Duration;
use thiserror::Error;

/// Failure reported by a capability provider.
///
/// Detectors decide per sub-check what a failure means; none of these is fatal to an
/// evaluation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invocation failed: {0}")]
    InvocationFailure(String),

    #[error("malformed value: {0}")]
    Malformed(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Invalid or incomplete evaluator configuration.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("expected_signature is required but was not configured")]
    MissingExpectedSignature,

    #[error("invalid expected_signature: {0}")]
    InvalidExpectedSignature(String),

    #[error("no {0} probe was provided")]
    MissingProbe(&'static str),

    #[error("shell timeout must be between 1ms and {max_ms}ms, got {got_ms}ms")]
    InvalidTimeout { got_ms: u64, max_ms: u64 },

    #[error("privileged shell command must not be empty")]
    EmptyCommand,
}
