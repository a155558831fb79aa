use thiserror::Error;

/// Errors surfaced by this crate.
///
/// Driver errors pass through verbatim; the string variants wrap failures with
/// the phase they happened in. Every error is terminal for the call that
/// produced it; there is no retry or classification beyond this enum.
#[derive(Debug, Error)]
pub enum EasyMssqlError {
    #[error(transparent)]
    Tiberius(#[from] tiberius::error::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parameter error: {0}")]
    ParameterError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),
}
