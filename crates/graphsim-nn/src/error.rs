//! Error types for graphsim-nn.

use thiserror::Error;

/// Encoder error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Candle tensor error.
    #[error("tensor error: {0}")]
    Tensor(#[from] candle_core::Error),

    /// Graph validation or I/O error.
    #[error("graph error: {0}")]
    Graph(#[from] graphsim_core::Error),

    /// Dimension mismatch.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Invalid configuration.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Malformed tensor input (bad rank, dangling edge index, ...).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Config file I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
