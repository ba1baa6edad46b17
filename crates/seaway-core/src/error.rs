//! Error types for the route engine.

use thiserror::Error;

/// Result type used throughout the engine.
pub type Result<T> = std::result::Result<T, RouteError>;

/// Failure of a single route computation.
///
/// Every variant is fatal to the request; the engine never returns a partial
/// route or defaults a cost to zero.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteError {
    /// Malformed or empty grids and fields (shape mismatch, zero-length axes).
    #[error("data error: {0}")]
    Data(String),

    /// Unknown vessel class, missing request fields, or an endpoint on land.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The search frontier emptied before reaching the destination node.
    #[error("no navigable route from node {start} to node {end}")]
    Unreachable { start: usize, end: usize },

    /// Non-finite or negative cost produced while weighting edges.
    #[error("computation error: {0}")]
    Computation(String),
}

impl RouteError {
    pub fn data(message: impl Into<String>) -> Self {
        Self::Data(message.into())
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    pub fn computation(message: impl Into<String>) -> Self {
        Self::Computation(message.into())
    }

    /// Short machine-readable kind, used in CLI output and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Data(_) => "data_error",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Unreachable { .. } => "unreachable",
            Self::Computation(_) => "computation_error",
        }
    }
}
