//! Service error types.

use thiserror::Error;

/// Errors surfaced by the retrieval service.
///
/// None of these are retried internally; the caller decides how to report
/// them. An empty catalog is not an error (searches simply return nothing)
/// and is reported through the health check instead.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request was malformed and was rejected before any computation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The embedding model could not be reached or timed out.
    #[error("embedding model unavailable: {message}")]
    UpstreamUnavailable { message: String },

    /// The embedding model answered with a failure or an unusable body.
    #[error("embedding model error{}: {message}", status_suffix(.status))]
    Upstream { status: Option<u16>, message: String },

    /// No demo fixture was loaded with the dataset.
    #[error("demo fixture is not available")]
    DemoUnavailable,

    /// The catalog is missing or empty, so there is nothing to derive from it.
    #[error("catalog is not available")]
    CatalogUnavailable,

    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

impl ServiceError {
    /// Returns `true` when the caller sent a bad request.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// Returns `true` when the failure came from the external model.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::UpstreamUnavailable { .. } | Self::Upstream { .. })
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({})", s)).unwrap_or_default()
}

/// Convenience alias for service results.
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
