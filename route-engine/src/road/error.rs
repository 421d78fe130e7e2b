//! Road-routing client error types.

/// Errors from a road-distance source.
#[derive(Debug, thiserror::Error)]
pub enum RoadError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service answered with a non-success status code
    #[error("routing service returned status {status}")]
    Status { status: u16 },

    /// Failed to parse response JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// Service answered but found no route
    #[error("no route found (code {code})")]
    NoRoute { code: String },

    /// One of the endpoints is not a usable coordinate
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(#[from] crate::domain::InvalidCoord),
}
