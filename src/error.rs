use thiserror::Error;

/// Errors surfaced by the retrieval pipeline.
///
/// Only conditions the caller cannot proceed past become errors. Recovered
/// conditions stay out of this enum: a generation failure turns into a
/// placeholder answer, a chunk lookup miss is `None`, and a malformed chunk
/// store file is logged and reported as a failed load.
#[derive(Debug, Error)]
pub enum RagError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("{service} call failed: {message}")]
    Service {
        service: &'static str,
        message: String,
    },
    #[error("internal error: {0}")]
    Internal(String),
}

impl RagError {
    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        RagError::Internal(err.to_string())
    }

    pub fn service<E: std::fmt::Display>(service: &'static str, err: E) -> Self {
        RagError::Service {
            service,
            message: err.to_string(),
        }
    }
}
