//! Error types for chunk transfers

use thiserror::Error;

/// Errors that can occur during a chunk transfer
#[derive(Debug, Error)]
pub enum TransferError {
    /// A read or write submission failed
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Digest algorithm name is not in the registry
    #[error("Unsupported digest algorithm: {0}")]
    UnsupportedDigestAlgorithm(String),

    /// Buffer size of zero was requested
    #[error("Buffer size must be at least 1 byte")]
    InvalidBufferSize,

    /// The primitive dropped a submission without resuming it
    #[error("Submission completed without a result")]
    CompletionLost,
}

/// Result type for chunk transfer operations
pub type Result<T> = std::result::Result<T, TransferError>;
