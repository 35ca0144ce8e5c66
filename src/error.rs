//! Error types for reqbin
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

use crate::model::BinId;

/// Result type alias using ReqbinError
pub type Result<T> = std::result::Result<T, ReqbinError>;

/// Unified error type for reqbin operations
#[derive(Debug, Error)]
pub enum ReqbinError {
    // -------------------------------------------------------------------------
    // Caller Errors
    // -------------------------------------------------------------------------
    #[error("Invalid bin reference: {0:?}")]
    InvalidBinReference(String),

    #[error("Bin {0} does not exist (foreign key violation)")]
    ForeignKeyViolation(BinId),

    #[error("Bin {0} not found")]
    BinNotFound(BinId),

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAL corruption detected: {0}")]
    WalCorruption(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Corrupt header encoding: {0}")]
    CorruptEncoding(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ReqbinError {
    /// Whether the error was caused by the caller's input rather than the engine.
    ///
    /// Boundaries map these to client-fault responses.
    pub fn is_client_fault(&self) -> bool {
        matches!(
            self,
            ReqbinError::InvalidBinReference(_)
                | ReqbinError::ForeignKeyViolation(_)
                | ReqbinError::BinNotFound(_)
        )
    }
}

impl From<bincode::Error> for ReqbinError {
    fn from(e: bincode::Error) -> Self {
        ReqbinError::Serialization(e.to_string())
    }
}
