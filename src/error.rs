//! Error types for symbolview.
//!
//! A single thiserror enum covers engine, store, controller and configuration
//! failures. The controller recovers from engine-side variants locally; only
//! configuration loading and explicit actions hand them back to callers.

use thiserror::Error;

/// Main error type for symbolview operations.
#[derive(Debug, Error)]
pub enum SymbolViewError {
    /// No debug session is active
    #[error("Debug engine unavailable: no active session")]
    EngineUnavailable,

    /// Selection references a module absent from the last module list
    #[error("Module not found: {0}")]
    ModuleNotFound(String),

    /// Engine enumeration failed (distinct from a module with zero symbols)
    #[error("Symbol enumeration failed for {module}: {reason}")]
    EnumerationFailure { module: String, reason: String },

    /// Enumeration was cancelled before it drained
    #[error("Symbol enumeration cancelled")]
    Cancelled,

    /// Enumeration exceeded its time guard
    #[error("Symbol enumeration timeout after {seconds}s")]
    Timeout { seconds: u64 },

    /// Operation requires a loaded symbol table
    #[error("No symbol table loaded")]
    NotLoaded,

    /// Operation requires a selected row
    #[error("No row selected")]
    NoSelection,

    /// Address text could not be parsed
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Configuration failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SymbolViewError {
    /// Whether the failure leaves the cache untouched so the next selection retries.
    ///
    /// Every enumeration error qualifies; only successful drains are cached.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SymbolViewError::EngineUnavailable
                | SymbolViewError::EnumerationFailure { .. }
                | SymbolViewError::Cancelled
                | SymbolViewError::Timeout { .. }
        )
    }
}

impl From<serde_json::Error> for SymbolViewError {
    fn from(err: serde_json::Error) -> Self {
        SymbolViewError::Serialization(err.to_string())
    }
}

/// Result type alias for symbolview operations
pub type Result<T> = std::result::Result<T, SymbolViewError>;
