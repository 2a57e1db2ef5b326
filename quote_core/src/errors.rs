//! # Error Types
//!
//! Structured error types for quote_core. Pricing calculators never return
//! these (they are total functions over their input domain, see
//! [`crate::pricing`]); errors are reserved for the true failure surfaces:
//! document validation, persistence, and serialization.
//!
//! ## Example
//!
//! ```rust
//! use quote_core::errors::{QuoteError, QuoteResult};
//!
//! fn validate_quantity(qty: f64) -> QuoteResult<()> {
//!     if qty <= 0.0 {
//!         return Err(QuoteError::invalid_input(
//!             "quantity",
//!             qty.to_string(),
//!             "Quantity must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for quote_core operations
pub type QuoteResult<T> = Result<T, QuoteError>;

/// Structured error type for document and store operations.
///
/// Each variant carries enough context to act on the failure
/// programmatically rather than just display it.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum QuoteError {
    /// An input value is invalid (out of range, wrong type, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Document cannot be saved in its current state
    #[error("Document not saveable: {reason}")]
    DocumentInvalid { reason: String },

    /// No document with the given number exists in the store
    #[error("Document not found: {number}")]
    DocumentNotFound { number: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// Store is locked by another user/process
    #[error("Store locked: '{path}' is locked by {locked_by} since {locked_at}")]
    StoreLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl QuoteError {
    /// Create an InvalidInput error
    pub fn invalid_input(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        QuoteError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        QuoteError::MissingField {
            field: field.into(),
        }
    }

    /// Create a DocumentInvalid error
    pub fn document_invalid(reason: impl Into<String>) -> Self {
        QuoteError::DocumentInvalid {
            reason: reason.into(),
        }
    }

    /// Create a DocumentNotFound error
    pub fn document_not_found(number: impl Into<String>) -> Self {
        QuoteError::DocumentNotFound {
            number: number.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(
        operation: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        QuoteError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a StoreLocked error
    pub fn store_locked(
        path: impl Into<String>,
        locked_by: impl Into<String>,
        locked_at: impl Into<String>,
    ) -> Self {
        QuoteError::StoreLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, QuoteError::StoreLocked { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            QuoteError::InvalidInput { .. } => "INVALID_INPUT",
            QuoteError::MissingField { .. } => "MISSING_FIELD",
            QuoteError::DocumentInvalid { .. } => "DOCUMENT_INVALID",
            QuoteError::DocumentNotFound { .. } => "DOCUMENT_NOT_FOUND",
            QuoteError::FileError { .. } => "FILE_ERROR",
            QuoteError::StoreLocked { .. } => "STORE_LOCKED",
            QuoteError::SerializationError { .. } => "SERIALIZATION_ERROR",
            QuoteError::VersionMismatch { .. } => "VERSION_MISMATCH",
            QuoteError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = QuoteError::invalid_input("length_ft", "-5.0", "Length must be positive");
        let json = serde_json::to_string(&error).unwrap();
        let roundtrip: QuoteError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            QuoteError::missing_field("customer.name").error_code(),
            "MISSING_FIELD"
        );
        assert_eq!(
            QuoteError::document_not_found("EST-0042").error_code(),
            "DOCUMENT_NOT_FOUND"
        );
    }

    #[test]
    fn test_recoverable() {
        let locked = QuoteError::store_locked("/tmp/quotes", "amy (shop-pc)", "2026-01-01");
        assert!(locked.is_recoverable());
        assert!(!QuoteError::missing_field("x").is_recoverable());
    }
}
