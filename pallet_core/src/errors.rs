//! # Error Types
//!
//! Structured error types for pallet_core. Every store operation returns a
//! [`StoreResult`], and the GUI turns the `Display` text of a [`StoreError`]
//! into the body of a warning or error dialog.
//!
//! ## Example
//!
//! ```rust
//! use pallet_core::errors::{StoreError, StoreResult};
//!
//! fn validate_priority(priority: i64) -> StoreResult<()> {
//!     if priority < 0 {
//!         return Err(StoreError::invalid_input(
//!             "Prioridad",
//!             priority.to_string(),
//!             "Priority cannot be negative",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for pallet_core operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Structured error type for store and editing operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum StoreError {
    /// A value typed by the user could not be coerced to the field's type
    #[error("Invalid value for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// The field exists but cannot be edited from the UI
    #[error("Field '{field}' cannot be edited")]
    ImmutableField { field: String },

    /// A row referenced by id does not exist
    #[error("{entity} {id} not found")]
    NotFound { entity: String, id: i64 },

    /// SQLite reported an error
    #[error("Database error: {operation} - {reason}")]
    Database { operation: String, reason: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },
}

impl StoreError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        StoreError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an ImmutableField error
    pub fn immutable_field(field: impl Into<String>) -> Self {
        StoreError::ImmutableField { field: field.into() }
    }

    /// Create a NotFound error
    pub fn not_found(entity: impl Into<String>, id: i64) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id,
        }
    }

    /// Create a Database error
    pub fn database(operation: impl Into<String>, reason: impl ToString) -> Self {
        StoreError::Database {
            operation: operation.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        StoreError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether the user can fix this by retyping the value
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StoreError::InvalidInput { .. } | StoreError::ImmutableField { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            StoreError::InvalidInput { .. } => "INVALID_INPUT",
            StoreError::ImmutableField { .. } => "IMMUTABLE_FIELD",
            StoreError::NotFound { .. } => "NOT_FOUND",
            StoreError::Database { .. } => "DATABASE_ERROR",
            StoreError::FileError { .. } => "FILE_ERROR",
            StoreError::SerializationError { .. } => "SERIALIZATION_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = StoreError::invalid_input("Peso", "abc", "Expected a number");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("InvalidInput"));
        let roundtrip: StoreError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(StoreError::immutable_field("X").error_code(), "IMMUTABLE_FIELD");
        assert_eq!(StoreError::not_found("Order", 3).error_code(), "NOT_FOUND");
        assert_eq!(StoreError::database("open", "disk I/O error").error_code(), "DATABASE_ERROR");
    }

    #[test]
    fn test_recoverable() {
        assert!(StoreError::immutable_field("Y").is_recoverable());
        assert!(!StoreError::not_found("Pallet", 1).is_recoverable());
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(StoreError::not_found("Order", 7).to_string(), "Order 7 not found");
        assert_eq!(
            StoreError::immutable_field("X").to_string(),
            "Field 'X' cannot be edited"
        );
    }
}
