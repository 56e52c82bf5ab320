//! Error types for cowframe operations

use thiserror::Error;

use crate::dtype::DType;
use crate::value::Scalar;

/// Raised when an in-place mutation is requested on an object that was
/// produced by a chained lookup and is not retained by the caller.
///
/// The receiver is never touched when this error is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Chained assignment: `{operation}` with inplace cannot update the parent {target}; retain the lookup result first")]
pub struct EphemeralMutationError {
    /// The rejected operation (e.g. "fillna")
    pub operation: &'static str,

    /// The kind of object the lookup produced ("Series" or "DataFrame")
    pub target: &'static str,
}

impl EphemeralMutationError {
    /// Create a new error for `operation` on a temporary `target`.
    pub fn new(operation: &'static str, target: &'static str) -> Self {
        Self { operation, target }
    }
}

/// Main error type for cowframe operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrameError {
    /// In-place mutation through a chained lookup
    #[error(transparent)]
    EphemeralMutation(#[from] EphemeralMutationError),

    /// Column lookup failed
    #[error("Column not found: {name}")]
    ColumnNotFound {
        /// The requested column name
        name: String,
    },

    /// Two columns share a name
    #[error("Duplicate column: {name}")]
    DuplicateColumn {
        /// The repeated column name
        name: String,
    },

    /// Columns of a table disagree on row count
    #[error("Length mismatch: expected {expected} rows, got {got}")]
    LengthMismatch {
        /// Row count of the table
        expected: usize,
        /// Row count of the offending column
        got: usize,
    },

    /// Positional access past the end of a column
    #[error("Row {row} out of bounds for length {len}")]
    RowOutOfBounds {
        /// Requested row
        row: usize,
        /// Column length
        len: usize,
    },

    /// A value that no element kind reachable by widening can store
    #[error("Type error: cannot store {value:?} in a {dtype} column")]
    TypeMismatch {
        /// Element kind of the target column
        dtype: DType,
        /// The rejected value
        value: Scalar,
    },

    /// Fill value of the wrong shape for the receiver
    #[error("Invalid fill value: {0}")]
    InvalidFillValue(String),

    /// Operation has no meaning for the column's element kind
    #[error("Unsupported operation: {operation} on {dtype} column")]
    Unsupported {
        /// The requested operation
        operation: &'static str,
        /// Element kind of the column
        dtype: DType,
    },
}

/// Result type alias for cowframe operations
pub type Result<T> = std::result::Result<T, FrameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ephemeral_error_converts() {
        let err: FrameError = EphemeralMutationError::new("fillna", "Series").into();
        assert!(matches!(err, FrameError::EphemeralMutation(_)));
        assert!(err.to_string().contains("fillna"));
    }

    #[test]
    fn test_type_mismatch_message() {
        let err = FrameError::TypeMismatch {
            dtype: DType::Int64,
            value: Scalar::string("x"),
        };
        assert_eq!(
            err.to_string(),
            "Type error: cannot store \"x\" in a int64 column"
        );
    }
}
