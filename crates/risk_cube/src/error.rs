//! Cube error types.
//!
//! This module provides structured error types for cube construction and
//! cube algebra using `thiserror` for derivation.

use thiserror::Error;

use crate::schema::ColumnType;

/// Errors that can occur while building or combining result cubes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CubeError {
    /// Row metadata has the wrong number of values for the schema.
    #[error("Arity mismatch: schema has {expected} columns, row has {actual}")]
    ArityMismatch {
        /// Number of columns in the schema.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },

    /// Row metadata value has the wrong type for its column.
    #[error("Type mismatch in column '{column}': expected {expected}, got {actual}")]
    TypeMismatch {
        /// Column name.
        column: String,
        /// Declared column type.
        expected: ColumnType,
        /// Type of the supplied value.
        actual: ColumnType,
    },

    /// Column lookup failed.
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// A schema or tag would contain the same column twice.
    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    /// Positional difference on cubes of different lengths.
    #[error("Dimensions do not match: {left} rows vs {right} rows")]
    DimensionMismatch {
        /// Row count of the receiving cube.
        left: usize,
        /// Row count of the other cube.
        right: usize,
    },

    /// Positional difference on cubes whose rows are not aligned.
    #[error("Row order mismatch at row {row}")]
    RowOrderMismatch {
        /// Index of the first misaligned row.
        row: usize,
    },

    /// Operation requires identical schemas.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_dimension_mismatch() {
        let err = CubeError::DimensionMismatch { left: 3, right: 2 };
        assert_eq!(
            format!("{}", err),
            "Dimensions do not match: 3 rows vs 2 rows"
        );
    }

    #[test]
    fn test_error_display_type_mismatch() {
        let err = CubeError::TypeMismatch {
            column: "TradeId".to_string(),
            expected: ColumnType::String,
            actual: ColumnType::Number,
        };
        assert_eq!(
            format!("{}", err),
            "Type mismatch in column 'TradeId': expected string, got number"
        );
    }

    #[test]
    fn test_error_display_column_not_found() {
        let err = CubeError::ColumnNotFound("Book".to_string());
        assert_eq!(format!("{}", err), "Column not found: Book");
    }

    #[test]
    fn test_error_is_error_trait() {
        let err: Box<dyn std::error::Error> = Box::new(CubeError::RowOrderMismatch { row: 4 });
        assert!(err.to_string().contains("row 4"));
    }
}
