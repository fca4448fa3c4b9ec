//! Error types for structural operations on the data model.

use crate::types::ElementType;
use thiserror::Error;

/// Errors raised when a data-model operation would break a structural rule
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("Data container '{0}' already exists")]
    DuplicateDataContainer(String),

    #[error("Data container '{0}' does not exist")]
    MissingDataContainer(String),

    #[error("Attribute matrix '{matrix}' already exists in data container '{container}'")]
    DuplicateAttributeMatrix { container: String, matrix: String },

    #[error("Attribute matrix '{matrix}' does not exist in data container '{container}'")]
    MissingAttributeMatrix { container: String, matrix: String },

    #[error("Array '{array}' already exists in attribute matrix '{matrix}'")]
    DuplicateArray { matrix: String, array: String },

    #[error("Array '{array}' does not exist in attribute matrix '{matrix}'")]
    MissingArray { matrix: String, array: String },

    #[error(
        "Array '{array}' has {actual} tuples but attribute matrix '{matrix}' requires {expected}"
    )]
    TupleCountMismatch {
        matrix: String,
        array: String,
        expected: usize,
        actual: usize,
    },

    #[error("Array '{array}' has invalid component dimensions {dims:?}")]
    InvalidComponentDims { array: String, dims: Vec<usize> },

    #[error("Array '{array}' was given {len} values which is not a multiple of {component_count} components")]
    LengthMismatch {
        array: String,
        len: usize,
        component_count: usize,
    },

    #[error("Array '{array}' holds {actual} values, expected {expected}")]
    TypeMismatch {
        array: String,
        expected: ElementType,
        actual: ElementType,
    },

    #[error(
        "Array '{array}' with {tuple_count} tuples of {component_dims:?} components is too large to allocate"
    )]
    TooLarge {
        array: String,
        tuple_count: usize,
        component_dims: Vec<usize>,
    },

    #[error("Attribute matrix '{matrix}' tuple dimensions {dims:?} overflow")]
    TupleDimsOverflow { matrix: String, dims: Vec<usize> },

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Name must not be empty")]
    EmptyName,
}

/// Result alias for data-model operations
pub type DataResult<T> = std::result::Result<T, DataError>;
