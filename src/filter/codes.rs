//! Numeric codes carried by filter messages.
//!
//! Negative values are errors, zero is success. Warnings reuse the same
//! space but never change a filter's error condition.

/// Required array exists but holds a different element type
pub const TYPE_MISMATCH: i32 = -501;
/// Two arrays that must line up have different tuple counts
pub const TUPLES_DONT_MATCH: i32 = -502;
/// Required array exists but has a different component shape
pub const COMPONENTS_DONT_MATCH: i32 = -503;

/// A path parameter is empty or incomplete
pub const EMPTY_PATH: i32 = -80000;
/// Required data container is absent
pub const DATA_CONTAINER_NOT_FOUND: i32 = -999;
/// Required attribute matrix is absent
pub const ATTRIBUTE_MATRIX_NOT_FOUND: i32 = -301;
/// Required array is absent
pub const ARRAY_NOT_FOUND: i32 = -300;
/// A name parameter is empty
pub const EMPTY_NAME: i32 = -80001;

/// Required geometry is absent
pub const GEOMETRY_MISSING: i32 = -385;
/// Geometry exists but is of the wrong kind
pub const GEOMETRY_WRONG_KIND: i32 = -384;
/// An attribute matrix disagrees with its container's geometry
pub const GEOMETRY_TUPLE_MISMATCH: i32 = -386;

/// Creating an object that already exists with an incompatible shape
pub const CREATE_CONFLICT: i32 = -10002;
/// Creating an object failed for a structural reason
pub const CREATE_FAILED: i32 = -10003;

/// No input file given
pub const INPUT_FILE_NOT_SET: i32 = -2000;
/// Input file does not exist
pub const INPUT_FILE_MISSING: i32 = -2001;
/// Input file exists but its header could not be read
pub const INPUT_FILE_UNREADABLE: i32 = -2002;
/// Input file could not be decoded during execute
pub const INPUT_FILE_DECODE_FAILED: i32 = -2003;

/// Expression failed to compile
pub const EXPRESSION_INVALID: i32 = -4010;
/// Expression failed while being evaluated
pub const EXPRESSION_EVAL_FAILED: i32 = -4011;

/// Initialization value cannot be parsed for the element type
pub const INIT_VALUE_INVALID: i32 = -4050;
/// Initialization value is outside the element type's range
pub const INIT_VALUE_OUT_OF_RANGE: i32 = -4051;

/// No input arrays selected
pub const NO_INPUT_ARRAYS: i32 = -62000;
/// Selected input arrays live in different attribute matrices
pub const INPUT_ARRAYS_DIFFERENT_MATRICES: i32 = -62001;

/// Execution stopped because the pipeline was canceled
pub const PIPELINE_CANCELED: i32 = -1;

/// Document named a filter the registry does not know
pub const UNKNOWN_FILTER: i32 = -66066;
/// Document entry carries no filter name
pub const MISSING_FILTER_NAME: i32 = -66067;
