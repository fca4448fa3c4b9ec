//! Hierarchical data model filters read from and write to.
//!
//! ```text
//! DataContainerArray
//! └── DataContainer            (optional Geometry)
//!     └── AttributeMatrix      (tuple dimensions)
//!         └── TypedArray       (element type, component dimensions)
//! ```
//!
//! Every array in an attribute matrix has the matrix's tuple count, and names
//! are unique among siblings. Arrays are addressed with a [`DataArrayPath`].

pub mod array;
pub mod attribute_matrix;
pub mod data_container;
pub mod data_container_array;
pub mod error;
pub mod geometry;
pub mod path;

pub use array::{ArrayData, ArrayShape, Element, TypedArray};
pub use attribute_matrix::{AttributeMatrix, AttributeMatrixType};
pub use data_container::{DataContainer, GeometryMismatch};
pub use data_container_array::DataContainerArray;
pub use error::{DataError, DataResult};
pub use geometry::{EdgeGeometry, Geometry, GeometryKind, ImageGeometry, VertexGeometry};
pub use path::{DataArrayPath, ParsePathError, PATH_SEPARATOR};
