//! Attribute matrices: named groups of arrays sharing one tuple count.

use super::array::{checked_product, TypedArray};
use super::error::{DataError, DataResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// What the tuples of an attribute matrix describe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AttributeMatrixType {
    /// One tuple per geometry cell (voxel or pixel)
    #[default]
    Cell,
    /// One tuple per feature (grain)
    Feature,
    /// One tuple per ensemble (phase)
    Ensemble,
    /// One tuple per vertex of a vertex or edge geometry
    Vertex,
    /// One tuple per edge of an edge geometry
    Edge,
    /// One tuple per face of a surface mesh
    Face,
    /// Tuples with no geometric meaning
    Generic,
}

impl fmt::Display for AttributeMatrixType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttributeMatrixType::Cell => "Cell",
            AttributeMatrixType::Feature => "Feature",
            AttributeMatrixType::Ensemble => "Ensemble",
            AttributeMatrixType::Vertex => "Vertex",
            AttributeMatrixType::Edge => "Edge",
            AttributeMatrixType::Face => "Face",
            AttributeMatrixType::Generic => "Generic",
        };
        write!(f, "{}", name)
    }
}

/// A named collection of arrays that all have the same number of tuples
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeMatrix {
    name: String,
    matrix_type: AttributeMatrixType,
    tuple_dims: Vec<usize>,
    arrays: BTreeMap<String, TypedArray>,
}

impl AttributeMatrix {
    /// Create an empty matrix. The tuple count is the product of `tuple_dims`;
    /// an empty dimension list means zero tuples.
    pub fn new(
        name: impl Into<String>,
        tuple_dims: &[usize],
        matrix_type: AttributeMatrixType,
    ) -> Self {
        Self {
            name: name.into(),
            matrix_type,
            tuple_dims: normalize_dims(tuple_dims),
            arrays: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn matrix_type(&self) -> AttributeMatrixType {
        self.matrix_type
    }

    pub fn tuple_dims(&self) -> &[usize] {
        &self.tuple_dims
    }

    /// Product of the tuple dimensions; saturates instead of overflowing so
    /// allocations against it fail cleanly
    pub fn tuple_count(&self) -> usize {
        checked_product(&self.tuple_dims).unwrap_or(usize::MAX)
    }

    pub fn num_arrays(&self) -> usize {
        self.arrays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    /// Add an array; it must have this matrix's tuple count and a unique name
    pub fn add_array(&mut self, array: TypedArray) -> DataResult<()> {
        if array.name().is_empty() {
            return Err(DataError::EmptyName);
        }
        if self.arrays.contains_key(array.name()) {
            return Err(DataError::DuplicateArray {
                matrix: self.name.clone(),
                array: array.name().to_string(),
            });
        }
        self.check_tuples(&array)?;
        self.arrays.insert(array.name().to_string(), array);
        Ok(())
    }

    /// Add an array, replacing any array with the same name
    pub fn insert_or_replace_array(&mut self, array: TypedArray) -> DataResult<Option<TypedArray>> {
        if array.name().is_empty() {
            return Err(DataError::EmptyName);
        }
        self.check_tuples(&array)?;
        Ok(self.arrays.insert(array.name().to_string(), array))
    }

    fn check_tuples(&self, array: &TypedArray) -> DataResult<()> {
        if array.tuple_count() != self.tuple_count() {
            return Err(DataError::TupleCountMismatch {
                matrix: self.name.clone(),
                array: array.name().to_string(),
                expected: self.tuple_count(),
                actual: array.tuple_count(),
            });
        }
        Ok(())
    }

    pub fn remove_array(&mut self, name: &str) -> Option<TypedArray> {
        self.arrays.remove(name)
    }

    /// Rename an array in place
    pub fn rename_array(&mut self, old_name: &str, new_name: &str) -> DataResult<()> {
        if new_name.is_empty() {
            return Err(DataError::EmptyName);
        }
        if old_name == new_name {
            return if self.arrays.contains_key(old_name) {
                Ok(())
            } else {
                Err(self.missing(old_name))
            };
        }
        if self.arrays.contains_key(new_name) {
            return Err(DataError::DuplicateArray {
                matrix: self.name.clone(),
                array: new_name.to_string(),
            });
        }
        let mut array = self
            .arrays
            .remove(old_name)
            .ok_or_else(|| self.missing(old_name))?;
        array.set_name(new_name);
        self.arrays.insert(new_name.to_string(), array);
        Ok(())
    }

    fn missing(&self, array: &str) -> DataError {
        DataError::MissingArray {
            matrix: self.name.clone(),
            array: array.to_string(),
        }
    }

    pub fn contains_array(&self, name: &str) -> bool {
        self.arrays.contains_key(name)
    }

    pub fn array(&self, name: &str) -> Option<&TypedArray> {
        self.arrays.get(name)
    }

    /// Mutable access to an array's values. Its tuple count can only change
    /// through [`AttributeMatrix::resize_tuples`].
    pub fn array_mut(&mut self, name: &str) -> Option<&mut TypedArray> {
        self.arrays.get_mut(name)
    }

    /// Array names in sorted order
    pub fn array_names(&self) -> impl Iterator<Item = &str> {
        self.arrays.keys().map(String::as_str)
    }

    pub fn arrays(&self) -> impl Iterator<Item = &TypedArray> {
        self.arrays.values()
    }

    /// Change the tuple dimensions, resizing every contained array with it.
    ///
    /// Storage for every array is reserved first; on failure the matrix is
    /// left unchanged.
    pub fn resize_tuples(&mut self, tuple_dims: &[usize]) -> DataResult<()> {
        let tuple_dims = normalize_dims(tuple_dims);
        let Some(tuple_count) = checked_product(&tuple_dims) else {
            return Err(DataError::TupleDimsOverflow {
                matrix: self.name.clone(),
                dims: tuple_dims,
            });
        };
        for array in self.arrays.values_mut() {
            array.reserve_tuples(tuple_count)?;
        }
        for array in self.arrays.values_mut() {
            array.resize_tuples(tuple_count)?;
        }
        self.tuple_dims = tuple_dims;
        Ok(())
    }

    /// Verify every array agrees with the matrix tuple count
    pub fn validate(&self) -> DataResult<()> {
        self.arrays.values().try_for_each(|a| self.check_tuples(a))
    }
}

fn normalize_dims(tuple_dims: &[usize]) -> Vec<usize> {
    if tuple_dims.is_empty() {
        vec![0]
    } else {
        tuple_dims.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ElementType;

    fn cell_matrix() -> AttributeMatrix {
        AttributeMatrix::new("CellData", &[10, 10, 1], AttributeMatrixType::Cell)
    }

    #[test]
    fn test_tuple_count_is_product_of_dims() {
        let matrix = cell_matrix();
        assert_eq!(matrix.tuple_count(), 100);
        let empty = AttributeMatrix::new("Empty", &[], AttributeMatrixType::Feature);
        assert_eq!(empty.tuple_count(), 0);
    }

    #[test]
    fn test_add_array_checks_tuple_count() {
        let mut matrix = cell_matrix();
        let ok = TypedArray::new("Phases", ElementType::Int32, 100, &[1]).unwrap();
        let bad = TypedArray::new("Bad", ElementType::Int32, 99, &[1]).unwrap();
        matrix.add_array(ok).unwrap();
        assert!(matches!(
            matrix.add_array(bad),
            Err(DataError::TupleCountMismatch {
                expected: 100,
                actual: 99,
                ..
            })
        ));
        assert_eq!(matrix.num_arrays(), 1);
    }

    #[test]
    fn test_duplicate_array_rejected() {
        let mut matrix = cell_matrix();
        let a = TypedArray::new("A", ElementType::UInt8, 100, &[1]).unwrap();
        matrix.add_array(a.clone()).unwrap();
        assert!(matches!(
            matrix.add_array(a.clone()),
            Err(DataError::DuplicateArray { .. })
        ));
        assert!(matrix.insert_or_replace_array(a).unwrap().is_some());
    }

    #[test]
    fn test_rename_array() {
        let mut matrix = cell_matrix();
        matrix
            .add_array(TypedArray::new("A", ElementType::UInt8, 100, &[1]).unwrap())
            .unwrap();
        matrix
            .add_array(TypedArray::new("B", ElementType::UInt8, 100, &[1]).unwrap())
            .unwrap();

        matrix.rename_array("A", "C").unwrap();
        assert!(!matrix.contains_array("A"));
        assert_eq!(matrix.array("C").unwrap().name(), "C");

        assert!(matches!(
            matrix.rename_array("C", "B"),
            Err(DataError::DuplicateArray { .. })
        ));
        assert!(matches!(
            matrix.rename_array("Missing", "D"),
            Err(DataError::MissingArray { .. })
        ));
        assert_eq!(matrix.array_names().collect::<Vec<_>>(), vec!["B", "C"]);
    }

    #[test]
    fn test_resize_tuples_resizes_arrays() {
        let mut matrix = cell_matrix();
        matrix
            .add_array(TypedArray::new("A", ElementType::Float32, 100, &[3]).unwrap())
            .unwrap();
        matrix.resize_tuples(&[5, 5, 1]).unwrap();
        assert_eq!(matrix.tuple_count(), 25);
        assert_eq!(matrix.array("A").unwrap().len(), 75);
        assert!(matrix.validate().is_ok());
    }

    #[test]
    fn test_failed_resize_leaves_matrix_unchanged() {
        let mut matrix = cell_matrix();
        matrix
            .add_array(TypedArray::new("A", ElementType::UInt8, 100, &[1]).unwrap())
            .unwrap();
        matrix
            .add_array(TypedArray::new("B", ElementType::Float64, 100, &[1]).unwrap())
            .unwrap();

        // Representable as a count but larger than any allocation
        assert!(matches!(
            matrix.resize_tuples(&[1 << 62, 3]),
            Err(DataError::TooLarge { .. })
        ));
        assert_eq!(matrix.tuple_dims(), &[10, 10, 1]);
        assert_eq!(matrix.array("A").unwrap().tuple_count(), 100);
        assert!(matrix.validate().is_ok());

        assert!(matches!(
            matrix.resize_tuples(&[usize::MAX, 2]),
            Err(DataError::TupleDimsOverflow { .. })
        ));
        assert_eq!(matrix.tuple_count(), 100);
    }

    #[test]
    fn test_overflowing_dims_saturate() {
        let matrix = AttributeMatrix::new("Huge", &[usize::MAX, 2], AttributeMatrixType::Generic);
        assert_eq!(matrix.tuple_count(), usize::MAX);
    }
}
