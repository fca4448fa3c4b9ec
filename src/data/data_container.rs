//! Data containers: a named set of attribute matrices plus an optional geometry.

use super::attribute_matrix::{AttributeMatrix, AttributeMatrixType};
use super::error::{DataError, DataResult};
use super::geometry::Geometry;
use std::collections::BTreeMap;

/// An attribute matrix whose tuple count disagrees with the container geometry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeometryMismatch {
    pub matrix: String,
    pub matrix_type: AttributeMatrixType,
    pub expected: usize,
    pub actual: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataContainer {
    name: String,
    matrices: BTreeMap<String, AttributeMatrix>,
    geometry: Option<Geometry>,
}

impl DataContainer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            matrices: BTreeMap::new(),
            geometry: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    pub fn set_geometry(&mut self, geometry: Geometry) {
        self.geometry = Some(geometry);
    }

    pub fn take_geometry(&mut self) -> Option<Geometry> {
        self.geometry.take()
    }

    pub fn num_attribute_matrices(&self) -> usize {
        self.matrices.len()
    }

    pub fn add_attribute_matrix(&mut self, matrix: AttributeMatrix) -> DataResult<()> {
        self.insert_matrix(matrix).map(|_| ())
    }

    /// Create and insert an empty attribute matrix, returning it for population
    pub fn create_attribute_matrix(
        &mut self,
        name: &str,
        tuple_dims: &[usize],
        matrix_type: AttributeMatrixType,
    ) -> DataResult<&mut AttributeMatrix> {
        self.insert_matrix(AttributeMatrix::new(name, tuple_dims, matrix_type))
    }

    fn insert_matrix(&mut self, matrix: AttributeMatrix) -> DataResult<&mut AttributeMatrix> {
        if matrix.name().is_empty() {
            return Err(DataError::EmptyName);
        }
        if self.matrices.contains_key(matrix.name()) {
            return Err(DataError::DuplicateAttributeMatrix {
                container: self.name.clone(),
                matrix: matrix.name().to_string(),
            });
        }
        Ok(self
            .matrices
            .entry(matrix.name().to_string())
            .or_insert(matrix))
    }

    pub fn remove_attribute_matrix(&mut self, name: &str) -> Option<AttributeMatrix> {
        self.matrices.remove(name)
    }

    pub fn rename_attribute_matrix(&mut self, old_name: &str, new_name: &str) -> DataResult<()> {
        if new_name.is_empty() {
            return Err(DataError::EmptyName);
        }
        if old_name != new_name && self.matrices.contains_key(new_name) {
            return Err(DataError::DuplicateAttributeMatrix {
                container: self.name.clone(),
                matrix: new_name.to_string(),
            });
        }
        let mut matrix = self
            .matrices
            .remove(old_name)
            .ok_or_else(|| self.missing(old_name))?;
        matrix.set_name(new_name);
        self.matrices.insert(new_name.to_string(), matrix);
        Ok(())
    }

    fn missing(&self, matrix: &str) -> DataError {
        DataError::MissingAttributeMatrix {
            container: self.name.clone(),
            matrix: matrix.to_string(),
        }
    }

    pub fn contains_attribute_matrix(&self, name: &str) -> bool {
        self.matrices.contains_key(name)
    }

    pub fn attribute_matrix(&self, name: &str) -> Option<&AttributeMatrix> {
        self.matrices.get(name)
    }

    pub fn attribute_matrix_mut(&mut self, name: &str) -> Option<&mut AttributeMatrix> {
        self.matrices.get_mut(name)
    }

    pub fn attribute_matrix_names(&self) -> impl Iterator<Item = &str> {
        self.matrices.keys().map(String::as_str)
    }

    pub fn attribute_matrices(&self) -> impl Iterator<Item = &AttributeMatrix> {
        self.matrices.values()
    }

    /// Attribute matrices whose tuple count contradicts the geometry.
    ///
    /// Empty when there is no geometry or every constrained matrix agrees.
    pub fn geometry_mismatches(&self) -> Vec<GeometryMismatch> {
        let Some(geometry) = &self.geometry else {
            return Vec::new();
        };
        self.matrices
            .values()
            .filter_map(|matrix| {
                let expected = geometry.expected_tuples(matrix.matrix_type())?;
                (expected != matrix.tuple_count()).then(|| GeometryMismatch {
                    matrix: matrix.name().to_string(),
                    matrix_type: matrix.matrix_type(),
                    expected,
                    actual: matrix.tuple_count(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::geometry::ImageGeometry;

    #[test]
    fn test_create_attribute_matrix() {
        let mut dc = DataContainer::new("DataContainer");
        let matrix = dc
            .create_attribute_matrix("CellData", &[4, 4, 1], AttributeMatrixType::Cell)
            .unwrap();
        assert_eq!(matrix.tuple_count(), 16);
        assert!(dc.contains_attribute_matrix("CellData"));
        assert!(matches!(
            dc.create_attribute_matrix("CellData", &[1], AttributeMatrixType::Cell),
            Err(DataError::DuplicateAttributeMatrix { .. })
        ));
    }

    #[test]
    fn test_geometry_mismatches() {
        let mut dc = DataContainer::new("DataContainer");
        dc.set_geometry(Geometry::Image(ImageGeometry::with_dimensions([4, 4, 1])));
        dc.create_attribute_matrix("CellData", &[16], AttributeMatrixType::Cell)
            .unwrap();
        dc.create_attribute_matrix("Grains", &[7], AttributeMatrixType::Feature)
            .unwrap();
        assert!(dc.geometry_mismatches().is_empty());

        dc.create_attribute_matrix("Coarse", &[2, 2, 1], AttributeMatrixType::Cell)
            .unwrap();
        let mismatches = dc.geometry_mismatches();
        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].matrix, "Coarse");
        assert_eq!(mismatches[0].expected, 16);
        assert_eq!(mismatches[0].actual, 4);
    }

    #[test]
    fn test_rename_attribute_matrix() {
        let mut dc = DataContainer::new("DC");
        dc.create_attribute_matrix("A", &[1], AttributeMatrixType::Generic)
            .unwrap();
        dc.rename_attribute_matrix("A", "B").unwrap();
        assert_eq!(dc.attribute_matrix("B").unwrap().name(), "B");
        assert!(dc.rename_attribute_matrix("A", "C").is_err());
    }
}
