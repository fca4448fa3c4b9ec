//! The root of the data model shared by every filter in a pipeline pass.

use super::array::{ArrayShape, TypedArray};
use super::attribute_matrix::AttributeMatrix;
use super::data_container::DataContainer;
use super::error::{DataError, DataResult};
use super::path::DataArrayPath;
use std::collections::BTreeMap;

/// Named data containers, addressed by [`DataArrayPath`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataContainerArray {
    containers: BTreeMap<String, DataContainer>,
}

impl DataContainerArray {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    pub fn clear(&mut self) {
        self.containers.clear();
    }

    pub fn add_data_container(&mut self, container: DataContainer) -> DataResult<()> {
        self.insert_container(container).map(|_| ())
    }

    /// Create and insert an empty data container
    pub fn create_data_container(&mut self, name: &str) -> DataResult<&mut DataContainer> {
        self.insert_container(DataContainer::new(name))
    }

    fn insert_container(&mut self, container: DataContainer) -> DataResult<&mut DataContainer> {
        if container.name().is_empty() {
            return Err(DataError::EmptyName);
        }
        if self.containers.contains_key(container.name()) {
            return Err(DataError::DuplicateDataContainer(container.name().to_string()));
        }
        Ok(self
            .containers
            .entry(container.name().to_string())
            .or_insert(container))
    }

    pub fn remove_data_container(&mut self, name: &str) -> Option<DataContainer> {
        self.containers.remove(name)
    }

    pub fn contains_data_container(&self, name: &str) -> bool {
        self.containers.contains_key(name)
    }

    pub fn data_container(&self, name: &str) -> Option<&DataContainer> {
        self.containers.get(name)
    }

    pub fn data_container_mut(&mut self, name: &str) -> Option<&mut DataContainer> {
        self.containers.get_mut(name)
    }

    pub fn data_container_names(&self) -> impl Iterator<Item = &str> {
        self.containers.keys().map(String::as_str)
    }

    pub fn data_containers(&self) -> impl Iterator<Item = &DataContainer> {
        self.containers.values()
    }

    pub fn attribute_matrix(&self, container: &str, matrix: &str) -> Option<&AttributeMatrix> {
        self.data_container(container)?.attribute_matrix(matrix)
    }

    pub fn attribute_matrix_mut(
        &mut self,
        container: &str,
        matrix: &str,
    ) -> Option<&mut AttributeMatrix> {
        self.data_container_mut(container)?
            .attribute_matrix_mut(matrix)
    }

    /// The attribute matrix holding the array `path` points at
    pub fn attribute_matrix_for(&self, path: &DataArrayPath) -> Option<&AttributeMatrix> {
        self.attribute_matrix(path.data_container_name(), path.attribute_matrix_name())
    }

    pub fn array(&self, path: &DataArrayPath) -> Option<&TypedArray> {
        self.attribute_matrix_for(path)?
            .array(path.data_array_name())
    }

    pub fn array_mut(&mut self, path: &DataArrayPath) -> Option<&mut TypedArray> {
        self.attribute_matrix_mut(path.data_container_name(), path.attribute_matrix_name())?
            .array_mut(path.data_array_name())
    }

    pub fn contains_array(&self, path: &DataArrayPath) -> bool {
        self.array(path).is_some()
    }

    /// Insert `array` into the matrix addressed by `path`'s container and matrix
    pub fn add_array(&mut self, path: &DataArrayPath, array: TypedArray) -> DataResult<()> {
        let container = self
            .data_container_mut(path.data_container_name())
            .ok_or_else(|| DataError::MissingDataContainer(path.data_container_name().to_string()))?;
        let container_name = container.name().to_string();
        container
            .attribute_matrix_mut(path.attribute_matrix_name())
            .ok_or_else(|| DataError::MissingAttributeMatrix {
                container: container_name,
                matrix: path.attribute_matrix_name().to_string(),
            })?
            .add_array(array)
    }

    pub fn remove_array(&mut self, path: &DataArrayPath) -> Option<TypedArray> {
        self.attribute_matrix_mut(path.data_container_name(), path.attribute_matrix_name())?
            .remove_array(path.data_array_name())
    }

    /// Path and shape of every array, in sorted path order
    pub fn array_shapes(&self) -> BTreeMap<DataArrayPath, ArrayShape> {
        let mut shapes = BTreeMap::new();
        for container in self.containers.values() {
            for matrix in container.attribute_matrices() {
                for array in matrix.arrays() {
                    shapes.insert(
                        DataArrayPath::new(container.name(), matrix.name(), array.name()),
                        array.shape(),
                    );
                }
            }
        }
        shapes
    }
}
