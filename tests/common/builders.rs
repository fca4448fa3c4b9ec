//! Test data builders for creating test objects

use microflow::data::{AttributeMatrixType, DataContainerArray, Geometry, ImageGeometry, TypedArray};
use microflow::DataArrayPath;
use serde_json::{json, Map, Value};

/// Builder for a single-container data model with an image geometry
pub struct ImageDataBuilder {
    container: String,
    matrix: String,
    dims: [usize; 3],
    arrays: Vec<TypedArray>,
}

impl ImageDataBuilder {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            container: "DC".to_string(),
            matrix: "CellData".to_string(),
            dims: [width, height, 1],
            arrays: Vec::new(),
        }
    }

    pub fn container(mut self, name: &str) -> Self {
        self.container = name.to_string();
        self
    }

    pub fn u8_array(mut self, name: &str, components: usize, values: Vec<u8>) -> Self {
        self.arrays
            .push(TypedArray::from_vec(name, &[components], values).unwrap());
        self
    }

    pub fn f32_array(mut self, name: &str, values: Vec<f32>) -> Self {
        self.arrays.push(TypedArray::from_vec(name, &[1], values).unwrap());
        self
    }

    pub fn path(&self, array: &str) -> DataArrayPath {
        DataArrayPath::new(self.container.as_str(), self.matrix.as_str(), array)
    }

    pub fn build(self) -> DataContainerArray {
        let mut dca = DataContainerArray::new();
        let dc = dca.create_data_container(&self.container).unwrap();
        dc.set_geometry(Geometry::Image(ImageGeometry::with_dimensions(self.dims)));
        let am = dc
            .create_attribute_matrix(&self.matrix, &self.dims, AttributeMatrixType::Cell)
            .unwrap();
        for array in self.arrays {
            am.add_array(array).unwrap();
        }
        dca
    }
}

/// Builder for JSON pipeline documents
pub struct DocumentBuilder {
    name: String,
    entries: Vec<Value>,
}

impl DocumentBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: Vec::new(),
        }
    }

    /// Add an entry; `params` must be a JSON object
    pub fn filter(mut self, filter_name: &str, params: Value) -> Self {
        let mut group = match params {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        group.insert("Filter_Name".to_string(), json!(filter_name));
        self.entries.push(Value::Object(group));
        self
    }

    /// Add an entry without a `Filter_Name` key
    pub fn unnamed(mut self) -> Self {
        self.entries.push(json!({}));
        self
    }

    pub fn build(self) -> Value {
        let mut root = Map::new();
        let count = self.entries.len();
        for (index, entry) in self.entries.into_iter().enumerate() {
            root.insert(index.to_string(), entry);
        }
        root.insert(
            "PipelineBuilder".to_string(),
            json!({ "Name": self.name, "Number_Filters": count, "Version": 6 }),
        );
        Value::Object(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_builder() {
        let doc = DocumentBuilder::new("Demo")
            .filter("ReadImage", json!({ "InputFileName": "a.png" }))
            .unnamed()
            .build();
        assert_eq!(doc["PipelineBuilder"]["Number_Filters"], json!(2));
        assert_eq!(doc["0"]["Filter_Name"], json!("ReadImage"));
        assert!(doc["1"].get("Filter_Name").is_none());
    }
}
