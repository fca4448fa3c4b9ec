//! Three-part addresses of arrays in a [`DataContainerArray`](super::DataContainerArray).
//!
//! The text form is `container|matrix|array`. In pipeline documents a path is
//! stored as an object:
//!
//! ```json
//! {
//!     "Data Container Name": "DataContainer",
//!     "Attribute Matrix Name": "CellData",
//!     "Data Array Name": "ImageData"
//! }
//! ```
//!
//! The text form is also accepted when reading.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Separator between the three parts of a path's text form
pub const PATH_SEPARATOR: char = '|';

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DataArrayPath {
    data_container: String,
    attribute_matrix: String,
    data_array: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{0}' is not a data array path; expected 'container|matrix|array'")]
pub struct ParsePathError(pub String);

impl DataArrayPath {
    pub fn new(
        data_container: impl Into<String>,
        attribute_matrix: impl Into<String>,
        data_array: impl Into<String>,
    ) -> Self {
        Self {
            data_container: data_container.into(),
            attribute_matrix: attribute_matrix.into(),
            data_array: data_array.into(),
        }
    }

    pub fn data_container_name(&self) -> &str {
        &self.data_container
    }

    pub fn attribute_matrix_name(&self) -> &str {
        &self.attribute_matrix
    }

    pub fn data_array_name(&self) -> &str {
        &self.data_array
    }

    /// Same container and matrix, different array
    pub fn with_array_name(&self, data_array: impl Into<String>) -> Self {
        Self {
            data_container: self.data_container.clone(),
            attribute_matrix: self.attribute_matrix.clone(),
            data_array: data_array.into(),
        }
    }

    /// True when all three parts are empty
    pub fn is_empty(&self) -> bool {
        self.data_container.is_empty()
            && self.attribute_matrix.is_empty()
            && self.data_array.is_empty()
    }

    /// True when no part is empty
    pub fn is_complete(&self) -> bool {
        !self.data_container.is_empty()
            && !self.attribute_matrix.is_empty()
            && !self.data_array.is_empty()
    }

    /// True when `other` addresses the same attribute matrix
    pub fn same_matrix(&self, other: &DataArrayPath) -> bool {
        self.data_container == other.data_container
            && self.attribute_matrix == other.attribute_matrix
    }
}

impl fmt::Display for DataArrayPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}",
            self.data_container,
            self.attribute_matrix,
            self.data_array,
            sep = PATH_SEPARATOR
        )
    }
}

impl FromStr for DataArrayPath {
    type Err = ParsePathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::default());
        }
        let parts: Vec<&str> = s.split(PATH_SEPARATOR).collect();
        match parts.as_slice() {
            [dc, am, da] => Ok(Self::new(*dc, *am, *da)),
            _ => Err(ParsePathError(s.to_string())),
        }
    }
}

#[derive(Serialize)]
struct PathObjectRef<'a> {
    #[serde(rename = "Data Container Name")]
    data_container: &'a str,
    #[serde(rename = "Attribute Matrix Name")]
    attribute_matrix: &'a str,
    #[serde(rename = "Data Array Name")]
    data_array: &'a str,
}

#[derive(Deserialize)]
struct PathObject {
    #[serde(rename = "Data Container Name", default)]
    data_container: String,
    #[serde(rename = "Attribute Matrix Name", default)]
    attribute_matrix: String,
    #[serde(rename = "Data Array Name", default)]
    data_array: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PathRepr {
    Object(PathObject),
    Text(String),
}

impl Serialize for DataArrayPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        PathObjectRef {
            data_container: &self.data_container,
            attribute_matrix: &self.attribute_matrix,
            data_array: &self.data_array,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DataArrayPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match PathRepr::deserialize(deserializer)? {
            PathRepr::Object(o) => Ok(Self::new(o.data_container, o.attribute_matrix, o.data_array)),
            PathRepr::Text(text) => text.parse().map_err(D::Error::custom),
        }
    }
}
