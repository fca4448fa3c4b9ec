//! Core element types for microflow
//!
//! Every array in the data model stores elements of exactly one
//! [`ElementType`]. The names used on the wire (pipeline documents, CLI
//! output) are the lowercase names shown below; `float32`/`float64` are
//! accepted as aliases when parsing.
//!
//! | Variant   | Name     | Rust type |
//! |-----------|----------|-----------|
//! | `Int8`    | `int8`   | `i8`      |
//! | `UInt8`   | `uint8`  | `u8`      |
//! | `Int16`   | `int16`  | `i16`     |
//! | `UInt16`  | `uint16` | `u16`     |
//! | `Int32`   | `int32`  | `i32`     |
//! | `UInt32`  | `uint32` | `u32`     |
//! | `Int64`   | `int64`  | `i64`     |
//! | `UInt64`  | `uint64` | `u64`     |
//! | `Float32` | `float`  | `f32`     |
//! | `Float64` | `double` | `f64`     |
//! | `Bool`    | `bool`   | `bool`    |
//! | `String`  | `string` | `String`  |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Element type of a typed array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ElementType {
    #[serde(rename = "int8")]
    Int8,
    #[default]
    #[serde(rename = "uint8")]
    UInt8,
    #[serde(rename = "int16")]
    Int16,
    #[serde(rename = "uint16")]
    UInt16,
    #[serde(rename = "int32")]
    Int32,
    #[serde(rename = "uint32")]
    UInt32,
    #[serde(rename = "int64")]
    Int64,
    #[serde(rename = "uint64")]
    UInt64,
    #[serde(rename = "float", alias = "float32")]
    Float32,
    #[serde(rename = "double", alias = "float64")]
    Float64,
    #[serde(rename = "bool")]
    Bool,
    #[serde(rename = "string")]
    String,
}

/// Error returned when an element type name is not recognised
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown element type '{0}'")]
pub struct ParseElementTypeError(pub String);

impl ElementType {
    /// All element types, in declaration order
    pub const ALL: [ElementType; 12] = [
        ElementType::Int8,
        ElementType::UInt8,
        ElementType::Int16,
        ElementType::UInt16,
        ElementType::Int32,
        ElementType::UInt32,
        ElementType::Int64,
        ElementType::UInt64,
        ElementType::Float32,
        ElementType::Float64,
        ElementType::Bool,
        ElementType::String,
    ];

    /// Wire name of the type
    pub fn name(&self) -> &'static str {
        match self {
            ElementType::Int8 => "int8",
            ElementType::UInt8 => "uint8",
            ElementType::Int16 => "int16",
            ElementType::UInt16 => "uint16",
            ElementType::Int32 => "int32",
            ElementType::UInt32 => "uint32",
            ElementType::Int64 => "int64",
            ElementType::UInt64 => "uint64",
            ElementType::Float32 => "float",
            ElementType::Float64 => "double",
            ElementType::Bool => "bool",
            ElementType::String => "string",
        }
    }

    /// Size of a single element in bytes
    pub fn size_bytes(&self) -> usize {
        match self {
            ElementType::Int8 | ElementType::UInt8 | ElementType::Bool => 1,
            ElementType::Int16 | ElementType::UInt16 => 2,
            ElementType::Int32 | ElementType::UInt32 | ElementType::Float32 => 4,
            ElementType::Int64 | ElementType::UInt64 | ElementType::Float64 => 8,
            ElementType::String => std::mem::size_of::<String>(),
        }
    }

    /// Check if this type holds numbers (booleans count as numeric 0/1)
    pub fn is_numeric(&self) -> bool {
        !matches!(self, ElementType::String)
    }

    /// Check if this is an integer type
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            ElementType::Int8
                | ElementType::UInt8
                | ElementType::Int16
                | ElementType::UInt16
                | ElementType::Int32
                | ElementType::UInt32
                | ElementType::Int64
                | ElementType::UInt64
        )
    }

    /// Check if this is a floating point type
    pub fn is_float(&self) -> bool {
        matches!(self, ElementType::Float32 | ElementType::Float64)
    }

    /// Inclusive value range representable by this type, if numeric
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let range = match self {
            ElementType::Int8 => (i8::MIN as f64, i8::MAX as f64),
            ElementType::UInt8 => (0.0, u8::MAX as f64),
            ElementType::Int16 => (i16::MIN as f64, i16::MAX as f64),
            ElementType::UInt16 => (0.0, u16::MAX as f64),
            ElementType::Int32 => (i32::MIN as f64, i32::MAX as f64),
            ElementType::UInt32 => (0.0, u32::MAX as f64),
            ElementType::Int64 => (i64::MIN as f64, i64::MAX as f64),
            ElementType::UInt64 => (0.0, u64::MAX as f64),
            ElementType::Float32 => (f32::MIN as f64, f32::MAX as f64),
            ElementType::Float64 => (f64::MIN, f64::MAX),
            ElementType::Bool => (0.0, 1.0),
            ElementType::String => return None,
        };
        Some(range)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ElementType {
    type Err = ParseElementTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "int8" => Ok(ElementType::Int8),
            "uint8" => Ok(ElementType::UInt8),
            "int16" => Ok(ElementType::Int16),
            "uint16" => Ok(ElementType::UInt16),
            "int32" => Ok(ElementType::Int32),
            "uint32" => Ok(ElementType::UInt32),
            "int64" => Ok(ElementType::Int64),
            "uint64" => Ok(ElementType::UInt64),
            "float" | "float32" => Ok(ElementType::Float32),
            "double" | "float64" => Ok(ElementType::Float64),
            "bool" => Ok(ElementType::Bool),
            "string" => Ok(ElementType::String),
            _ => Err(ParseElementTypeError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_type_sizes() {
        assert_eq!(ElementType::UInt8.size_bytes(), 1);
        assert_eq!(ElementType::Bool.size_bytes(), 1);
        assert_eq!(ElementType::Int16.size_bytes(), 2);
        assert_eq!(ElementType::Float32.size_bytes(), 4);
        assert_eq!(ElementType::UInt64.size_bytes(), 8);
        assert_eq!(ElementType::Float64.size_bytes(), 8);
    }

    #[test]
    fn test_element_type_names_round_trip() {
        for ty in ElementType::ALL {
            assert_eq!(ty.name().parse::<ElementType>(), Ok(ty));
        }
        assert_eq!("float32".parse::<ElementType>(), Ok(ElementType::Float32));
        assert_eq!("Float64".parse::<ElementType>(), Ok(ElementType::Float64));
        assert!("complex".parse::<ElementType>().is_err());
    }

    #[test]
    fn test_element_type_serde() {
        let json = serde_json::to_string(&ElementType::Float32).unwrap();
        assert_eq!(json, "\"float\"");
        let parsed: ElementType = serde_json::from_str("\"float64\"").unwrap();
        assert_eq!(parsed, ElementType::Float64);
    }

    #[test]
    fn test_element_type_classification() {
        assert!(ElementType::Int32.is_integer());
        assert!(!ElementType::Float32.is_integer());
        assert!(ElementType::Float64.is_float());
        assert!(ElementType::Bool.is_numeric());
        assert!(!ElementType::String.is_numeric());
        assert_eq!(ElementType::UInt8.value_range(), Some((0.0, 255.0)));
        assert_eq!(ElementType::String.value_range(), None);
    }
}
