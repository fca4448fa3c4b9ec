//! Parameter descriptors and values.
//!
//! Each filter describes its parameters with [`FilterParameter`]s. The
//! descriptor's [`ParameterKind`] decides how the value is read from and
//! written to a parameter document, so individual filters never touch the
//! reader or writer directly.

use super::io::{FilterParametersReader, FilterParametersWriter};
use crate::data::DataArrayPath;
use crate::types::ElementType;
use serde::{Deserialize, Serialize};

/// Storage and validation rule of a parameter
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterKind {
    Bool,
    /// Integer with an inclusive range; values outside it fall back to the current value
    Int { min: i64, max: i64 },
    Float,
    String,
    InputFile,
    OutputFile,
    /// Index into a list of labelled options
    Choice { options: Vec<String> },
    ElementType,
    DataArrayPath,
    DataArrayPathList,
    IntVec3,
    FloatVec3,
}

/// A concrete parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Choice(usize),
    ElementType(ElementType),
    Path(DataArrayPath),
    PathList(Vec<DataArrayPath>),
    IntVec3([i32; 3]),
    FloatVec3([f32; 3]),
}

impl ParameterValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParameterValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParameterValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            ParameterValue::Float(v) => Some(*v),
            ParameterValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParameterValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_choice(&self) -> Option<usize> {
        match self {
            ParameterValue::Choice(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_element_type(&self) -> Option<ElementType> {
        match self {
            ParameterValue::ElementType(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&DataArrayPath> {
        match self {
            ParameterValue::Path(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_path_list(&self) -> Option<&[DataArrayPath]> {
        match self {
            ParameterValue::PathList(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_int_vec3(&self) -> Option<[i32; 3]> {
        match self {
            ParameterValue::IntVec3(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float_vec3(&self) -> Option<[f32; 3]> {
        match self {
            ParameterValue::FloatVec3(v) => Some(*v),
            _ => None,
        }
    }
}

/// Description of one filter parameter
#[derive(Debug, Clone, PartialEq)]
pub struct FilterParameter {
    /// Key used in parameter documents
    pub name: &'static str,
    /// Label shown to users
    pub label: &'static str,
    pub kind: ParameterKind,
    pub default: ParameterValue,
}

impl FilterParameter {
    pub fn new(
        name: &'static str,
        label: &'static str,
        kind: ParameterKind,
        default: ParameterValue,
    ) -> Self {
        Self {
            name,
            label,
            kind,
            default,
        }
    }

    pub fn bool(name: &'static str, label: &'static str, default: bool) -> Self {
        Self::new(name, label, ParameterKind::Bool, ParameterValue::Bool(default))
    }

    pub fn int(name: &'static str, label: &'static str, default: i64, min: i64, max: i64) -> Self {
        Self::new(
            name,
            label,
            ParameterKind::Int { min, max },
            ParameterValue::Int(default),
        )
    }

    pub fn float(name: &'static str, label: &'static str, default: f64) -> Self {
        Self::new(name, label, ParameterKind::Float, ParameterValue::Float(default))
    }

    pub fn string(name: &'static str, label: &'static str, default: &str) -> Self {
        Self::new(
            name,
            label,
            ParameterKind::String,
            ParameterValue::String(default.to_string()),
        )
    }

    pub fn input_file(name: &'static str, label: &'static str) -> Self {
        Self::new(
            name,
            label,
            ParameterKind::InputFile,
            ParameterValue::String(String::new()),
        )
    }

    pub fn element_type(name: &'static str, label: &'static str, default: ElementType) -> Self {
        Self::new(
            name,
            label,
            ParameterKind::ElementType,
            ParameterValue::ElementType(default),
        )
    }

    pub fn path(name: &'static str, label: &'static str, default: DataArrayPath) -> Self {
        Self::new(
            name,
            label,
            ParameterKind::DataArrayPath,
            ParameterValue::Path(default),
        )
    }

    pub fn path_list(name: &'static str, label: &'static str) -> Self {
        Self::new(
            name,
            label,
            ParameterKind::DataArrayPathList,
            ParameterValue::PathList(Vec::new()),
        )
    }

    pub fn float_vec3(name: &'static str, label: &'static str, default: [f32; 3]) -> Self {
        Self::new(
            name,
            label,
            ParameterKind::FloatVec3,
            ParameterValue::FloatVec3(default),
        )
    }

    /// Read this parameter from `reader`, keeping `current` for anything
    /// missing, mistyped or out of range.
    pub fn read(
        &self,
        reader: &dyn FilterParametersReader,
        current: ParameterValue,
    ) -> ParameterValue {
        let key = self.name;
        match (&self.kind, current) {
            (ParameterKind::Bool, ParameterValue::Bool(v)) => {
                ParameterValue::Bool(reader.read_bool(key, v))
            }
            (ParameterKind::Int { min, max }, ParameterValue::Int(v)) => {
                let read = reader.read_value::<i64>(key, v);
                if read < *min || read > *max {
                    tracing::warn!(
                        "Parameter '{}' value {} outside [{}, {}], keeping {}",
                        key,
                        read,
                        min,
                        max,
                        v
                    );
                    ParameterValue::Int(v)
                } else {
                    ParameterValue::Int(read)
                }
            }
            (ParameterKind::Float, ParameterValue::Float(v)) => {
                ParameterValue::Float(reader.read_value::<f64>(key, v))
            }
            (
                ParameterKind::String | ParameterKind::InputFile | ParameterKind::OutputFile,
                ParameterValue::String(v),
            ) => ParameterValue::String(reader.read_string(key, v)),
            (ParameterKind::Choice { options }, ParameterValue::Choice(v)) => {
                let read = reader.read_value::<usize>(key, v);
                ParameterValue::Choice(if read < options.len() { read } else { v })
            }
            (ParameterKind::ElementType, ParameterValue::ElementType(v)) => {
                let name = reader.read_string(key, v.name().to_string());
                ParameterValue::ElementType(name.parse().unwrap_or(v))
            }
            (ParameterKind::DataArrayPath, ParameterValue::Path(v)) => {
                ParameterValue::Path(reader.read_data_array_path(key, v))
            }
            (ParameterKind::DataArrayPathList, ParameterValue::PathList(v)) => {
                ParameterValue::PathList(reader.read_data_array_paths(key, v))
            }
            (ParameterKind::IntVec3, ParameterValue::IntVec3(v)) => {
                let read = reader.read_array::<i32>(key, v.to_vec());
                ParameterValue::IntVec3(read.try_into().unwrap_or(v))
            }
            (ParameterKind::FloatVec3, ParameterValue::FloatVec3(v)) => {
                let read = reader.read_array::<f32>(key, v.to_vec());
                ParameterValue::FloatVec3(read.try_into().unwrap_or(v))
            }
            (kind, current) => {
                tracing::warn!(
                    "Parameter '{}' holds {:?} which does not match kind {:?}",
                    key,
                    current,
                    kind
                );
                current
            }
        }
    }

    /// Write `value` under this parameter's key
    pub fn write(&self, writer: &mut dyn FilterParametersWriter, value: &ParameterValue) {
        let key = self.name;
        match value {
            ParameterValue::Bool(v) => writer.write_bool(key, *v),
            ParameterValue::Int(v) => writer.write_value(key, *v),
            ParameterValue::Float(v) => writer.write_value(key, *v),
            ParameterValue::String(v) => writer.write_string(key, v),
            ParameterValue::Choice(v) => writer.write_value(key, *v),
            ParameterValue::ElementType(v) => writer.write_string(key, v.name()),
            ParameterValue::Path(v) => writer.write_data_array_path(key, v),
            ParameterValue::PathList(v) => writer.write_data_array_paths(key, v),
            ParameterValue::IntVec3(v) => writer.write_array(key, &v[..]),
            ParameterValue::FloatVec3(v) => writer.write_array(key, &v[..]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        assert_eq!(ParameterValue::Int(3).as_int(), Some(3));
        assert_eq!(ParameterValue::Int(3).as_float(), Some(3.0));
        assert_eq!(ParameterValue::Bool(true).as_int(), None);
        assert_eq!(
            ParameterValue::FloatVec3([1.0, 2.0, 3.0]).as_float_vec3(),
            Some([1.0, 2.0, 3.0])
        );
        assert_eq!(
            ParameterValue::ElementType(ElementType::Int16).as_element_type(),
            Some(ElementType::Int16)
        );
    }

    #[test]
    fn test_constructors_set_defaults() {
        let p = FilterParameter::int("NumClasses", "Number of Classes", 2, 2, 15);
        assert_eq!(p.kind, ParameterKind::Int { min: 2, max: 15 });
        assert_eq!(p.default, ParameterValue::Int(2));

        let p = FilterParameter::path_list("InputDataArrayVector", "Input Arrays");
        assert_eq!(p.default, ParameterValue::PathList(Vec::new()));
    }
}
