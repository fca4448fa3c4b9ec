//! Creates a new array of a chosen element type filled with one value.

use crate::data::DataArrayPath;
use crate::filter::{codes, FilterContext, FilterParameter, FilterPlugin, ParameterValue};
use crate::types::ElementType;

/// A parsed initialization value
#[derive(Debug, Clone, PartialEq)]
pub enum InitValue {
    Number(f64),
    Text(String),
}

/// Why an initialization value was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitValueError {
    Invalid,
    OutOfRange,
}

impl InitValueError {
    pub fn code(self) -> i32 {
        match self {
            InitValueError::Invalid => codes::INIT_VALUE_INVALID,
            InitValueError::OutOfRange => codes::INIT_VALUE_OUT_OF_RANGE,
        }
    }
}

/// Parse `text` as a value of `element_type`
pub fn parse_init_value(element_type: ElementType, text: &str) -> Result<InitValue, InitValueError> {
    let trimmed = text.trim();
    let number = match element_type {
        ElementType::String => return Ok(InitValue::Text(text.to_string())),
        ElementType::Bool => match trimmed.to_ascii_lowercase().as_str() {
            "0" | "false" => 0.0,
            "1" | "true" => 1.0,
            _ => return Err(InitValueError::Invalid),
        },
        t if t.is_integer() => {
            let v: i128 = trimmed.parse().map_err(|_| InitValueError::Invalid)?;
            v as f64
        }
        _ => {
            let v: f64 = trimmed.parse().map_err(|_| InitValueError::Invalid)?;
            if !v.is_finite() {
                return Err(InitValueError::Invalid);
            }
            v
        }
    };
    match element_type.value_range() {
        Some((lo, hi)) if number < lo || number > hi => Err(InitValueError::OutOfRange),
        _ => Ok(InitValue::Number(number)),
    }
}

#[derive(Debug, Clone)]
pub struct CreateDataArray {
    element_type: ElementType,
    number_of_components: i64,
    new_array: DataArrayPath,
    initialization_value: String,
    parsed: Option<InitValue>,
}

impl CreateDataArray {
    pub const NAME: &'static str = "CreateDataArray";

    pub fn new() -> Self {
        Self {
            element_type: ElementType::Float32,
            number_of_components: 1,
            new_array: DataArrayPath::default(),
            initialization_value: "0".to_string(),
            parsed: None,
        }
    }

    pub fn with_array(mut self, path: DataArrayPath, element_type: ElementType) -> Self {
        self.new_array = path;
        self.element_type = element_type;
        self
    }

    pub fn with_components(mut self, count: i64) -> Self {
        self.number_of_components = count;
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.initialization_value = value.into();
        self
    }
}

impl Default for CreateDataArray {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterPlugin for CreateDataArray {
    fn filter_name(&self) -> &str {
        Self::NAME
    }

    fn human_label(&self) -> &str {
        "Create Data Array"
    }

    fn group_name(&self) -> &str {
        "Core"
    }

    fn sub_group_name(&self) -> &str {
        "Memory/Management"
    }

    fn setup_parameters(&self) -> Vec<FilterParameter> {
        vec![
            FilterParameter::element_type("ScalarType", "Scalar Type", ElementType::Float32),
            FilterParameter::int("NumberOfComponents", "Number of Components", 1, 1, i32::MAX as i64),
            FilterParameter::path("NewArray", "Created Attribute Array", DataArrayPath::default()),
            FilterParameter::string("InitializationValue", "Initialization Value", "0"),
        ]
    }

    fn parameter(&self, name: &str) -> Option<ParameterValue> {
        let value = match name {
            "ScalarType" => ParameterValue::ElementType(self.element_type),
            "NumberOfComponents" => ParameterValue::Int(self.number_of_components),
            "NewArray" => ParameterValue::Path(self.new_array.clone()),
            "InitializationValue" => ParameterValue::String(self.initialization_value.clone()),
            _ => return None,
        };
        Some(value)
    }

    fn set_parameter(&mut self, name: &str, value: ParameterValue) -> bool {
        match (name, value) {
            ("ScalarType", ParameterValue::ElementType(v)) => self.element_type = v,
            ("NumberOfComponents", ParameterValue::Int(v)) => self.number_of_components = v,
            ("NewArray", ParameterValue::Path(v)) => self.new_array = v,
            ("InitializationValue", ParameterValue::String(v)) => self.initialization_value = v,
            _ => return false,
        }
        true
    }

    fn data_check(&mut self, ctx: &mut FilterContext<'_>) {
        self.parsed = None;
        if self.number_of_components < 1 {
            ctx.error(
                codes::COMPONENTS_DONT_MATCH,
                format!(
                    "The number of components must be at least 1, got {}",
                    self.number_of_components
                ),
            );
            return;
        }
        let parsed = match parse_init_value(self.element_type, &self.initialization_value) {
            Ok(parsed) => parsed,
            Err(e) => {
                let text = match e {
                    InitValueError::Invalid => format!(
                        "'{}' is not a valid {} value",
                        self.initialization_value, self.element_type
                    ),
                    InitValueError::OutOfRange => format!(
                        "'{}' is outside the range of {}",
                        self.initialization_value, self.element_type
                    ),
                };
                ctx.error(e.code(), text);
                return;
            }
        };
        let components = [self.number_of_components as usize];
        if ctx
            .create_array(&self.new_array, self.element_type, &components)
            .is_some()
        {
            self.parsed = Some(parsed);
        }
    }

    fn execute(&mut self, ctx: &mut FilterContext<'_>) {
        let Some(value) = self.parsed.clone() else {
            return;
        };
        let Some(array) = ctx.data.array_mut(&self.new_array) else {
            ctx.error(
                codes::ARRAY_NOT_FOUND,
                format!("The array '{}' vanished", self.new_array),
            );
            return;
        };
        match value {
            InitValue::Number(v) => {
                array.fill_f64(v);
            }
            InitValue::Text(text) => {
                if let Some(slots) = array.as_mut_slice::<String>() {
                    slots.iter_mut().for_each(|s| s.clone_from(&text));
                }
            }
        }
    }
}
