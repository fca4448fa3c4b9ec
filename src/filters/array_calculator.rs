//! Evaluates a Rhai expression for every element of a numeric array.
//!
//! The expression sees `value` (the element as a float) and `index` (its
//! flat position) and must produce a number. Results go to a new `double`
//! array next to the input with the same component layout.

use crate::data::DataArrayPath;
use crate::filter::{codes, FilterContext, FilterParameter, FilterPlugin, ParameterValue};
use crate::scripting::{CompiledExpression, ScriptEngine};
use crate::types::ElementType;

#[derive(Debug)]
pub struct ArrayCalculator {
    input_path: DataArrayPath,
    expression: String,
    output_array_name: String,
    engine: ScriptEngine,
    compiled: Option<CompiledExpression>,
}

impl ArrayCalculator {
    pub const NAME: &'static str = "ArrayCalculator";

    pub fn new() -> Self {
        Self {
            input_path: DataArrayPath::default(),
            expression: "value".to_string(),
            output_array_name: "Calculated".to_string(),
            engine: ScriptEngine::new(),
            compiled: None,
        }
    }

    pub fn with_input(mut self, path: DataArrayPath) -> Self {
        self.input_path = path;
        self
    }

    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = expression.into();
        self
    }

    pub fn with_output_name(mut self, name: impl Into<String>) -> Self {
        self.output_array_name = name.into();
        self
    }

    pub fn output_path(&self) -> DataArrayPath {
        self.input_path.with_array_name(&self.output_array_name)
    }
}

impl Default for ArrayCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterPlugin for ArrayCalculator {
    fn filter_name(&self) -> &str {
        Self::NAME
    }

    fn human_label(&self) -> &str {
        "Attribute Array Calculator"
    }

    fn group_name(&self) -> &str {
        "Core"
    }

    fn setup_parameters(&self) -> Vec<FilterParameter> {
        vec![
            FilterParameter::path("SelectedArrayPath", "Input Attribute Array", DataArrayPath::default()),
            FilterParameter::string("Expression", "Expression", "value"),
            FilterParameter::string("CalculatedArrayName", "Calculated Array", "Calculated"),
        ]
    }

    fn parameter(&self, name: &str) -> Option<ParameterValue> {
        let value = match name {
            "SelectedArrayPath" => ParameterValue::Path(self.input_path.clone()),
            "Expression" => ParameterValue::String(self.expression.clone()),
            "CalculatedArrayName" => ParameterValue::String(self.output_array_name.clone()),
            _ => return None,
        };
        Some(value)
    }

    fn set_parameter(&mut self, name: &str, value: ParameterValue) -> bool {
        match (name, value) {
            ("SelectedArrayPath", ParameterValue::Path(v)) => self.input_path = v,
            ("Expression", ParameterValue::String(v)) => self.expression = v,
            ("CalculatedArrayName", ParameterValue::String(v)) => self.output_array_name = v,
            _ => return false,
        }
        true
    }

    fn data_check(&mut self, ctx: &mut FilterContext<'_>) {
        self.compiled = None;
        let input = ctx.require_array(&self.input_path, None, &[]);
        if let Some(shape) = &input {
            if !shape.element_type.is_numeric() {
                ctx.error(
                    codes::TYPE_MISMATCH,
                    format!(
                        "The array '{}' holds {} values; a numeric array is required",
                        self.input_path, shape.element_type
                    ),
                );
            }
        }
        let compiled = match self.engine.compile(&self.expression) {
            Ok(compiled) => Some(compiled),
            Err(e) => {
                ctx.error(codes::EXPRESSION_INVALID, e.to_string());
                None
            }
        };
        if !ctx.require_name("calculated array name", &self.output_array_name) || ctx.has_errors() {
            return;
        }
        let Some(shape) = input else {
            return;
        };
        if ctx
            .create_array(&self.output_path(), ElementType::Float64, &shape.component_dims)
            .is_some()
        {
            self.compiled = compiled;
        }
    }

    fn execute(&mut self, ctx: &mut FilterContext<'_>) {
        let Some(compiled) = &self.compiled else {
            return;
        };
        let Some(input) = ctx.data.array(&self.input_path) else {
            ctx.error(
                codes::ARRAY_NOT_FOUND,
                format!("The array '{}' vanished", self.input_path),
            );
            return;
        };
        let mut results = Vec::with_capacity(input.len());
        for index in 0..input.len() {
            let value = input.value_as_f64(index).unwrap_or_default();
            match self.engine.evaluate(compiled, value, index) {
                Ok(v) => results.push(v),
                Err(e) => {
                    ctx.error(
                        codes::EXPRESSION_EVAL_FAILED,
                        format!("Element {}: {}", index, e),
                    );
                    return;
                }
            }
        }
        let output = self.output_path();
        match ctx
            .data
            .array_mut(&output)
            .and_then(|a| a.as_mut_slice::<f64>())
        {
            Some(target) if target.len() == results.len() => target.copy_from_slice(&results),
            _ => ctx.error(
                codes::TUPLES_DONT_MATCH,
                format!("The array '{}' cannot hold {} results", output, results.len()),
            ),
        }
    }
}
