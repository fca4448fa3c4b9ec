//! Converts a 3- or 4-component `uint8` color array to a single-component grayscale array.

use crate::data::DataArrayPath;
use crate::filter::{codes, FilterContext, FilterParameter, FilterPlugin, ParameterValue};
use crate::types::ElementType;

/// Luminosity weights for R, G and B
pub const DEFAULT_COLOR_WEIGHTS: [f32; 3] = [0.2125, 0.7154, 0.0721];

/// Weighted sum of the first three components of each tuple, rounded and clamped to `u8`
pub fn convert_to_gray(rgb: &[u8], components: usize, weights: [f32; 3]) -> Vec<u8> {
    rgb.chunks_exact(components)
        .map(|px| {
            let gray = px[0] as f32 * weights[0] + px[1] as f32 * weights[1] + px[2] as f32 * weights[2];
            gray.round().clamp(0.0, 255.0) as u8
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct RgbToGray {
    input_path: DataArrayPath,
    output_array_name: String,
    color_weights: [f32; 3],
}

impl RgbToGray {
    pub const NAME: &'static str = "RGBToGray";

    pub fn new() -> Self {
        Self {
            input_path: DataArrayPath::new("ImageDataContainer", "CellData", "ImageData"),
            output_array_name: "GrayscaleArray".to_string(),
            color_weights: DEFAULT_COLOR_WEIGHTS,
        }
    }

    pub fn with_input(mut self, path: DataArrayPath) -> Self {
        self.input_path = path;
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

impl Default for RgbToGray {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterPlugin for RgbToGray {
    fn filter_name(&self) -> &str {
        Self::NAME
    }

    fn human_label(&self) -> &str {
        "Convert RGB to Grayscale"
    }

    fn group_name(&self) -> &str {
        "Processing"
    }

    fn sub_group_name(&self) -> &str {
        "Image"
    }

    fn setup_parameters(&self) -> Vec<FilterParameter> {
        vec![
            FilterParameter::path(
                "SelectedCellArrayArrayPath",
                "Color Array",
                DataArrayPath::new("ImageDataContainer", "CellData", "ImageData"),
            ),
            FilterParameter::string("NewCellArrayName", "Grayscale Array", "GrayscaleArray"),
            FilterParameter::float_vec3("ColorWeights", "Color Weighting", DEFAULT_COLOR_WEIGHTS),
        ]
    }

    fn parameter(&self, name: &str) -> Option<ParameterValue> {
        match name {
            "SelectedCellArrayArrayPath" => Some(ParameterValue::Path(self.input_path.clone())),
            "NewCellArrayName" => Some(ParameterValue::String(self.output_array_name.clone())),
            "ColorWeights" => Some(ParameterValue::FloatVec3(self.color_weights)),
            _ => None,
        }
    }

    fn set_parameter(&mut self, name: &str, value: ParameterValue) -> bool {
        match (name, value) {
            ("SelectedCellArrayArrayPath", ParameterValue::Path(v)) => self.input_path = v,
            ("NewCellArrayName", ParameterValue::String(v)) => self.output_array_name = v,
            ("ColorWeights", ParameterValue::FloatVec3(v)) => self.color_weights = v,
            _ => return false,
        }
        true
    }

    fn data_check(&mut self, ctx: &mut FilterContext<'_>) {
        let shape = ctx.require_array(&self.input_path, Some(ElementType::UInt8), &[]);
        if let Some(shape) = shape {
            let components = shape.component_count();
            if components != 3 && components != 4 {
                ctx.error(
                    codes::COMPONENTS_DONT_MATCH,
                    format!(
                        "The array '{}' has {} components; 3 (RGB) or 4 (RGBA) are required",
                        self.input_path, components
                    ),
                );
            }
        }
        if ctx.require_name("grayscale array name", &self.output_array_name) {
            ctx.create_array(&self.output_path(), ElementType::UInt8, &[1]);
        }
    }

    fn execute(&mut self, ctx: &mut FilterContext<'_>) {
        let gray = match ctx.data.array(&self.input_path) {
            Some(input) => match input.as_slice::<u8>() {
                Some(rgb) => convert_to_gray(rgb, input.component_count(), self.color_weights),
                None => return,
            },
            None => return,
        };
        let output = self.output_path();
        if let Some(target) = ctx
            .data
            .array_mut(&output)
            .and_then(|a| a.as_mut_slice::<u8>())
        {
            target.copy_from_slice(&gray);
        }
        ctx.status(format!("Converted '{}' to grayscale", self.input_path));
    }
}
