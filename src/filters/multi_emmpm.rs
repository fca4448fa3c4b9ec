//! EM/MPM segmentation applied to several grayscale arrays of one attribute matrix.

use super::emmpm::{
    segment_array, segmentation_parameter, segmentation_parameters, set_segmentation_parameter,
};
use super::segmentation::SegmentationParams;
use crate::data::{DataArrayPath, GeometryKind};
use crate::filter::{codes, FilterContext, FilterParameter, FilterPlugin, ParameterValue};
use crate::types::ElementType;

#[derive(Debug, Clone)]
pub struct MultiEmmpmFilter {
    input_paths: Vec<DataArrayPath>,
    output_prefix: String,
    params: SegmentationParams,
}

impl MultiEmmpmFilter {
    pub const NAME: &'static str = "MultiEmmpmFilter";

    pub fn new() -> Self {
        Self {
            input_paths: Vec::new(),
            output_prefix: "Segmented ".to_string(),
            params: SegmentationParams::default(),
        }
    }

    pub fn with_inputs(mut self, paths: Vec<DataArrayPath>) -> Self {
        self.input_paths = paths;
        self
    }

    pub fn with_output_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.output_prefix = prefix.into();
        self
    }

    /// Output path for each input, in input order
    pub fn output_paths(&self) -> Vec<DataArrayPath> {
        self.input_paths
            .iter()
            .map(|p| p.with_array_name(format!("{}{}", self.output_prefix, p.data_array_name())))
            .collect()
    }
}

impl Default for MultiEmmpmFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterPlugin for MultiEmmpmFilter {
    fn filter_name(&self) -> &str {
        Self::NAME
    }

    fn human_label(&self) -> &str {
        "Multi-Array EM/MPM Segmentation"
    }

    fn group_name(&self) -> &str {
        "Processing"
    }

    fn sub_group_name(&self) -> &str {
        "Segmentation"
    }

    fn setup_parameters(&self) -> Vec<FilterParameter> {
        let mut params = vec![
            FilterParameter::path_list("InputDataArrayVector", "Input Attribute Arrays"),
            FilterParameter::string("OutputArrayPrefix", "Output Array Prefix", "Segmented "),
        ];
        params.extend(segmentation_parameters());
        params
    }

    fn parameter(&self, name: &str) -> Option<ParameterValue> {
        match name {
            "InputDataArrayVector" => Some(ParameterValue::PathList(self.input_paths.clone())),
            "OutputArrayPrefix" => Some(ParameterValue::String(self.output_prefix.clone())),
            _ => segmentation_parameter(&self.params, name),
        }
    }

    fn set_parameter(&mut self, name: &str, value: ParameterValue) -> bool {
        match (name, value) {
            ("InputDataArrayVector", ParameterValue::PathList(v)) => self.input_paths = v,
            ("OutputArrayPrefix", ParameterValue::String(v)) => self.output_prefix = v,
            (name, value) => return set_segmentation_parameter(&mut self.params, name, &value),
        }
        true
    }

    fn data_check(&mut self, ctx: &mut FilterContext<'_>) {
        let Some(first) = self.input_paths.first() else {
            ctx.error(
                codes::NO_INPUT_ARRAYS,
                "At least one input array must be selected",
            );
            return;
        };
        if let Some(stray) = self.input_paths.iter().find(|p| !p.same_matrix(first)) {
            ctx.error(
                codes::INPUT_ARRAYS_DIFFERENT_MATRICES,
                format!(
                    "All input arrays must share one attribute matrix; '{}' and '{}' do not",
                    first, stray
                ),
            );
            return;
        }
        if !ctx.require_name("output array prefix", &self.output_prefix) {
            return;
        }

        let mut inputs_ok = true;
        for path in &self.input_paths {
            inputs_ok &= ctx
                .require_array(path, Some(ElementType::UInt8), &[1])
                .is_some();
        }
        if !inputs_ok
            || !ctx.require_geometry(first.data_container_name(), GeometryKind::Image)
        {
            return;
        }
        for output in self.output_paths() {
            ctx.create_array(&output, ElementType::UInt8, &[1]);
        }
    }

    fn execute(&mut self, ctx: &mut FilterContext<'_>) {
        let total = self.input_paths.len();
        for (i, (input, output)) in self
            .input_paths
            .iter()
            .zip(self.output_paths())
            .enumerate()
        {
            ctx.progress(
                (i * 100 / total) as u8,
                format!("Segmenting '{}' ({}/{})", input, i + 1, total),
            );
            segment_array(ctx, input, &output, &self.params);
            if ctx.has_errors() {
                return;
            }
        }
    }
}
