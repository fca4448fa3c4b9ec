//! EM/MPM segmentation of a single grayscale array.

use super::segmentation::{segment, SegmentationParams};
use crate::data::{DataArrayPath, Geometry, GeometryKind, ImageGeometry};
use crate::filter::{codes, FilterContext, FilterParameter, FilterPlugin, ParameterValue};
use crate::types::ElementType;

pub(crate) const MAX_CLASSES: i64 = 15;
pub(crate) const MAX_ITERATIONS: i64 = 1000;

/// Parameter descriptors shared by the EM/MPM filters
pub(crate) fn segmentation_parameters() -> Vec<FilterParameter> {
    let defaults = SegmentationParams::default();
    vec![
        FilterParameter::int(
            "NumClasses",
            "Number of Classes",
            defaults.num_classes as i64,
            2,
            MAX_CLASSES,
        ),
        FilterParameter::int(
            "EmIterations",
            "EM Iterations",
            defaults.em_iterations as i64,
            1,
            MAX_ITERATIONS,
        ),
        FilterParameter::int(
            "MpmIterations",
            "MPM Iterations",
            defaults.mpm_iterations as i64,
            0,
            MAX_ITERATIONS,
        ),
        FilterParameter::float("Beta", "Beta", defaults.beta),
    ]
}

pub(crate) fn segmentation_parameter(params: &SegmentationParams, name: &str) -> Option<ParameterValue> {
    let value = match name {
        "NumClasses" => ParameterValue::Int(params.num_classes as i64),
        "EmIterations" => ParameterValue::Int(params.em_iterations as i64),
        "MpmIterations" => ParameterValue::Int(params.mpm_iterations as i64),
        "Beta" => ParameterValue::Float(params.beta),
        _ => return None,
    };
    Some(value)
}

pub(crate) fn set_segmentation_parameter(
    params: &mut SegmentationParams,
    name: &str,
    value: &ParameterValue,
) -> bool {
    match (name, value) {
        ("NumClasses", ParameterValue::Int(v)) if (2..=MAX_CLASSES).contains(v) => {
            params.num_classes = *v as usize
        }
        ("EmIterations", ParameterValue::Int(v)) if (1..=MAX_ITERATIONS).contains(v) => {
            params.em_iterations = *v as usize
        }
        ("MpmIterations", ParameterValue::Int(v)) if (0..=MAX_ITERATIONS).contains(v) => {
            params.mpm_iterations = *v as usize
        }
        ("Beta", ParameterValue::Float(v)) => params.beta = *v,
        _ => return false,
    }
    true
}

/// Image geometry of the container holding `path`, if it has one
pub(crate) fn image_geometry(ctx: &FilterContext<'_>, path: &DataArrayPath) -> Option<ImageGeometry> {
    ctx.data
        .data_container(path.data_container_name())
        .and_then(|dc| dc.geometry())
        .and_then(Geometry::as_image)
        .cloned()
}

/// Segment the `uint8` array at `input` into the `uint8` array at `output`
pub(crate) fn segment_array(
    ctx: &mut FilterContext<'_>,
    input: &DataArrayPath,
    output: &DataArrayPath,
    params: &SegmentationParams,
) {
    let Some(geometry) = image_geometry(ctx, input) else {
        ctx.error(
            codes::GEOMETRY_MISSING,
            format!("The data container of '{}' has no image geometry", input),
        );
        return;
    };
    let Some(values) = ctx
        .data
        .array(input)
        .and_then(|a| a.as_slice::<u8>())
        .map(<[u8]>::to_vec)
    else {
        ctx.error(codes::ARRAY_NOT_FOUND, format!("The array '{}' vanished", input));
        return;
    };
    let labels = segment(&values, &geometry, params);
    match ctx
        .data
        .array_mut(output)
        .and_then(|a| a.as_mut_slice::<u8>())
    {
        Some(target) if target.len() == labels.len() => target.copy_from_slice(&labels),
        _ => ctx.error(
            codes::TUPLES_DONT_MATCH,
            format!("The output array '{}' cannot hold {} labels", output, labels.len()),
        ),
    }
}

#[derive(Debug, Clone)]
pub struct EmmpmFilter {
    input_path: DataArrayPath,
    output_path: DataArrayPath,
    params: SegmentationParams,
}

impl EmmpmFilter {
    pub const NAME: &'static str = "EMMPMFilter";

    pub fn new() -> Self {
        Self {
            input_path: DataArrayPath::new("ImageDataContainer", "CellData", "ImageData"),
            output_path: DataArrayPath::new("ImageDataContainer", "CellData", "Segmented"),
            params: SegmentationParams::default(),
        }
    }

    pub fn with_input(mut self, path: DataArrayPath) -> Self {
        self.input_path = path;
        self
    }

    pub fn with_output(mut self, path: DataArrayPath) -> Self {
        self.output_path = path;
        self
    }

    pub fn with_params(mut self, params: SegmentationParams) -> Self {
        self.params = params;
        self
    }

    pub fn params(&self) -> &SegmentationParams {
        &self.params
    }
}

impl Default for EmmpmFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterPlugin for EmmpmFilter {
    fn filter_name(&self) -> &str {
        Self::NAME
    }

    fn human_label(&self) -> &str {
        "EM/MPM Segmentation"
    }

    fn group_name(&self) -> &str {
        "Processing"
    }

    fn sub_group_name(&self) -> &str {
        "Segmentation"
    }

    fn setup_parameters(&self) -> Vec<FilterParameter> {
        let mut params = vec![
            FilterParameter::path(
                "InputDataArrayPath",
                "Input Attribute Array",
                DataArrayPath::new("ImageDataContainer", "CellData", "ImageData"),
            ),
            FilterParameter::path(
                "OutputDataArrayPath",
                "Output Attribute Array",
                DataArrayPath::new("ImageDataContainer", "CellData", "Segmented"),
            ),
        ];
        params.extend(segmentation_parameters());
        params
    }

    fn parameter(&self, name: &str) -> Option<ParameterValue> {
        match name {
            "InputDataArrayPath" => Some(ParameterValue::Path(self.input_path.clone())),
            "OutputDataArrayPath" => Some(ParameterValue::Path(self.output_path.clone())),
            _ => segmentation_parameter(&self.params, name),
        }
    }

    fn set_parameter(&mut self, name: &str, value: ParameterValue) -> bool {
        match (name, value) {
            ("InputDataArrayPath", ParameterValue::Path(v)) => self.input_path = v,
            ("OutputDataArrayPath", ParameterValue::Path(v)) => self.output_path = v,
            (name, value) => return set_segmentation_parameter(&mut self.params, name, &value),
        }
        true
    }

    fn data_check(&mut self, ctx: &mut FilterContext<'_>) {
        let Some(input) = ctx.require_array(&self.input_path, Some(ElementType::UInt8), &[1]) else {
            return;
        };
        if !ctx.require_geometry(self.input_path.data_container_name(), GeometryKind::Image) {
            return;
        }
        let Some(output) = ctx.create_array(&self.output_path, ElementType::UInt8, &[1]) else {
            return;
        };
        if output.tuple_count != input.tuple_count {
            ctx.error(
                codes::TUPLES_DONT_MATCH,
                format!(
                    "The output array '{}' has {} tuples but the input has {}",
                    self.output_path, output.tuple_count, input.tuple_count
                ),
            );
        }
    }

    fn execute(&mut self, ctx: &mut FilterContext<'_>) {
        ctx.status(format!(
            "Segmenting '{}' into {} classes",
            self.input_path, self.params.num_classes
        ));
        segment_array(ctx, &self.input_path, &self.output_path, &self.params);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AttributeMatrixType, DataContainerArray, TypedArray};
    use crate::filter::Filter;
    use crate::message::ObserverSet;

    fn image(components: usize) -> DataContainerArray {
        let mut dca = DataContainerArray::new();
        let dc = dca.create_data_container("ImageDataContainer").unwrap();
        dc.set_geometry(Geometry::Image(ImageGeometry::with_dimensions([4, 2, 1])));
        let values: Vec<u8> = (0..8 * components)
            .map(|i| if (i / components) % 4 < 2 { 30 } else { 220 })
            .collect();
        dc.create_attribute_matrix("CellData", &[4, 2, 1], AttributeMatrixType::Cell)
            .unwrap()
            .add_array(TypedArray::from_vec("ImageData", &[components], values).unwrap())
            .unwrap();
        dca
    }

    #[test]
    fn test_segments_gray_image() {
        let mut dca = image(1);
        let mut filter = Filter::new(EmmpmFilter::new());
        filter.execute(&mut dca, &mut ObserverSet::new());
        assert_eq!(filter.error_condition(), 0);
        let labels = dca
            .array(&DataArrayPath::new("ImageDataContainer", "CellData", "Segmented"))
            .unwrap();
        assert_eq!(labels.as_slice::<u8>().unwrap(), &[0, 0, 1, 1, 0, 0, 1, 1]);
    }

    #[test]
    fn test_rejects_rgba_input() {
        let mut dca = image(4);
        let mut filter = Filter::new(EmmpmFilter::new());
        filter.preflight(&mut dca, &mut ObserverSet::new());
        assert_eq!(filter.error_condition(), codes::COMPONENTS_DONT_MATCH);
        assert!(!dca.contains_array(&DataArrayPath::new(
            "ImageDataContainer",
            "CellData",
            "Segmented"
        )));
    }

    #[test]
    fn test_requires_image_geometry() {
        let mut dca = image(1);
        dca.data_container_mut("ImageDataContainer")
            .unwrap()
            .take_geometry();
        let mut filter = Filter::new(EmmpmFilter::new());
        filter.preflight(&mut dca, &mut ObserverSet::new());
        assert_eq!(filter.error_condition(), codes::GEOMETRY_MISSING);
    }

    #[test]
    fn test_class_count_is_bounded() {
        let mut filter = EmmpmFilter::new();
        assert!(!filter.set_parameter("NumClasses", ParameterValue::Int(1)));
        assert!(!filter.set_parameter("NumClasses", ParameterValue::Int(16)));
        assert!(filter.set_parameter("NumClasses", ParameterValue::Int(3)));
        assert_eq!(filter.params().num_classes, 3);
    }
}
