//! Integration tests for pipeline documents
//!
//! These tests validate loading and saving JSON pipelines:
//! - Unknown and unnamed entries become placeholders in place
//! - Placeholder warnings reach observers
//! - Written parameters read back unchanged

mod common;

use common::builders::DocumentBuilder;
use common::recording_observers;
use microflow::filter::{codes, ParameterValue};
use microflow::filters::{
    ArrayCalculator, CreateDataArray, EmmpmFilter, MultiEmmpmFilter, ReadImage,
    RenameAttributeArray, RgbToGray, SegmentationParams,
};
use microflow::message::MessageKind;
use microflow::pipeline::{
    read_pipeline, read_pipeline_from_file, write_pipeline, write_pipeline_to_file,
    JsonFilterParametersReader,
};
use microflow::types::ElementType;
use microflow::{DataArrayPath, EngineError, Filter, FilterManager, FilterPipeline, ObserverSet};
use serde_json::json;

#[test]
fn test_unknown_filter_keeps_its_slot() {
    let doc = DocumentBuilder::new("Mixed")
        .filter("CreateDataArray", json!({}))
        .filter("FindEllipsoidError", json!({ "Anything": 1 }))
        .filter("RGBToGray", json!({}))
        .build();
    let pipeline = read_pipeline(&doc, &FilterManager::with_builtins(), ObserverSet::new()).unwrap();

    assert_eq!(pipeline.len(), 3);
    let placeholder = pipeline.filter(1).unwrap();
    assert!(placeholder.is_placeholder());
    assert_eq!(placeholder.error_condition(), codes::UNKNOWN_FILTER);
    assert_eq!(placeholder.document_name(), "FindEllipsoidError");
    assert_eq!(placeholder.human_label(), "UNKNOWN FILTER: FindEllipsoidError");
    assert_eq!(pipeline.filter(2).unwrap().filter_name(), RgbToGray::NAME);
    assert_eq!(pipeline.filter(2).unwrap().pipeline_index(), Some(2));
}

#[test]
fn test_missing_name_becomes_placeholder() {
    let doc = DocumentBuilder::new("Unnamed")
        .filter("", json!({}))
        .unnamed()
        .build();
    let pipeline = read_pipeline(&doc, &FilterManager::with_builtins(), ObserverSet::new()).unwrap();

    assert_eq!(pipeline.len(), 2);
    for filter in pipeline.filters() {
        assert!(filter.is_placeholder());
        assert_eq!(filter.error_condition(), codes::MISSING_FILTER_NAME);
    }
}

#[test]
fn test_mixed_document_slots() {
    let doc = DocumentBuilder::new("Three")
        .filter("CreateDataArray", json!({ "NewArray": "DC|AM|X" }))
        .filter("", json!({}))
        .filter("NoSuchFilter", json!({}))
        .build();
    let (observers, log) = recording_observers();
    let pipeline = read_pipeline(&doc, &FilterManager::with_builtins(), observers).unwrap();

    assert_eq!(pipeline.len(), 3);
    assert!(!pipeline.filter(0).unwrap().is_placeholder());
    assert_eq!(
        pipeline.filter(1).unwrap().error_condition(),
        codes::MISSING_FILTER_NAME
    );
    assert_eq!(pipeline.filter(2).unwrap().error_condition(), codes::UNKNOWN_FILTER);

    let warnings: Vec<_> = log
        .lock()
        .unwrap()
        .iter()
        .filter_map(|e| e.as_message().cloned())
        .collect();
    assert_eq!(warnings.len(), 2);
    assert!(warnings.iter().all(|m| m.kind == MessageKind::Warning));
    assert_eq!(warnings[0].code, codes::MISSING_FILTER_NAME);
    assert_eq!(warnings[0].pipeline_index, Some(1));
    assert_eq!(warnings[1].code, codes::UNKNOWN_FILTER);
    assert!(warnings[1].text.contains("NoSuchFilter"));
}

#[test]
fn test_placeholder_blocks_execution() {
    let doc = DocumentBuilder::new("Blocked")
        .filter("CreateDataArray", json!({ "NewArray": "DC|AM|X" }))
        .filter("NoSuchFilter", json!({}))
        .build();
    let mut pipeline =
        read_pipeline(&doc, &FilterManager::with_builtins(), ObserverSet::new()).unwrap();

    assert!(!pipeline.preflight_pipeline());
    assert!(pipeline.execute() < 0);
    // The code survives every reset
    assert_eq!(pipeline.filter(1).unwrap().error_condition(), codes::UNKNOWN_FILTER);
}

#[test]
fn test_malformed_documents() {
    let manager = FilterManager::with_builtins();
    let no_builder = json!({ "0": { "Filter_Name": "ReadImage" } });
    let err = read_pipeline(&no_builder, &manager, ObserverSet::new()).unwrap_err();
    assert!(matches!(err.root(), EngineError::Document(_)));

    let not_object = json!("pipeline");
    assert!(read_pipeline(&not_object, &manager, ObserverSet::new()).is_err());
}

#[test]
fn test_declared_count_beyond_groups_is_bounded() {
    let manager = FilterManager::with_builtins();
    let absurd = json!({
        "0": { "Filter_Name": "CreateDataArray" },
        "PipelineBuilder": { "Name": "Huge", "Number_Filters": 1_000_000_000_000u64, "Version": 6 }
    });
    let err = read_pipeline(&absurd, &manager, ObserverSet::new()).unwrap_err();
    assert!(matches!(err.root(), EngineError::Document(_)));

    let short = json!({
        "0": { "Filter_Name": "CreateDataArray" },
        "PipelineBuilder": { "Name": "Short", "Number_Filters": 3, "Version": 6 }
    });
    let pipeline = read_pipeline(&short, &manager, ObserverSet::new()).unwrap();
    assert_eq!(pipeline.len(), 3);
    assert_eq!(
        pipeline.filter(2).unwrap().error_condition(),
        codes::MISSING_FILTER_NAME
    );
}

fn configured_pipeline() -> FilterPipeline {
    let mut pipeline = FilterPipeline::with_name("Round Trip");
    pipeline.push_back(
        ReadImage::new()
            .with_input_file("/data/slice_001.tif")
            .with_data_container_name("Slices"),
    );
    let mut gray = Filter::new(
        RgbToGray::new()
            .with_input(DataArrayPath::new("Slices", "CellData", "ImageData"))
            .with_output_name("Gray"),
    );
    assert!(gray.set_parameter("ColorWeights", ParameterValue::FloatVec3([0.25, 0.5, 0.25])));
    pipeline.push_back(gray);
    pipeline.push_back(
        EmmpmFilter::new()
            .with_input(DataArrayPath::new("Slices", "CellData", "Gray"))
            .with_params(SegmentationParams {
                num_classes: 4,
                em_iterations: 12,
                mpm_iterations: 3,
                beta: 0.375,
            }),
    );
    pipeline.push_back(
        MultiEmmpmFilter::new()
            .with_inputs(vec![
                DataArrayPath::new("Slices", "CellData", "Gray"),
                DataArrayPath::new("Slices", "CellData", "Other"),
            ])
            .with_output_prefix("Seg_"),
    );
    pipeline.push_back(
        CreateDataArray::new()
            .with_array(DataArrayPath::new("Slices", "CellData", "Mask"), ElementType::Bool)
            .with_components(2)
            .with_value("true"),
    );
    pipeline.push_back(RenameAttributeArray::new(
        DataArrayPath::new("Slices", "CellData", "Mask"),
        "Renamed",
    ));
    pipeline.push_back(
        ArrayCalculator::new()
            .with_input(DataArrayPath::new("Slices", "CellData", "Gray"))
            .with_expression("clamp(value * 2.0, 0.0, 255.0)")
            .with_output_name("Doubled"),
    );
    pipeline
}

fn assert_same_parameters(a: &FilterPipeline, b: &FilterPipeline) {
    assert_eq!(a.len(), b.len());
    for (left, right) in a.filters().iter().zip(b.filters()) {
        assert_eq!(left.filter_name(), right.filter_name());
        for param in left.parameters() {
            assert_eq!(
                left.parameter(param.name),
                right.parameter(param.name),
                "parameter '{}' of '{}'",
                param.name,
                left.filter_name()
            );
        }
    }
}

#[test]
fn test_parameters_round_trip() {
    let original = configured_pipeline();
    let doc = write_pipeline(&original);
    assert_eq!(doc["PipelineBuilder"]["Number_Filters"], json!(7));
    assert_eq!(doc["PipelineBuilder"]["Name"], json!("Round Trip"));

    let loaded = read_pipeline(&doc, &FilterManager::with_builtins(), ObserverSet::new()).unwrap();
    assert_eq!(loaded.name(), "Round Trip");
    assert_same_parameters(&original, &loaded);
}

#[test]
fn test_round_trip_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pipeline.json");
    let original = configured_pipeline();
    write_pipeline_to_file(&original, &path).unwrap();

    let reader = JsonFilterParametersReader::from_file(&path).unwrap();
    assert_eq!(reader.filter_count().unwrap(), 7);
    assert_eq!(reader.filter_name_at(2), EmmpmFilter::NAME);

    let loaded =
        read_pipeline_from_file(&path, &FilterManager::with_builtins(), ObserverSet::new()).unwrap();
    assert_same_parameters(&original, &loaded);
}

#[test]
fn test_placeholders_round_trip_their_names() {
    let doc = DocumentBuilder::new("Placeholders")
        .filter("NoSuchFilter", json!({}))
        .unnamed()
        .build();
    let manager = FilterManager::with_builtins();
    let pipeline = read_pipeline(&doc, &manager, ObserverSet::new()).unwrap();

    let written = write_pipeline(&pipeline);
    assert_eq!(written["0"]["Filter_Name"], json!("NoSuchFilter"));
    assert_eq!(written["1"]["Filter_Name"], json!(""));

    let reloaded = read_pipeline(&written, &manager, ObserverSet::new()).unwrap();
    assert_eq!(reloaded.filter(0).unwrap().error_condition(), codes::UNKNOWN_FILTER);
    assert_eq!(
        reloaded.filter(1).unwrap().error_condition(),
        codes::MISSING_FILTER_NAME
    );
}

#[test]
fn test_missing_file_is_an_error() {
    let result = read_pipeline_from_file(
        std::path::Path::new("/no/such/pipeline.json"),
        &FilterManager::with_builtins(),
        ObserverSet::new(),
    );
    assert!(matches!(result.unwrap_err().root(), EngineError::Io(_)));
}
