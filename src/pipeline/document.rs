//! JSON pipeline documents.
//!
//! ```json
//! {
//!     "0": { "Filter_Name": "ReadImage", "Filter_Human_Label": "Read Image", "InputFileName": "a.png" },
//!     "1": { "Filter_Name": "EMMPMFilter", "Filter_Human_Label": "EM/MPM Segmentation", "NumClasses": 2 },
//!     "PipelineBuilder": { "Name": "Segment", "Number_Filters": 2, "Version": 6 }
//! }
//! ```
//!
//! Loading never drops an entry: names that are empty or unknown to the
//! registry become inert placeholders, so the pipeline keeps the length and
//! order of the document.

use super::executor::FilterPipeline;
use crate::data::DataArrayPath;
use crate::error::{EngineError, Result, ResultExt};
use crate::filter::{codes, Filter, FilterManager, FilterParametersReader, FilterParametersWriter};
use crate::filters::EmptyFilter;
use crate::message::{ObserverSet, PipelineMessage};
use serde_json::{Map, Number, Value};
use std::path::Path;
use std::str::FromStr;

pub const PIPELINE_BUILDER: &str = "PipelineBuilder";
pub const NUMBER_FILTERS: &str = "Number_Filters";
pub const PIPELINE_NAME: &str = "Name";
pub const PIPELINE_VERSION: &str = "Version";
pub const FILTER_NAME: &str = "Filter_Name";
pub const FILTER_HUMAN_LABEL: &str = "Filter_Human_Label";

/// Document format version written by [`JsonFilterParametersWriter`]
pub const DOCUMENT_VERSION: u64 = 6;

/// Declared entries allowed beyond the filter groups actually present
pub const MAX_MISSING_GROUPS: usize = 1024;

/// Prefix of messages emitted while resolving document entries
pub const READER_PREFIX: &str = "JsonFilterParametersReader::ReadPipelineFromFile()";

/// Reads filter parameters from a JSON pipeline document
#[derive(Debug, Clone)]
pub struct JsonFilterParametersReader {
    root: Map<String, Value>,
    current: Option<usize>,
}

impl JsonFilterParametersReader {
    pub fn from_value(document: Value) -> Result<Self> {
        match document {
            Value::Object(root) => Ok(Self {
                root,
                current: None,
            }),
            other => Err(EngineError::Document(format!(
                "Expected a JSON object at the document root, found {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Reading pipeline {}", path.display()))?;
        text.parse::<Self>()
            .with_context(|| format!("Parsing pipeline {}", path.display()))
    }

    fn builder(&self) -> Result<&Map<String, Value>> {
        self.root
            .get(PIPELINE_BUILDER)
            .and_then(Value::as_object)
            .ok_or_else(|| {
                EngineError::Document(format!("The document has no '{}' group", PIPELINE_BUILDER))
            })
    }

    /// Number of filter entries declared by the document.
    ///
    /// Entries without a group become placeholders, so a count far beyond
    /// the groups present is refused rather than allocated.
    pub fn filter_count(&self) -> Result<usize> {
        let declared = self
            .builder()?
            .get(NUMBER_FILTERS)
            .and_then(Value::as_u64)
            .ok_or_else(|| {
                EngineError::Document(format!(
                    "'{}' is missing or not a non-negative integer",
                    NUMBER_FILTERS
                ))
            })?;
        let limit = self.group_count().saturating_add(MAX_MISSING_GROUPS);
        match usize::try_from(declared) {
            Ok(count) if count <= limit => Ok(count),
            _ => Err(EngineError::Document(format!(
                "'{}' declares {} filters but the document holds {} filter groups",
                NUMBER_FILTERS,
                declared,
                self.group_count()
            ))),
        }
    }

    /// Number of top-level groups keyed by a filter index
    fn group_count(&self) -> usize {
        self.root
            .keys()
            .filter(|k| k.parse::<usize>().is_ok())
            .count()
    }

    pub fn pipeline_name(&self) -> String {
        self.builder()
            .ok()
            .and_then(|b| b.get(PIPELINE_NAME))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    pub fn version(&self) -> Option<u64> {
        self.builder().ok()?.get(PIPELINE_VERSION)?.as_u64()
    }

    fn group_at(&self, index: usize) -> Option<&Map<String, Value>> {
        self.root.get(&index.to_string()).and_then(Value::as_object)
    }

    /// `Filter_Name` of entry `index`; empty when absent
    pub fn filter_name_at(&self, index: usize) -> String {
        self.group_at(index)
            .and_then(|g| g.get(FILTER_NAME))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    fn value(&self, key: &str) -> Option<&Value> {
        self.group_at(self.current?)?.get(key)
    }
}

impl FromStr for JsonFilterParametersReader {
    type Err = EngineError;

    fn from_str(text: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(text)?)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl FilterParametersReader for JsonFilterParametersReader {
    fn open_filter_group(&mut self, index: usize) -> bool {
        if self.group_at(index).is_some() {
            self.current = Some(index);
            true
        } else {
            self.current = None;
            false
        }
    }

    fn close_filter_group(&mut self) {
        self.current = None;
    }

    fn read_string(&self, key: &str, default: String) -> String {
        match self.value(key) {
            Some(Value::String(s)) => s.clone(),
            _ => default,
        }
    }

    fn read_strings(&self, key: &str, default: Vec<String>) -> Vec<String> {
        match self.value(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => default,
        }
    }

    fn read_bool(&self, key: &str, default: bool) -> bool {
        match self.value(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_i64().map(|v| v != 0).unwrap_or(default),
            _ => default,
        }
    }

    fn read_number(&self, key: &str) -> Option<Number> {
        match self.value(key)? {
            Value::Number(n) => Some(n.clone()),
            _ => None,
        }
    }

    fn read_numbers(&self, key: &str) -> Option<Vec<Number>> {
        match self.value(key)? {
            Value::Array(items) => Some(
                items
                    .iter()
                    .filter_map(|v| match v {
                        Value::Number(n) => Some(n.clone()),
                        _ => None,
                    })
                    .collect(),
            ),
            _ => None,
        }
    }

    fn read_data_array_path(&self, key: &str, default: DataArrayPath) -> DataArrayPath {
        self.value(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or(default)
    }

    fn read_data_array_paths(&self, key: &str, default: Vec<DataArrayPath>) -> Vec<DataArrayPath> {
        self.value(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or(default)
    }
}

/// Builds a JSON pipeline document
#[derive(Debug, Clone)]
pub struct JsonFilterParametersWriter {
    pipeline_name: String,
    root: Map<String, Value>,
    current: Option<(usize, Map<String, Value>)>,
}

impl JsonFilterParametersWriter {
    pub fn new(pipeline_name: impl Into<String>) -> Self {
        Self {
            pipeline_name: pipeline_name.into(),
            root: Map::new(),
            current: None,
        }
    }

    fn insert(&mut self, key: &str, value: Value) {
        match &mut self.current {
            Some((_, group)) => {
                group.insert(key.to_string(), value);
            }
            None => tracing::warn!("Dropping '{}': no filter group is open", key),
        }
    }

    /// Close any open group, add the `PipelineBuilder` group and return the document
    pub fn finish(mut self, filter_count: usize) -> Value {
        self.close_filter_group();
        let mut builder = Map::new();
        builder.insert(PIPELINE_NAME.to_string(), Value::from(self.pipeline_name));
        builder.insert(NUMBER_FILTERS.to_string(), Value::from(filter_count));
        builder.insert(PIPELINE_VERSION.to_string(), Value::from(DOCUMENT_VERSION));
        self.root
            .insert(PIPELINE_BUILDER.to_string(), Value::Object(builder));
        Value::Object(self.root)
    }
}

impl FilterParametersWriter for JsonFilterParametersWriter {
    fn open_filter_group(&mut self, filter_name: &str, human_label: &str, index: usize) {
        self.close_filter_group();
        let mut group = Map::new();
        group.insert(FILTER_NAME.to_string(), Value::from(filter_name));
        group.insert(FILTER_HUMAN_LABEL.to_string(), Value::from(human_label));
        self.current = Some((index, group));
    }

    fn close_filter_group(&mut self) {
        if let Some((index, group)) = self.current.take() {
            self.root.insert(index.to_string(), Value::Object(group));
        }
    }

    fn write_string(&mut self, key: &str, value: &str) {
        self.insert(key, Value::from(value));
    }

    fn write_strings(&mut self, key: &str, values: &[String]) {
        self.insert(key, Value::from(values.to_vec()));
    }

    fn write_bool(&mut self, key: &str, value: bool) {
        self.insert(key, Value::Bool(value));
    }

    fn write_number(&mut self, key: &str, value: Number) {
        self.insert(key, Value::Number(value));
    }

    fn write_numbers(&mut self, key: &str, values: Vec<Number>) {
        self.insert(key, Value::Array(values.into_iter().map(Value::Number).collect()));
    }

    fn write_data_array_path(&mut self, key: &str, value: &DataArrayPath) {
        match serde_json::to_value(value) {
            Ok(v) => self.insert(key, v),
            Err(e) => tracing::warn!("Could not serialize path '{}': {}", value, e),
        }
    }

    fn write_data_array_paths(&mut self, key: &str, values: &[DataArrayPath]) {
        match serde_json::to_value(values) {
            Ok(v) => self.insert(key, v),
            Err(e) => tracing::warn!("Could not serialize paths for '{}': {}", key, e),
        }
    }
}

fn placeholder(name: &str, index: usize, code: i32) -> (Filter, PipelineMessage) {
    let text = if code == codes::MISSING_FILTER_NAME {
        format!(
            "The filter at index {} has no name. The pipeline will not run until it is replaced.",
            index
        )
    } else {
        format!(
            "A filter named '{}' could not be located. The pipeline will not run until it is replaced.",
            name
        )
    };
    let mut filter = Filter::new(EmptyFilter::unknown(name, code));
    let message = PipelineMessage::warning(EmptyFilter::NAME, filter.human_label(), text, code)
        .with_prefix(READER_PREFIX)
        .with_pipeline_index(index);
    filter.mark_unresolved(message.clone());
    (filter, message)
}

/// Build a pipeline from `document`, resolving names through `manager`.
///
/// `observers` receive a warning for every placeholder and are then installed
/// on the returned pipeline.
pub fn read_pipeline(
    document: &Value,
    manager: &FilterManager,
    mut observers: ObserverSet,
) -> Result<FilterPipeline> {
    let mut reader = JsonFilterParametersReader::from_value(document.clone())?;
    let count = reader.filter_count()?;
    let mut pipeline = FilterPipeline::with_name(reader.pipeline_name());

    for index in 0..count {
        let name = reader.filter_name_at(index);
        let created = if name.is_empty() {
            None
        } else {
            manager.create_filter(&name)
        };
        match created {
            Some(mut filter) => {
                filter.read_parameters(&mut reader, index);
                pipeline.push_back(filter);
            }
            None => {
                let code = if name.is_empty() {
                    codes::MISSING_FILTER_NAME
                } else {
                    codes::UNKNOWN_FILTER
                };
                tracing::warn!("Entry {} ('{}') replaced by a placeholder ({})", index, name, code);
                let (filter, message) = placeholder(&name, index, code);
                observers.notify_message(message);
                pipeline.push_back(filter);
            }
        }
    }

    tracing::info!(
        "Loaded pipeline '{}' with {} filters",
        pipeline.name(),
        pipeline.len()
    );
    pipeline.set_observers(observers);
    Ok(pipeline)
}

pub fn read_pipeline_from_file(
    path: &Path,
    manager: &FilterManager,
    observers: ObserverSet,
) -> Result<FilterPipeline> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Reading pipeline {}", path.display()))?;
    let document: Value = serde_json::from_str(&text)
        .map_err(EngineError::from)
        .with_context(|| format!("Parsing pipeline {}", path.display()))?;
    read_pipeline(&document, manager, observers)
        .with_context(|| format!("Loading pipeline {}", path.display()))
}

/// Serialize every filter of `pipeline`, placeholders included
pub fn write_pipeline(pipeline: &FilterPipeline) -> Value {
    let mut writer = JsonFilterParametersWriter::new(pipeline.name());
    let mut index = 0;
    for filter in pipeline.filters() {
        index = filter.write_parameters(&mut writer, index);
    }
    writer.finish(index)
}

pub fn write_pipeline_to_file(pipeline: &FilterPipeline, path: &Path) -> Result<()> {
    let text = serde_json::to_string_pretty(&write_pipeline(pipeline))?;
    std::fs::write(path, text).with_context(|| format!("Writing pipeline {}", path.display()))
}
