//! Ordered filter pipelines and their JSON documents.
//!
//! A [`FilterPipeline`] owns its filters and a seed
//! [`DataContainerArray`](crate::data::DataContainerArray). Every preflight or
//! execute pass starts from a fresh copy of the seed and runs the filters in
//! order against it.
//!
//! ```text
//! seed ──clone──► [ReadImage] ──► [RgbToGray] ──► [EMMPMFilter] ──► data
//! ```
//!
//! Documents map each filter to a numbered group plus a `PipelineBuilder`
//! group; see [`document`].

pub mod document;
pub mod executor;

pub use document::{
    read_pipeline, read_pipeline_from_file, write_pipeline, write_pipeline_to_file,
    JsonFilterParametersReader, JsonFilterParametersWriter,
};
pub use executor::{FilterPipeline, PIPELINE_SOURCE};
