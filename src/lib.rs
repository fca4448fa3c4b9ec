//! # microflow: filter pipelines over a typed data model
//!
//! microflow runs ordered pipelines of filters against a hierarchical data
//! model of typed arrays, in the manner of DREAM3D. Every filter validates its
//! inputs in a side-effect-free preflight before the pipeline executes
//! anything.
//!
//! ## Architecture
//!
//! - **Data**: `DataContainerArray` → `DataContainer` (optional geometry) →
//!   `AttributeMatrix` (tuple dimensions) → `TypedArray`
//! - **Filters**: the `FilterPlugin` trait, dispatched through the
//!   `BuiltinFilter` enum, with a `FilterManager` name → factory registry
//! - **Pipelines**: `FilterPipeline` preflights then executes its filters,
//!   reporting messages and progress to observers
//! - **Documents**: JSON pipeline files read and written by
//!   `pipeline::document`
//! - **Scripting**: Rhai expressions for the array calculator
//!
//! ## Configuration
//!
//! The host binary reads `config.toml` from `--config`, `MICROFLOW_CONFIG` or
//! the platform config directory; see [`config`].
//!
//! ## Example
//!
//! ```ignore
//! use microflow::{FilterManager, ObserverSet, TracingObserver};
//! use microflow::pipeline::read_pipeline_from_file;
//!
//! let manager = FilterManager::with_builtins();
//! let mut observers = ObserverSet::new();
//! observers.add(TracingObserver);
//!
//! let mut pipeline = read_pipeline_from_file("segment.json".as_ref(), &manager, observers)?;
//! if pipeline.preflight_pipeline() {
//!     let code = pipeline.execute();
//!     println!("finished with {}", code);
//! }
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod filter;
pub mod filters;
pub mod message;
pub mod pipeline;
pub mod scripting;
pub mod types;

// Re-export commonly used types
pub use config::EngineConfig;
pub use data::{
    AttributeMatrix, AttributeMatrixType, DataArrayPath, DataContainer, DataContainerArray,
    Geometry, ImageGeometry, TypedArray,
};
pub use error::{EngineError, Result};
pub use filter::{Filter, FilterManager, FilterPlugin, OverridePolicy};
pub use message::{ObserverSet, PipelineEvent, PipelineMessage, PipelineObserver, TracingObserver};
pub use pipeline::FilterPipeline;
pub use scripting::{CompiledExpression, ScriptEngine};
pub use types::ElementType;
