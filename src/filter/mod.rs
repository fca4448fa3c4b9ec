//! Filter contract, parameters and registry.
//!
//! A [`Filter`] wraps one filter implementation ([`AnyFilter`]) together with
//! the state the engine tracks for it: parameter descriptors, accumulated
//! messages, error and warning conditions, and its lifecycle phase.
//!
//! ```text
//! Unconfigured ──read/set parameters──▶ Configured ──preflight──▶ Preflighted
//!                                           ▲                        │
//!                                           └──── parameter change ──┤
//!                                                                    ▼
//!                                                                 Executed
//! ```
//!
//! `execute` always reruns the data check on the data it is given, so a
//! filter reaches `Executed` only after passing a fresh check.

pub mod codes;
pub mod context;
pub mod io;
pub mod node;
pub mod parameter;
pub mod registry;

pub use context::{FilterContext, RunPhase};
pub use io::{FilterParametersReader, FilterParametersWriter, Scalar};
pub use node::{AnyFilter, BuiltinFilter, FilterPlugin};
pub use parameter::{FilterParameter, ParameterKind, ParameterValue};
pub use registry::{FilterFactory, FilterLibrary, FilterManager, OverridePolicy, Registration};

use crate::data::DataContainerArray;
use crate::message::{ObserverSet, PipelineEvent, PipelineMessage};

/// Lifecycle phase of a filter instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterPhase {
    #[default]
    Unconfigured,
    Configured,
    Preflighted,
    Executed,
}

/// Messages and conditions accumulated by a filter since its last reset
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterStatus {
    error_condition: i32,
    warning_condition: i32,
    messages: Vec<PipelineMessage>,
}

impl FilterStatus {
    /// Most negative error code reported, or 0
    pub fn error_condition(&self) -> i32 {
        self.error_condition
    }

    /// Most negative warning code reported, or 0
    pub fn warning_condition(&self) -> i32 {
        self.warning_condition
    }

    pub fn messages(&self) -> &[PipelineMessage] {
        &self.messages
    }

    pub fn record_error(&mut self, code: i32) {
        self.error_condition = self.error_condition.min(code);
    }

    pub fn record_warning(&mut self, code: i32) {
        self.warning_condition = self.warning_condition.min(code);
    }

    pub fn push(&mut self, message: PipelineMessage) {
        self.messages.push(message);
    }

    pub fn reset(&mut self) {
        self.error_condition = 0;
        self.warning_condition = 0;
        self.messages.clear();
    }
}

/// A configured filter instance as it sits in a pipeline
#[derive(Debug)]
pub struct Filter {
    inner: AnyFilter,
    parameters: Vec<FilterParameter>,
    status: FilterStatus,
    phase: FilterPhase,
    pipeline_index: Option<usize>,
    /// Set for placeholders created while loading a document
    unresolved: Option<PipelineMessage>,
}

impl Filter {
    pub fn new(inner: impl Into<AnyFilter>) -> Self {
        let inner = inner.into();
        let parameters = inner.setup_parameters();
        Self {
            inner,
            parameters,
            status: FilterStatus::default(),
            phase: FilterPhase::Unconfigured,
            pipeline_index: None,
            unresolved: None,
        }
    }

    pub fn from_plugin(plugin: impl FilterPlugin + 'static) -> Self {
        Self::new(AnyFilter::plugin(plugin))
    }

    pub fn filter_name(&self) -> &str {
        self.inner.filter_name()
    }

    pub fn human_label(&self) -> &str {
        self.inner.human_label()
    }

    pub fn group_name(&self) -> &str {
        self.inner.group_name()
    }

    pub fn sub_group_name(&self) -> &str {
        self.inner.sub_group_name()
    }

    pub fn inner(&self) -> &AnyFilter {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut AnyFilter {
        &mut self.inner
    }

    pub fn parameters(&self) -> &[FilterParameter] {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<ParameterValue> {
        self.inner.parameter(name)
    }

    /// Update a parameter; a successful change requires a new preflight
    pub fn set_parameter(&mut self, name: &str, value: ParameterValue) -> bool {
        let accepted = self.inner.set_parameter(name, value);
        if accepted {
            self.phase = FilterPhase::Configured;
        } else {
            tracing::warn!(
                "Filter '{}' rejected value for parameter '{}'",
                self.filter_name(),
                name
            );
        }
        accepted
    }

    pub fn status(&self) -> &FilterStatus {
        &self.status
    }

    pub fn error_condition(&self) -> i32 {
        self.status.error_condition()
    }

    pub fn warning_condition(&self) -> i32 {
        self.status.warning_condition()
    }

    pub fn messages(&self) -> &[PipelineMessage] {
        self.status.messages()
    }

    pub fn phase(&self) -> FilterPhase {
        self.phase
    }

    pub fn pipeline_index(&self) -> Option<usize> {
        self.pipeline_index
    }

    pub(crate) fn set_pipeline_index(&mut self, index: usize) {
        self.pipeline_index = Some(index);
    }

    /// True for placeholders standing in for unresolved document entries
    pub fn is_placeholder(&self) -> bool {
        self.inner.as_placeholder().is_some()
    }

    /// Mark this filter as a placeholder for an entry that could not be
    /// resolved. The message's code becomes the error condition and survives
    /// resets.
    pub(crate) fn mark_unresolved(&mut self, message: PipelineMessage) {
        self.status.record_error(message.code);
        self.status.push(message.clone());
        self.unresolved = Some(message);
    }

    /// Clear messages and conditions so the instance can be run again
    pub fn reset(&mut self) {
        self.status.reset();
        if let Some(message) = &self.unresolved {
            self.status.record_error(message.code);
            self.status.push(message.clone());
        }
        if self.phase != FilterPhase::Unconfigured {
            self.phase = FilterPhase::Configured;
        }
    }

    /// Name written to documents; placeholders keep the name they replaced
    pub fn document_name(&self) -> &str {
        match (&self.unresolved, self.inner.as_placeholder()) {
            (Some(_), Some(placeholder)) => placeholder.original_filter_name(),
            _ => self.filter_name(),
        }
    }

    /// Load parameters from the filter group at `index`. Missing or invalid
    /// values keep their current setting.
    pub fn read_parameters(&mut self, reader: &mut dyn FilterParametersReader, index: usize) {
        if reader.open_filter_group(index) {
            let Filter {
                inner, parameters, ..
            } = self;
            for param in parameters.iter() {
                let current = inner
                    .parameter(param.name)
                    .unwrap_or_else(|| param.default.clone());
                let value = param.read(&*reader, current);
                inner.set_parameter(param.name, value);
            }
            reader.close_filter_group();
        } else {
            tracing::debug!(
                "No parameter group {} for '{}', keeping defaults",
                index,
                self.filter_name()
            );
        }
        self.phase = FilterPhase::Configured;
    }

    /// Write this filter's group at `index`; returns the next free index
    pub fn write_parameters(&self, writer: &mut dyn FilterParametersWriter, index: usize) -> usize {
        writer.open_filter_group(self.document_name(), self.human_label(), index);
        for param in &self.parameters {
            let value = self
                .inner
                .parameter(param.name)
                .unwrap_or_else(|| param.default.clone());
            param.write(writer, &value);
        }
        writer.close_filter_group();
        index + 1
    }

    fn run(&mut self, data: &mut DataContainerArray, observers: &mut ObserverSet, phase: RunPhase) {
        self.reset();
        let filter_name = self.filter_name().to_string();
        let human_label = self.human_label().to_string();
        let Filter {
            inner,
            status,
            pipeline_index,
            ..
        } = self;
        let mut ctx = FilterContext::new(
            data,
            status,
            observers,
            &filter_name,
            &human_label,
            *pipeline_index,
            phase,
        );
        inner.data_check(&mut ctx);
        if phase == RunPhase::Execute && !ctx.has_errors() {
            inner.execute(&mut ctx);
            if !ctx.has_errors() {
                ctx.status(format!("{} Completed", human_label));
            }
        }
    }

    /// Run the data check only: validate prerequisites and declare outputs
    pub fn preflight(&mut self, data: &mut DataContainerArray, observers: &mut ObserverSet) {
        observers.notify(&PipelineEvent::PreflightAboutToExecute {
            index: self.pipeline_index,
            filter: self.filter_name().to_string(),
        });
        self.run(data, observers, RunPhase::Preflight);
        if self.error_condition() >= 0 {
            self.phase = FilterPhase::Preflighted;
        }
        observers.notify(&PipelineEvent::PreflightExecuted {
            index: self.pipeline_index,
            filter: self.filter_name().to_string(),
            error_condition: self.error_condition(),
        });
    }

    /// Rerun the data check and, if it passes, perform the filter's work
    pub fn execute(&mut self, data: &mut DataContainerArray, observers: &mut ObserverSet) {
        self.run(data, observers, RunPhase::Execute);
        if self.error_condition() >= 0 {
            self.phase = FilterPhase::Executed;
        }
        observers.notify(&PipelineEvent::FilterExecuted {
            index: self.pipeline_index,
            filter: self.filter_name().to_string(),
            error_condition: self.error_condition(),
        });
    }
}

impl From<AnyFilter> for Filter {
    fn from(inner: AnyFilter) -> Self {
        Filter::new(inner)
    }
}
