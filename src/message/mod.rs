//! Messages emitted by filters and pipelines, and the observers that receive them.
//!
//! A [`PipelineMessage`] carries the emitting filter's identity, a numeric
//! code and a kind. Messages are pushed to every registered
//! [`PipelineObserver`] synchronously, in emission order.

mod observer;

pub use observer::{ChannelObserver, ObserverSet, PipelineEvent, PipelineObserver, TracingObserver};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity or purpose of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    Error,
    Warning,
    Status,
    Progress,
}

/// A single message emitted during loading, preflight or execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineMessage {
    /// Class name of the emitting filter (`"ReadImage"`)
    pub filter_name: String,
    /// Human label of the emitting filter (`"Read Image"`)
    pub human_label: String,
    /// Free-form origin, usually a function or subsystem name
    pub prefix: String,
    pub text: String,
    pub code: i32,
    pub kind: MessageKind,
    /// Position of the emitting filter in its pipeline
    pub pipeline_index: Option<usize>,
    /// Percentage for progress messages
    pub progress: Option<u8>,
}

impl PipelineMessage {
    pub fn new(
        kind: MessageKind,
        filter_name: impl Into<String>,
        human_label: impl Into<String>,
        text: impl Into<String>,
        code: i32,
    ) -> Self {
        Self {
            filter_name: filter_name.into(),
            human_label: human_label.into(),
            prefix: String::new(),
            text: text.into(),
            code,
            kind,
            pipeline_index: None,
            progress: None,
        }
    }

    pub fn error(
        filter_name: impl Into<String>,
        human_label: impl Into<String>,
        text: impl Into<String>,
        code: i32,
    ) -> Self {
        Self::new(MessageKind::Error, filter_name, human_label, text, code)
    }

    pub fn warning(
        filter_name: impl Into<String>,
        human_label: impl Into<String>,
        text: impl Into<String>,
        code: i32,
    ) -> Self {
        Self::new(MessageKind::Warning, filter_name, human_label, text, code)
    }

    pub fn status(
        filter_name: impl Into<String>,
        human_label: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self::new(MessageKind::Status, filter_name, human_label, text, 0)
    }

    pub fn progress(
        filter_name: impl Into<String>,
        human_label: impl Into<String>,
        text: impl Into<String>,
        percent: u8,
    ) -> Self {
        let mut message = Self::new(MessageKind::Progress, filter_name, human_label, text, 0);
        message.progress = Some(percent.min(100));
        message
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_pipeline_index(mut self, index: usize) -> Self {
        self.pipeline_index = Some(index);
        self
    }

    pub fn is_error(&self) -> bool {
        self.kind == MessageKind::Error
    }

    pub fn is_warning(&self) -> bool {
        self.kind == MessageKind::Warning
    }

    fn origin(&self) -> &str {
        if self.human_label.is_empty() {
            &self.filter_name
        } else {
            &self.human_label
        }
    }
}

impl fmt::Display for PipelineMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(index) = self.pipeline_index {
            write!(f, "[{}] ", index)?;
        }
        match self.kind {
            MessageKind::Error => write!(f, "Error ({}): {}: {}", self.code, self.origin(), self.text),
            MessageKind::Warning => {
                write!(f, "Warning ({}): {}: {}", self.code, self.origin(), self.text)
            }
            MessageKind::Status => write!(f, "{}: {}", self.origin(), self.text),
            MessageKind::Progress => write!(
                f,
                "{}: {} ({}%)",
                self.origin(),
                self.text,
                self.progress.unwrap_or(0)
            ),
        }
    }
}
