//! Error handling for microflow
//!
//! This module defines the crate error type and a Result alias. Filter
//! failures are not errors in this sense: they are reported through
//! messages and negative error conditions. `EngineError` covers failures of
//! the surrounding machinery (documents, files, configuration, scripts).

use crate::data::DataError;
use thiserror::Error;

/// Main error type for microflow operations
#[derive(Error, Debug)]
pub enum EngineError {
    /// A data-model operation broke a structural rule
    #[error("Data model error: {0}")]
    Data(#[from] DataError),

    /// A pipeline document is malformed
    #[error("Pipeline document error: {0}")]
    Document(String),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors related to Rhai script compilation or execution
    #[error("Script error: {0}")]
    Script(String),

    /// Image decoding errors
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parse errors
    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<EngineError>,
    },
}

impl EngineError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        EngineError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create a script error from a Rhai evaluation error
    pub fn from_rhai_error(err: Box<rhai::EvalAltResult>) -> Self {
        EngineError::Script(err.to_string())
    }

    /// Create a script error from a Rhai parse error
    pub fn from_parse_error(err: rhai::ParseError) -> Self {
        EngineError::Script(err.to_string())
    }

    /// The innermost error, with all context layers removed
    pub fn root(&self) -> &EngineError {
        match self {
            EngineError::WithContext { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type alias for microflow operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, Box<rhai::EvalAltResult>> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| EngineError::from_rhai_error(e).with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| EngineError::from_rhai_error(e).with_context(f()))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| EngineError::Io(e).with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| EngineError::Io(e).with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field");

        let err = EngineError::Data(DataError::MissingDataContainer("DC".into()));
        assert_eq!(
            err.to_string(),
            "Data model error: Data container 'DC' does not exist"
        );
    }

    #[test]
    fn test_error_with_context() {
        let err = EngineError::Document("no PipelineBuilder".to_string())
            .with_context("Loading pipeline.json");
        assert!(err.to_string().contains("Loading pipeline.json"));
        assert!(err.to_string().contains("no PipelineBuilder"));
        assert!(matches!(err.root(), EngineError::Document(_)));
    }

    #[test]
    fn test_result_ext() {
        let result: Result<()> = Err(EngineError::Script("bad".to_string()));
        let with_ctx = result.context("Evaluating expression");
        assert!(with_ctx.unwrap_err().to_string().contains("Evaluating expression"));

        let io: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let err = io.with_context(|| "Reading config".to_string()).unwrap_err();
        assert!(matches!(err.root(), EngineError::Io(_)));
    }

    #[test]
    fn test_error_from_conversions() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(EngineError::from(json_err), EngineError::Json(_)));

        let toml_err = toml::from_str::<toml::Value>("= 1").unwrap_err();
        assert!(matches!(EngineError::from(toml_err), EngineError::TomlDe(_)));
    }
}
