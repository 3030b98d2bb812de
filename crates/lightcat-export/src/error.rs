//! Error types for exporting fixtures
use lightcat_core::CoreError;
use thiserror::Error;

/// Export errors
#[derive(Error, Debug)]
pub enum ExportError {
    /// Model or scaling error
    #[error(transparent)]
    Core(#[from] CoreError),

    /// XML writer failure
    #[error("XML error: {0}")]
    Xml(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A single (fixture, mode) pair failed
    #[error("Export of fixture '{fixture}' mode '{mode}' failed: {source}")]
    Item {
        fixture: String,
        mode: String,
        #[source]
        source: Box<ExportError>,
    },

    /// No export plugin with this key
    #[error("Unknown export plugin: {0}")]
    UnknownPlugin(String),
}

impl ExportError {
    /// Attach the fixture and mode an error occurred in
    pub fn for_item(self, fixture: impl Into<String>, mode: impl Into<String>) -> Self {
        ExportError::Item {
            fixture: fixture.into(),
            mode: mode.into(),
            source: Box::new(self),
        }
    }

    /// Innermost error, skipping `Item` wrappers
    pub fn root_cause(&self) -> &ExportError {
        match self {
            ExportError::Item { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

pub(crate) fn xml_error(err: impl std::fmt::Display) -> ExportError {
    ExportError::Xml(err.to_string())
}

/// Result type for export operations
pub type Result<T> = std::result::Result<T, ExportError>;
