//! Error types for the fixture model and the scaling engine
use thiserror::Error;

/// Core errors
#[derive(Error, Debug)]
pub enum CoreError {
    /// A DMX value does not fit into the given resolution
    #[error("DMX value {value} is out of range for resolution {resolution}")]
    OutOfRange { value: u64, resolution: u32 },

    /// Resolution is zero or larger than the engine supports
    #[error("Invalid DMX resolution: {0}")]
    InvalidResolution(u32),

    /// Range start is greater than its end
    #[error("Invalid DMX range: [{start}, {end}]")]
    InvalidRange { start: u64, end: u64 },

    /// A mode references a channel that its fixture does not define
    #[error("Mode '{mode}' of fixture '{fixture}' references unknown channel '{channel}'")]
    UnresolvedReference {
        fixture: String,
        mode: String,
        channel: String,
    },

    /// A structure that cannot be classified safely
    #[error("Unsupported structure: {0}")]
    UnsupportedStructure(String),

    /// Fixture definition is inconsistent
    #[error("Invalid fixture '{fixture}': {reason}")]
    InvalidFixture { fixture: String, reason: String },

    /// Manufacturer key missing from the registry
    #[error("Unknown manufacturer: {0}")]
    UnknownManufacturer(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

impl CoreError {
    /// Whether this error is one of the scaling precondition violations
    pub fn is_out_of_range(&self) -> bool {
        matches!(
            self,
            CoreError::OutOfRange { .. }
                | CoreError::InvalidResolution(_)
                | CoreError::InvalidRange { .. }
        )
    }

    pub(crate) fn invalid_fixture(fixture: &str, reason: impl Into<String>) -> Self {
        CoreError::InvalidFixture {
            fixture: fixture.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
