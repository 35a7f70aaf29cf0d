//! Error types for registration, evaluation, configuration and audit

use thiserror::Error;

/// Two detectors registered under the same name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("detector '{name}' is already registered")]
pub struct DuplicateDetectorError {
    pub name: String,
}

/// A single detector failed while evaluating a snapshot
///
/// Never aborts an evaluation; the engine turns it into a diagnostic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectorEvaluationError {
    /// The snapshot lacks an attribute the detector needs
    #[error("snapshot attribute '{0}' is missing")]
    MissingAttribute(&'static str),

    /// The detector reported a failure of its own
    #[error("detector failed: {0}")]
    Failed(String),

    /// The detector panicked
    #[error("detector panicked: {0}")]
    Panicked(String),
}

/// Configuration could not be loaded or is invalid
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to extract configuration: {0}")]
    Extract(#[from] Box<figment::Error>),

    #[error("Configuration file not found: {}", .0.display())]
    NotFound(std::path::PathBuf),

    #[error("Unknown detector in disabled_detectors: {0}")]
    UnknownDetector(String),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Extract(Box::new(err))
    }
}

/// Audit record could not be written
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Failed to serialize audit record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write audit log: {0}")]
    Io(#[from] std::io::Error),
}
