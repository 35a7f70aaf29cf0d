//! Side-channel diagnostics emitted during evaluation
//! Codes follow the same stable-string style as the verdict reasons

use serde::{Serialize, Serializer};
use crate::types::DetectorEvaluationError;

/// Stable diagnostic codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[allow(non_camel_case_types)]
pub enum DiagnosticCode {
    /// Detector returned an error
    D001_DETECTOR_FAILED,
    /// Detector panicked
    D002_DETECTOR_PANICKED,
    /// No detectors registered, verdict is trivially negative
    D003_EMPTY_REGISTRY,
}

impl DiagnosticCode {
    /// Get the code string (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::D001_DETECTOR_FAILED => "D001_DETECTOR_FAILED",
            Self::D002_DETECTOR_PANICKED => "D002_DETECTOR_PANICKED",
            Self::D003_EMPTY_REGISTRY => "D003_EMPTY_REGISTRY",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::D001_DETECTOR_FAILED => "Detector failed, outcome set by failure policy",
            Self::D002_DETECTOR_PANICKED => "Detector panicked, outcome set by failure policy",
            Self::D003_EMPTY_REGISTRY => "No detectors registered, possible misconfiguration",
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}

/// One diagnostic record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A detector could not produce an outcome
    DetectorFault {
        detector: String,
        error: DetectorEvaluationError,
        /// Outcome recorded in place of the missing one
        recorded: bool,
    },
    /// Evaluation ran against an empty registry
    EmptyRegistry,
}

impl Diagnostic {
    pub fn code(&self) -> DiagnosticCode {
        match self {
            Self::DetectorFault { error: DetectorEvaluationError::Panicked(_), .. } => {
                DiagnosticCode::D002_DETECTOR_PANICKED
            }
            Self::DetectorFault { .. } => DiagnosticCode::D001_DETECTOR_FAILED,
            Self::EmptyRegistry => DiagnosticCode::D003_EMPTY_REGISTRY,
        }
    }

    /// Detector the diagnostic concerns, if any
    pub fn detector(&self) -> Option<&str> {
        match self {
            Self::DetectorFault { detector, .. } => Some(detector),
            Self::EmptyRegistry => None,
        }
    }

    /// Log this diagnostic as a structured warning
    pub fn emit(&self) {
        match self {
            Self::DetectorFault { detector, error, recorded } => {
                tracing::warn!(
                    code = self.code().code(),
                    detector = %detector,
                    recorded = *recorded,
                    error = %error,
                    "Detector evaluation failed"
                );
            }
            Self::EmptyRegistry => {
                tracing::warn!(
                    code = self.code().code(),
                    "Evaluation ran with zero registered detectors"
                );
            }
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DetectorFault { detector, error, recorded } => write!(
                f,
                "{} [{}] {} (recorded as {})",
                self.code().code(),
                detector,
                error,
                recorded
            ),
            Self::EmptyRegistry => write!(f, "{}", self.code()),
        }
    }
}

/// Diagnostics go over the wire as flat records
impl Serialize for Diagnostic {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Diagnostic", 4)?;
        state.serialize_field("code", self.code().code())?;
        state.serialize_field("detector", &self.detector())?;
        match self {
            Self::DetectorFault { error, recorded, .. } => {
                state.serialize_field("message", &error.to_string())?;
                state.serialize_field("recorded", &Some(*recorded))?;
            }
            Self::EmptyRegistry => {
                state.serialize_field("message", self.code().description())?;
                state.serialize_field("recorded", &None::<bool>)?;
            }
        }
        state.end()
    }
}
