//! Core types for botcheck

mod snapshot;
mod result;
mod diagnostic;
mod error;
mod report;

pub use snapshot::Snapshot;
pub use result::{DetectionResult, Verdict};
pub use diagnostic::{Diagnostic, DiagnosticCode};
pub use error::{DuplicateDetectorError, DetectorEvaluationError, ConfigError, AuditError};
pub use report::{Evaluation, EvaluationReport};
