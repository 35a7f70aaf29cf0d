//! Evaluation Engine: runs every registered detector against a snapshot
//!
//! A faulting detector never aborts the batch:
//! - `Err` or panic → outcome recorded per `FailurePolicy`
//! - a diagnostic is emitted and collected
//! - remaining detectors still run

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use crate::core::DetectorRegistry;
use crate::types::{DetectionResult, DetectorEvaluationError, Diagnostic, Evaluation, Snapshot};

/// Outcome recorded for a detector that could not evaluate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Treat as signal absent (`false`)
    #[default]
    FailOpen,
    /// Treat as signal present (`true`)
    FailSafe,
}

impl FailurePolicy {
    /// Outcome to record for a faulting detector
    pub fn outcome(&self) -> bool {
        matches!(self, Self::FailSafe)
    }
}

/// Runs a shared, read-only registry against snapshots
#[derive(Debug, Clone)]
pub struct EvaluationEngine {
    registry: Arc<DetectorRegistry>,
    policy: FailurePolicy,
}

impl EvaluationEngine {
    /// Create engine with the default fail-open policy
    pub fn new(registry: DetectorRegistry) -> Self {
        Self::with_policy(registry, FailurePolicy::default())
    }

    /// Create engine with an explicit failure policy
    pub fn with_policy(registry: DetectorRegistry, policy: FailurePolicy) -> Self {
        Self {
            registry: Arc::new(registry),
            policy,
        }
    }

    pub fn registry(&self) -> &DetectorRegistry {
        &self.registry
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Evaluate all detectors; diagnostics go to the log only
    pub fn evaluate(&self, snapshot: &Snapshot) -> DetectionResult {
        self.evaluate_with_diagnostics(snapshot).result
    }

    /// Evaluate all detectors and hand back the diagnostics as well
    pub fn evaluate_with_diagnostics(&self, snapshot: &Snapshot) -> Evaluation {
        let mut result = DetectionResult::with_capacity(self.registry.len());
        let mut diagnostics = Vec::new();

        if self.registry.is_empty() {
            let diag = Diagnostic::EmptyRegistry;
            diag.emit();
            diagnostics.push(diag);
            return Evaluation { result, diagnostics };
        }

        for (name, predicate) in self.registry.list() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| predicate(snapshot)))
                .unwrap_or_else(|payload| Err(DetectorEvaluationError::Panicked(panic_message(payload.as_ref()))));

            match outcome {
                Ok(fired) => {
                    tracing::trace!(detector = name, fired, "Detector evaluated");
                    result.record(name, fired);
                }
                Err(error) => {
                    let recorded = self.policy.outcome();
                    let diag = Diagnostic::DetectorFault {
                        detector: name.to_string(),
                        error,
                        recorded,
                    };
                    diag.emit();
                    diagnostics.push(diag);
                    result.record(name, recorded);
                }
            }
        }

        tracing::debug!(
            detectors = result.len(),
            fired = result.fired_count(),
            faults = diagnostics.len(),
            "Evaluation complete"
        );

        Evaluation { result, diagnostics }
    }
}

/// Best-effort text of a panic payload
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
