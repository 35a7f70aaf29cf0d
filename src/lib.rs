//! botcheck: rule-based bot detection
//!
//! Snapshot → DetectorRegistry → EvaluationEngine → DetectionResult → Verdict
//!
//! Every registered detector is evaluated; the verdict is the disjunction of
//! their outcomes and `explain` names every detector that fired.

pub mod core;
pub mod types;
pub mod config;
pub mod logging;

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
