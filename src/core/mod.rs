//! Core modules for botcheck

pub mod registry;
pub mod detectors;
pub mod engine;
pub mod aggregator;
pub mod audit;
pub mod api;

pub use registry::{DetectorRegistry, Predicate, RegisteredDetector};
pub use detectors::{BrowserFamily, BUILTIN_DETECTORS};
pub use engine::{EvaluationEngine, FailurePolicy};
pub use aggregator::{aggregate, explain, report};
pub use audit::{append_audit_record, load_audit_records};
pub use api::{create_router, run_server};
