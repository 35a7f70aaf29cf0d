//! Audit trail: one JSON line per evaluation report

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use crate::types::{AuditError, EvaluationReport};

/// Append a report to a JSON-lines audit file, creating it (and its parent) if needed
pub fn append_audit_record(report: &EvaluationReport, path: impl AsRef<Path>) -> Result<(), AuditError> {
    let path = path.as_ref();
    let line = serde_json::to_string(report)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", line)?;

    tracing::debug!(id = %report.id, path = %path.display(), "Audit record written");
    Ok(())
}

/// Read all records back as raw JSON values
pub fn load_audit_records(path: impl AsRef<Path>) -> Result<Vec<serde_json::Value>, AuditError> {
    let content = std::fs::read_to_string(path)?;
    content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).map_err(AuditError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{aggregator, DetectorRegistry, EvaluationEngine};
    use crate::types::Snapshot;

    #[test]
    fn test_append_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit").join("verdicts.jsonl");

        let engine = EvaluationEngine::new(DetectorRegistry::with_builtin_detectors());
        let snapshot = Snapshot {
            automation_flag: true,
            ..Snapshot::default()
        };

        for _ in 0..2 {
            let report = aggregator::report(engine.evaluate_with_diagnostics(&snapshot), &snapshot);
            append_audit_record(&report, &path).unwrap();
        }

        let records = load_audit_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["verdict"], true);
        assert_eq!(records[0]["result"]["webDriver"], true);
        assert_eq!(records[0]["snapshot_fingerprint"], records[1]["snapshot_fingerprint"]);
    }
}
