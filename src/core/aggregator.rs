//! Verdict Aggregator: disjunction over a DetectionResult plus evidence
//!
//! All detectors are evaluated before the verdict is derived; the verdict
//! is never decided by the first firing detector alone.

use chrono::Utc;
use crate::types::{DetectionResult, Evaluation, EvaluationReport, Snapshot, Verdict};

/// Reduce a result to its verdict: true iff any entry fired
pub fn aggregate(result: &DetectionResult) -> Verdict {
    Verdict::of(result)
}

/// Every detector that fired, in registry order.
///
/// Lazy and restartable: clone the iterator or call again. A negative
/// verdict yields nothing.
pub fn explain<'a>(verdict: Verdict, result: &'a DetectionResult) -> impl Iterator<Item = &'a str> + Clone + 'a {
    result
        .iter()
        .filter(move |(_, fired)| verdict.is_bot() && *fired)
        .map(|(name, _)| name)
}

/// Build the structured report for one evaluation
pub fn report(evaluation: Evaluation, snapshot: &Snapshot) -> EvaluationReport {
    let Evaluation { result, diagnostics } = evaluation;
    let verdict = aggregate(&result);
    let fired: Vec<String> = explain(verdict, &result).map(str::to_string).collect();

    let timestamp = Utc::now();
    let snapshot_fingerprint = snapshot.fingerprint();
    let id = format!(
        "eval_{}_{}",
        timestamp.format("%Y%m%d_%H%M%S%3f"),
        &snapshot_fingerprint[0..8]
    );

    tracing::info!(
        id = %id,
        verdict = verdict.is_bot(),
        fired = ?fired,
        detectors = result.len(),
        diagnostics = diagnostics.len(),
        "Verdict aggregated"
    );

    EvaluationReport {
        id,
        timestamp,
        snapshot_fingerprint,
        verdict,
        result,
        fired,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explain_lists_all_fired() {
        let result: DetectionResult = [("a", true), ("b", false), ("c", true)].into_iter().collect();
        let verdict = aggregate(&result);

        assert!(verdict.is_bot());
        let fired: Vec<&str> = explain(verdict, &result).collect();
        assert_eq!(fired, vec!["a", "c"]);
    }

    #[test]
    fn test_explain_is_restartable() {
        let result: DetectionResult = [("a", true), ("b", true)].into_iter().collect();
        let listing = explain(aggregate(&result), &result);
        assert_eq!(listing.clone().count(), 2);
        assert_eq!(listing.count(), 2);
    }

    #[test]
    fn test_explain_negative_verdict_yields_nothing() {
        let result: DetectionResult = [("a", false), ("b", false)].into_iter().collect();
        let verdict = aggregate(&result);
        assert!(!verdict.is_bot());
        assert_eq!(explain(verdict, &result).count(), 0);
    }

    #[test]
    fn test_report_id_uses_fingerprint() {
        let snapshot = Snapshot::with_user_agent("Mozilla/5.0");
        let evaluation = Evaluation {
            result: [("a", true)].into_iter().collect(),
            diagnostics: Vec::new(),
        };
        let report = report(evaluation, &snapshot);

        assert!(report.id.starts_with("eval_"));
        assert!(report.id.ends_with(&snapshot.fingerprint()[0..8]));
        assert_eq!(report.fired, vec!["a".to_string()]);
        assert!(report.verdict.is_bot());
    }
}
