//! Evaluation output: raw evaluation and the structured report built from it

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use crate::types::{DetectionResult, Diagnostic, Verdict};

/// DetectionResult plus whatever went wrong while producing it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluation {
    pub result: DetectionResult,
    pub diagnostics: Vec<Diagnostic>,
}

/// Structured record of one evaluation, for display and audit
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    /// `eval_<utc timestamp>_<fingerprint prefix>`
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// SHA-256 of the evaluated snapshot
    pub snapshot_fingerprint: String,
    pub verdict: Verdict,
    pub result: DetectionResult,
    /// Every detector that fired, in registry order
    pub fired: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl EvaluationReport {
    /// Colored single-line summary
    pub fn to_terminal_string(&self) -> String {
        let head = if self.verdict.is_bot() {
            format!("🤖 {}", self.verdict).red().bold()
        } else {
            format!("✅ {}", self.verdict).green().bold()
        };

        let mut line = format!("{} | fired={}/{}", head, self.fired.len(), self.result.len());
        if !self.fired.is_empty() {
            line.push_str(&format!(" | {}", self.fired.join(", ").yellow()));
        }
        if !self.diagnostics.is_empty() {
            line.push_str(&format!(
                " | {}",
                format!("{} diagnostic(s)", self.diagnostics.len()).magenta()
            ));
        }
        line
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        format!(
            "verdict={} | fired={} | detectors={} | diagnostics={}",
            self.verdict.is_bot(),
            if self.fired.is_empty() { "-".to_string() } else { self.fired.join(",") },
            self.result.len(),
            self.diagnostics.len()
        )
    }

    /// Per-detector breakdown, one line each
    pub fn breakdown_lines(&self, no_color: bool) -> Vec<String> {
        let mut lines: Vec<String> = self
            .result
            .iter()
            .map(|(name, fired)| {
                let mark = match (fired, no_color) {
                    (true, true) => "FIRED".to_string(),
                    (false, true) => "-".to_string(),
                    (true, false) => "FIRED".red().to_string(),
                    (false, false) => "-".dimmed().to_string(),
                };
                format!("  {:<20} {}", name, mark)
            })
            .collect();

        for diag in &self.diagnostics {
            let text = diag.to_string();
            lines.push(if no_color { format!("  ! {}", text) } else { format!("  ! {}", text.magenta()) });
        }
        lines
    }
}
