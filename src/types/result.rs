//! Per-detector outcomes and the verdict derived from them

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Ordered mapping of detector name to outcome for one evaluation
///
/// Entries keep registry order so output is reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectionResult {
    entries: Vec<(String, bool)>,
}

impl DetectionResult {
    /// Create an empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty result sized for `capacity` detectors
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Record an outcome. Names are unique because the registry enforces it.
    pub(crate) fn record(&mut self, name: impl Into<String>, fired: bool) {
        self.entries.push((name.into(), fired));
    }

    /// Outcome for a detector, if it was evaluated
    pub fn get(&self, name: &str) -> Option<bool> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, fired)| *fired)
    }

    /// Iterate entries in registry order
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> + Clone + '_ {
        self.entries.iter().map(|(n, fired)| (n.as_str(), *fired))
    }

    /// Detector names in registry order
    pub fn names(&self) -> impl Iterator<Item = &str> + Clone + '_ {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of detectors that fired
    pub fn fired_count(&self) -> usize {
        self.entries.iter().filter(|(_, fired)| *fired).count()
    }
}

impl<N: Into<String>> FromIterator<(N, bool)> for DetectionResult {
    fn from_iter<I: IntoIterator<Item = (N, bool)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(n, f)| (n.into(), f)).collect(),
        }
    }
}

/// Serialized as a JSON object that keeps registry order
impl Serialize for DetectionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, fired) in &self.entries {
            map.serialize_entry(name, fired)?;
        }
        map.end()
    }
}

/// Single boolean disjunction over a DetectionResult
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Verdict(bool);

impl Verdict {
    /// Derive the verdict for a result
    pub fn of(result: &DetectionResult) -> Self {
        Self(result.iter().any(|(_, fired)| fired))
    }

    /// At least one detector fired
    pub fn is_bot(&self) -> bool {
        self.0
    }
}

impl From<Verdict> for bool {
    fn from(verdict: Verdict) -> Self {
        verdict.0
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0 {
            write!(f, "bot detected")
        } else {
            write!(f, "no bot detected")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_insertion_order() {
        let result: DetectionResult = [("b", true), ("a", false), ("c", true)].into_iter().collect();
        let names: Vec<&str> = result.names().collect();
        assert_eq!(names, vec!["b", "a", "c"]);
        assert_eq!(result.fired_count(), 2);
    }

    #[test]
    fn test_serializes_as_ordered_object() {
        let result: DetectionResult = [("webDriver", true), ("headlessBrowser", false)].into_iter().collect();
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"webDriver":true,"headlessBrowser":false}"#);
    }

    #[test]
    fn test_verdict_of_empty_is_negative() {
        let verdict = Verdict::of(&DetectionResult::new());
        assert!(!verdict.is_bot());
        assert_eq!(verdict.to_string(), "no bot detected");
    }

    #[test]
    fn test_get_unknown_name() {
        let result: DetectionResult = [("webDriver", false)].into_iter().collect();
        assert_eq!(result.get("webDriver"), Some(false));
        assert_eq!(result.get("missing"), None);
    }
}
