//! Detector registry: ordered, named predicates
//!
//! Populated once at setup, shared read-only afterwards.

use std::fmt;
use std::sync::Arc;
use crate::types::{DetectorEvaluationError, DuplicateDetectorError, Snapshot};

/// Predicate signature every detector implements
pub type Predicate = Arc<dyn Fn(&Snapshot) -> Result<bool, DetectorEvaluationError> + Send + Sync>;

/// A detector registered under a unique name
#[derive(Clone)]
pub struct RegisteredDetector {
    name: String,
    predicate: Predicate,
}

impl RegisteredDetector {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }
}

impl fmt::Debug for RegisteredDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredDetector")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Ordered set of named detectors
#[derive(Debug, Clone, Default)]
pub struct DetectorRegistry {
    detectors: Vec<RegisteredDetector>,
}

impl DetectorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a detector. Fails if `name` is taken; the first registration stays.
    pub fn register<F>(&mut self, name: impl Into<String>, predicate: F) -> Result<(), DuplicateDetectorError>
    where
        F: Fn(&Snapshot) -> Result<bool, DetectorEvaluationError> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.contains(&name) {
            tracing::error!(detector = %name, "Duplicate detector registration rejected");
            return Err(DuplicateDetectorError { name });
        }

        tracing::debug!(detector = %name, position = self.detectors.len(), "Registering detector");
        self.detectors.push(RegisteredDetector {
            name,
            predicate: Arc::new(predicate),
        });
        Ok(())
    }

    /// Lazy `(name, predicate)` sequence in registration order.
    /// Call again (or clone the iterator) to restart.
    pub fn list(&self) -> impl Iterator<Item = (&str, &Predicate)> + Clone + '_ {
        self.detectors.iter().map(|d| (d.name.as_str(), &d.predicate))
    }

    /// Registered names in order
    pub fn names(&self) -> impl Iterator<Item = &str> + Clone + '_ {
        self.detectors.iter().map(|d| d.name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.detectors.iter().any(|d| d.name == name)
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    /// Copy of this registry without the named detectors, order kept
    pub fn without<S: AsRef<str>>(&self, names: &[S]) -> Self {
        let detectors = self
            .detectors
            .iter()
            .filter(|d| !names.iter().any(|n| n.as_ref() == d.name))
            .cloned()
            .collect();
        Self { detectors }
    }
}

impl<'a> IntoIterator for &'a DetectorRegistry {
    type Item = &'a RegisteredDetector;
    type IntoIter = std::slice::Iter<'a, RegisteredDetector>;

    fn into_iter(self) -> Self::IntoIter {
        self.detectors.iter()
    }
}
