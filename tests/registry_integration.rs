//! Integration tests for detector registration

use botcheck::core::{DetectorRegistry, EvaluationEngine, BUILTIN_DETECTORS};
use botcheck::types::{DuplicateDetectorError, Snapshot};
use pretty_assertions::assert_eq;

#[test]
fn test_duplicate_registration_fails_fast() {
    let mut registry = DetectorRegistry::with_builtin_detectors();
    let err = registry
        .register("webDriver", |_: &Snapshot| Ok(false))
        .unwrap_err();

    assert_eq!(err, DuplicateDetectorError { name: "webDriver".to_string() });
    assert_eq!(err.to_string(), "detector 'webDriver' is already registered");
    assert_eq!(registry.len(), BUILTIN_DETECTORS.len());

    // The first registration still decides the outcome
    let snapshot = Snapshot { automation_flag: true, ..Snapshot::default() };
    let result = EvaluationEngine::new(registry).evaluate(&snapshot);
    assert_eq!(result.get("webDriver"), Some(true));
}

#[test]
fn test_custom_detector_after_builtins() {
    let mut registry = DetectorRegistry::with_builtin_detectors();
    registry
        .register("phantomUserAgent", |s: &Snapshot| Ok(s.user_agent.contains("PhantomJS")))
        .unwrap();

    let names: Vec<&str> = registry.list().map(|(name, _)| name).collect();
    assert_eq!(names.last(), Some(&"phantomUserAgent"));

    let snapshot = Snapshot {
        languages: vec!["en".to_string()],
        eval_source_length: Some(37),
        ..Snapshot::with_user_agent("Mozilla/5.0 (Unknown; Linux x86_64) AppleWebKit/534.34 PhantomJS/2.1.1")
    };
    let result = EvaluationEngine::new(registry).evaluate(&snapshot);
    assert_eq!(result.get("phantomUserAgent"), Some(true));
}

#[test]
fn test_registry_shared_across_threads() {
    let engine = EvaluationEngine::new(DetectorRegistry::with_builtin_detectors());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let engine = engine.clone();
            std::thread::spawn(move || {
                let snapshot = Snapshot {
                    automation_flag: i % 2 == 0,
                    languages: vec!["en".to_string()],
                    eval_source_length: Some(33),
                    ..Snapshot::with_user_agent("Chrome/120")
                };
                engine.evaluate(&snapshot).get("webDriver")
            })
        })
        .collect();

    let outcomes: Vec<Option<bool>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(outcomes, vec![Some(true), Some(false), Some(true), Some(false)]);
}
