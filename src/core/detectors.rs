//! Built-in detectors: five cheap client-side automation signals
//!
//! Each one is a pure function of the snapshot. Names match the keys
//! reported to display and audit consumers.

use lazy_static::lazy_static;
use regex::Regex;
use crate::core::DetectorRegistry;
use crate::types::{DetectorEvaluationError, DuplicateDetectorError, Snapshot};

pub const WEB_DRIVER: &str = "webDriver";
pub const HEADLESS_BROWSER: &str = "headlessBrowser";
pub const NO_LANGUAGES: &str = "noLanguages";
pub const INCONSISTENT_EVAL: &str = "inconsistentEval";
pub const DOM_MANIPULATION: &str = "domManipulation";

/// Built-in detector names in canonical registration order
pub const BUILTIN_DETECTORS: [&str; 5] = [
    WEB_DRIVER,
    HEADLESS_BROWSER,
    NO_LANGUAGES,
    INCONSISTENT_EVAL,
    DOM_MANIPULATION,
];

// `eval.toString().length` per engine family
const EVAL_LENGTH_V8: usize = 33;
const EVAL_LENGTH_GECKO_WEBKIT: usize = 37;
const EVAL_LENGTH_TRIDENT: usize = 39;

lazy_static! {
    static ref RE_HEADLESS: Regex = Regex::new(r"(?i)headless").unwrap();

    // Attributes automation drivers leave on <html>
    static ref RE_AUTOMATION_ATTR: Regex = Regex::new(r"(?i)^(selenium|webdriver|driver)$").unwrap();
}

/// Browser family inferred from the user agent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserFamily {
    Edge,
    InternetExplorer,
    Firefox,
    Opera,
    Chrome,
    Safari,
    Unknown,
}

impl BrowserFamily {
    /// First match wins; order matters because most UAs mention several engines
    pub fn from_user_agent(user_agent: &str) -> Self {
        let ua = user_agent.to_lowercase();
        if ua.contains("edg/") {
            Self::Edge
        } else if ua.contains("trident") || ua.contains("msie") {
            Self::InternetExplorer
        } else if ua.contains("firefox") {
            Self::Firefox
        } else if ua.contains("opera") || ua.contains("opr") {
            Self::Opera
        } else if ua.contains("chrome") {
            Self::Chrome
        } else if ua.contains("safari") {
            Self::Safari
        } else {
            Self::Unknown
        }
    }

    /// Expected `eval` source length, None when unknown
    pub fn expected_eval_length(&self) -> Option<usize> {
        match self {
            Self::Chrome | Self::Opera | Self::Edge => Some(EVAL_LENGTH_V8),
            Self::Firefox | Self::Safari => Some(EVAL_LENGTH_GECKO_WEBKIT),
            Self::InternetExplorer => Some(EVAL_LENGTH_TRIDENT),
            Self::Unknown => None,
        }
    }
}

/// Automation flag set by the host (`navigator.webdriver`)
pub fn detect_web_driver(snapshot: &Snapshot) -> Result<bool, DetectorEvaluationError> {
    Ok(snapshot.automation_flag)
}

/// User agent advertises a headless browser
pub fn detect_headless_browser(snapshot: &Snapshot) -> Result<bool, DetectorEvaluationError> {
    Ok(RE_HEADLESS.is_match(&snapshot.user_agent))
}

/// No declared languages
pub fn detect_no_languages(snapshot: &Snapshot) -> Result<bool, DetectorEvaluationError> {
    Ok(snapshot.language_count() == 0)
}

/// `eval` source length does not belong to the claimed browser family.
///
/// Only the three known lengths are judged; any other length, or an unknown
/// family, is not a signal.
pub fn detect_inconsistent_eval(snapshot: &Snapshot) -> Result<bool, DetectorEvaluationError> {
    let length = snapshot
        .eval_source_length
        .ok_or(DetectorEvaluationError::MissingAttribute("evalSourceLength"))?;

    let family = BrowserFamily::from_user_agent(&snapshot.user_agent);
    let Some(expected) = family.expected_eval_length() else {
        return Ok(false);
    };

    let known = [EVAL_LENGTH_V8, EVAL_LENGTH_GECKO_WEBKIT, EVAL_LENGTH_TRIDENT];
    Ok(known.contains(&length) && length != expected)
}

/// Automation driver attributes present on the root element
pub fn detect_dom_manipulation(snapshot: &Snapshot) -> Result<bool, DetectorEvaluationError> {
    Ok(snapshot
        .root_attribute_names
        .iter()
        .any(|attr| RE_AUTOMATION_ATTR.is_match(attr.trim())))
}

impl DetectorRegistry {
    /// Registry holding all built-in detectors in canonical order
    pub fn with_builtin_detectors() -> Self {
        let mut registry = Self::new();
        let registered = register_builtins(&mut registry);
        debug_assert!(registered.is_ok(), "built-in detector names collide: {:?}", registered);
        if let Err(e) = registered {
            tracing::error!(error = %e, "Built-in detector registration incomplete");
        }
        registry
    }
}

fn register_builtins(registry: &mut DetectorRegistry) -> Result<(), DuplicateDetectorError> {
    registry.register(WEB_DRIVER, detect_web_driver)?;
    registry.register(HEADLESS_BROWSER, detect_headless_browser)?;
    registry.register(NO_LANGUAGES, detect_no_languages)?;
    registry.register(INCONSISTENT_EVAL, detect_inconsistent_eval)?;
    registry.register(DOM_MANIPULATION, detect_dom_manipulation)?;
    Ok(())
}
