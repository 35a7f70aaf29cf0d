//! Environment snapshot evaluated by detectors
//!
//! A snapshot is gathered by the host page/runtime and handed to the engine
//! as a plain value. The engine never reads ambient browser state itself.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Immutable set of client/environment attributes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    /// `navigator.webdriver` as reported by the host
    pub automation_flag: bool,
    /// Raw user-agent string
    pub user_agent: String,
    /// Declared languages (`navigator.languages`)
    pub languages: Vec<String>,
    /// Length of the host's `eval` function source, if it could be read
    pub eval_source_length: Option<usize>,
    /// Attribute names found on the document root element
    pub root_attribute_names: Vec<String>,
}

impl Snapshot {
    /// Create a snapshot with only a user agent set
    pub fn with_user_agent(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            ..Self::default()
        }
    }

    /// Number of declared languages
    pub fn language_count(&self) -> usize {
        self.languages.len()
    }

    /// SHA-256 over the canonical JSON form, hex encoded
    ///
    /// Field order is fixed by the struct definition, so equal snapshots
    /// always produce equal fingerprints.
    pub fn fingerprint(&self) -> String {
        let canonical = serde_json::to_vec(self).unwrap_or_default();
        let digest: [u8; 32] = Sha256::digest(&canonical).into();
        digest.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_camel_case_with_defaults() {
        let snapshot: Snapshot = serde_json::from_str(
            r#"{"automationFlag": true, "userAgent": "Mozilla/5.0", "evalSourceLength": 33}"#,
        )
        .unwrap();

        assert!(snapshot.automation_flag);
        assert_eq!(snapshot.user_agent, "Mozilla/5.0");
        assert_eq!(snapshot.eval_source_length, Some(33));
        assert!(snapshot.languages.is_empty());
        assert!(snapshot.root_attribute_names.is_empty());
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let a = Snapshot::with_user_agent("Mozilla/5.0");
        let b = Snapshot::with_user_agent("Mozilla/5.0");
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }

    #[test]
    fn test_fingerprint_changes_with_content() {
        let a = Snapshot::with_user_agent("Mozilla/5.0");
        let b = Snapshot::with_user_agent("HeadlessChrome");
        assert_ne!(a.fingerprint(), b.fingerprint());
    }
}
