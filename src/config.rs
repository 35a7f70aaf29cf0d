//! Configuration with hierarchical merging
//!
//! Precedence (lowest to highest):
//! 1. Programmatic defaults
//! 2. YAML file (`--config`, or `botcheck.yaml` in the working directory)
//! 3. Environment variables (`BOTCHECK_*`, `__` for nesting)
//! 4. CLI flags, applied by the binary after loading

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::{DetectorRegistry, EvaluationEngine, FailurePolicy};
use crate::types::ConfigError;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "botcheck.yaml";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Outcome recorded for a faulting detector
    pub failure_policy: FailurePolicy,
    /// Built-in detectors that are not registered at all
    pub disabled_detectors: Vec<String>,
    /// JSON-lines audit file, off when unset
    pub audit_log: Option<PathBuf>,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:3000".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// trace, debug, info, warn or error
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Config {
    /// Load defaults, the default YAML file if present, then environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None::<&Path>)
    }

    /// Load with an explicit YAML file instead of the default one.
    ///
    /// An explicit file must exist; the default `botcheck.yaml` is optional.
    pub fn load_from(path: Option<impl AsRef<Path>>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        match path {
            Some(p) => {
                let p = p.as_ref();
                if !p.is_file() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                figment = figment.merge(Yaml::file_exact(p));
            }
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    figment = figment.merge(Yaml::file_exact(default));
                }
            }
        }

        let config: Config = figment
            .merge(Env::prefixed("BOTCHECK_").split("__"))
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    /// Log the effective configuration. Call once the subscriber is installed.
    pub fn log_summary(&self, source: Option<&Path>) {
        let source = source.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        tracing::info!(
            source = %source.display(),
            failure_policy = ?self.failure_policy,
            disabled_detectors = ?self.disabled_detectors,
            audit_log = ?self.audit_log,
            addr = %self.server.addr,
            "Configuration loaded"
        );
    }

    /// Reject unknown detector names and log levels
    pub fn validate(&self) -> Result<(), ConfigError> {
        let builtin = DetectorRegistry::with_builtin_detectors();
        if let Some(unknown) = self.disabled_detectors.iter().find(|n| !builtin.contains(n)) {
            return Err(ConfigError::UnknownDetector(unknown.clone()));
        }

        crate::logging::parse_log_level(&self.logging.level).map(|_| ())
    }

    /// Built-in registry minus disabled detectors
    pub fn build_registry(&self) -> DetectorRegistry {
        for name in &self.disabled_detectors {
            tracing::info!(detector = %name, "Detector disabled by configuration");
        }
        DetectorRegistry::with_builtin_detectors().without(&self.disabled_detectors)
    }

    /// Engine ready to evaluate, per this configuration
    pub fn build_engine(&self) -> EvaluationEngine {
        EvaluationEngine::with_policy(self.build_registry(), self.failure_policy)
    }
}
