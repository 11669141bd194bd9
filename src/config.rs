//! Registry Configuration
//!
//! Configuration types for the hook registry

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{RegistryError, RegistryResult};
use crate::hooks::priority;

/// What `register` does when the id is already taken
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Replace the existing record
    #[default]
    Replace,
    /// Fail with `AlreadyExists`
    Reject,
}

/// Configuration for a `HookRegistry`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Priority given to hooks registered without one
    #[serde(default = "default_priority")]
    pub default_priority: i32,

    /// Behavior when registering an id that already exists
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,

    /// Catch panics from individual callbacks and keep dispatching
    #[serde(default)]
    pub isolate_panics: bool,
}

fn default_priority() -> i32 {
    priority::NORMAL
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            default_priority: default_priority(),
            duplicate_policy: DuplicatePolicy::default(),
            isolate_panics: false,
        }
    }
}

impl RegistryConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default priority
    pub fn with_default_priority(mut self, priority: i32) -> Self {
        self.default_priority = priority;
        self
    }

    /// Set the duplicate registration policy
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    /// Enable or disable per-callback panic isolation
    pub fn with_isolate_panics(mut self, isolate: bool) -> Self {
        self.isolate_panics = isolate;
        self
    }

    /// Check that values are within the named priority range
    pub fn validate(&self) -> RegistryResult<()> {
        if !(priority::LOWEST..=priority::HIGHEST).contains(&self.default_priority) {
            return Err(RegistryError::InvalidConfig(format!(
                "default_priority {} outside {}..={}",
                self.default_priority,
                priority::LOWEST,
                priority::HIGHEST
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration document
    pub fn from_json_str(json: &str) -> RegistryResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> RegistryResult<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading registry config from {:?}", path);
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = RegistryConfig::new();
        assert_eq!(config.default_priority, 0);
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Replace);
        assert!(!config.isolate_panics);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = RegistryConfig::from_json_str("{}").unwrap();
        assert_eq!(config, RegistryConfig::default());
    }

    #[test]
    fn test_parse_full_document() {
        let config = RegistryConfig::from_json_str(
            r#"{"default_priority": 100, "duplicate_policy": "reject", "isolate_panics": true}"#,
        )
        .unwrap();

        assert_eq!(config.default_priority, priority::HIGH);
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Reject);
        assert!(config.isolate_panics);
    }

    #[test]
    fn test_validate_rejects_out_of_range_priority() {
        let err = RegistryConfig::from_json_str(r#"{"default_priority": 5000}"#).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidConfig(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"isolate_panics": true}}"#).unwrap();

        let config = RegistryConfig::from_file(file.path()).unwrap();
        assert!(config.isolate_panics);
    }

    #[test]
    fn test_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = RegistryConfig::from_file(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, RegistryError::Io(_)));
    }
}
