//! Engine configuration
//!
//! Loaded from a JSON file. Every field is optional:
//!
//! ```json
//! {
//!   "max_limit": 10000,
//!   "full_text_keys": ["name", "description", "snippet"],
//!   "date_suggestions": true,
//!   "default_filters": [ { "relationKey": "isDeleted", "condition": "notEqual", "value": true } ],
//!   "log_level": "info"
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::filter::DefaultFilters;
use crate::model::bundle::{RELATION_DESCRIPTION, RELATION_NAME, RELATION_SNIPPET};
use crate::observability::{log_event_with_fields, Event, Severity};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Query engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Largest page a query may return; 0 means unbounded
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,

    /// Relations searched by full-text queries
    #[serde(default = "default_full_text_keys")]
    pub full_text_keys: Vec<String>,

    /// Whether full-text input may produce a synthetic date record
    #[serde(default = "default_date_suggestions")]
    pub date_suggestions: bool,

    /// Replaces the standard default predicates when set
    #[serde(default)]
    pub default_filters: Option<DefaultFilters>,

    /// Minimum log severity (trace, info, warn, error, fatal)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_max_limit() -> usize {
    10_000
}

fn default_full_text_keys() -> Vec<String> {
    [RELATION_NAME, RELATION_DESCRIPTION, RELATION_SNIPPET]
        .iter()
        .map(|k| k.to_string())
        .collect()
}

fn default_date_suggestions() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_limit: default_max_limit(),
            full_text_keys: default_full_text_keys(),
            date_suggestions: default_date_suggestions(),
            default_filters: None,
            log_level: default_log_level(),
        }
    }
}

impl EngineConfig {
    /// Load and validate configuration from a file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json_str(&content)?;
        let shown = path.display().to_string();
        log_event_with_fields(Event::ConfigLoaded, &[("path", shown.as_str())]);
        Ok(config)
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json_str(raw: &str) -> ConfigResult<Self> {
        let config: EngineConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if Severity::parse(&self.log_level).is_none() {
            return Err(ConfigError::Invalid(format!(
                "unknown log_level '{}'",
                self.log_level
            )));
        }
        if self.full_text_keys.iter().any(|k| k.is_empty()) {
            return Err(ConfigError::Invalid(
                "full_text_keys must not contain empty keys".to_string(),
            ));
        }
        if let Some(defaults) = &self.default_filters {
            defaults
                .validate()
                .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        }
        Ok(())
    }

    /// Configured minimum severity
    pub fn severity(&self) -> Severity {
        Severity::parse(&self.log_level).unwrap_or(Severity::Info)
    }

    /// The default predicates queries run with
    pub fn defaults(&self) -> DefaultFilters {
        self.default_filters.clone().unwrap_or_default()
    }

    /// Page size actually applied for a requested limit
    pub fn effective_limit(&self, requested: usize) -> usize {
        match (requested, self.max_limit) {
            (0, max) => max,
            (n, 0) => n,
            (n, max) => n.min(max),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.full_text_keys, ["name", "description", "snippet"]);
        assert_eq!(config.defaults().len(), 3);
    }

    #[test]
    fn test_default_filters_override() {
        let config = EngineConfig::from_json_str(
            r#"{"default_filters": [{"relationKey": "isHidden", "condition": "notEqual", "value": true}]}"#,
        )
        .unwrap();
        assert_eq!(config.defaults().len(), 1);
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let err = EngineConfig::from_json_str(r#"{"log_level": "loud"}"#).unwrap_err();
        assert!(err.to_string().contains("loud"));
    }

    #[test]
    fn test_invalid_default_filters_rejected() {
        let err = EngineConfig::from_json_str(
            r#"{"default_filters": [{"operator": "or", "nestedFilters": [{"relationKey": "a", "condition": "exists"}]}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_effective_limit() {
        let config = EngineConfig::default();
        assert_eq!(config.effective_limit(0), 10_000);
        assert_eq!(config.effective_limit(50), 50);
        assert_eq!(config.effective_limit(20_000), 10_000);

        let unbounded = EngineConfig {
            max_limit: 0,
            ..EngineConfig::default()
        };
        assert_eq!(unbounded.effective_limit(0), 0);
        assert_eq!(unbounded.effective_limit(7), 7);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"max_limit": 25, "date_suggestions": false}}"#).unwrap();

        let config = EngineConfig::load(file.path()).unwrap();
        assert_eq!(config.max_limit, 25);
        assert!(!config.date_suggestions);
    }

    #[test]
    fn test_load_missing_file() {
        let err = EngineConfig::load(Path::new("/nonexistent/objquery.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
