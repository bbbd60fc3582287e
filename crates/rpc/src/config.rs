//! Application configuration
//!
//! Read from `<data>/custody.json` when present, then overridden by
//! environment variables. Every field has a default.

use custody_core::Principal;
use custody_registry::RegistryConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Config file name inside the data directory
pub const CONFIG_FILE: &str = "custody.json";

/// Overrides `registry.operator`
pub const ENV_OPERATOR: &str = "CUSTODY_OPERATOR";

/// Overrides `log_filter`
pub const ENV_LOG: &str = "CUSTODY_LOG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid {var}: {reason}")]
    InvalidEnv { var: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustodyConfig {
    #[serde(default)]
    pub registry: RegistryConfig,

    /// `tracing_subscriber::EnvFilter` directive used when RUST_LOG is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// How far a bus subscriber may fall behind before it is dropped
    #[serde(default = "default_bus_capacity")]
    pub bus_capacity: usize,
}

fn default_log_filter() -> String {
    "info".to_string()
}

fn default_bus_capacity() -> usize {
    1024
}

impl Default for CustodyConfig {
    fn default() -> Self {
        Self {
            registry: RegistryConfig::default(),
            log_filter: default_log_filter(),
            bus_capacity: default_bus_capacity(),
        }
    }
}

impl CustodyConfig {
    /// Load configuration from JSON file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// File in `data_path` if it exists, else defaults; then env overrides
    pub fn load(data_path: &Path) -> Result<Self, ConfigError> {
        let path = data_path.join(CONFIG_FILE);
        let config = if path.exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        config.with_overrides(|var| std::env::var(var).ok())
    }

    /// Apply overrides from a variable lookup (the process env in production)
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(operator) = lookup(ENV_OPERATOR) {
            let operator = operator
                .parse::<Principal>()
                .map_err(|e| ConfigError::InvalidEnv {
                    var: ENV_OPERATOR,
                    reason: e.to_string(),
                })?;
            self.registry.operator = Some(operator);
        }

        if let Some(filter) = lookup(ENV_LOG) {
            self.log_filter = filter;
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CustodyConfig::default();
        assert_eq!(config.registry, RegistryConfig::default());
        assert_eq!(config.log_filter, "info");
        assert_eq!(config.bus_capacity, 1024);
    }

    #[test]
    fn test_config_partial_json() {
        let json = r#"{ "registry": { "max_committee_size": 5 } }"#;
        let config: CustodyConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.registry.max_committee_size, 5);
        assert_eq!(config.registry.operator, None);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_env_overrides() {
        let operator = format!("0x{}", "de".repeat(20));
        let config = CustodyConfig::default()
            .with_overrides(|var| match var {
                ENV_OPERATOR => Some(operator.clone()),
                ENV_LOG => Some("debug".to_string()),
                _ => None,
            })
            .unwrap();

        assert_eq!(config.registry.operator, Some(Principal::repeat(0xde)));
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn test_invalid_env_operator() {
        let result = CustodyConfig::default().with_overrides(|var| {
            (var == ENV_OPERATOR).then(|| "bob".to_string())
        });
        assert!(matches!(
            result,
            Err(ConfigError::InvalidEnv { var: ENV_OPERATOR, .. })
        ));
    }

    #[test]
    fn test_load_from_data_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), r#"{ "log_filter": "warn" }"#).unwrap();

        let config = CustodyConfig::from_file(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config.log_filter, "warn");
    }
}
