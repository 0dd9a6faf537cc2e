//! Service configuration loader (strict parsing)
//!
//! Configuration lives in a YAML file with one settings block per
//! environment. The active environment is selected by the METRICSTORE_ENV
//! variable and must be either `development` or `production`; anything else
//! refuses to start.

use crate::error::{AppError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Environment the process runs in, selected via METRICSTORE_ENV.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Resolve from the METRICSTORE_ENV variable value.
    pub fn from_var(value: Option<&str>) -> Result<Self> {
        match value {
            Some("development") => Ok(Environment::Development),
            Some("production") => Ok(Environment::Production),
            Some(other) => Err(AppError::Config(format!(
                "METRICSTORE_ENV must be 'development' or 'production', got '{}'",
                other
            ))),
            None => Err(AppError::Config(
                "METRICSTORE_ENV must be set to development or production".to_string(),
            )),
        }
    }

    /// Default tracing filter when RUST_LOG is not set.
    pub fn default_log_filter(self) -> &'static str {
        match self {
            Environment::Development => "metricstore=debug,tower_http=debug",
            Environment::Production => "metricstore=warn",
        }
    }
}

/// One environment's settings block.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvSettings {
    /// Listen address, e.g. "127.0.0.1:5000"
    pub listen: String,
    /// Path to the SQLite database file
    pub database: String,
}

/// Raw configuration file shape.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    api_key: String,
    development: EnvSettings,
    production: EnvSettings,
}

/// Resolved configuration for the selected environment.
///
/// Built once at startup and passed explicitly into state construction;
/// there is no ambient global config.
#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub api_key: String,
    pub listen: String,
    pub database: String,
}

impl Config {
    /// Load the config file and resolve it against the given environment.
    pub fn load(path: &Path, environment: Environment) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_str(&raw, environment)
    }

    fn from_str(raw: &str, environment: Environment) -> Result<Self> {
        let file: ConfigFile = serde_yaml::from_str(raw)
            .map_err(|e| AppError::Config(format!("invalid config yaml: {}", e)))?;

        let settings = match environment {
            Environment::Development => file.development,
            Environment::Production => file.production,
        };

        let config = Config {
            environment,
            api_key: file.api_key,
            listen: settings.listen,
            database: settings.database,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(AppError::Config("api_key must not be empty".to_string()));
        }
        if self.listen.is_empty() {
            return Err(AppError::Config("listen must not be empty".to_string()));
        }
        if self.database.is_empty() {
            return Err(AppError::Config("database must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
api_key: "secret-key"
development:
  listen: "127.0.0.1:5000"
  database: "metrics-dev.db"
production:
  listen: "0.0.0.0:5000"
  database: "metrics.db"
"#;

    #[test]
    fn test_selects_environment_block() {
        let dev = Config::from_str(SAMPLE, Environment::Development).unwrap();
        assert_eq!(dev.listen, "127.0.0.1:5000");
        assert_eq!(dev.database, "metrics-dev.db");
        assert_eq!(dev.api_key, "secret-key");

        let prod = Config::from_str(SAMPLE, Environment::Production).unwrap();
        assert_eq!(prod.listen, "0.0.0.0:5000");
        assert_eq!(prod.database, "metrics.db");
    }

    #[test]
    fn test_unknown_environment_rejected() {
        assert!(Environment::from_var(Some("staging")).is_err());
        assert!(Environment::from_var(None).is_err());
        assert_eq!(
            Environment::from_var(Some("development")).unwrap(),
            Environment::Development
        );
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let raw = format!("{}\nextra_setting: true\n", SAMPLE);
        assert!(Config::from_str(&raw, Environment::Development).is_err());
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let raw = SAMPLE.replace("\"secret-key\"", "\"\"");
        assert!(Config::from_str(&raw, Environment::Development).is_err());
    }
}
