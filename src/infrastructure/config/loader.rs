use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Learner id cannot be empty")]
    EmptyLearnerId,

    #[error("Invalid candidate_domains: {0}. Must be between 1 and 5")]
    InvalidCandidateDomains(usize),

    #[error("Invalid {field}: must be at least 1")]
    ZeroCount { field: &'static str },
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .mentor/config.yaml (project config)
    /// 3. .mentor/local.yaml (local overrides, optional)
    /// 4. Environment variables (MENTOR_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".mentor/config.yaml"))
            .merge(Yaml::file(".mentor/local.yaml"))
            .merge(Env::prefixed("MENTOR_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honouring environment overrides
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("MENTOR_").split("__"))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.learner_id.trim().is_empty() {
            return Err(ConfigError::EmptyLearnerId);
        }

        if config.database.path.is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }

        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(
                config.database.max_connections,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        if config.bandit.default_recommendation_count == 0 {
            return Err(ConfigError::ZeroCount {
                field: "bandit.default_recommendation_count",
            });
        }

        let candidates = config.assembler.candidate_domains;
        if candidates == 0 || candidates > crate::domain::models::DOMAIN_COUNT {
            return Err(ConfigError::InvalidCandidateDomains(candidates));
        }

        if config.assembler.default_count == 0 {
            return Err(ConfigError::ZeroCount {
                field: "assembler.default_count",
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.learner_id, "default");
        assert_eq!(config.database.path, ".mentor/mentor.db");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.assembler.candidate_domains, 5);
        assert_eq!(config.bandit.default_recommendation_count, 3);
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
learner_id: alice
catalog_path: /data/catalog.yaml
database:
  path: /custom/path.db
  max_connections: 2
logging:
  level: debug
  format: json
bandit:
  default_recommendation_count: 4
";

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.learner_id, "alice");
        assert_eq!(config.catalog_path, "/data/catalog.yaml");
        assert_eq!(config.database.path, "/custom/path.db");
        assert_eq!(config.database.max_connections, 2);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.bandit.default_recommendation_count, 4);
        assert_eq!(config.assembler.default_count, 5);

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "loud".to_string();

        match ConfigLoader::validate(&config).unwrap_err() {
            ConfigError::InvalidLogLevel(level) => assert_eq!(level, "loud"),
            other => panic!("Expected InvalidLogLevel error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_invalid_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();

        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogFormat(_))
        ));
    }

    #[test]
    fn test_validate_empty_learner() {
        let mut config = Config::default();
        config.learner_id = "  ".to_string();

        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::EmptyLearnerId)
        ));
    }

    #[test]
    fn test_validate_candidate_domains_bounds() {
        let mut config = Config::default();
        config.assembler.candidate_domains = 6;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidCandidateDomains(6))
        ));

        config.assembler.candidate_domains = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidCandidateDomains(0))
        ));
    }

    #[test]
    fn test_validate_zero_counts() {
        let mut config = Config::default();
        config.assembler.default_count = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::ZeroCount { field: "assembler.default_count" })
        ));
    }

    #[test]
    fn test_load_from_file_with_env_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "learner_id: from-file\nlogging:\n  level: warn").unwrap();

        temp_env::with_var("MENTOR_LEARNER_ID", Some("from-env"), || {
            let config = ConfigLoader::load_from_file(file.path()).unwrap();
            assert_eq!(config.learner_id, "from-env");
            assert_eq!(config.logging.level, "warn");
        });
    }

    #[test]
    fn test_load_from_file_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "database:\n  max_connections: 0").unwrap();

        assert!(ConfigLoader::load_from_file(file.path()).is_err());
    }
}
