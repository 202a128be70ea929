use serde::{Deserialize, Serialize};

/// Main configuration structure for Mentor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Learner whose bandit state is loaded and saved
    #[serde(default = "default_learner_id")]
    pub learner_id: String,

    /// Path to the YAML lesson catalog
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,

    /// Path to the YAML list of completed unit ids
    #[serde(default = "default_ledger_path")]
    pub ledger_path: String,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Domain scorer configuration
    #[serde(default)]
    pub bandit: BanditConfig,

    /// Recommendation assembler configuration
    #[serde(default)]
    pub assembler: AssemblerConfig,
}

fn default_learner_id() -> String {
    "default".to_string()
}

fn default_catalog_path() -> String {
    ".mentor/catalog.yaml".to_string()
}

fn default_ledger_path() -> String {
    ".mentor/completed.yaml".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            learner_id: default_learner_id(),
            catalog_path: default_catalog_path(),
            ledger_path: default_ledger_path(),
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
            bandit: BanditConfig::default(),
            assembler: AssemblerConfig::default(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to `SQLite` database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    ".mentor/mentor.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stderr only when unset
    #[serde(default)]
    pub log_dir: Option<String>,

    /// Number of days to retain logs
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

const fn default_retention_days() -> u32 {
    30
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            retention_days: default_retention_days(),
        }
    }
}

/// Domain scorer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BanditConfig {
    /// Ranked domains returned by `get_recommendations` when no count is given
    #[serde(default = "default_recommendation_count")]
    pub default_recommendation_count: usize,
}

const fn default_recommendation_count() -> usize {
    3
}

impl Default for BanditConfig {
    fn default() -> Self {
        Self {
            default_recommendation_count: default_recommendation_count(),
        }
    }
}

/// Recommendation assembler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AssemblerConfig {
    /// Scored domains requested from the scorer before filtering
    #[serde(default = "default_candidate_domains")]
    pub candidate_domains: usize,

    /// Recommendations returned by `generate` when no count is given
    #[serde(default = "default_count")]
    pub default_count: usize,
}

const fn default_candidate_domains() -> usize {
    5
}

const fn default_count() -> usize {
    5
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            candidate_domains: default_candidate_domains(),
            default_count: default_count(),
        }
    }
}
