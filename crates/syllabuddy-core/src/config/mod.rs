use serde::{Deserialize, Serialize};

use crate::cloze::DISTRACTORS;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub practice: PracticeConfig,

    #[serde(default)]
    pub cloze: ClozeConfig,

    #[serde(default)]
    pub review: ReviewConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            catalog: CatalogConfig::default(),
            practice: PracticeConfig::default(),
            cloze: ClozeConfig::default(),
            review: ReviewConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.practice.weakness_cap == 0 {
            return Err(ConfigError::ValidationError(
                "practice.weakness_cap must be > 0".to_string(),
            ));
        }
        if self.practice.retry_threshold > 10 {
            return Err(ConfigError::ValidationError(
                "practice.retry_threshold must be within 0..=10".to_string(),
            ));
        }
        if self.practice.max_specificity > 1 {
            return Err(ConfigError::ValidationError(
                "practice.max_specificity must be 0 or 1".to_string(),
            ));
        }
        if self.cloze.max_distractors > DISTRACTORS.len() {
            return Err(ConfigError::ValidationError(format!(
                "cloze.max_distractors must be <= {}",
                DISTRACTORS.len()
            )));
        }
        if self.logging.filter.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "logging.filter cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Where the syllabus comes from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Path to a syllabus JSON file. Missing or unset falls back to the
    /// built-in catalog.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Focused-practice tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PracticeConfig {
    #[serde(default = "default_weakness_cap")]
    pub weakness_cap: usize,
    #[serde(default = "default_retry_threshold")]
    pub retry_threshold: u8,
    #[serde(default = "default_max_specificity")]
    pub max_specificity: u8,
    #[serde(default = "default_weakness_delimiter")]
    pub weakness_delimiter: char,
}

fn default_weakness_cap() -> usize {
    5
}
fn default_retry_threshold() -> u8 {
    6
}
fn default_max_specificity() -> u8 {
    1
}
fn default_weakness_delimiter() -> char {
    ';'
}

impl Default for PracticeConfig {
    fn default() -> Self {
        Self {
            weakness_cap: default_weakness_cap(),
            retry_threshold: default_retry_threshold(),
            max_specificity: default_max_specificity(),
            weakness_delimiter: default_weakness_delimiter(),
        }
    }
}

/// Cloze word-bank settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClozeConfig {
    #[serde(default = "default_true")]
    pub pad_bank: bool,
    #[serde(default = "default_max_distractors")]
    pub max_distractors: usize,
    /// Seed for bank shuffling. Unset draws from OS entropy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_true() -> bool {
    true
}
fn default_max_distractors() -> usize {
    3
}

impl Default for ClozeConfig {
    fn default() -> Self {
        Self {
            pad_bank: true,
            max_distractors: default_max_distractors(),
            seed: None,
        }
    }
}

/// Review/triage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    #[serde(default = "default_suggestion_limit")]
    pub suggestion_limit: usize,
}

fn default_suggestion_limit() -> usize {
    40
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            suggestion_limit: default_suggestion_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

/// Errors from configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    ParseError(String),
    #[error("failed to serialize config: {0}")]
    SerializeError(String),
    #[error("config validation failed: {0}")]
    ValidationError(String),
}
