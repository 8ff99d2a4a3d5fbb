//! Application configuration module for lexfind
//!
//! Provides TOML-based configuration with environment variable override
//! support. Priority: CLI args > Environment variables > Config file >
//! Defaults.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite document database (default: lexfind.db)
    #[serde(default = "default_db_path")]
    db_path: String,

    /// OpenRouter API key for query normalization
    #[serde(default)]
    openrouter_api_key: Option<String>,

    /// Model used by the query normalizer
    #[serde(default = "default_model")]
    model: String,

    /// Default language filter for searches
    #[serde(default = "default_language")]
    default_language: String,
}

fn default_db_path() -> String {
    "lexfind.db".to_string()
}

fn default_model() -> String {
    "anthropic/claude-3.5-haiku".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            openrouter_api_key: None,
            model: default_model(),
            default_language: default_language(),
        }
    }
}

impl AppConfig {
    /// Create config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path.display(), e))?;
        let config: AppConfig =
            toml::from_str(&content).map_err(|e| anyhow!("Failed to parse config file: {}", e))?;
        Ok(config)
    }

    /// Create config from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(db_path) = std::env::var("LEXFIND_DB_PATH") {
            config.db_path = db_path;
        }

        if let Ok(api_key) = std::env::var("LEXFIND_OPENROUTER_API_KEY") {
            config.openrouter_api_key = Some(api_key);
        } else if let Ok(api_key) = std::env::var("OPENROUTER_API_KEY") {
            config.openrouter_api_key = Some(api_key);
        }

        if let Ok(model) = std::env::var("LEXFIND_MODEL") {
            config.model = model;
        }

        if let Ok(language) = std::env::var("LEXFIND_LANGUAGE") {
            config.default_language = language;
        }

        config
    }

    /// Merge with another config (other takes priority for non-default values)
    pub fn merge_with(&self, other: &Self) -> Self {
        Self {
            db_path: if other.db_path != default_db_path() {
                other.db_path.clone()
            } else {
                self.db_path.clone()
            },
            openrouter_api_key: other
                .openrouter_api_key
                .clone()
                .or_else(|| self.openrouter_api_key.clone()),
            model: if other.model != default_model() {
                other.model.clone()
            } else {
                self.model.clone()
            },
            default_language: if other.default_language != default_language() {
                other.default_language.clone()
            } else {
                self.default_language.clone()
            },
        }
    }

    /// Override db_path
    pub fn with_db_path(mut self, path: &str) -> Self {
        self.db_path = path.to_string();
        self
    }

    /// Override default_language
    pub fn with_default_language(mut self, language: &str) -> Self {
        self.default_language = language.to_string();
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.db_path.trim().is_empty() {
            return Err(anyhow!("db_path must not be empty"));
        }

        if self.default_language.trim().is_empty() {
            return Err(anyhow!("default_language must not be empty"));
        }

        Ok(())
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| anyhow!("Failed to serialize config: {}", e))
    }

    // Getters
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    pub fn openrouter_api_key(&self) -> Option<String> {
        self.openrouter_api_key.clone()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }
}
