//! Configuration module.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file (`.codeshape/settings.toml`, searched upward)
//! - Environment variable overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `CS_` and use double underscores
//! to separate nested levels:
//! - `CS_LOGGING__LEVEL=debug` sets `logging.level`
//! - `CS_MANIPULATION__ALLOW_TOUCHING=false` sets `manipulation.allow_touching`
//! - `CS_LANGUAGES__GO__ENABLED=false` sets `languages.go.enabled`

use crate::error::{ConfigError, ConfigResult};
use crate::parsing::Language;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const CONFIG_DIR: &str = ".codeshape";
const CONFIG_FILE: &str = "settings.toml";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Global debug mode
    #[serde(default = "default_false")]
    pub debug: bool,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Language-specific settings, keyed by language name
    #[serde(default = "default_languages")]
    pub languages: HashMap<String, LanguageConfig>,

    /// Change application settings
    #[serde(default)]
    pub manipulation: ManipulationConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LanguageConfig {
    /// Whether this language is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Extra file extensions mapped to this language, on top of the built-in ones
    #[serde(default)]
    pub extensions: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ManipulationConfig {
    /// Accept changes whose spans touch (`a.end == b.start`)
    #[serde(default = "default_true")]
    pub allow_touching: bool,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_log_level() -> String {
    "warn".to_string()
}

fn default_languages() -> HashMap<String, LanguageConfig> {
    Language::ALL
        .into_iter()
        .map(|lang| {
            (
                lang.config_key().to_string(),
                LanguageConfig {
                    enabled: true,
                    extensions: Vec::new(),
                },
            )
        })
        .collect()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            debug: false,
            logging: LoggingConfig::default(),
            languages: default_languages(),
            manipulation: ManipulationConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for ManipulationConfig {
    fn default() -> Self {
        Self {
            allow_touching: true,
        }
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join(CONFIG_FILE));

        Self::figment(config_path)
            .extract()
            .map_err(|e| ConfigError::Figment(Box::new(e)))
    }

    /// Load configuration from a specific file, still honoring `CS_` overrides
    pub fn load_from(path: impl AsRef<Path>) -> ConfigResult<Self> {
        Self::figment(path.as_ref())
            .extract()
            .map_err(|e| ConfigError::Figment(Box::new(e)))
    }

    fn figment(config_path: impl AsRef<Path>) -> Figment {
        Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Settings::default()))
            // Layer in config file if it exists
            .merge(Toml::file(config_path.as_ref()))
            // Layer in environment variables with CS_ prefix
            // Double underscore separates nested levels
            .merge(Env::prefixed("CS_").map(|key| {
                key.as_str()
                    .to_lowercase()
                    .replace("__", ".")
                    .into()
            }))
    }

    /// Find the workspace config by looking for a .codeshape directory,
    /// searching from the current directory up to the root
    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        current
            .ancestors()
            .map(|ancestor| ancestor.join(CONFIG_DIR))
            .find(|dir| dir.is_dir())
            .map(|dir| dir.join(CONFIG_FILE))
    }

    /// Write these settings as TOML, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Whether `language` is enabled. Languages missing from the map are enabled.
    pub fn is_language_enabled(&self, language: Language) -> bool {
        self.languages
            .get(language.config_key())
            .is_none_or(|config| config.enabled)
    }

    /// Configured extension aliases as `(".ext", language)` pairs
    pub fn extension_overrides(&self) -> Vec<(String, Language)> {
        let mut overrides = Vec::new();
        for (name, config) in &self.languages {
            let Some(language) = Language::from_name(name) else {
                continue;
            };
            for ext in &config.extensions {
                let ext = ext.trim_start_matches('.').to_lowercase();
                if !ext.is_empty() {
                    overrides.push((format!(".{ext}"), language));
                }
            }
        }
        overrides.sort();
        overrides
    }
}
