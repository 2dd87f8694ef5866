// Application settings
// Loaded from ~/.config/docdiff/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Provider-specific settings.
///
/// Selector and language are kept as raw strings here so that an
/// unsupported value surfaces as a `ConfigError` during resolution instead
/// of a generic JSON error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Backend selector: "gemini", "openai", "anthropic", "local"
    pub provider: String,

    /// Model identifier (empty = provider default)
    pub model: String,

    /// Override base endpoint URL
    pub endpoint: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: String::new(), // Empty = use provider default
            endpoint: None,
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Output language for descriptions and summaries
    #[serde(rename = "output.language")]
    pub language: String,

    // Backend
    #[serde(rename = "ai")]
    pub provider: ProviderSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            provider: ProviderSettings::default(),
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("docdiff");
        config_dir.join("settings.json")
    }

    /// Load settings from the default location, falling back to defaults when absent
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from `path`. A missing file yields defaults; a malformed one is an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("no settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| ConfigError::Settings(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&contents)
            .map_err(|e| ConfigError::Settings(format!("{}: {}", path.display(), e)))
    }

    /// Parse settings JSON. Lines starting with `//` are treated as comments.
    pub fn from_json(contents: &str) -> Result<Self, String> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");

        serde_json::from_str(&cleaned).map_err(|e| e.to_string())
    }

    /// Get the config file path for display
    pub fn config_path_display() -> String {
        Self::config_path().to_string_lossy().to_string()
    }
}
