//! Configuration file handling for the CLI.
//!
//! Settings live in `$XDG_CONFIG_HOME/lumiqr/config.toml` (or the platform
//! equivalent). Flags and environment variables take precedence over the file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use directories::ProjectDirs;
use lumiqr_business::BusinessConfig;
use serde::{Deserialize, Serialize};

use crate::cli::Cli;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album_dir: Option<PathBuf>,
}

/// Values given on the command line or through the environment.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

impl From<&Cli> for Overrides {
    fn from(cli: &Cli) -> Self {
        Self {
            api_key: cli.api_key.clone(),
            model: cli.model.clone(),
            base_url: cli.base_url.clone(),
        }
    }
}

impl Config {
    /// `$XDG_CONFIG_HOME/lumiqr/config.toml` on Linux.
    pub fn default_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("com", "lumi", "lumiqr")
            .context("Failed to determine config directory")?;
        Ok(project_dirs.config_dir().join("config.toml"))
    }

    /// The explicit path when given, the per-user path otherwise.
    pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
        explicit.map_or_else(Self::default_path, |path| Ok(path.to_path_buf()))
    }

    /// Missing files load as the default configuration.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    pub fn set_api_key(&mut self, key: &str) {
        self.gemini.api_key = Some(key.trim().to_owned());
    }

    pub fn clear_api_key(&mut self) -> bool {
        self.gemini.api_key.take().is_some()
    }

    /// Merge flags/env over the file over built-in defaults.
    pub fn business_config(&self, overrides: &Overrides) -> BusinessConfig {
        let defaults = BusinessConfig::default();
        BusinessConfig {
            api_base_url: overrides
                .base_url
                .clone()
                .or_else(|| self.gemini.base_url.clone())
                .unwrap_or(defaults.api_base_url),
            model: overrides
                .model
                .clone()
                .or_else(|| self.gemini.model.clone())
                .unwrap_or(defaults.model),
            api_key: overrides
                .api_key
                .clone()
                .or_else(|| self.gemini.api_key.clone()),
            album_dir: self.output.album_dir.clone(),
        }
    }
}

/// `abcd…wxyz` style rendering of a secret.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.gemini.api_key.is_none());
        assert_eq!(
            config.business_config(&Overrides::default()),
            BusinessConfig::default()
        );
    }

    #[test]
    fn test_overrides_win_over_file() {
        let mut config = Config::default();
        config.set_api_key(" from-file ");
        config.gemini.model = Some("file-model".to_owned());
        config.output.album_dir = Some(PathBuf::from("/tmp/album"));

        let merged = config.business_config(&Overrides {
            api_key: Some("from-flag".to_owned()),
            model: None,
            base_url: Some("http://localhost:1234".to_owned()),
        });
        assert_eq!(merged.api_key.as_deref(), Some("from-flag"));
        assert_eq!(merged.model, "file-model");
        assert_eq!(merged.api_base_url, "http://localhost:1234");
        assert_eq!(merged.album_dir, Some(PathBuf::from("/tmp/album")));

        let from_file = config.business_config(&Overrides::default());
        assert_eq!(from_file.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_config_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        assert_eq!(Config::load_from(&path).unwrap(), Config::default());

        let mut config = Config::default();
        config.set_api_key("secret");
        config.save_to(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("[gemini]"));
        assert!(text.contains("api_key = \"secret\""));

        let mut loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert!(loaded.clear_api_key());
        assert!(!loaded.clear_api_key());
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("short"), "*****");
        assert_eq!(mask_key("AIzaSyExample1234"), "AIza…1234");
    }
}
