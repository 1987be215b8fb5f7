// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Settings management for Sitecraft
//!
//! Handles loading and saving settings from ~/.sitecraft/settings.toml

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Main settings structure, stored in ~/.sitecraft/settings.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// LLM provider configurations
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Web search configuration
    #[serde(default)]
    pub tavily: TavilyConfig,

    /// Default settings for new sessions
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Workspace the file tools operate on
    #[serde(default)]
    pub workspace: WorkspaceConfig,
}

/// Configuration for LLM providers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Anthropic Claude configuration
    #[serde(default = "ProviderConfig::anthropic")]
    pub anthropic: ProviderConfig,

    /// OpenAI configuration
    #[serde(default = "ProviderConfig::openai")]
    pub openai: ProviderConfig,

    /// Google Gemini configuration
    #[serde(default = "ProviderConfig::gemini")]
    pub gemini: ProviderConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            anthropic: ProviderConfig::anthropic(),
            openai: ProviderConfig::openai(),
            gemini: ProviderConfig::gemini(),
        }
    }
}

/// Per-provider credential configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key (if stored directly, not recommended)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable name for API key
    pub api_key_env: String,
}

impl ProviderConfig {
    fn anthropic() -> Self {
        Self {
            api_key: None,
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
        }
    }

    fn openai() -> Self {
        Self {
            api_key: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }

    fn gemini() -> Self {
        Self {
            api_key: None,
            api_key_env: "GEMINI_API_KEY".to_string(),
        }
    }

    /// Resolve the API key. The environment variable wins over the stored
    /// value.
    pub fn resolve_key(&self) -> Option<String> {
        if let Ok(key) = std::env::var(&self.api_key_env) {
            if !key.is_empty() {
                return Some(key);
            }
        }
        self.api_key.clone()
    }
}

/// Tavily web search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TavilyConfig {
    /// API key (if stored directly, not recommended)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable name for API key
    #[serde(default = "default_tavily_api_key_env")]
    pub api_key_env: String,
}

impl Default for TavilyConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: default_tavily_api_key_env(),
        }
    }
}

impl TavilyConfig {
    /// Resolve the API key, environment variable first
    pub fn resolve_key(&self) -> Option<String> {
        if let Ok(key) = std::env::var(&self.api_key_env) {
            if !key.is_empty() {
                return Some(key);
            }
        }
        self.api_key.clone()
    }
}

/// Default settings for new sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Automode iteration budget
    #[serde(default = "default_automode_iterations")]
    pub automode_iterations: u32,

    /// Override for the built-in system prompt template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt_template: Option<String>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            automode_iterations: default_automode_iterations(),
            system_prompt_template: None,
        }
    }
}

/// Workspace configuration for the file tools
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Root directory relative tool paths resolve against
    #[serde(default = "default_workspace_root")]
    pub root: PathBuf,

    /// Active theme folder, substituted into the system prompt
    #[serde(default = "default_theme_folder")]
    pub theme_folder: String,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: default_workspace_root(),
            theme_folder: default_theme_folder(),
        }
    }
}

fn default_tavily_api_key_env() -> String {
    "TAVILY_API_KEY".to_string()
}

fn default_model() -> String {
    "claude-3-haiku-20240307".to_string()
}

fn default_automode_iterations() -> u32 {
    crate::chat::DEFAULT_ITERATIONS
}

fn default_workspace_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_theme_folder() -> String {
    "themes/custom".to_string()
}

impl Settings {
    /// Get the default settings file path.
    pub fn default_path() -> PathBuf {
        Self::sitecraft_home().join("settings.toml")
    }

    /// Load settings from the default path.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load settings from a specific path. A missing file yields defaults.
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Save settings to the default path.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the sitecraft home directory (~/.sitecraft or $SITECRAFT_HOME).
    pub fn sitecraft_home() -> PathBuf {
        if let Ok(home) = std::env::var("SITECRAFT_HOME") {
            return PathBuf::from(home);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".sitecraft")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();

        assert_eq!(settings.defaults.model, "claude-3-haiku-20240307");
        assert_eq!(settings.defaults.automode_iterations, 25);
        assert_eq!(settings.providers.anthropic.api_key_env, "ANTHROPIC_API_KEY");
        assert_eq!(settings.providers.gemini.api_key_env, "GEMINI_API_KEY");
        assert_eq!(settings.tavily.api_key_env, "TAVILY_API_KEY");
    }

    #[test]
    fn test_load_missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.toml");

        let settings = Settings::load_from(&path).unwrap();

        assert_eq!(settings.defaults.automode_iterations, 25);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/settings.toml");

        let mut settings = Settings::default();
        settings.defaults.model = "gpt-3.5-turbo-0125".to_string();
        settings.defaults.automode_iterations = 10;
        settings.providers.openai.api_key = Some("sk-stored".to_string());
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded.defaults.model, "gpt-3.5-turbo-0125");
        assert_eq!(loaded.defaults.automode_iterations, 10);
        assert_eq!(loaded.providers.openai.api_key.as_deref(), Some("sk-stored"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.toml");
        std::fs::write(&path, "[defaults]\nmodel = \"gemini-1.5-pro\"\n").unwrap();

        let settings = Settings::load_from(&path).unwrap();

        assert_eq!(settings.defaults.model, "gemini-1.5-pro");
        assert_eq!(settings.defaults.automode_iterations, 25);
        assert_eq!(settings.providers.anthropic.api_key_env, "ANTHROPIC_API_KEY");
    }

    #[test]
    fn test_resolve_key_env_takes_precedence() {
        let config = ProviderConfig {
            api_key: Some("stored".to_string()),
            api_key_env: "SITECRAFT_TEST_KEY_PRECEDENCE".to_string(),
        };

        std::env::set_var("SITECRAFT_TEST_KEY_PRECEDENCE", "from-env");
        assert_eq!(config.resolve_key().as_deref(), Some("from-env"));
        std::env::remove_var("SITECRAFT_TEST_KEY_PRECEDENCE");

        assert_eq!(config.resolve_key().as_deref(), Some("stored"));
    }

    #[test]
    fn test_resolve_key_absent() {
        let config = ProviderConfig {
            api_key: None,
            api_key_env: "SITECRAFT_TEST_KEY_ABSENT".to_string(),
        };

        assert_eq!(config.resolve_key(), None);
    }
}
