// CLI configuration: defaults for the deployed GenAI Bot API, merged
// with `~/.genai-bot/config.yaml` when present, then overridden by
// environment variables. Numeric env values that fail to parse are
// ignored with a warning rather than aborting startup.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

const CONFIG_DIR: &str = ".genai-bot";
const CONFIG_FILENAME: &str = "config.yaml";

const DEFAULT_ENDPOINT: &str = "https://2i9yquihz5.execute-api.us-east-2.amazonaws.com/Prod";
const DEFAULT_USER_ID: &str = "cli_user";

pub const VALID_KEYS: &[&str] = &[
    "api_endpoint",
    "default_user_id",
    "default_max_tokens",
    "default_temperature",
    "output_format",
    "log_level",
    "timeout",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default = "default_endpoint")]
    pub api_endpoint: String,
    #[serde(default = "default_user_id")]
    pub default_user_id: String,
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub default_temperature: f64,
    #[serde(default = "default_output_format")]
    pub output_format: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_user_id() -> String {
    DEFAULT_USER_ID.to_string()
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_temperature() -> f64 {
    0.7
}

fn default_output_format() -> String {
    "text".to_string()
}

fn default_log_level() -> String {
    "INFO".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for CliConfig {
    fn default() -> Self {
        CliConfig {
            api_endpoint: default_endpoint(),
            default_user_id: default_user_id(),
            default_max_tokens: default_max_tokens(),
            default_temperature: default_temperature(),
            output_format: default_output_format(),
            log_level: default_log_level(),
            timeout: default_timeout(),
        }
    }
}

impl CliConfig {
    /// Load from the default path and apply env overrides. An
    /// unreadable or unparseable file falls back to defaults with a
    /// warning, so a broken config never locks the user out.
    pub fn load() -> Self {
        let mut config = Self::load_from(&Self::config_path());
        config.apply_env_overrides();
        config
    }

    /// Load from an explicit file (partial files merge over defaults).
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return CliConfig::default();
        }
        match fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(config) => config,
                Err(err) => {
                    warn!(path = %path.display(), %err, "could not parse config file, using defaults");
                    CliConfig::default()
                }
            },
            Err(err) => {
                warn!(path = %path.display(), %err, "could not read config file, using defaults");
                CliConfig::default()
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory {}", dir.display()))?;
        }
        let yaml = serde_yaml::to_string(self).context("Failed to serialize config")?;
        fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(CONFIG_DIR).join(CONFIG_FILENAME)
    }

    /// Environment variables win over the config file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(endpoint) = std::env::var("GENAI_API_ENDPOINT") {
            self.api_endpoint = endpoint;
        }
        if let Ok(user_id) = std::env::var("GENAI_USER_ID") {
            self.default_user_id = user_id;
        }
        if let Ok(raw) = std::env::var("GENAI_MAX_TOKENS") {
            match raw.parse() {
                Ok(value) => self.default_max_tokens = value,
                Err(_) => warn!(%raw, "ignoring unparseable GENAI_MAX_TOKENS"),
            }
        }
        if let Ok(raw) = std::env::var("GENAI_TEMPERATURE") {
            match raw.parse() {
                Ok(value) => self.default_temperature = value,
                Err(_) => warn!(%raw, "ignoring unparseable GENAI_TEMPERATURE"),
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "api_endpoint" => Some(self.api_endpoint.clone()),
            "default_user_id" => Some(self.default_user_id.clone()),
            "default_max_tokens" => Some(self.default_max_tokens.to_string()),
            "default_temperature" => Some(self.default_temperature.to_string()),
            "output_format" => Some(self.output_format.clone()),
            "log_level" => Some(self.log_level.clone()),
            "timeout" => Some(self.timeout.to_string()),
            _ => None,
        }
    }

    /// Ordered key/value pairs for `config show`.
    pub fn display(&self) -> Vec<(&'static str, String)> {
        VALID_KEYS
            .iter()
            .map(|key| (*key, self.get(key).unwrap_or_default()))
            .collect()
    }

    /// Validate and apply one setting. Values arrive as strings from
    /// the command line; numeric keys are parsed and range-checked.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "api_endpoint" => {
                if !value.starts_with("https://") && !value.starts_with("http://localhost") {
                    bail!("api_endpoint must start with https:// (or http://localhost for testing)");
                }
                self.api_endpoint = value.to_string();
            }
            "default_user_id" => self.default_user_id = value.to_string(),
            "default_max_tokens" => {
                let tokens: u32 = value
                    .parse()
                    .context("default_max_tokens must be a number")?;
                if !(1..=4000).contains(&tokens) {
                    bail!("max_tokens must be between 1 and 4000");
                }
                self.default_max_tokens = tokens;
            }
            "default_temperature" => {
                let temperature: f64 = value
                    .parse()
                    .context("default_temperature must be a number")?;
                if !(0.0..=1.0).contains(&temperature) {
                    bail!("temperature must be between 0.0 and 1.0");
                }
                self.default_temperature = temperature;
            }
            "output_format" => {
                if !matches!(value, "text" | "json") {
                    bail!("output_format must be one of: text, json");
                }
                self.output_format = value.to_string();
            }
            "log_level" => {
                let level = value.to_uppercase();
                if !matches!(level.as_str(), "DEBUG" | "INFO" | "WARNING" | "ERROR") {
                    bail!("log_level must be one of: DEBUG, INFO, WARNING, ERROR");
                }
                self.log_level = level;
            }
            "timeout" => {
                let timeout: u64 = value.parse().context("timeout must be a number")?;
                if !(1..=300).contains(&timeout) {
                    bail!("timeout must be between 1 and 300 seconds");
                }
                self.timeout = timeout;
            }
            other => bail!(
                "'{}' is not a recognized configuration key (valid keys: {})",
                other,
                VALID_KEYS.join(", ")
            ),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_point_at_the_deployed_api() {
        let config = CliConfig::default();
        assert!(config.api_endpoint.starts_with("https://"));
        assert_eq!(config.default_user_id, "cli_user");
        assert_eq!(config.default_max_tokens, 1000);
        assert_eq!(config.timeout, 30);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = TempDir::new().unwrap();
        let config = CliConfig::load_from(&dir.path().join("config.yaml"));
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn partial_file_merges_over_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "default_user_id: team_bot\ntimeout: 60\n").unwrap();

        let config = CliConfig::load_from(&path);
        assert_eq!(config.default_user_id, "team_bot");
        assert_eq!(config.timeout, 60);
        assert_eq!(config.default_max_tokens, 1000);
        assert_eq!(config.output_format, "text");
    }

    #[test]
    fn unparseable_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "timeout: [not a number\n").unwrap();
        assert_eq!(CliConfig::load_from(&path), CliConfig::default());
    }

    #[test]
    fn save_and_reload_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let mut config = CliConfig::default();
        config.set("default_max_tokens", "1500").unwrap();
        config.set("default_temperature", "0.3").unwrap();
        config.save_to(&path).unwrap();

        let reloaded = CliConfig::load_from(&path);
        assert_eq!(reloaded, config);
    }

    #[test]
    fn set_rejects_out_of_range_values() {
        let mut config = CliConfig::default();
        assert!(config.set("default_max_tokens", "0").is_err());
        assert!(config.set("default_max_tokens", "5000").is_err());
        assert!(config.set("default_temperature", "1.5").is_err());
        assert!(config.set("timeout", "0").is_err());
        assert!(config.set("timeout", "301").is_err());
        assert!(config.set("output_format", "xml").is_err());
        assert!(config.set("log_level", "verbose").is_err());
        assert!(config.set("api_endpoint", "ftp://example.com").is_err());
        // Nothing was mutated along the way.
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn set_normalizes_log_level_case() {
        let mut config = CliConfig::default();
        config.set("log_level", "debug").unwrap();
        assert_eq!(config.log_level, "DEBUG");
    }

    #[test]
    fn set_rejects_unknown_keys() {
        let mut config = CliConfig::default();
        let err = config.set("api_key", "secret").unwrap_err();
        assert!(err.to_string().contains("not a recognized"));
    }

    #[test]
    fn env_overrides_win_and_ignore_garbage() {
        std::env::set_var("GENAI_USER_ID", "env_user");
        std::env::set_var("GENAI_MAX_TOKENS", "not-a-number");

        let mut config = CliConfig::default();
        config.apply_env_overrides();
        assert_eq!(config.default_user_id, "env_user");
        assert_eq!(config.default_max_tokens, 1000);

        std::env::remove_var("GENAI_USER_ID");
        std::env::remove_var("GENAI_MAX_TOKENS");
    }
}
