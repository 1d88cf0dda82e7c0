use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use roulette_core::adapter::{WinnerSources, DEFAULT_RESET_CONFIRMATION};
use roulette_core::history::DEFAULT_HISTORY_KEY;
use roulette_core::BiasSettings;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DaemonConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub bias: BiasSettings,
    #[serde(default)]
    pub hook: HookConfig,
}

impl DaemonConfig {
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path();
        if config_path.exists() {
            return Self::from_file(&config_path);
        }

        Ok(DaemonConfig::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("failed to parse TOML from {}", path.display()))
    }
}

fn resolve_config_path() -> PathBuf {
    if let Ok(path) = env::var("ROULETTE_BIAS_CONFIG") {
        return Path::new(&path).to_path_buf();
    }

    if let Some(base) = dirs::config_dir() {
        return base.join("roulette-bias").join("config.toml");
    }

    Path::new("/tmp/roulette-bias.toml").to_path_buf()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_socket_path")]
    pub socket_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            socket_path: default_socket_path(),
        }
    }
}

fn default_socket_path() -> PathBuf {
    Path::new("/tmp/roulette-bias.sock").to_path_buf()
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
    #[serde(default = "default_history_key")]
    pub history_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: default_storage_path(),
            history_key: default_history_key(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    File,
    Memory,
}

fn default_backend() -> StorageBackend {
    StorageBackend::File
}

fn default_storage_path() -> PathBuf {
    match dirs::data_dir() {
        Some(base) => base.join("roulette-bias").join("storage.json"),
        None => Path::new("/tmp/roulette-bias-storage.json").to_path_buf(),
    }
}

fn default_history_key() -> String {
    DEFAULT_HISTORY_KEY.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct HookConfig {
    #[serde(default = "default_winner_fields")]
    pub winner_fields: Vec<String>,
    #[serde(default = "default_reset_confirmation")]
    pub reset_confirmation: String,
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            winner_fields: default_winner_fields(),
            reset_confirmation: default_reset_confirmation(),
        }
    }
}

impl HookConfig {
    pub fn winner_sources(&self) -> WinnerSources {
        WinnerSources::new(self.winner_fields.clone())
    }
}

fn default_winner_fields() -> Vec<String> {
    WinnerSources::default().detail_fields
}

fn default_reset_confirmation() -> String {
    DEFAULT_RESET_CONFIRMATION.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config: DaemonConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.socket_path, default_socket_path());
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.storage.history_key, "roulette_wins_v1");
        assert_eq!(config.bias, BiasSettings::default());
        assert_eq!(config.hook.winner_fields, vec!["name", "winner", "title"]);
    }

    #[test]
    fn parses_partial_sections() {
        let raw = r#"
            [storage]
            backend = "memory"

            [bias]
            use_history = false
            strength = 0.8
            window_days = 14

            [hook]
            winner_fields = ["label"]
        "#;
        let config: DaemonConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.history_key, "roulette_wins_v1");
        assert!(!config.bias.use_history);
        assert_eq!(config.bias.strength, 0.8);
        assert_eq!(config.bias.window_days, 14);
        assert_eq!(config.hook.winner_sources().detail_fields, vec!["label"]);
        assert_eq!(config.hook.reset_confirmation, "History has been reset.");
    }

    #[test]
    fn from_file_reports_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[bias\nstrength = ").unwrap();
        assert!(DaemonConfig::from_file(&path).is_err());
    }
}
