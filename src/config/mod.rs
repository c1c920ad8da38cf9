use crate::host::SettingsSource;
use crate::models::MinsaveConfig;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Configuration manager for the YAML settings file.
///
/// Standalone counterpart to an editor-provided settings store: hosts that
/// have their own configuration UI implement
/// [`SettingsSource`](crate::host::SettingsSource) directly, while the
/// binary and headless setups read `minsave.yaml` through this manager.
///
/// Settings are re-read on every query rather than cached, so an edit to
/// the file takes effect on the very next save event.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    config_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified configuration directory.
    ///
    /// The directory is created if it does not exist; the file inside it is
    /// only created by [`save`](Self::save).
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            config_path: config_dir.join("minsave.yaml"),
            config_dir,
        })
    }

    /// Load the configuration file, falling back to defaults when absent
    pub fn load(&self) -> Result<MinsaveConfig> {
        if !self.config_path.exists() {
            tracing::debug!(
                "config file not found at {}, using defaults",
                self.config_path
            );
            return Ok(MinsaveConfig::default());
        }

        let file_contents = fs::read_to_string(&self.config_path)
            .with_context(|| format!("Failed to read config: {}", self.config_path))?;

        let config: MinsaveConfig = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse config: {}", self.config_path))?;

        Ok(config)
    }

    /// Save the configuration file.
    pub fn save(&self, config: &MinsaveConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize config to YAML")?;

        fs::write(&self.config_path, yaml_string)
            .with_context(|| format!("Failed to write config: {}", self.config_path))?;

        tracing::info!("Saved config to {}", self.config_path);
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    pub fn config_path(&self) -> &Utf8Path {
        &self.config_path
    }
}

// An unreadable or malformed file answers with the caller's default instead
// of failing the save that asked.
impl SettingsSource for ConfigManager {
    fn bool_setting(&self, key: &str, default: bool) -> bool {
        match self.load() {
            Ok(config) => config.bool_value(key).unwrap_or(default),
            Err(e) => {
                tracing::warn!("falling back to default for {}: {:#}", key, e);
                default
            }
        }
    }

    fn string_setting(&self, key: &str, default: &str) -> String {
        match self.load() {
            Ok(config) => config
                .string_value(key)
                .unwrap_or_else(|| default.to_string()),
            Err(e) => {
                tracing::warn!("falling back to default for {}: {:#}", key, e);
                default.to_string()
            }
        }
    }
}
