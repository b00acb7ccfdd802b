//! On-disk settings and stored accounts
//!
//! One TOML file, at `<config dir>/b2/config.toml` or `$B2_CONFIG_DIR/config.toml`.
//! Application keys live in it, so it is written owner-only.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::account::Account;
use crate::error::{Error, Result};

/// Highest file layout this build understands
pub const SCHEMA_VERSION: u32 = 1;

/// Environment variable naming a directory that replaces the platform default
pub const CONFIG_DIR_ENV: &str = "B2_CONFIG_DIR";

const FILE_NAME: &str = "config.toml";

/// How command results are printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

/// When terminal colors are used
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

/// Settings the CLI applies when no flag says otherwise
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub output: OutputFormat,
    pub color: ColorMode,
    /// Show a spinner during transfers
    pub progress: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: OutputFormat::Human,
            color: ColorMode::Auto,
            progress: true,
        }
    }
}

/// Everything stored in the file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub schema_version: u32,
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub accounts: Vec<Account>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            defaults: Defaults::default(),
            accounts: Vec::new(),
        }
    }
}

/// Reads and writes the config file at a fixed location
#[derive(Debug)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Locate the file through `$B2_CONFIG_DIR`, falling back to the platform config dir
    pub fn new() -> Result<Self> {
        let dir = match std::env::var_os(CONFIG_DIR_ENV).filter(|v| !v.is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::config_dir()
                .map(|d| d.join("b2"))
                .ok_or_else(|| Error::Config("no platform config directory".into()))?,
        };
        Ok(Self::with_path(dir.join(FILE_NAME)))
    }

    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// A missing file reads as [`Config::default`]
    pub fn load(&self) -> Result<Config> {
        let text = match std::fs::read_to_string(&self.config_path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(e) => return Err(e.into()),
        };

        let config: Config = toml::from_str(&text)?;
        if config.schema_version > SCHEMA_VERSION {
            return Err(Error::Config(format!(
                "{} uses schema version {}, this b2 reads up to {SCHEMA_VERSION}; upgrade b2",
                self.config_path.display(),
                config.schema_version
            )));
        }
        Ok(Config {
            schema_version: SCHEMA_VERSION,
            ..config
        })
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(dir) = self.config_path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&self.config_path, toml::to_string_pretty(config)?)?;
        restrict_to_owner(&self.config_path)?;

        tracing::debug!(path = %self.config_path.display(), accounts = config.accounts.len(), "Config written");
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_to_owner(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_to_owner(_path: &Path) -> Result<()> {
    Ok(())
}
