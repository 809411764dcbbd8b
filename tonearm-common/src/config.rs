//! Configuration loading and device identity
//!
//! Bootstrap configuration is a small TOML file resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`TONEARM_CONFIG`)
//! 3. Per-user config file (`<config_dir>/tonearm/config.toml`)
//! 4. Built-in defaults (fallback)
//!
//! A missing file is never fatal (warning + defaults) unless it was named
//! explicitly on the command line. A malformed file is always an error.

use crate::{Error, Result};
use serde::Deserialize;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

/// Environment variable naming the configuration file
pub const CONFIG_ENV_VAR: &str = "TONEARM_CONFIG";

/// Directory name below the platform config dir
pub const APP_DIR_NAME: &str = "tonearm";

const CONFIG_FILE_NAME: &str = "config.toml";
const DEVICE_ID_FILE_NAME: &str = "device_id";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct TomlConfig {
    /// Session controller settings
    #[serde(default)]
    pub session: SessionSettings,

    /// Settings handed to the playback engine
    #[serde(default)]
    pub engine: EngineSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Session controller settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SessionSettings {
    /// Period of the displayed-position refresh while playing
    #[serde(default = "default_position_interval_ms")]
    pub position_interval_ms: u64,

    /// Number of notifications buffered per subscriber before lagging
    #[serde(default = "default_notification_capacity")]
    pub notification_capacity: usize,
}

/// Engine identity settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct EngineSettings {
    /// Human readable device name announced by the engine
    #[serde(default = "default_device_name")]
    pub device_name: String,

    /// Fixed device id; generated and persisted when absent
    #[serde(default)]
    pub device_id: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_position_interval_ms() -> u64 {
    1000
}

fn default_notification_capacity() -> usize {
    100
}

fn default_device_name() -> String {
    "Tonearm".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            position_interval_ms: default_position_interval_ms(),
            notification_capacity: default_notification_capacity(),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            device_name: default_device_name(),
            device_id: None,
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

impl SessionSettings {
    /// Position refresh period as a `Duration`
    pub fn position_interval(&self) -> Duration {
        crate::time::millis_to_duration(self.position_interval_ms)
    }

    /// Reject a zero refresh period or a zero notification buffer
    pub fn validate(&self) -> Result<()> {
        if self.position_interval_ms == 0 {
            return Err(Error::Config(
                "session.position_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.notification_capacity == 0 {
            return Err(Error::Config(
                "session.notification_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl TomlConfig {
    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let toml_str = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        let config = Self::from_toml_str(&toml_str)?;
        info!("Loaded TOML configuration from {:?}", path);
        Ok(config)
    }

    /// Reject values the runtime cannot honour
    pub fn validate(&self) -> Result<()> {
        self.session.validate()?;
        if self.engine.device_name.trim().is_empty() {
            return Err(Error::Config("engine.device_name must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Load configuration following the documented priority order
pub fn load_config(cli_path: Option<&Path>) -> Result<TomlConfig> {
    // Priority 1: Command-line argument (must exist)
    if let Some(path) = cli_path {
        return TomlConfig::load(path);
    }

    // Priority 2: Environment variable
    if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return TomlConfig::load(&path);
        }
        warn!(
            "{} points to missing file {:?}, using built-in defaults",
            CONFIG_ENV_VAR, path
        );
        return Ok(TomlConfig::default());
    }

    // Priority 3: Per-user config file
    let user_file = default_config_dir().join(CONFIG_FILE_NAME);
    if user_file.exists() {
        return TomlConfig::load(&user_file);
    }

    // Priority 4: Built-in defaults
    info!("No configuration file found, using built-in defaults");
    Ok(TomlConfig::default())
}

/// Platform configuration directory for Tonearm
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(".").join(APP_DIR_NAME))
}

/// Resolve the engine device id
///
/// A configured id wins. Otherwise the id stored in `<config_dir>/device_id`
/// is reused, and if there is none a fresh UUID v4 (simple format) is
/// generated and persisted so the device keeps its identity across runs.
pub fn resolve_device_id(configured: Option<&str>, config_dir: &Path) -> Result<String> {
    if let Some(id) = configured.map(str::trim).filter(|id| !id.is_empty()) {
        return Ok(id.to_string());
    }

    let path = config_dir.join(DEVICE_ID_FILE_NAME);
    match std::fs::read_to_string(&path) {
        Ok(contents) if !contents.trim().is_empty() => return Ok(contents.trim().to_string()),
        Ok(_) => warn!("Device id file {:?} is empty, generating a new id", path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    let device_id = Uuid::new_v4().simple().to_string();
    std::fs::create_dir_all(config_dir)?;
    std::fs::write(&path, &device_id)?;
    info!("Generated device id {} ({:?})", device_id, path);
    Ok(device_id)
}
