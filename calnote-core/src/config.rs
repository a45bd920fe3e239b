//! Global calnote configuration at ~/.config/calnote/config.toml

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::date_range::{DEFAULT_MONTHS_BACK, DEFAULT_MONTHS_FORWARD, SyncWindow};
use crate::error::{CalNoteError, CalNoteResult};
use crate::sync::DEFAULT_CALL_TIMEOUT;

static DEFAULT_DATA_DIR: &str = "~/.local/share/calnote";
static DEFAULT_CALENDAR_ID: &str = "primary";
static FALLBACK_TIME_ZONE: &str = "UTC";

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_timeout_secs() -> u64 {
    DEFAULT_CALL_TIMEOUT.as_secs()
}

fn default_months_back() -> u32 {
    DEFAULT_MONTHS_BACK
}

fn default_months_forward() -> u32 {
    DEFAULT_MONTHS_FORWARD
}

fn default_calendar_id() -> String {
    DEFAULT_CALENDAR_ID.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalNoteConfig {
    /// Where the local store keeps its documents.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// IANA zone sent with timed events. Detected from the system when unset.
    #[serde(default)]
    pub time_zone: Option<String>,

    /// Upper bound for a single remote call.
    #[serde(default = "default_timeout_secs")]
    pub remote_timeout_secs: u64,

    #[serde(default)]
    pub sync: SyncSettings,

    #[serde(default)]
    pub remote: RemoteSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSettings {
    #[serde(default = "default_months_back")]
    pub months_back: u32,
    #[serde(default = "default_months_forward")]
    pub months_forward: u32,
}

impl Default for SyncSettings {
    fn default() -> Self {
        SyncSettings {
            months_back: DEFAULT_MONTHS_BACK,
            months_forward: DEFAULT_MONTHS_FORWARD,
        }
    }
}

/// Which remote account and calendar events are mirrored to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteSettings {
    /// Signed-in account; no remote sync happens without one.
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        RemoteSettings {
            account: None,
            calendar_id: default_calendar_id(),
        }
    }
}

impl Default for CalNoteConfig {
    fn default() -> Self {
        CalNoteConfig {
            data_dir: default_data_dir(),
            time_zone: None,
            remote_timeout_secs: default_timeout_secs(),
            sync: SyncSettings::default(),
            remote: RemoteSettings::default(),
        }
    }
}

impl CalNoteConfig {
    pub fn config_dir() -> CalNoteResult<PathBuf> {
        Ok(dirs::config_dir()
            .ok_or_else(|| CalNoteError::Config("Could not determine config directory".into()))?
            .join("calnote"))
    }

    pub fn config_path() -> CalNoteResult<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing a commented template first if
    /// there is no config file yet.
    pub fn load() -> CalNoteResult<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            Self::create_default_config(&path)?;
        }

        Self::load_from(&path)
    }

    /// Load from `path`, with `CALNOTE_*` environment variables taking
    /// precedence (nested keys use `__`, e.g. `CALNOTE_REMOTE__ACCOUNT`).
    pub fn load_from(path: &Path) -> CalNoteResult<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix("CALNOTE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(|e| CalNoteError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CalNoteError::Config(e.to_string()))
    }

    pub fn save(&self) -> CalNoteResult<()> {
        let path = Self::config_path()?;
        let content =
            toml::to_string_pretty(self).map_err(|e| CalNoteError::Config(e.to_string()))?;

        std::fs::write(&path, content)
            .map_err(|e| CalNoteError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Store directory with `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.data_dir.to_string_lossy()).into_owned())
    }

    /// Configured zone, else the system zone, else UTC.
    pub fn resolved_time_zone(&self) -> CalNoteResult<String> {
        match &self.time_zone {
            Some(tz) => {
                tz.parse::<chrono_tz::Tz>().map_err(|_| {
                    CalNoteError::Config(format!("Unknown time zone '{tz}' in config"))
                })?;
                Ok(tz.clone())
            }
            None => Ok(iana_time_zone::get_timezone()
                .ok()
                .filter(|tz| tz.parse::<chrono_tz::Tz>().is_ok())
                .unwrap_or_else(|| FALLBACK_TIME_ZONE.to_string())),
        }
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_timeout_secs.max(1))
    }

    pub fn default_window(&self) -> SyncWindow {
        SyncWindow::around(Utc::now(), self.sync.months_back, self.sync.months_forward)
    }

    /// Create a config file with all options commented out.
    pub fn create_default_config(path: &Path) -> CalNoteResult<()> {
        let contents = format!(
            "\
# calnote configuration

# Where your events and notes are stored:
# data_dir = \"{DEFAULT_DATA_DIR}\"

# Time zone sent with timed events (defaults to the system zone):
# time_zone = \"Europe/Berlin\"

# Seconds to wait for a single remote calendar request:
# remote_timeout_secs = {timeout}

# [sync]
# months_back = {DEFAULT_MONTHS_BACK}
# months_forward = {DEFAULT_MONTHS_FORWARD}

# [remote]
# account = \"you@example.com\"
# calendar_id = \"{DEFAULT_CALENDAR_ID}\"
",
            timeout = default_timeout_secs(),
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CalNoteError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| CalNoteError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
