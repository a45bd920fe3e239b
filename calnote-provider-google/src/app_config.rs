//! App-level configuration for the Google remote.
//!
//! User-provided OAuth credentials stored at:
//!   ~/.config/calnote/providers/google/app_config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Google OAuth client credentials (user-provided).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub client_id: String,
    pub client_secret: String,
}

pub fn base_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Could not determine config directory")?
        .join("calnote")
        .join("providers")
        .join("google"))
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::load_from(&base_dir()?)
    }

    pub fn load_from(dir: &Path) -> Result<Self> {
        let path = dir.join("app_config.toml");

        if !path.exists() {
            anyhow::bail!(
                "Google credentials not found.\n\n\
                Create {} with:\n\n\
                client_id = \"your-client-id.apps.googleusercontent.com\"\n\
                client_secret = \"your-client-secret\"\n\n\
                See https://console.cloud.google.com/apis/credentials for setup.",
                path.display()
            );
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read credentials from {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse credentials from {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_explains_setup() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load_from(dir.path()).unwrap_err().to_string();
        assert!(err.contains("app_config.toml"));
        assert!(err.contains("client_secret"));
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("app_config.toml"),
            "client_id = \"abc.apps.googleusercontent.com\"\nclient_secret = \"s3cret\"\n",
        )
        .unwrap();

        let app = AppConfig::load_from(dir.path()).unwrap();
        assert_eq!(app.client_id, "abc.apps.googleusercontent.com");
        assert_eq!(app.client_secret, "s3cret");
    }
}
