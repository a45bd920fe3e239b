//! Keeps a valid Google access token for one account, refreshing it on demand.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use calnote_core::{AccessToken, CalNoteError, CalNoteResult, CredentialProvider};
use chrono::{DateTime, Duration, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::app_config::{AppConfig, base_dir};

pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Tokens this close to expiry are refreshed before use.
const EXPIRY_SKEW_SECS: i64 = 60;

const REFRESH_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    access_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

/// Body returned by the OAuth token endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_in: i64,
}

impl SessionData {
    pub fn new(access_token: String, refresh_token: String, expires_at: DateTime<Utc>) -> Self {
        SessionData {
            access_token,
            refresh_token,
            expires_at,
        }
    }

    /// Google usually omits the refresh token on refresh; keep the old one then.
    pub(crate) fn from_response(tokens: TokenResponse, previous_refresh: &str) -> Self {
        SessionData {
            access_token: tokens.access_token,
            refresh_token: tokens
                .refresh_token
                .unwrap_or_else(|| previous_refresh.to_string()),
            expires_at: Utc::now() + Duration::seconds(tokens.expires_in),
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    fn expires_soon(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_SKEW_SECS) >= self.expires_at
    }

    pub fn path_for(dir: &Path, account: &str) -> PathBuf {
        let slug = account.replace(['/', '\\', ':'], "_");
        dir.join("session").join(format!("{slug}.toml"))
    }

    pub fn load(dir: &Path, account: &str) -> Result<Option<Self>> {
        let path = Self::path_for(dir, account);

        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path).with_context(|| {
            format!("Failed to read Google OAuth session from {}", path.display())
        })?;

        let data = toml::from_str(&contents).with_context(|| {
            format!("Failed to parse Google OAuth session from {}", path.display())
        })?;

        Ok(Some(data))
    }

    pub fn save(&self, dir: &Path, account: &str) -> Result<()> {
        let contents = toml::to_string_pretty(self).context("Failed to serialize session")?;
        let path = Self::path_for(dir, account);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        write_owner_only(&path, contents.as_bytes())
            .with_context(|| format!("Failed to write session to {}", path.display()))
    }
}

/// Write a file that only its owner can read; it holds OAuth tokens.
#[cfg(unix)]
fn write_owner_only(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies when the file is created.
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    file.write_all(contents)
}

#[cfg(not(unix))]
fn write_owner_only(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, contents)
}

/// Credential source backed by the session file of the configured account.
///
/// With no account configured every request reports
/// [`CalNoteError::Unauthenticated`], which keeps calnote fully usable offline.
pub struct GoogleSession {
    account: Option<String>,
    dir: PathBuf,
    token_url: String,
    http: reqwest::Client,
    cached: Mutex<Option<SessionData>>,
}

impl GoogleSession {
    pub fn for_account(account: Option<String>) -> Result<Self> {
        Ok(Self::new(account, base_dir()?))
    }

    pub fn new(account: Option<String>, dir: PathBuf) -> Self {
        GoogleSession {
            account,
            dir,
            token_url: TOKEN_URL.to_string(),
            http: reqwest::Client::builder()
                .timeout(REFRESH_TIMEOUT)
                .build()
                .unwrap_or_default(),
            cached: Mutex::new(None),
        }
    }

    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    /// Whether a session file exists for the configured account.
    pub fn is_signed_in(&self) -> bool {
        self.account
            .as_deref()
            .is_some_and(|account| SessionData::path_for(&self.dir, account).exists())
    }

    async fn refresh(&self, account: &str, data: &SessionData) -> CalNoteResult<SessionData> {
        let app = AppConfig::load_from(&self.dir).map_err(|e| {
            tracing::warn!(error = %e, "cannot refresh Google session");
            CalNoteError::Unauthenticated
        })?;

        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", app.client_id.as_str()),
                ("client_secret", app.client_secret.as_str()),
                ("refresh_token", data.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| CalNoteError::SyncFailed(format!("token refresh: {e}")))?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%account, %status, %body, "Google rejected the refresh token");
            return Err(CalNoteError::Unauthenticated);
        }
        if !status.is_success() {
            return Err(CalNoteError::SyncFailed(format!("token refresh: {status}")));
        }

        let tokens: TokenResponse = response
            .json()
            .await
            .map_err(|e| CalNoteError::SyncFailed(format!("token refresh: {e}")))?;

        let refreshed = SessionData::from_response(tokens, &data.refresh_token);
        if let Err(e) = refreshed.save(&self.dir, account) {
            tracing::warn!(error = %e, "refreshed token could not be saved");
        }

        Ok(refreshed)
    }
}

#[async_trait]
impl CredentialProvider for GoogleSession {
    async fn access_token(&self) -> CalNoteResult<AccessToken> {
        let Some(account) = self.account.as_deref() else {
            return Err(CalNoteError::Unauthenticated);
        };

        let mut cached = self.cached.lock().await;

        if cached.is_none() {
            *cached = SessionData::load(&self.dir, account).map_err(|e| {
                tracing::warn!(error = %e, "unreadable Google session");
                CalNoteError::Unauthenticated
            })?;
        }

        let Some(data) = cached.as_ref() else {
            return Err(CalNoteError::Unauthenticated);
        };

        if data.expires_soon(Utc::now()) {
            tracing::debug!(%account, "access token expired, refreshing");
            let refreshed = self.refresh(account, data).await?;
            let token = AccessToken::new(refreshed.access_token.clone());
            *cached = Some(refreshed);
            return Ok(token);
        }

        Ok(AccessToken::new(data.access_token.clone()))
    }
}
