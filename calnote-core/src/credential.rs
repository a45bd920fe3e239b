//! Access credentials for the remote calendar.
//!
//! The sync engine never reads tokens from ambient state; it asks an injected
//! [`CredentialProvider`] for a valid token right before each remote call.

use std::fmt;

use async_trait::async_trait;

use crate::error::{CalNoteError, CalNoteResult};

/// Bearer token for remote calls.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        AccessToken(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Keep tokens out of logs.
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessToken(***)")
    }
}

/// Source of valid access tokens.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// A token good for at least one request, refreshed if needed.
    /// Returns [`CalNoteError::Unauthenticated`] when none can be obtained.
    async fn access_token(&self) -> CalNoteResult<AccessToken>;
}

/// A fixed token, or none at all.
#[derive(Debug, Clone, Default)]
pub struct StaticCredential {
    token: Option<AccessToken>,
}

impl StaticCredential {
    pub fn new(token: impl Into<String>) -> Self {
        StaticCredential {
            token: Some(AccessToken::new(token)),
        }
    }

    pub fn signed_out() -> Self {
        StaticCredential { token: None }
    }
}

#[async_trait]
impl CredentialProvider for StaticCredential {
    async fn access_token(&self) -> CalNoteResult<AccessToken> {
        self.token.clone().ok_or(CalNoteError::Unauthenticated)
    }
}

#[async_trait]
impl<T: CredentialProvider + ?Sized> CredentialProvider for std::sync::Arc<T> {
    async fn access_token(&self) -> CalNoteResult<AccessToken> {
        (**self).access_token().await
    }
}
