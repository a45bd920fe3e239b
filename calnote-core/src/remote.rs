//! Remote calendar contract and its wire representation.
//!
//! The body shapes mirror the Google Calendar v3 event resource, restricted
//! to the fields calnote reads or writes.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::credential::AccessToken;
use crate::date_range::SyncWindow;
use crate::error::CalNoteResult;

/// Request/response body for a remote event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteEvent {
    /// Assigned by the provider; absent on create requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_id: Option<String>,
    pub start: RemoteTime,
    pub end: RemoteTime,
    /// Only present on listed events ("confirmed", "tentative", "cancelled").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// A boundary in the provider's format.
///
/// All-day boundaries use `date`, and the end date is exclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RemoteTime {
    #[serde(rename_all = "camelCase")]
    DateTime {
        /// RFC 3339 timestamp.
        date_time: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        time_zone: Option<String>,
    },
    Date { date: NaiveDate },
}

impl RemoteEvent {
    pub fn is_cancelled(&self) -> bool {
        self.status.as_deref() == Some("cancelled")
    }
}

/// A calendar service holding time-ranged events under its own identifiers.
///
/// Implementations report every provider or transport failure as
/// [`CalNoteError::SyncFailed`](crate::error::CalNoteError::SyncFailed).
#[async_trait]
pub trait RemoteCalendar: Send + Sync {
    /// Events whose time range intersects `window`.
    async fn list_events(
        &self,
        token: &AccessToken,
        window: &SyncWindow,
    ) -> CalNoteResult<Vec<RemoteEvent>>;

    /// Create an event and return the identifier the provider assigned.
    async fn create_event(&self, token: &AccessToken, event: &RemoteEvent) -> CalNoteResult<String>;

    async fn update_event(
        &self,
        token: &AccessToken,
        remote_ref: &str,
        event: &RemoteEvent,
    ) -> CalNoteResult<()>;

    async fn delete_event(&self, token: &AccessToken, remote_ref: &str) -> CalNoteResult<()>;
}
