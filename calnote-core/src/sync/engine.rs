use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use tokio::time::timeout;

use crate::convert::{FromRemote, ToRemote};
use crate::credential::{AccessToken, CredentialProvider};
use crate::date_range::SyncWindow;
use crate::error::{CalNoteError, CalNoteResult};
use crate::item::{CalendarItem, DedupKey};
use crate::remote::{RemoteCalendar, RemoteEvent};
use crate::sync::{DeleteOutcome, LinkResult, Reconciliation};

pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Keeps each local event's remote counterpart in step with local state.
///
/// The engine only reads items and returns outcomes. Persisting them is the
/// caller's job, and no remote failure ever escapes as an `Err`.
pub struct SyncEngine<R, C> {
    remote: R,
    credentials: C,
    time_zone: String,
    call_timeout: Duration,
}

impl<R: RemoteCalendar, C: CredentialProvider> SyncEngine<R, C> {
    /// `time_zone` is the IANA name sent with timed events.
    pub fn new(remote: R, credentials: C, time_zone: impl Into<String>) -> Self {
        SyncEngine {
            remote,
            credentials,
            time_zone: time_zone.into(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn credentials(&self) -> &C {
        &self.credentials
    }

    pub fn time_zone(&self) -> &str {
        &self.time_zone
    }

    /// Bound a remote call; expiry counts as a failed sync.
    async fn call<T>(
        &self,
        what: &str,
        fut: impl Future<Output = CalNoteResult<T>>,
    ) -> CalNoteResult<T> {
        timeout(self.call_timeout, fut).await.map_err(|_| {
            CalNoteError::SyncFailed(format!(
                "{what} timed out after {}s",
                self.call_timeout.as_secs_f32()
            ))
        })?
    }

    /// Credential lookup may refresh over the network, so it is bounded too.
    async fn token(&self) -> CalNoteResult<AccessToken> {
        self.call("credential refresh", self.credentials.access_token())
            .await
    }

    /// Push one event to the remote calendar.
    ///
    /// Unlinked items are created, linked items are updated in place. An
    /// update failure never falls back to a create.
    pub async fn sync_item(&self, item: &CalendarItem) -> LinkResult {
        if item.is_note() {
            tracing::debug!(id = %item.id, "notes are not synced");
            return LinkResult::Unlinked;
        }

        if let Err(e) = item.validate() {
            return LinkResult::Failed(e);
        }

        let token = match self.token().await {
            Ok(token) => token,
            Err(e) => return LinkResult::Failed(e),
        };

        self.push(&token, item).await
    }

    async fn push(&self, token: &AccessToken, item: &CalendarItem) -> LinkResult {
        let body = item.to_remote(&self.time_zone);

        match &item.remote_ref {
            None => {
                tracing::debug!(id = %item.id, title = %item.title, "creating remote event");
                match self
                    .call("create", self.remote.create_event(token, &body))
                    .await
                {
                    Ok(remote_ref) => LinkResult::Linked(remote_ref),
                    Err(e) => {
                        tracing::warn!(id = %item.id, error = %e, "remote create failed, item stays unlinked");
                        LinkResult::Failed(e)
                    }
                }
            }
            Some(remote_ref) => {
                tracing::debug!(id = %item.id, %remote_ref, "updating remote event");
                match self
                    .call("update", self.remote.update_event(token, remote_ref, &body))
                    .await
                {
                    Ok(()) => LinkResult::Linked(remote_ref.clone()),
                    Err(e) => {
                        tracing::warn!(id = %item.id, %remote_ref, error = %e, "remote update failed");
                        LinkResult::Failed(e)
                    }
                }
            }
        }
    }

    /// Delete the remote counterpart of a locally deleted event.
    ///
    /// Failures are logged and returned, never raised: the local delete goes
    /// ahead regardless and the remote event is left as an orphan.
    pub async fn unlink_and_delete(&self, remote_ref: &str) -> DeleteOutcome {
        let result = match self.token().await {
            Ok(token) => {
                tracing::debug!(%remote_ref, "deleting remote event");
                self.call("delete", self.remote.delete_event(&token, remote_ref))
                    .await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => DeleteOutcome::Deleted,
            Err(e) => {
                tracing::warn!(%remote_ref, error = %e, "remote delete failed, remote event orphaned");
                DeleteOutcome::Failed(e)
            }
        }
    }

    /// Merge local items with the remote events inside `window`.
    ///
    /// Unlinked local events get a create attempt and linked events whose
    /// last push failed get another update. Remote events that no local
    /// item points at are materialized as new local-shaped items.
    pub async fn reconcile(&self, local: &[CalendarItem], window: &SyncWindow) -> Reconciliation {
        let mut out = Reconciliation::default();

        let token = match self.token().await {
            Ok(token) => Some(token),
            Err(e) => {
                tracing::info!(error = %e, "reconcile without remote access");
                out.remote_error = Some(e);
                None
            }
        };

        let remote_events = match &token {
            Some(token) => match self
                .call("list", self.remote.list_events(token, window))
                .await
            {
                Ok(events) => events,
                Err(e) => {
                    tracing::warn!(error = %e, "listing remote events failed");
                    out.remote_error = Some(e);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        let mut seen: HashSet<DedupKey> = HashSet::new();

        for item in local {
            let mut merged = item.clone();

            let needs_push = item.is_event() && !(item.is_linked() && item.remote_synced);
            if let (Some(token), true) = (&token, needs_push) {
                let result = match item.validate() {
                    Ok(()) => self.push(token, item).await,
                    Err(e) => LinkResult::Failed(e),
                };
                result.apply_to(&mut merged);
                match result {
                    LinkResult::Linked(remote_ref) => {
                        out.linked.push((item.id.clone(), remote_ref));
                    }
                    LinkResult::Failed(e) => out.failed.push((item.id.clone(), e)),
                    LinkResult::Unlinked => {}
                }
            }

            if seen.insert(merged.dedup_key()) {
                out.items.push(merged);
            } else {
                tracing::warn!(id = %item.id, key = ?merged.dedup_key(), "dropping duplicate local entry");
            }
        }

        let now = Utc::now();
        for event in remote_events {
            if !should_import(&event, &seen) {
                continue;
            }
            match CalendarItem::from_remote(event, now) {
                Ok(item) => {
                    seen.insert(item.dedup_key());
                    out.items.push(item);
                }
                Err(e) => tracing::warn!(error = %e, "skipping unreadable remote event"),
            }
        }

        tracing::info!(summary = %out, "reconciled");
        out
    }
}

fn should_import(event: &RemoteEvent, seen: &HashSet<DedupKey>) -> bool {
    match &event.id {
        Some(id) => !event.is_cancelled() && !seen.contains(&DedupKey::Remote(id.clone())),
        None => false,
    }
}
