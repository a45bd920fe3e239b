//! The notebook: local persistence first, remote mirroring second.
//!
//! Every operation completes against the local store no matter what the
//! remote calendar does. Remote trouble surfaces only as a [`SyncNotice`].

use std::fmt;

use chrono::Utc;

use crate::credential::CredentialProvider;
use crate::date_range::SyncWindow;
use crate::error::{CalNoteError, CalNoteResult};
use crate::item::{CalendarItem, ItemPatch, NewItem};
use crate::remote::RemoteCalendar;
use crate::store::LocalStore;
use crate::sync::{DeleteOutcome, LinkResult, SyncEngine};

/// Informational outcome of the remote half of an operation.
#[derive(Debug)]
pub enum SyncNotice {
    Synced { remote_ref: String },
    /// Notes, and events deleted before they were ever linked.
    LocalOnly,
    /// Saved locally; the remote side will be retried on the next sync.
    Deferred(CalNoteError),
    /// Deleted locally; the remote copy could not be removed.
    Orphaned(CalNoteError),
}

impl SyncNotice {
    pub fn is_problem(&self) -> bool {
        matches!(self, SyncNotice::Deferred(_) | SyncNotice::Orphaned(_))
    }
}

impl From<LinkResult> for SyncNotice {
    fn from(result: LinkResult) -> Self {
        match result {
            LinkResult::Linked(remote_ref) => SyncNotice::Synced { remote_ref },
            LinkResult::Unlinked => SyncNotice::LocalOnly,
            LinkResult::Failed(e) => SyncNotice::Deferred(e),
        }
    }
}

impl fmt::Display for SyncNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncNotice::Synced { .. } => write!(f, "synced to remote calendar"),
            SyncNotice::LocalOnly => write!(f, "local only"),
            SyncNotice::Deferred(e) => write!(f, "saved locally, remote sync pending ({e})"),
            SyncNotice::Orphaned(e) => {
                write!(f, "deleted locally, remote copy left behind ({e})")
            }
        }
    }
}

/// Counts from [`Notebook::sync`].
#[derive(Debug, Default)]
pub struct SyncReport {
    pub linked: usize,
    pub imported: usize,
    pub failed: Vec<(String, CalNoteError)>,
    pub remote_error: Option<CalNoteError>,
}

pub struct Notebook<S, R, C> {
    store: S,
    engine: SyncEngine<R, C>,
}

impl<S, R, C> Notebook<S, R, C>
where
    S: LocalStore,
    R: RemoteCalendar,
    C: CredentialProvider,
{
    pub fn new(store: S, engine: SyncEngine<R, C>) -> Self {
        Notebook { store, engine }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn engine(&self) -> &SyncEngine<R, C> {
        &self.engine
    }

    async fn fetch(&self, id: &str) -> CalNoteResult<CalendarItem> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| CalNoteError::NotFound(id.to_string()))
    }

    /// Mirror an already stored item and persist the link outcome.
    async fn mirror(&self, item: &mut CalendarItem) -> CalNoteResult<SyncNotice> {
        if item.is_note() {
            return Ok(SyncNotice::LocalOnly);
        }

        let result = self.engine.sync_item(item).await;
        result.apply_to(item);
        self.store.update(item).await?;
        Ok(result.into())
    }

    pub async fn create(&self, new: NewItem) -> CalNoteResult<(CalendarItem, SyncNotice)> {
        let mut item = new.into_item(Utc::now());
        item.validate()?;

        item.id = self.store.create(item.clone()).await?;
        tracing::info!(id = %item.id, kind = %item.kind, "created item");

        let notice = self.mirror(&mut item).await?;
        Ok((item, notice))
    }

    pub async fn update(
        &self,
        id: &str,
        patch: ItemPatch,
    ) -> CalNoteResult<(CalendarItem, SyncNotice)> {
        let mut item = self.fetch(id).await?;
        patch.apply(&mut item, Utc::now());
        item.validate()?;

        self.store.update(&item).await?;
        tracing::info!(id = %item.id, "updated item");

        let notice = self.mirror(&mut item).await?;
        Ok((item, notice))
    }

    /// Delete locally, attempting exactly one remote delete for linked events.
    pub async fn delete(&self, id: &str) -> CalNoteResult<SyncNotice> {
        let item = self.fetch(id).await?;

        let notice = match (&item.remote_ref, item.is_event()) {
            (Some(remote_ref), true) => match self.engine.unlink_and_delete(remote_ref).await {
                DeleteOutcome::Deleted => SyncNotice::Synced {
                    remote_ref: remote_ref.clone(),
                },
                DeleteOutcome::Failed(e) => SyncNotice::Orphaned(e),
            },
            _ => SyncNotice::LocalOnly,
        };

        self.store.delete(id).await?;
        tracing::info!(%id, "deleted item");
        Ok(notice)
    }

    /// Reconcile the whole store with the remote calendar and persist the
    /// outcome: new links, failed attempts, and remote-only events.
    pub async fn sync(&self, window: &SyncWindow) -> CalNoteResult<SyncReport> {
        let local = self.store.all().await?;
        let reconciliation = self.engine.reconcile(&local, window).await;

        let mut report = SyncReport {
            linked: reconciliation.linked.len(),
            ..Default::default()
        };

        let touched: Vec<&str> = reconciliation
            .linked
            .iter()
            .map(|(id, _)| id.as_str())
            .chain(reconciliation.failed.iter().map(|(id, _)| id.as_str()))
            .collect();

        for merged in reconciliation
            .items
            .iter()
            .filter(|item| touched.contains(&item.id.as_str()))
        {
            self.store.update(merged).await?;
        }

        for remote_only in reconciliation.imported() {
            self.store.create(remote_only.clone()).await?;
            report.imported += 1;
        }

        report.failed = reconciliation.failed;
        report.remote_error = reconciliation.remote_error;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::StaticCredential;
    use crate::item::{ItemTime, Priority};
    use crate::store::{Collection, MemoryStore};
    use crate::test_support::{FakeRemote, remote_event};
    use chrono::{NaiveDate, TimeZone};

    type TestNotebook = Notebook<MemoryStore, FakeRemote, StaticCredential>;

    fn notebook(remote: FakeRemote) -> TestNotebook {
        Notebook::new(
            MemoryStore::new(),
            SyncEngine::new(remote, StaticCredential::new("token"), "UTC"),
        )
    }

    fn standup() -> NewItem {
        NewItem::event(
            "Standup",
            ItemTime::DateTime(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()),
            ItemTime::DateTime(Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()),
        )
    }

    fn window() -> SyncWindow {
        SyncWindow::new(
            Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_persists_remote_ref() {
        let nb = notebook(FakeRemote::new());

        let (item, notice) = nb.create(standup()).await.unwrap();

        assert!(matches!(notice, SyncNotice::Synced { .. }));
        let stored = nb.store().get(&item.id).await.unwrap().unwrap();
        assert!(stored.remote_ref.is_some());
        assert!(stored.remote_synced);
    }

    #[tokio::test]
    async fn test_create_with_remote_down_keeps_item_local() {
        let remote = FakeRemote::new();
        remote.fail_writes(true);
        let nb = notebook(remote);

        let (item, notice) = nb.create(standup()).await.unwrap();

        assert!(notice.is_problem());
        let stored = nb.store().get(&item.id).await.unwrap().unwrap();
        assert!(stored.remote_ref.is_none());
        assert!(!stored.remote_synced);
    }

    #[tokio::test]
    async fn test_notes_never_hit_remote() {
        let nb = notebook(FakeRemote::new());
        let on = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

        let (note, notice) = nb.create(NewItem::note("Ideas", on)).await.unwrap();
        nb.update(&note.id, ItemPatch { title: Some("More ideas".into()), ..Default::default() })
            .await
            .unwrap();
        nb.delete(&note.id).await.unwrap();

        assert!(matches!(notice, SyncNotice::LocalOnly));
        assert_eq!(nb.engine().remote().calls(), 0);
    }

    #[tokio::test]
    async fn test_edit_of_linked_item_updates_remote() {
        let nb = notebook(FakeRemote::new());
        let (item, _) = nb.create(standup()).await.unwrap();

        let patch = ItemPatch {
            priority: Some(Priority::High),
            ..Default::default()
        };
        let (edited, notice) = nb.update(&item.id, patch).await.unwrap();

        assert!(matches!(notice, SyncNotice::Synced { .. }));
        assert_eq!(edited.remote_ref, item.remote_ref);
        let remote = nb.engine().remote();
        assert_eq!((remote.creates(), remote.updates()), (1, 1));
        assert_eq!(remote.last_body().unwrap().color_id.as_deref(), Some("11"));
    }

    #[tokio::test]
    async fn test_invalid_edit_is_rejected_before_store() {
        let nb = notebook(FakeRemote::new());
        let (item, _) = nb.create(standup()).await.unwrap();

        let patch = ItemPatch {
            title: Some(" ".into()),
            ..Default::default()
        };
        assert!(matches!(
            nb.update(&item.id, patch).await,
            Err(CalNoteError::ValidationFailed(_))
        ));
        assert_eq!(nb.store().get(&item.id).await.unwrap().unwrap().title, "Standup");
    }

    #[tokio::test]
    async fn test_delete_completes_when_remote_delete_fails() {
        let nb = notebook(FakeRemote::new());
        let (item, _) = nb.create(standup()).await.unwrap();

        nb.engine().remote().fail_writes(true);
        let notice = nb.delete(&item.id).await.unwrap();

        assert!(matches!(notice, SyncNotice::Orphaned(_)));
        assert!(nb.store().get(&item.id).await.unwrap().is_none());
        assert_eq!(nb.engine().remote().deletes(), 1);
    }

    #[tokio::test]
    async fn test_delete_of_linked_item_removes_remote_event() {
        let nb = notebook(FakeRemote::new());
        let (item, _) = nb.create(standup()).await.unwrap();
        let remote_ref = item.remote_ref.clone().unwrap();

        nb.delete(&item.id).await.unwrap();

        assert!(!nb.engine().remote().contains(&remote_ref));
    }

    #[tokio::test]
    async fn test_sync_links_pending_and_imports_remote_only() {
        let remote = FakeRemote::new();
        remote.fail_writes(true);
        remote.seed(remote_event("ext-1", "Dentist", 2024, 5, 10));
        let nb = notebook(remote);

        let (pending, _) = nb.create(standup()).await.unwrap();
        nb.engine().remote().fail_writes(false);

        let report = nb.sync(&window()).await.unwrap();
        assert_eq!(report.linked, 1);
        assert_eq!(report.imported, 1);
        assert!(report.failed.is_empty());

        let stored = nb.store().get(&pending.id).await.unwrap().unwrap();
        assert!(stored.remote_ref.is_some());

        let events = nb.store().list(Collection::Events).await.unwrap();
        assert_eq!(events.len(), 2);
        assert!(events.iter().any(|e| e.remote_ref.as_deref() == Some("ext-1")));

        // A second run finds nothing new.
        let again = nb.sync(&window()).await.unwrap();
        assert_eq!((again.linked, again.imported), (0, 0));
        assert_eq!(nb.store().list(Collection::Events).await.unwrap().len(), 2);
        assert_eq!(nb.engine().remote().creates(), 2);
    }
}
