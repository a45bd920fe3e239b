//! Values returned by the sync engine in place of raised remote errors.

use std::fmt;

use crate::convert::REMOTE_ID_PREFIX;
use crate::error::CalNoteError;
use crate::item::CalendarItem;

/// Outcome of [`SyncEngine::sync_item`](super::SyncEngine::sync_item).
#[derive(Debug)]
pub enum LinkResult {
    /// The remote counterpart exists and holds the item's current content.
    Linked(String),
    /// Nothing was sent (notes never sync).
    Unlinked,
    /// The remote call did not happen or did not succeed. The item keeps
    /// whatever link state it had.
    Failed(CalNoteError),
}

impl LinkResult {
    pub fn is_linked(&self) -> bool {
        matches!(self, LinkResult::Linked(_))
    }

    pub fn remote_ref(&self) -> Option<&str> {
        match self {
            LinkResult::Linked(remote_ref) => Some(remote_ref),
            _ => None,
        }
    }

    /// Record the outcome on the caller's copy of the item.
    ///
    /// A failure never clears an existing `remote_ref`, so later edits keep
    /// updating the same remote event.
    pub fn apply_to(&self, item: &mut CalendarItem) {
        match self {
            LinkResult::Linked(remote_ref) => {
                item.remote_ref = Some(remote_ref.clone());
                item.remote_synced = true;
            }
            LinkResult::Failed(_) => item.remote_synced = false,
            LinkResult::Unlinked => {}
        }
    }
}

/// Outcome of [`SyncEngine::unlink_and_delete`](super::SyncEngine::unlink_and_delete).
#[derive(Debug)]
pub enum DeleteOutcome {
    Deleted,
    /// The remote event may now be an orphan.
    Failed(CalNoteError),
}

impl DeleteOutcome {
    pub fn is_deleted(&self) -> bool {
        matches!(self, DeleteOutcome::Deleted)
    }
}

/// Result of [`SyncEngine::reconcile`](super::SyncEngine::reconcile).
#[derive(Debug, Default)]
pub struct Reconciliation {
    /// Merged view: local items (with fresh links applied) plus remote-only
    /// events. Unique by remote id when linked, by local id otherwise.
    /// Order carries no meaning.
    pub items: Vec<CalendarItem>,
    /// `(local id, remote id)` for items created or re-pushed during this run.
    pub linked: Vec<(String, String)>,
    /// `(local id, error)` for items whose push failed. They remain in
    /// `items` unchanged apart from `remote_synced`.
    pub failed: Vec<(String, CalNoteError)>,
    /// Set when remote events could not be listed.
    pub remote_error: Option<CalNoteError>,
}

impl Reconciliation {
    /// Remote-only events materialized during this run.
    pub fn imported(&self) -> impl Iterator<Item = &CalendarItem> {
        self.items
            .iter()
            .filter(|item| item.id.starts_with(REMOTE_ID_PREFIX))
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.remote_error.is_none()
    }
}

impl fmt::Display for Reconciliation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} items, {} linked, {} imported, {} failed",
            self.items.len(),
            self.linked.len(),
            self.imported().count(),
            self.failed.len()
        )
    }
}
