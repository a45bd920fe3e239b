//! Combined, display-ordered view over the events and notes feeds.

use tokio::sync::watch;

use crate::error::{CalNoteError, CalNoteResult};
use crate::item::CalendarItem;
use crate::store::{Collection, LocalStore, Snapshot};

/// Always rebuilt from the latest full snapshot of both feeds, so updates
/// arriving on either feed in any order never yield a stale partial union.
pub struct MergedView {
    events: watch::Receiver<Snapshot>,
    notes: watch::Receiver<Snapshot>,
}

impl MergedView {
    pub fn new(store: &impl LocalStore) -> Self {
        MergedView {
            events: store.subscribe(Collection::Events),
            notes: store.subscribe(Collection::Notes),
        }
    }

    /// Current merged list, sorted by start (notes after events on ties).
    pub fn current(&mut self) -> Vec<CalendarItem> {
        let mut items: Vec<CalendarItem> = self.events.borrow_and_update().clone();
        items.extend(self.notes.borrow_and_update().iter().cloned());
        items.sort_by(|a, b| {
            a.start
                .to_utc()
                .cmp(&b.start.to_utc())
                .then_with(|| a.is_note().cmp(&b.is_note()))
                .then_with(|| a.title.cmp(&b.title))
        });
        items
    }

    /// Wait until either feed changes, then return the rebuilt list.
    pub async fn changed(&mut self) -> CalNoteResult<Vec<CalendarItem>> {
        let result = tokio::select! {
            r = self.events.changed() => r,
            r = self.notes.changed() => r,
        };
        result.map_err(|_| CalNoteError::Store("store feed closed".into()))?;
        Ok(self.current())
    }
}
