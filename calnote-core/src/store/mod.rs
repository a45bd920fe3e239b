//! Local document store: the single source of truth for item existence.
//!
//! Items live in two collections, events and notes. Each collection is a
//! push feed: subscribers receive the full current collection after every
//! change, never a partial diff.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::CalNoteResult;
use crate::item::{CalendarItem, ItemKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Events,
    Notes,
}

impl Collection {
    pub fn of(kind: ItemKind) -> Self {
        match kind {
            ItemKind::Event => Collection::Events,
            ItemKind::Note => Collection::Notes,
        }
    }

    pub fn dir_name(&self) -> &'static str {
        match self {
            Collection::Events => "events",
            Collection::Notes => "notes",
        }
    }
}

/// Snapshot pushed to subscribers.
pub type Snapshot = Vec<CalendarItem>;

#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Store a new item and return the id assigned to it. Any id already on
    /// `item` is ignored.
    async fn create(&self, item: CalendarItem) -> CalNoteResult<String>;

    /// Replace an existing item, addressed by `item.id`.
    async fn update(&self, item: &CalendarItem) -> CalNoteResult<()>;

    async fn delete(&self, id: &str) -> CalNoteResult<()>;

    async fn get(&self, id: &str) -> CalNoteResult<Option<CalendarItem>>;

    async fn list(&self, collection: Collection) -> CalNoteResult<Vec<CalendarItem>>;

    /// Feed of the full collection, current value included.
    fn subscribe(&self, collection: Collection) -> watch::Receiver<Snapshot>;

    /// Events and notes together.
    async fn all(&self) -> CalNoteResult<Vec<CalendarItem>> {
        let mut items = self.list(Collection::Events).await?;
        items.extend(self.list(Collection::Notes).await?);
        Ok(items)
    }
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Stable order for published snapshots.
pub(crate) fn sort_snapshot(items: &mut [CalendarItem]) {
    items.sort_by(|a, b| {
        a.start
            .to_utc()
            .cmp(&b.start.to_utc())
            .then_with(|| a.id.cmp(&b.id))
    });
}
