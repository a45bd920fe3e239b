//! In-memory store. Also serves as the index behind [`FileStore`](super::FileStore).

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::watch;

use super::{Collection, LocalStore, Snapshot, new_id, sort_snapshot};
use crate::error::{CalNoteError, CalNoteResult};
use crate::item::CalendarItem;

pub struct MemoryStore {
    items: Mutex<HashMap<String, CalendarItem>>,
    events_feed: watch::Sender<Snapshot>,
    notes_feed: watch::Sender<Snapshot>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            items: Mutex::new(HashMap::new()),
            events_feed: watch::Sender::new(Vec::new()),
            notes_feed: watch::Sender::new(Vec::new()),
        }
    }

    /// Build a store pre-filled with `items`, keeping their ids.
    pub fn with_items(items: impl IntoIterator<Item = CalendarItem>) -> Self {
        let store = Self::new();
        {
            let mut map = store.lock();
            for item in items {
                map.insert(item.id.clone(), item);
            }
            store.publish_locked(&map, Collection::Events);
            store.publish_locked(&map, Collection::Notes);
        }
        store
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CalendarItem>> {
        // A panic mid-insert cannot leave a map entry half-written.
        self.items.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn feed(&self, collection: Collection) -> &watch::Sender<Snapshot> {
        match collection {
            Collection::Events => &self.events_feed,
            Collection::Notes => &self.notes_feed,
        }
    }

    fn collect(&self, collection: Collection) -> Vec<CalendarItem> {
        collect_from(&self.lock(), collection)
    }

    /// Send a snapshot of `map`. Callers hold the map lock, so snapshots are
    /// published in the same order as the writes that produced them.
    fn publish_locked(&self, map: &HashMap<String, CalendarItem>, collection: Collection) {
        self.feed(collection)
            .send_replace(collect_from(map, collection));
    }

    /// Insert under the item's own id, replacing whatever was there.
    pub(crate) fn put(&self, item: CalendarItem) {
        let collection = Collection::of(item.kind);
        let mut map = self.lock();
        map.insert(item.id.clone(), item);
        self.publish_locked(&map, collection);
    }

    pub(crate) fn remove(&self, id: &str) -> Option<CalendarItem> {
        let mut map = self.lock();
        let removed = map.remove(id);
        if let Some(item) = &removed {
            self.publish_locked(&map, Collection::of(item.kind));
        }
        removed
    }

    pub(crate) fn fetch(&self, id: &str) -> Option<CalendarItem> {
        self.lock().get(id).cloned()
    }

    /// Ensure `item` can replace the stored item with the same id.
    pub(crate) fn check_update(&self, item: &CalendarItem) -> CalNoteResult<()> {
        let existing = self
            .fetch(&item.id)
            .ok_or_else(|| CalNoteError::NotFound(item.id.clone()))?;
        if existing.kind != item.kind {
            return Err(CalNoteError::ValidationFailed(format!(
                "cannot turn {} '{}' into a {}",
                existing.kind, item.id, item.kind
            )));
        }
        Ok(())
    }
}

fn collect_from(map: &HashMap<String, CalendarItem>, collection: Collection) -> Vec<CalendarItem> {
    let mut items: Vec<_> = map
        .values()
        .filter(|item| Collection::of(item.kind) == collection)
        .cloned()
        .collect();
    sort_snapshot(&mut items);
    items
}

#[async_trait]
impl LocalStore for MemoryStore {
    async fn create(&self, mut item: CalendarItem) -> CalNoteResult<String> {
        item.id = new_id();
        let id = item.id.clone();
        self.put(item);
        Ok(id)
    }

    async fn update(&self, item: &CalendarItem) -> CalNoteResult<()> {
        self.check_update(item)?;
        self.put(item.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> CalNoteResult<()> {
        self.remove(id)
            .map(|_| ())
            .ok_or_else(|| CalNoteError::NotFound(id.to_string()))
    }

    async fn get(&self, id: &str) -> CalNoteResult<Option<CalendarItem>> {
        Ok(self.fetch(id))
    }

    async fn list(&self, collection: Collection) -> CalNoteResult<Vec<CalendarItem>> {
        Ok(self.collect(collection))
    }

    fn subscribe(&self, collection: Collection) -> watch::Receiver<Snapshot> {
        self.feed(collection).subscribe()
    }
}
