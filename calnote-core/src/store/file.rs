//! Directory-backed store: one JSON document per item.
//!
//! Layout:
//!   <root>/events/<id>.json
//!   <root>/notes/<id>.json

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::watch;

use super::{Collection, LocalStore, MemoryStore, Snapshot, new_id};
use crate::error::{CalNoteError, CalNoteResult};
use crate::item::CalendarItem;

pub struct FileStore {
    root: PathBuf,
    index: MemoryStore,
}

impl FileStore {
    /// Open (creating if needed) the store rooted at `root` and load every
    /// document in it. Unreadable documents are skipped with a warning.
    pub async fn open(root: impl Into<PathBuf>) -> CalNoteResult<Self> {
        let root = root.into();
        let mut items = Vec::new();

        for collection in [Collection::Events, Collection::Notes] {
            let dir = root.join(collection.dir_name());
            tokio::fs::create_dir_all(&dir).await?;

            let mut entries = tokio::fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if path.extension().is_none_or(|e| e != "json") {
                    continue;
                }
                match read_item(&path).await {
                    Ok(item) => items.push(item),
                    Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping unreadable item"),
                }
            }
        }

        tracing::debug!(root = %root.display(), count = items.len(), "opened file store");

        Ok(FileStore {
            root,
            index: MemoryStore::with_items(items),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, item: &CalendarItem) -> PathBuf {
        self.root
            .join(Collection::of(item.kind).dir_name())
            .join(format!("{}.json", item.id))
    }

    /// Write via a temp file so readers never see a half-written document.
    async fn write(&self, item: &CalendarItem) -> CalNoteResult<()> {
        let path = self.path_for(item);
        let temp = path.with_extension("json.tmp");

        let content = serde_json::to_string_pretty(item)?;
        tokio::fs::write(&temp, content).await?;
        tokio::fs::rename(&temp, &path).await?;
        Ok(())
    }
}

async fn read_item(path: &Path) -> CalNoteResult<CalendarItem> {
    let content = tokio::fs::read_to_string(path).await?;
    serde_json::from_str(&content)
        .map_err(|e| CalNoteError::Store(format!("{}: {}", path.display(), e)))
}

#[async_trait]
impl LocalStore for FileStore {
    async fn create(&self, mut item: CalendarItem) -> CalNoteResult<String> {
        item.id = new_id();
        self.write(&item).await?;
        let id = item.id.clone();
        self.index.put(item);
        Ok(id)
    }

    async fn update(&self, item: &CalendarItem) -> CalNoteResult<()> {
        self.index.check_update(item)?;
        self.write(item).await?;
        self.index.put(item.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> CalNoteResult<()> {
        let item = self
            .index
            .fetch(id)
            .ok_or_else(|| CalNoteError::NotFound(id.to_string()))?;

        match tokio::fs::remove_file(self.path_for(&item)).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        self.index.remove(id);
        Ok(())
    }

    async fn get(&self, id: &str) -> CalNoteResult<Option<CalendarItem>> {
        self.index.get(id).await
    }

    async fn list(&self, collection: Collection) -> CalNoteResult<Vec<CalendarItem>> {
        self.index.list(collection).await
    }

    fn subscribe(&self, collection: Collection) -> watch::Receiver<Snapshot> {
        self.index.subscribe(collection)
    }
}
