//! Core of calnote: a local notebook of events and notes, mirrored to a
//! remote calendar.
//!
//! - [`item`] holds the data model shared by the store and the sync engine
//! - [`store`] is the local source of truth, exposed as push feeds
//! - [`sync`] mirrors events to any [`remote::RemoteCalendar`]
//! - [`notebook`] ties the two together for create, edit, delete and sync

pub mod config;
pub mod convert;
pub mod credential;
pub mod date_range;
pub mod error;
pub mod item;
pub mod notebook;
pub mod remote;
pub mod store;
pub mod sync;
pub mod view;

#[cfg(test)]
mod test_support;

pub use config::CalNoteConfig;
pub use credential::{AccessToken, CredentialProvider, StaticCredential};
pub use date_range::SyncWindow;
pub use error::{CalNoteError, CalNoteResult};
pub use item::{CalendarItem, DedupKey, ItemKind, ItemPatch, ItemTime, NewItem, Priority};
pub use notebook::{Notebook, SyncNotice, SyncReport};
pub use remote::{RemoteCalendar, RemoteEvent, RemoteTime};
pub use store::{Collection, FileStore, LocalStore, MemoryStore};
pub use sync::{DeleteOutcome, LinkResult, Reconciliation, SyncEngine};
pub use view::MergedView;
