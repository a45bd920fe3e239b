//! Calendar items: the events and notes kept in the local notebook.
//!
//! Only events are mirrored to a remote calendar. Notes live locally and
//! never reach the sync engine.

use std::fmt;

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CalNoteError, CalNoteResult};

/// A single event or note in the local notebook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarItem {
    /// Assigned by the local store on creation, stable for the item's lifetime.
    pub id: String,
    pub kind: ItemKind,
    pub title: String,
    /// Free-form body text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub start: ItemTime,
    pub end: ItemTime,
    #[serde(default)]
    pub priority: Priority,

    /// Identifier of the remote counterpart. Its presence is the only
    /// signal that an item is linked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_ref: Option<String>,
    /// Whether the last sync attempt for this item succeeded.
    #[serde(default)]
    pub remote_synced: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Event,
    Note,
}

/// Local-only importance. Travels to the remote calendar as a color tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// One boundary of an item.
///
/// All-day items use `Date` on both ends, and the end date is the last day
/// the item covers (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemTime {
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
}

impl ItemTime {
    /// Instant used for ordering; dates are taken at midnight UTC.
    pub fn to_utc(&self) -> DateTime<Utc> {
        match self {
            ItemTime::DateTime(dt) => *dt,
            ItemTime::Date(d) => d.and_time(NaiveTime::MIN).and_utc(),
        }
    }

    pub fn is_date(&self) -> bool {
        matches!(self, ItemTime::Date(_))
    }

    pub fn date(&self) -> NaiveDate {
        match self {
            ItemTime::DateTime(dt) => dt.date_naive(),
            ItemTime::Date(d) => *d,
        }
    }
}

impl fmt::Display for ItemTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemTime::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M UTC")),
            ItemTime::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Event => write!(f, "event"),
            ItemKind::Note => write!(f, "note"),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = CalNoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(CalNoteError::ValidationFailed(format!(
                "unknown priority '{other}' (expected low, medium or high)"
            ))),
        }
    }
}

impl fmt::Display for CalendarItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

impl CalendarItem {
    pub fn is_event(&self) -> bool {
        self.kind == ItemKind::Event
    }

    pub fn is_note(&self) -> bool {
        self.kind == ItemKind::Note
    }

    pub fn is_linked(&self) -> bool {
        self.remote_ref.is_some()
    }

    pub fn is_all_day(&self) -> bool {
        self.start.is_date() && self.end.is_date()
    }

    /// Key used to keep merged lists free of duplicates: the remote
    /// identifier when linked, the local id otherwise.
    pub fn dedup_key(&self) -> DedupKey {
        match &self.remote_ref {
            Some(remote_ref) => DedupKey::Remote(remote_ref.clone()),
            None => DedupKey::Local(self.id.clone()),
        }
    }

    /// Reject malformed items before anything touches the network.
    pub fn validate(&self) -> CalNoteResult<()> {
        if self.title.trim().is_empty() {
            return Err(CalNoteError::ValidationFailed("title is empty".into()));
        }

        match (&self.start, &self.end) {
            (ItemTime::Date(start), ItemTime::Date(end)) if end < start => {
                Err(CalNoteError::ValidationFailed(format!(
                    "end date {end} is before start date {start}"
                )))
            }
            // The remote end date is exclusive, one day past the local one.
            (ItemTime::Date(_), ItemTime::Date(end))
                if end.checked_add_days(Days::new(1)).is_none() =>
            {
                Err(CalNoteError::ValidationFailed(format!(
                    "end date {end} is out of range"
                )))
            }
            (ItemTime::DateTime(start), ItemTime::DateTime(end)) if end < start => {
                Err(CalNoteError::ValidationFailed(format!(
                    "end {end} is before start {start}"
                )))
            }
            (ItemTime::Date(_), ItemTime::DateTime(_))
            | (ItemTime::DateTime(_), ItemTime::Date(_)) => Err(CalNoteError::ValidationFailed(
                "start and end must both be dates or both be date-times".into(),
            )),
            _ => Ok(()),
        }
    }
}

/// Identity of an item in a merged list. Local ids and remote ids live in
/// separate namespaces, so they never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DedupKey {
    Remote(String),
    Local(String),
}

/// Fields a user supplies when creating an item. The store assigns the id.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub kind: ItemKind,
    pub title: String,
    pub content: Option<String>,
    pub start: ItemTime,
    pub end: ItemTime,
    pub priority: Priority,
}

impl NewItem {
    pub fn event(title: impl Into<String>, start: ItemTime, end: ItemTime) -> Self {
        NewItem {
            kind: ItemKind::Event,
            title: title.into(),
            content: None,
            start,
            end,
            priority: Priority::default(),
        }
    }

    pub fn note(title: impl Into<String>, on: NaiveDate) -> Self {
        NewItem {
            kind: ItemKind::Note,
            title: title.into(),
            content: None,
            start: ItemTime::Date(on),
            end: ItemTime::Date(on),
            priority: Priority::default(),
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Build an unlinked item with a placeholder id, for the store to fill in.
    pub fn into_item(self, now: DateTime<Utc>) -> CalendarItem {
        CalendarItem {
            id: String::new(),
            kind: self.kind,
            title: self.title,
            content: self.content,
            start: self.start,
            end: self.end,
            priority: self.priority,
            remote_ref: None,
            remote_synced: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A partial edit. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ItemPatch {
    pub title: Option<String>,
    /// `Some(None)` clears the content.
    pub content: Option<Option<String>>,
    pub start: Option<ItemTime>,
    pub end: Option<ItemTime>,
    pub priority: Option<Priority>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.start.is_none()
            && self.end.is_none()
            && self.priority.is_none()
    }

    /// Apply the edit. Link state is never touched here.
    pub fn apply(self, item: &mut CalendarItem, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            item.title = title;
        }
        if let Some(content) = self.content {
            item.content = content;
        }
        if let Some(start) = self.start {
            item.start = start;
        }
        if let Some(end) = self.end {
            item.end = end;
        }
        if let Some(priority) = self.priority {
            item.priority = priority;
        }
        item.updated_at = now;
    }
}
