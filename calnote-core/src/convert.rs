//! Translation between local items and remote events.

use chrono::{DateTime, Days, SecondsFormat, Utc};

use crate::error::{CalNoteError, CalNoteResult};
use crate::item::{CalendarItem, ItemKind, ItemTime, Priority};
use crate::remote::{RemoteEvent, RemoteTime};

/// Prefix for the placeholder local id of a remote-only event.
pub const REMOTE_ID_PREFIX: &str = "remote:";

const UNTITLED: &str = "(untitled)";

/// Priority -> remote color tag. This table is the only channel that carries
/// priority remotely, so its values must not change.
const PRIORITY_COLORS: [(Priority, &str); 3] = [
    (Priority::Low, "2"),
    (Priority::Medium, "5"),
    (Priority::High, "11"),
];

pub fn priority_to_color(priority: Priority) -> &'static str {
    PRIORITY_COLORS
        .iter()
        .find(|(p, _)| *p == priority)
        .map(|(_, color)| *color)
        .unwrap_or("5")
}

/// Unknown or missing tags map to the default priority.
pub fn color_to_priority(color: Option<&str>) -> Priority {
    color
        .and_then(|c| PRIORITY_COLORS.iter().find(|(_, tag)| *tag == c))
        .map(|(p, _)| *p)
        .unwrap_or_default()
}

pub trait ToRemote {
    /// `time_zone` is the IANA name attached to timed boundaries.
    fn to_remote(&self, time_zone: &str) -> RemoteEvent;
}

impl ToRemote for CalendarItem {
    fn to_remote(&self, time_zone: &str) -> RemoteEvent {
        RemoteEvent {
            id: None,
            summary: self.title.clone(),
            description: self.content.clone().unwrap_or_default(),
            color_id: Some(priority_to_color(self.priority).to_string()),
            start: boundary_to_remote(&self.start, time_zone, false),
            end: boundary_to_remote(&self.end, time_zone, true),
            status: None,
        }
    }
}

fn boundary_to_remote(time: &ItemTime, time_zone: &str, is_end: bool) -> RemoteTime {
    match time {
        ItemTime::DateTime(dt) => RemoteTime::DateTime {
            date_time: dt.to_rfc3339_opts(SecondsFormat::Millis, true),
            time_zone: Some(time_zone.to_string()),
        },
        // The provider's end date is exclusive: one day past our inclusive end.
        ItemTime::Date(d) if is_end => RemoteTime::Date {
            date: d.checked_add_days(Days::new(1)).unwrap_or(*d),
        },
        ItemTime::Date(d) => RemoteTime::Date { date: *d },
    }
}

pub trait FromRemote {
    fn from_remote(event: RemoteEvent, now: DateTime<Utc>) -> CalNoteResult<Self>
    where
        Self: Sized;
}

impl FromRemote for CalendarItem {
    /// Materialize a remote-only event as a linked local event.
    fn from_remote(event: RemoteEvent, now: DateTime<Utc>) -> CalNoteResult<Self> {
        let remote_ref = event
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| CalNoteError::SyncFailed("remote event has no id".into()))?;

        let start = boundary_from_remote(&event.start)?;
        let mut end = boundary_from_remote(&event.end)?;

        if let (ItemTime::Date(s), ItemTime::Date(e)) = (start, end) {
            let inclusive = e.checked_sub_days(Days::new(1)).unwrap_or(e);
            end = ItemTime::Date(inclusive.max(s));
        }

        let title = if event.summary.trim().is_empty() {
            UNTITLED.to_string()
        } else {
            event.summary
        };

        Ok(CalendarItem {
            id: format!("{REMOTE_ID_PREFIX}{remote_ref}"),
            kind: ItemKind::Event,
            title,
            content: Some(event.description).filter(|d| !d.is_empty()),
            start,
            end,
            priority: color_to_priority(event.color_id.as_deref()),
            remote_ref: Some(remote_ref),
            remote_synced: true,
            created_at: now,
            updated_at: now,
        })
    }
}

fn boundary_from_remote(time: &RemoteTime) -> CalNoteResult<ItemTime> {
    match time {
        RemoteTime::Date { date } => Ok(ItemTime::Date(*date)),
        RemoteTime::DateTime { date_time, .. } => DateTime::parse_from_rfc3339(date_time)
            .map(|dt| ItemTime::DateTime(dt.with_timezone(&Utc)))
            .map_err(|e| {
                CalNoteError::SyncFailed(format!("invalid remote timestamp '{date_time}': {e}"))
            }),
    }
}
