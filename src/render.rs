//! Terminal rendering for calnote-core types.
//!
//! Extension traits that add colored output using owo_colors.

use calnote_core::{CalNoteError, CalendarItem, ItemTime, Priority, SyncNotice, SyncReport};
use chrono::Local;
use owo_colors::OwoColorize;

/// Extension trait for colored terminal rendering.
pub trait Render {
    fn render(&self) -> String;
}

/// Ids are uuids; the first block is enough to address an item.
const SHORT_ID_LEN: usize = 8;

impl Render for Priority {
    fn render(&self) -> String {
        match self {
            Priority::High => "!!".red().to_string(),
            Priority::Medium => "! ".yellow().to_string(),
            Priority::Low => "  ".to_string(),
        }
    }
}

fn render_time(item: &CalendarItem) -> String {
    match (item.start, item.end) {
        (ItemTime::Date(start), ItemTime::Date(end)) if start == end => "all day".to_string(),
        (ItemTime::Date(start), ItemTime::Date(end)) => {
            format!("{} → {}", start.format("%b %-d"), end.format("%b %-d"))
        }
        (start, end) => {
            let start = start.to_utc().with_timezone(&Local);
            let end = end.to_utc().with_timezone(&Local);
            if start.date_naive() == end.date_naive() {
                format!("{} → {}", start.format("%H:%M"), end.format("%H:%M"))
            } else {
                format!("{} → {}", start.format("%H:%M"), end.format("%b %-d %H:%M"))
            }
        }
    }
}

fn sync_marker(item: &CalendarItem) -> String {
    if item.is_note() {
        " ".to_string()
    } else if item.is_linked() && item.remote_synced {
        "✓".green().to_string()
    } else if item.is_linked() {
        "~".yellow().to_string()
    } else {
        "○".yellow().to_string()
    }
}

impl Render for CalendarItem {
    fn render(&self) -> String {
        let short_id: String = self.id.chars().take(SHORT_ID_LEN).collect();
        let title = if self.is_note() {
            format!("✎ {}", self.title).italic().to_string()
        } else {
            self.title.clone()
        };

        format!(
            "{} {} {} {} {}",
            short_id.dimmed(),
            sync_marker(self),
            self.priority.render(),
            title,
            render_time(self).dimmed()
        )
    }
}

impl Render for SyncNotice {
    fn render(&self) -> String {
        match self {
            SyncNotice::Synced { .. } => self.to_string().green().to_string(),
            SyncNotice::LocalOnly => self.to_string().dimmed().to_string(),
            SyncNotice::Deferred(_) => self.to_string().yellow().to_string(),
            SyncNotice::Orphaned(_) => self.to_string().red().to_string(),
        }
    }
}

fn render_remote_error(e: &CalNoteError) -> String {
    match e {
        CalNoteError::Unauthenticated => "Not signed in, run `calnote auth` to connect Google Calendar"
            .yellow()
            .to_string(),
        other => format!("Remote calendar unavailable: {other}").red().to_string(),
    }
}

impl Render for SyncReport {
    fn render(&self) -> String {
        let mut lines = Vec::new();

        if let Some(e) = &self.remote_error {
            lines.push(render_remote_error(e));
        }

        if self.linked == 0 && self.imported == 0 && self.failed.is_empty() {
            if self.remote_error.is_none() {
                lines.push("Everything is in sync".dimmed().to_string());
            }
            return lines.join("\n");
        }

        if self.linked > 0 {
            lines.push(format!("{} pushed {} event(s)", "↑".green(), self.linked));
        }
        if self.imported > 0 {
            lines.push(format!("{} imported {} event(s)", "↓".green(), self.imported));
        }
        for (id, e) in &self.failed {
            let short_id: String = id.chars().take(SHORT_ID_LEN).collect();
            lines.push(format!("{} {} {}", "✗".red(), short_id.dimmed(), e.to_string().red()));
        }

        lines.join("\n")
    }
}
