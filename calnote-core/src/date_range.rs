//! Time window for fetching remote events.

use chrono::{DateTime, Months, NaiveDate, NaiveTime, Utc};

use crate::error::{CalNoteError, CalNoteResult};
use crate::item::{CalendarItem, ItemTime};

/// Default reach of a sync into the past.
pub const DEFAULT_MONTHS_BACK: u32 = 1;
/// Default reach of a sync into the future.
pub const DEFAULT_MONTHS_FORWARD: u32 = 2;

/// Half-open window `[from, to)` of instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl Default for SyncWindow {
    /// One month back to two months forward from now.
    fn default() -> Self {
        SyncWindow::around(Utc::now(), DEFAULT_MONTHS_BACK, DEFAULT_MONTHS_FORWARD)
    }
}

impl SyncWindow {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> CalNoteResult<Self> {
        if to <= from {
            return Err(CalNoteError::ValidationFailed(format!(
                "sync window ends ({to}) before it starts ({from})"
            )));
        }
        Ok(SyncWindow { from, to })
    }

    /// Window reaching `back` months before and `forward` months after `now`.
    pub fn around(now: DateTime<Utc>, back: u32, forward: u32) -> Self {
        let from = now.checked_sub_months(Months::new(back)).unwrap_or(now);
        let to = now.checked_add_months(Months::new(forward)).unwrap_or(now);
        SyncWindow { from, to }
    }

    /// Parse optional YYYY-MM-DD bounds, falling back to `default` for each
    /// side left out. `to` is inclusive of the whole named day.
    pub fn from_args(
        from: Option<&str>,
        to: Option<&str>,
        default: SyncWindow,
    ) -> CalNoteResult<Self> {
        let from_dt = match from {
            Some(s) => start_of_day(parse_date(s)?),
            None => default.from,
        };

        let to_dt = match to {
            Some(s) => {
                let day = parse_date(s)?;
                let next = day.succ_opt().ok_or_else(|| {
                    CalNoteError::ValidationFailed(format!("date '{s}' is out of range"))
                })?;
                start_of_day(next)
            }
            None => default.to,
        };

        SyncWindow::new(from_dt, to_dt)
    }

    /// Whether an item's span overlaps the window.
    pub fn intersects(&self, item: &CalendarItem) -> bool {
        let start = item.start.to_utc();
        // All-day ends are inclusive days, so they reach to the following midnight.
        let end = match item.end {
            ItemTime::Date(d) => d.succ_opt().map(start_of_day).unwrap_or(start),
            ItemTime::DateTime(dt) => dt,
        };
        start < self.to && (end > self.from || (end == start && start >= self.from))
    }
}

fn parse_date(s: &str) -> CalNoteResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
        CalNoteError::ValidationFailed(format!("Invalid date format '{s}'. Expected YYYY-MM-DD"))
    })
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::NewItem;
    use chrono::TimeZone;

    #[test]
    fn test_default_window_spans_one_month_back_two_forward() {
        let now = Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap();
        let window = SyncWindow::around(now, DEFAULT_MONTHS_BACK, DEFAULT_MONTHS_FORWARD);
        assert_eq!(window.from, Utc.with_ymd_and_hms(2024, 4, 15, 12, 0, 0).unwrap());
        assert_eq!(window.to, Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_from_args_includes_whole_end_day() {
        let default = SyncWindow::around(Utc::now(), 1, 2);
        let window = SyncWindow::from_args(Some("2024-06-01"), Some("2024-06-03"), default).unwrap();
        assert_eq!(window.from, Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
        assert_eq!(window.to, Utc.with_ymd_and_hms(2024, 6, 4, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_from_args_rejects_bad_dates() {
        let default = SyncWindow::default();
        assert!(SyncWindow::from_args(Some("06/01/2024"), None, default).is_err());
        assert!(SyncWindow::from_args(Some("2024-06-05"), Some("2024-06-01"), default).is_err());
    }

    #[test]
    fn test_intersects_is_half_open() {
        let window = SyncWindow::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap(),
        )
        .unwrap();

        let at = |h: u32| ItemTime::DateTime(Utc.with_ymd_and_hms(2024, 6, 1, h, 0, 0).unwrap());
        let inside = NewItem::event("a", at(9), at(10)).into_item(Utc::now());
        assert!(window.intersects(&inside));

        let next_day = ItemTime::Date(NaiveDate::from_ymd_opt(2024, 6, 2).unwrap());
        let outside = NewItem::event("b", next_day, next_day).into_item(Utc::now());
        assert!(!window.intersects(&outside));

        let day = ItemTime::Date(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        let all_day = NewItem::event("c", day, day).into_item(Utc::now());
        assert!(window.intersects(&all_day));
    }
}
