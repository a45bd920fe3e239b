use anyhow::{Context, Result};
use calnote_core::{CalNoteConfig, ItemTime};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"];

/// The zone local wall-clock input is read in.
pub fn time_zone(config: &CalNoteConfig) -> Result<Tz> {
    let name = config.resolved_time_zone()?;
    name.parse::<Tz>()
        .map_err(|_| anyhow::anyhow!("Unknown time zone '{name}'"))
}

/// Parse "YYYY-MM-DD" as an all-day boundary, anything with a time as an instant.
pub fn parse_time(input: &str, tz: Tz) -> Result<ItemTime> {
    let input = input.trim();

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(ItemTime::Date(date));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(ItemTime::DateTime(dt.with_timezone(&Utc)));
    }

    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            let local = tz
                .from_local_datetime(&naive)
                .earliest()
                .with_context(|| format!("'{input}' does not exist in {tz}"))?;
            return Ok(ItemTime::DateTime(local.with_timezone(&Utc)));
        }
    }

    anyhow::bail!("Could not parse '{input}' (expected YYYY-MM-DD or YYYY-MM-DDTHH:MM)")
}

/// Same day for all-day items, one hour later for timed ones.
pub fn default_end(start: &ItemTime) -> ItemTime {
    match start {
        ItemTime::Date(date) => ItemTime::Date(*date),
        ItemTime::DateTime(dt) => ItemTime::DateTime(*dt + Duration::hours(1)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_is_all_day() {
        let parsed = parse_time("2024-07-01", Tz::UTC).unwrap();
        assert_eq!(
            parsed,
            ItemTime::Date(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap())
        );
    }

    #[test]
    fn test_parse_local_time_in_zone() {
        let parsed = parse_time("2024-05-01T09:00", chrono_tz::Europe::Berlin).unwrap();
        assert_eq!(
            parsed,
            ItemTime::DateTime(Utc.with_ymd_and_hms(2024, 5, 1, 7, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_rfc3339() {
        let parsed = parse_time("2024-05-01T09:00:00-04:00", Tz::UTC).unwrap();
        assert_eq!(
            parsed,
            ItemTime::DateTime(Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_nonexistent_local_time_is_rejected() {
        // Clocks jump from 02:00 to 03:00 in Berlin on this day.
        assert!(parse_time("2024-03-31T02:30", chrono_tz::Europe::Berlin).is_err());
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(parse_time("next tuesday", Tz::UTC).is_err());
    }

    #[test]
    fn test_default_end() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        assert_eq!(
            default_end(&ItemTime::DateTime(start)),
            ItemTime::DateTime(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap())
        );

        let day = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        assert_eq!(default_end(&ItemTime::Date(day)), ItemTime::Date(day));
    }
}
