//! Creation timestamp source for new notes.
//!
//! Dates are produced at the persistence boundary, never by callers, so the
//! service owns a [`Clock`] and tests swap in [`FixedClock`].

use chrono::{Local, NaiveDateTime};

/// Display/storage format for `note.date`.
pub const NOTE_DATE_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Source of "now" for note creation.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock in the device's local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Formats an instant as `yyyy/MM/dd HH:mm:ss`.
pub fn format_note_date(value: NaiveDateTime) -> String {
    value.format(NOTE_DATE_FORMAT).to_string()
}

/// Returns whether `value` is exactly a `yyyy/MM/dd HH:mm:ss` string.
///
/// The parser tolerates padding and sign variants, so the value must also
/// survive a format round trip.
pub fn is_note_date(value: &str) -> bool {
    NaiveDateTime::parse_from_str(value, NOTE_DATE_FORMAT)
        .is_ok_and(|parsed| format_note_date(parsed) == value)
}

#[cfg(test)]
mod tests {
    use super::{format_note_date, is_note_date, Clock, FixedClock, SystemClock};
    use chrono::NaiveDate;

    #[test]
    fn fixed_clock_formats_with_zero_padding() {
        let instant = NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|date| date.and_hms_opt(10, 0, 0))
            .expect("valid instant");
        assert_eq!(format_note_date(FixedClock(instant).now()), "2024/01/01 10:00:00");
    }

    #[test]
    fn system_clock_output_round_trips_through_format() {
        assert!(is_note_date(&format_note_date(SystemClock.now())));
    }

    #[test]
    fn malformed_dates_are_rejected() {
        assert!(!is_note_date("2024-01-01 10:00:00"));
        assert!(!is_note_date("2024/13/01 10:00:00"));
        assert!(!is_note_date(""));
    }

    #[test]
    fn loosely_formatted_dates_are_rejected() {
        assert!(!is_note_date("2024/1/1 1:0:0"));
        assert!(!is_note_date("  2024/01/01 10:00:00"));
        assert!(!is_note_date("+2024/01/01 10:00:00"));
        assert!(is_note_date("2024/01/01 10:00:00"));
    }
}
