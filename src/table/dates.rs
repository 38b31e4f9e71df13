use chrono::{NaiveDate, NaiveDateTime};

/// Formats carrying an explicit time component, tried first.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%d-%m-%Y %H:%M:%S",
];

/// Date-only formats; matches are promoted to midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d-%m-%Y", "%d-%b-%Y"];

/// Lenient parse of the date shapes entity exports produce.
///
/// Tries the known formats in order and returns `None` for anything that
/// matches none of them, so callers can coerce failures to null instead of
/// aborting a file. Slashed dates are read month-first, hyphenated
/// day-month dates day-first; bare numbers are rejected rather than read
/// as Excel serial offsets.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}
