//! Date helper functions

use chrono::NaiveDateTime;

/// Format a date with a chrono format string, falling back to ISO dates
/// when the pattern is invalid
pub fn format_date(date: &NaiveDateTime, format: &str) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    if write!(out, "{}", date.format(format)).is_err() {
        return date.format("%Y-%m-%d").to_string();
    }
    out
}

/// Format a date in RFC 3339, treating it as UTC
pub fn date_xml(date: &NaiveDateTime) -> String {
    date.and_utc().to_rfc3339()
}
