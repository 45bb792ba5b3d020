use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%b %d, %Y", "%B %d, %Y"];

/// Parse a loosely formatted date or timestamp.
///
/// Accepts RFC 3339 ("2026-02-24T10:30:00Z"), a bare date read as midnight
/// UTC ("2026-02-26", "2026/02/26", "02/26/2026", "Feb 26, 2026",
/// "February 26, 2026"), and a zone-less date-time (read as UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.and_utc());
        }
    }
    None
}

/// Short date for display.
///
/// Example: "2026-02-26" → "Feb 26, 2026". Empty input renders as "--";
/// unparseable input is returned unchanged.
pub fn format_date(raw: &str) -> String {
    if raw.trim().is_empty() {
        return "--".to_string();
    }
    match parse_timestamp(raw) {
        Some(dt) => dt.format("%b %-d, %Y").to_string(),
        None => raw.to_string(),
    }
}

/// Date and time for display.
///
/// Example: "2026-02-24T10:30:00Z" → "Feb 24, 2026, 10:30 AM"
pub fn format_timestamp(raw: &str) -> String {
    if raw.trim().is_empty() {
        return "--".to_string();
    }
    match parse_timestamp(raw) {
        Some(dt) => dt.format("%b %-d, %Y, %-I:%M %p").to_string(),
        None => raw.to_string(),
    }
}

/// "1 message", "3 messages"
pub fn pluralize(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}
