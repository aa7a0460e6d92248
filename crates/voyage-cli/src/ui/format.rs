//! String formatting utilities for UI rendering.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use uuid::Uuid;

/// Truncate a string to `max_len` characters, adding an ellipsis if needed.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    if max_len <= 3 {
        return s.chars().take(max_len).collect();
    }
    let truncated: String = s.chars().take(max_len - 3).collect();
    format!("{}...", truncated)
}

/// Wrap text to a given width, preserving newlines.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if current.is_empty() {
                current = word.to_string();
            } else if current.chars().count() + 1 + word.chars().count() <= width {
                current.push(' ');
                current.push_str(word);
            } else {
                lines.push(std::mem::take(&mut current));
                current = word.to_string();
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    lines
}

/// First eight characters of a UUID.
pub fn short_id(id: &Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}

/// Format a timestamp for display.
///
/// Pretty output uses the configured zone (UTC when unset); plain output is
/// always RFC 3339 in UTC.
pub fn format_datetime(dt: &DateTime<Utc>, pretty: bool, tz: Option<Tz>) -> String {
    if !pretty {
        return dt.to_rfc3339();
    }
    match tz {
        Some(tz) => dt.with_timezone(&tz).format("%Y-%m-%d %H:%M %Z").to_string(),
        None => dt.format("%Y-%m-%d %H:%M UTC").to_string(),
    }
}

/// Date only, in the configured zone.
pub fn format_date(dt: &DateTime<Utc>, tz: Option<Tz>) -> String {
    match tz {
        Some(tz) => dt.with_timezone(&tz).format("%Y-%m-%d").to_string(),
        None => dt.format("%Y-%m-%d").to_string(),
    }
}

/// Format bytes as a human-readable size.
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Replace newlines with spaces for single-line output.
pub fn single_line(s: &str) -> String {
    s.replace('\r', "").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Kotor", 10), "Kotor");
        assert_eq!(truncate("Kotor", 5), "Kotor");
        assert_eq!(truncate("Bay of Kotor", 8), "Bay o...");
        assert_eq!(truncate("Kotor", 2), "Ko");
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        assert_eq!(truncate("Ω Ψ Φ Σ", 7), "Ω Ψ Φ Σ");
    }

    #[test]
    fn test_wrap() {
        assert_eq!(
            wrap("sailed north past the islands", 12),
            vec!["sailed north", "past the", "islands"]
        );
        assert_eq!(wrap("one\n\ntwo", 20), vec!["one", "", "two"]);
    }

    #[test]
    fn test_short_id() {
        let id = Uuid::parse_str("7a2e3c0b-1234-5678-9abc-def012345678").unwrap();
        assert_eq!(short_id(&id), "7a2e3c0b");
    }

    #[test]
    fn test_format_datetime_zones() {
        let dt = Utc.with_ymd_and_hms(2026, 6, 1, 18, 30, 0).unwrap();
        assert_eq!(format_datetime(&dt, true, None), "2026-06-01 18:30 UTC");
        assert_eq!(
            format_datetime(&dt, true, Some(chrono_tz::Europe::Athens)),
            "2026-06-01 21:30 EEST"
        );
        assert_eq!(format_datetime(&dt, false, None), "2026-06-01T18:30:00+00:00");
        assert_eq!(
            format_date(&dt, Some(chrono_tz::Pacific::Auckland)),
            "2026-06-02"
        );
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(500), "500 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1048576), "1.0 MB");
    }

    #[test]
    fn test_single_line() {
        assert_eq!(single_line("calm\r\nseas"), "calm seas");
    }
}
