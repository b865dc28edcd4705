//! Front-matter date normalization.
//!
//! Literal `YYYY-MM-DD` strings are passed through untouched so a post dated
//! `2025-01-05` never shows up as the 4th or 6th after a timezone shift.
//! Everything else is parsed into a UTC instant.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use regex::Regex;
use std::sync::LazyLock;

static RE_DATE_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").unwrap());
static RE_MONTH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}$").unwrap());
static RE_YEAR_MONTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<y>[0-9]{4})-(?P<m>[0-9]{2})$").unwrap());
static RE_YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?P<y>[0-9]{4})$").unwrap());
static RE_SLUG_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<y>[0-9]{4})-(?P<m>[0-9]{2})-(?P<d>[0-9]{2})").unwrap());

/// Formats carrying an explicit UTC offset (RFC 3339 is tried first).
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

/// Formats without an offset. These are read as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// A loosely-typed `date` field from front matter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateValue {
    /// Any textual form, e.g. `2025-01-05` or `2025-01-05T10:00:00+09:00`
    Text(String),
    /// Milliseconds since the UNIX epoch (an unquoted integer in YAML)
    Millis(i64),
}

#[cfg(test)]
impl DateValue {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }
}

/// True iff `s` is exactly `YYYY-MM-DD` (ASCII digits, no validation).
pub fn is_date_only(s: &str) -> bool {
    RE_DATE_ONLY.is_match(s)
}

/// True iff `s` is exactly `YYYY-MM`.
pub fn is_month(s: &str) -> bool {
    RE_MONTH.is_match(s)
}

/// Parse a date value into a UTC instant.
///
/// Returns `None` for anything that isn't a recognizable date.
pub fn parse_date(value: &DateValue) -> Option<DateTime<Utc>> {
    match value {
        DateValue::Millis(ms) => DateTime::from_timestamp_millis(*ms),
        DateValue::Text(text) => parse_text(text.trim()),
    }
}

fn parse_text(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.to_utc());
    }
    if let Some(dt) = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt.to_utc());
    }
    if let Some(dt) = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt.and_utc());
    }
    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
    {
        return midnight_utc(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.to_utc());
    }

    // Partial ISO dates: "2025-06" and "2025" mean the first day of the period
    if let Some(caps) = RE_YEAR_MONTH.captures(s) {
        let date = NaiveDate::from_ymd_opt(caps["y"].parse().ok()?, caps["m"].parse().ok()?, 1)?;
        return midnight_utc(date);
    }
    if let Some(caps) = RE_YEAR.captures(s) {
        let date = NaiveDate::from_ymd_opt(caps["y"].parse().ok()?, 1, 1)?;
        return midnight_utc(date);
    }

    None
}

#[inline]
fn midnight_utc(date: NaiveDate) -> Option<DateTime<Utc>> {
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

/// Display form of a front-matter date: `YYYY-MM-DD`, or `""` if unusable.
///
/// Date-only text is returned as written, even when it names an impossible day.
pub fn format_date(value: Option<&DateValue>) -> String {
    let Some(value) = value else {
        return String::new();
    };
    if let DateValue::Text(text) = value
        && is_date_only(text)
    {
        return text.clone();
    }
    parse_date(value)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Full ISO-8601 instant with millisecond precision, e.g. `2025-01-05T00:00:00.000Z`.
pub fn to_iso(value: Option<&DateValue>) -> Option<String> {
    parse_date(value?).map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// `YYYY-MM` bucket of a date, if it has a usable one.
pub fn month_key(value: Option<&DateValue>) -> Option<String> {
    let formatted = format_date(value);
    let month = formatted.get(..7)?;
    is_month(month).then(|| month.to_owned())
}

/// Extract a `YYYY-MM-DD` prefix from a file stem like `2025-12-23-site-build`.
pub fn date_from_slug(stem: &str) -> Option<String> {
    let caps = RE_SLUG_DATE.captures(stem)?;
    let (y, m, d) = (&caps["y"], &caps["m"], &caps["d"]);
    NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, d.parse().ok()?)?;
    Some(format!("{y}-{m}-{d}"))
}

/// Format an instant the way the site footer shows it: `YYYY/MM/DD`.
pub fn format_ymd_slash(dt: DateTime<Utc>) -> String {
    dt.format("%Y/%m/%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> DateValue {
        DateValue::text(s)
    }

    // ========================================================================
    // is_date_only
    // ========================================================================

    #[test]
    fn test_is_date_only() {
        assert!(is_date_only("2025-01-05"));
        assert!(is_date_only("2025-13-45")); // shape only
        assert!(!is_date_only("2025-1-5"));
        assert!(!is_date_only(" 2025-01-05"));
        assert!(!is_date_only("2025-01-05T00:00:00Z"));
        // non-ASCII digits are not date digits
        assert!(!is_date_only("２０２５-01-05"));
    }

    // ========================================================================
    // format_date
    // ========================================================================

    #[test]
    fn test_format_date_passthrough() {
        assert_eq!(format_date(Some(&text("2025-01-05"))), "2025-01-05");
        assert_eq!(format_date(Some(&text("2025-02-30"))), "2025-02-30");
    }

    #[test]
    fn test_format_date_invalid_or_absent() {
        assert_eq!(format_date(Some(&text("not a date"))), "");
        assert_eq!(format_date(Some(&text(""))), "");
        assert_eq!(format_date(None), "");
    }

    #[test]
    fn test_format_date_converts_offset_to_utc() {
        // 08:00 in Tokyo is still the previous day in UTC
        assert_eq!(
            format_date(Some(&text("2025-01-05T08:00:00+09:00"))),
            "2025-01-04"
        );
        assert_eq!(format_date(Some(&text("2025-01-05T10:00:00Z"))), "2025-01-05");
    }

    #[test]
    fn test_format_date_other_shapes() {
        assert_eq!(format_date(Some(&text("2025/03/09"))), "2025-03-09");
        assert_eq!(format_date(Some(&text("2025-03-09 12:30"))), "2025-03-09");
        assert_eq!(format_date(Some(&text("2025-03"))), "2025-03-01");
        assert_eq!(
            format_date(Some(&text("Sun, 09 Mar 2025 12:00:00 +0000"))),
            "2025-03-09"
        );
        // 2025-01-05T00:00:00Z
        assert_eq!(format_date(Some(&DateValue::Millis(1_736_035_200_000))), "2025-01-05");
    }

    // ========================================================================
    // to_iso
    // ========================================================================

    #[test]
    fn test_to_iso() {
        assert_eq!(
            to_iso(Some(&text("2025-01-05"))).as_deref(),
            Some("2025-01-05T00:00:00.000Z")
        );
        assert_eq!(
            to_iso(Some(&text("2025-01-05T09:30:15.250+09:00"))).as_deref(),
            Some("2025-01-05T00:30:15.250Z")
        );
    }

    #[test]
    fn test_to_iso_invalid() {
        assert_eq!(to_iso(Some(&text("not a date"))), None);
        assert_eq!(to_iso(Some(&text("2025-02-30"))), None);
        assert_eq!(to_iso(None), None);
    }

    // ========================================================================
    // month_key / date_from_slug
    // ========================================================================

    #[test]
    fn test_month_key() {
        assert_eq!(month_key(Some(&text("2024-03-02"))).as_deref(), Some("2024-03"));
        assert_eq!(month_key(Some(&text("garbage"))), None);
        assert_eq!(month_key(None), None);
    }

    #[test]
    fn test_date_from_slug() {
        assert_eq!(
            date_from_slug("2025-12-23-site-build").as_deref(),
            Some("2025-12-23")
        );
        assert_eq!(date_from_slug("2025-12-23").as_deref(), Some("2025-12-23"));
        assert_eq!(date_from_slug("site-build"), None);
        assert_eq!(date_from_slug("2025-02-31-nope"), None);
    }

    #[test]
    fn test_format_ymd_slash() {
        let dt = parse_date(&text("2025-06-15")).unwrap();
        assert_eq!(format_ymd_slash(dt), "2025/06/15");
    }
}
