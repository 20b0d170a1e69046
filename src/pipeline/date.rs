use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());
static DATE_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4}-\d{2}-\d{2}) \d{2}:\d{2}:\d{2}$").unwrap());

// Naive values carry no offset and are read as UTC.
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];
const DATE_FORMATS: &[&str] = &["%Y/%m/%d", "%B %d, %Y", "%b %d, %Y", "%d %B %Y", "%m/%d/%Y"];

/// Canonical `YYYY-MM-DD` for a raw export date, or `None` when nothing
/// recognizable (and calendar-valid) is found.
pub fn normalize_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if DATE_RE.is_match(raw) {
        return calendar_date(raw);
    }
    if let Some(caps) = DATE_TIME_RE.captures(raw) {
        return calendar_date(&caps[1]);
    }
    if let Some(date) = parse_any(raw) {
        // chrono renders years past 9999 as `+YYYYY`
        let ymd = date.format("%Y-%m-%d").to_string();
        return DATE_RE.is_match(&ymd).then_some(ymd);
    }

    raw.get(..10)
        .filter(|prefix| DATE_RE.is_match(prefix))
        .and_then(calendar_date)
}

/// Publish date from the primary field, falling back to the secondary one.
pub fn publish_date(primary: &str, fallback: &str) -> Option<String> {
    [primary, fallback]
        .into_iter()
        .filter(|raw| !raw.trim().is_empty())
        .find_map(normalize_date)
}

fn calendar_date(ymd: &str) -> Option<String> {
    NaiveDate::parse_from_str(ymd, "%Y-%m-%d")
        .ok()
        .map(|_| ymd.to_string())
}

fn parse_any(raw: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_canonical(s: &str) -> bool {
        DATE_RE.is_match(s)
    }

    #[test]
    fn plain_date() {
        assert_eq!(normalize_date("2021-03-05").as_deref(), Some("2021-03-05"));
    }

    #[test]
    fn date_time_truncated() {
        assert_eq!(normalize_date("2021-03-05 10:00:00").as_deref(), Some("2021-03-05"));
        assert_eq!(normalize_date("2021-03-05 23:59:59").as_deref(), Some("2021-03-05"));
    }

    #[test]
    fn rfc2822_uses_utc_calendar() {
        assert_eq!(
            normalize_date("Fri, 05 Mar 2021 10:00:00 +0000").as_deref(),
            Some("2021-03-05")
        );
        // 23:30 at -05:00 is already the next day in UTC
        assert_eq!(
            normalize_date("Fri, 05 Mar 2021 23:30:00 -0500").as_deref(),
            Some("2021-03-06")
        );
    }

    #[test]
    fn rfc3339_and_iso() {
        assert_eq!(
            normalize_date("2021-03-05T01:00:00+02:00").as_deref(),
            Some("2021-03-04")
        );
        assert_eq!(normalize_date("2021-03-05T10:00:00").as_deref(), Some("2021-03-05"));
        assert_eq!(normalize_date("2021/03/05").as_deref(), Some("2021-03-05"));
        assert_eq!(normalize_date("March 5, 2021").as_deref(), Some("2021-03-05"));
    }

    #[test]
    fn prefix_fallback() {
        assert_eq!(normalize_date("2021-03-05 garbage").as_deref(), Some("2021-03-05"));
    }

    #[test]
    fn unparseable() {
        assert_eq!(normalize_date(""), None);
        assert_eq!(normalize_date("   "), None);
        assert_eq!(normalize_date("someday"), None);
        assert_eq!(normalize_date("0000-00-00 00:00:00"), None);
        assert_eq!(normalize_date("2021-02-30"), None);
        assert_eq!(normalize_date("Fri, 05 Mar 12021 10:00:00 +0000"), None);
        assert_eq!(normalize_date("12021-03-05T10:00:00"), None);
    }

    #[test]
    fn outputs_are_canonical() {
        for raw in [
            "2021-03-05",
            "2021-03-05 10:00:00",
            "Fri, 05 Mar 2021 10:00:00 +0000",
            "2021-03-05T10:00:00Z",
            "2021-03-05xyz",
        ] {
            let out = normalize_date(raw).unwrap();
            assert!(is_canonical(&out), "{raw} -> {out}");
        }
    }

    #[test]
    fn fallback_field() {
        assert_eq!(
            publish_date("", "Fri, 05 Mar 2021 10:00:00 +0000").as_deref(),
            Some("2021-03-05")
        );
        assert_eq!(publish_date("2020-01-02 00:00:00", "junk").as_deref(), Some("2020-01-02"));
        assert_eq!(
            publish_date("0000-00-00 00:00:00", "Fri, 05 Mar 2021 10:00:00 +0000").as_deref(),
            Some("2021-03-05")
        );
        assert_eq!(publish_date("", ""), None);
        assert_eq!(publish_date("nope", ""), None);
    }
}
