//! Content freshness: months since the newest change evidence on a homepage.

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use regex::Regex;
use serde_json::Value;

use crate::fetch::Homepage;
use crate::markup::{json_ld_values, meta_content};

static COPYRIGHT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:©|&copy;|&#169;|copyright)\s*(?:\d{4}\s*(?:-|–|&ndash;)\s*)?(\d{4})")
        .expect("valid copyright regex")
});

const MODIFIED_META: &[(&str, &str)] = &[
    ("property", "article:modified_time"),
    ("property", "og:updated_time"),
    ("name", "last-modified"),
];

/// Months between the newest change evidence and `now`, or `None` when the
/// page carries no evidence at all.
///
/// Evidence: the `Last-Modified` header, JSON-LD `dateModified`, modified-time
/// meta tags, and the latest copyright year (taken as 31 December of that
/// year).
#[must_use]
pub fn content_freshness_months(page: &Homepage, now: DateTime<Utc>) -> Option<u32> {
    let mut evidence: Vec<DateTime<Utc>> = Vec::new();

    if let Some(raw) = page.header("last-modified") {
        if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
            evidence.push(dt.with_timezone(&Utc));
        }
    }

    for value in json_ld_values(&page.body) {
        collect_date_modified(&value, &mut evidence);
    }

    for (attr, key) in MODIFIED_META {
        if let Some(dt) = meta_content(&page.body, attr, key).as_deref().and_then(parse_date) {
            evidence.push(dt);
        }
    }

    if let Some(year) = latest_copyright_year(&page.body, now.year()) {
        if let Some(dt) = Utc.with_ymd_and_hms(year, 12, 31, 0, 0, 0).single() {
            evidence.push(dt);
        }
    }

    let newest = evidence.into_iter().max()?;
    Some(months_between(newest.min(now), now))
}

fn collect_date_modified(value: &Value, out: &mut Vec<DateTime<Utc>>) {
    match value {
        Value::Object(map) => {
            if let Some(dt) = map
                .get("dateModified")
                .and_then(Value::as_str)
                .and_then(parse_date)
            {
                out.push(dt);
            }
            for child in map.values() {
                collect_date_modified(child, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_date_modified(item, out);
            }
        }
        _ => {}
    }
}

/// RFC 3339 timestamps or bare `YYYY-MM-DD` dates.
fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

fn latest_copyright_year(body: &str, current_year: i32) -> Option<i32> {
    COPYRIGHT_RE
        .captures_iter(body)
        .filter_map(|c| c[1].parse::<i32>().ok())
        .filter(|y| (1995..=current_year).contains(y))
        .max()
}

/// Whole calendar months from `then` to `now`, never negative.
#[allow(clippy::cast_possible_wrap)]
fn months_between(then: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    let mut months = (now.year() - then.year()) * 12 + now.month() as i32 - then.month() as i32;
    if now.day() < then.day() {
        months -= 1;
    }
    u32::try_from(months).unwrap_or(0)
}
