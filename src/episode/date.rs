// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

static ORDINAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)\b").unwrap());

static WEEKDAY_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:mon|tue|wed|thu|fri|sat|sun)[a-z]*\.?,?\s+").unwrap());

/// `Sept` is common on the site but not a month abbreviation chrono knows
static SEPT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bsept\b").unwrap());

/// Episode slugs end in dates such as `...-28th-october-2025`
static URL_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d{1,2})(?:st|nd|rd|th)-([a-z]+)-(\d{4})").unwrap());

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%a, %d %b %Y %H:%M:%S %z",
];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d %B %Y", "%B %d %Y", "%d/%m/%Y"];

/// Parse a publish date in any of the formats the source pages use
///
/// Values without an offset are taken as UTC.
pub fn parse_publish_date(input: &str) -> Option<DateTime<FixedOffset>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt);
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(input) {
        return Some(dt);
    }

    if let Some(dt) = OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(input, format).ok())
    {
        return Some(dt);
    }

    if let Some(naive) = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
    {
        return Some(naive.and_utc().fixed_offset());
    }

    parse_human_date(input)
}

/// Dates like `28th October 2025`, `Tue 28 Oct 2025` or `October 28, 2025`
fn parse_human_date(input: &str) -> Option<DateTime<FixedOffset>> {
    let cleaned = WEEKDAY_PREFIX_RE.replace(input, "");
    let cleaned = ORDINAL_RE.replace_all(&cleaned, "$1");
    let cleaned = SEPT_RE.replace_all(&cleaned, "Sep");
    let cleaned = cleaned
        .replace(',', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&cleaned, format).ok())
        .and_then(midnight_utc)
}

/// Date encoded in an episode URL slug, e.g. `wildcard-28th-october-2025`
pub fn date_from_url(url: &str) -> Option<DateTime<FixedOffset>> {
    URL_DATE_RE.captures_iter(url).find_map(|caps| {
        let month = SEPT_RE.replace(&caps[2], "sep");
        let text = format!("{} {} {}", &caps[1], month, &caps[3]);
        NaiveDate::parse_from_str(&text, "%d %B %Y")
            .ok()
            .and_then(midnight_utc)
    })
}

fn midnight_utc(date: NaiveDate) -> Option<DateTime<FixedOffset>> {
    date.and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc().fixed_offset())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(input: &str) -> String {
        parse_publish_date(input)
            .map(|dt| dt.format("%Y-%m-%d %H:%M %z").to_string())
            .unwrap_or_else(|| "none".to_string())
    }

    #[test]
    fn parses_iso_formats() {
        assert_eq!(ymd("2025-03-12T09:00:00.000Z"), "2025-03-12 09:00 +0000");
        assert_eq!(ymd("2025-03-12T09:00:00+11:00"), "2025-03-12 09:00 +1100");
        assert_eq!(ymd("2025-03-12T09:00:00"), "2025-03-12 09:00 +0000");
        assert_eq!(ymd("2025-03-12T09:00"), "2025-03-12 09:00 +0000");
        assert_eq!(ymd("2024-01-01"), "2024-01-01 00:00 +0000");
    }

    #[test]
    fn parses_rfc2822() {
        assert_eq!(
            ymd("Sat, 01 Nov 2025 00:00:00 +0000"),
            "2025-11-01 00:00 +0000"
        );
    }

    #[test]
    fn parses_human_readable_dates() {
        assert_eq!(ymd("28 October 2025"), "2025-10-28 00:00 +0000");
        assert_eq!(ymd("28th October 2025"), "2025-10-28 00:00 +0000");
        assert_eq!(ymd("1st Oct 2025"), "2025-10-01 00:00 +0000");
        assert_eq!(ymd("October 28, 2025"), "2025-10-28 00:00 +0000");
        assert_eq!(ymd("Tue 28 Oct 2025"), "2025-10-28 00:00 +0000");
        assert_eq!(ymd("Tuesday, 28th October 2025"), "2025-10-28 00:00 +0000");
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(ymd(""), "none");
        assert_eq!(ymd("   "), "none");
        assert_eq!(ymd("sometime soon"), "none");
        assert_eq!(ymd("31 February 2025"), "none");
    }

    #[test]
    fn extracts_date_from_episode_slug() {
        let url = "https://www.fbi.radio/programs/wildcard/episodes/wildcard-with-stuart-coupe-28th-october-2025";
        let date = date_from_url(url).unwrap();
        assert_eq!(date.format("%Y-%m-%d").to_string(), "2025-10-28");
    }

    #[test]
    fn slug_date_accepts_short_month_names() {
        let date = date_from_url("/episodes/show-3rd-jan-2024").unwrap();
        assert_eq!(date.format("%Y-%m-%d").to_string(), "2024-01-03");
    }

    #[test]
    fn accepts_sept_abbreviation() {
        let date = date_from_url("/episodes/utility-fog-5th-sept-2025").unwrap();
        assert_eq!(date.format("%Y-%m-%d").to_string(), "2025-09-05");
        assert_eq!(ymd("5th Sept 2025"), "2025-09-05 00:00 +0000");
        assert_eq!(ymd("Sept 5, 2025"), "2025-09-05 00:00 +0000");
    }

    #[test]
    fn slug_without_date_yields_none() {
        assert!(date_from_url("https://www.fbi.radio/episode/ep-a").is_none());
        assert!(date_from_url("/episodes/show-30th-february-2024").is_none());
    }
}
