use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use foundation::time::Month;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

// Month/day/year with `/` or `-`; the tail of the string is ignored.
static MDY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})[/-](\d{1,2})[/-](\d{2,4})").expect("valid MDY regex"));

// Numeric forms below are only tried when the string starts with a full year,
// so short leading numbers are never read as years.
static YEAR_FIRST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}[-/]").expect("valid year-first regex"));

// `2021`, `2021-03`, `2021/3`: missing month and day default to 1.
static PARTIAL_YEAR_FIRST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})(?:[-/](\d{1,2}))?$").expect("valid partial-date regex")
});

const OFFSET_DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y/%m/%d %H:%M:%S%.f%#z",
];

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

const NAMED_MONTH_FORMATS: &[&str] = &[
    "%B %d, %Y",
    "%b %d, %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%a %b %d %Y",
    "%a, %b %d, %Y",
    "%A, %B %d, %Y",
    "%A %B %d %Y",
];

// Applied to `1 <input>` so a bare `March 2021` lands on the 1st.
const MONTH_YEAR_FORMATS: &[&str] = &["%d %B %Y", "%d %b %Y", "%d %B, %Y"];

pub struct TemporalAnalysis;

impl TemporalAnalysis {
    /// Calendar date of a loosely formatted string, or `None` when no
    /// supported form matches.
    pub fn parse_loose_date(input: &str) -> Option<NaiveDate> {
        let s = input.trim();
        if s.is_empty() {
            return None;
        }
        Self::parse_generic(s)
            .or_else(|| Self::parse_partial_year_first(s))
            .or_else(|| Self::parse_month_year(s))
            .or_else(|| Self::parse_month_day_year(s))
    }

    /// Month as written in the string (no timezone shifting).
    pub fn month_of(input: &str) -> Option<Month> {
        Self::parse_loose_date(input).and_then(|d| Month::new(d.month()))
    }

    /// Month of a property value. Strings are parsed loosely; numbers are
    /// Unix epoch milliseconds (UTC).
    pub fn month_of_value(value: Option<&Value>) -> Option<Month> {
        match value? {
            Value::String(s) => Self::month_of(s),
            Value::Number(n) => {
                let ms = n.as_i64()?;
                DateTime::<Utc>::from_timestamp_millis(ms).and_then(|d| Month::new(d.month()))
            }
            _ => None,
        }
    }

    fn parse_generic(s: &str) -> Option<NaiveDate> {
        if let Ok(d) = DateTime::parse_from_rfc3339(s) {
            return Some(d.date_naive());
        }
        if let Ok(d) = DateTime::parse_from_rfc2822(s) {
            return Some(d.date_naive());
        }
        if YEAR_FIRST.is_match(s) {
            for fmt in OFFSET_DATE_TIME_FORMATS {
                if let Ok(d) = DateTime::parse_from_str(s, fmt) {
                    return Some(d.date_naive());
                }
            }
            for fmt in DATE_TIME_FORMATS {
                if let Ok(d) = NaiveDateTime::parse_from_str(s, fmt) {
                    return Some(d.date());
                }
            }
            if let Some(d) = DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
            {
                return Some(d);
            }
        }
        NAMED_MONTH_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
    }

    fn parse_partial_year_first(s: &str) -> Option<NaiveDate> {
        let caps = PARTIAL_YEAR_FIRST.captures(s)?;
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = match caps.get(2) {
            Some(m) => m.as_str().parse().ok()?,
            None => 1,
        };
        NaiveDate::from_ymd_opt(year, month, 1)
    }

    fn parse_month_year(s: &str) -> Option<NaiveDate> {
        let padded = format!("1 {s}");
        MONTH_YEAR_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(&padded, fmt).ok())
    }

    fn parse_month_day_year(s: &str) -> Option<NaiveDate> {
        let caps = MDY.captures(s)?;
        let month: u32 = caps[1].parse().ok()?;
        let day: u32 = caps[2].parse().ok()?;
        let year_text = &caps[3];
        let mut year: i32 = year_text.parse().ok()?;
        if year_text.len() == 2 {
            year += 2000;
        }
        NaiveDate::from_ymd_opt(year, month, day)
    }
}
