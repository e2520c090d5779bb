//! Date detection in receipt lines.
//!
//! Three shapes are recognized, tried in this order on each line:
//!   01/15/2024, 15-01-24      numeric, order set by [`DateOrder`]
//!   2024/01/15, 2024-1-5      year first
//!   Jan 15, 2024, March 3 2024

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use tracing::debug;

static NUMERIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})[/\-](\d{1,2})[/\-](\d{2,4})\b").expect("numeric date pattern")
});

static YEAR_FIRST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{4})[/\-](\d{1,2})[/\-](\d{1,2})\b").expect("year-first date pattern")
});

static TEXTUAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Za-z]{3,9})\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})\b")
        .expect("textual date pattern")
});

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Locale assumption for ambiguous numeric dates.
///
/// `03/04/2024` is March 4th under `MonthFirst` and April 3rd under `DayFirst`.
/// A reading that yields an impossible date (month 15) is simply not a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateOrder {
    #[default]
    MonthFirst,
    DayFirst,
}

/// Scan lines in order and return the first valid calendar date.
pub fn resolve_date<S: AsRef<str>>(lines: &[S], order: DateOrder) -> Option<NaiveDate> {
    for line in lines {
        let line = line.as_ref();
        if let Some(date) = date_in_line(line, order) {
            debug!(%date, line, "date resolved");
            return Some(date);
        }
    }
    None
}

/// First valid date on a single line, trying each shape in turn.
pub fn date_in_line(line: &str, order: DateOrder) -> Option<NaiveDate> {
    NUMERIC_RE
        .captures_iter(line)
        .find_map(|caps| numeric_date(&caps, order))
        .or_else(|| YEAR_FIRST_RE.captures_iter(line).find_map(|caps| year_first_date(&caps)))
        .or_else(|| TEXTUAL_RE.captures_iter(line).find_map(|caps| textual_date(&caps)))
}

fn numeric_date(caps: &Captures, order: DateOrder) -> Option<NaiveDate> {
    let a: u32 = caps[1].parse().ok()?;
    let b: u32 = caps[2].parse().ok()?;
    let year = expand_year(&caps[3])?;
    let (month, day) = match order {
        DateOrder::MonthFirst => (a, b),
        DateOrder::DayFirst => (b, a),
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

fn year_first_date(caps: &Captures) -> Option<NaiveDate> {
    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn textual_date(caps: &Captures) -> Option<NaiveDate> {
    let month = month_number(&caps[1])?;
    let day: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Two-digit years pivot at 50: `24` is 2024, `87` is 1987.
fn expand_year(raw: &str) -> Option<i32> {
    let year: i32 = raw.parse().ok()?;
    match raw.len() {
        2 if year < 50 => Some(2000 + year),
        2 => Some(1900 + year),
        4 => Some(year),
        _ => None,
    }
}

/// Full month names and any prefix of at least three letters ("Sept" too).
fn month_number(word: &str) -> Option<u32> {
    let word = word.to_lowercase();
    if word == "sept" {
        return Some(9);
    }
    MONTHS
        .iter()
        .position(|m| m.starts_with(&word))
        .map(|i| i as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_numeric_month_first() {
        assert_eq!(date_in_line("01/15/2024", DateOrder::MonthFirst), Some(ymd(2024, 1, 15)));
        assert_eq!(date_in_line("Date: 3-4-24 14:02", DateOrder::MonthFirst), Some(ymd(2024, 3, 4)));
    }

    #[test]
    fn test_numeric_day_first() {
        assert_eq!(date_in_line("15/01/2024", DateOrder::DayFirst), Some(ymd(2024, 1, 15)));
        assert_eq!(date_in_line("03/04/2024", DateOrder::DayFirst), Some(ymd(2024, 4, 3)));
        // month 15 does not exist under day-first reading
        assert_eq!(date_in_line("01/15/2024", DateOrder::DayFirst), None);
    }

    #[test]
    fn test_two_digit_year_pivot() {
        assert_eq!(date_in_line("12/31/99", DateOrder::MonthFirst), Some(ymd(1999, 12, 31)));
        assert_eq!(date_in_line("12/31/07", DateOrder::MonthFirst), Some(ymd(2007, 12, 31)));
        assert_eq!(date_in_line("12/31/207", DateOrder::MonthFirst), None);
    }

    #[test]
    fn test_year_first() {
        assert_eq!(date_in_line("2024-01-15 09:12", DateOrder::DayFirst), Some(ymd(2024, 1, 15)));
        assert_eq!(date_in_line("2023/7/4", DateOrder::MonthFirst), Some(ymd(2023, 7, 4)));
    }

    #[test]
    fn test_textual() {
        assert_eq!(date_in_line("Jan 15, 2024", DateOrder::MonthFirst), Some(ymd(2024, 1, 15)));
        assert_eq!(date_in_line("Sold on September 3rd 2023", DateOrder::MonthFirst), Some(ymd(2023, 9, 3)));
        assert_eq!(date_in_line("Sept. 30, 2022", DateOrder::MonthFirst), Some(ymd(2022, 9, 30)));
        assert_eq!(date_in_line("Table 12, 2024 guests", DateOrder::MonthFirst), None);
    }

    #[test]
    fn test_invalid_calendar_value_is_skipped() {
        assert_eq!(date_in_line("02/30/2024", DateOrder::MonthFirst), None);
        assert_eq!(date_in_line("Feb 30, 2024", DateOrder::MonthFirst), None);
    }

    #[test]
    fn test_first_valid_line_wins() {
        let lines = [
            "STARBUCKS",
            "13/45/2024",
            "02/01/2024 08:15",
            "Printed 2024-12-25",
        ];
        assert_eq!(resolve_date(&lines, DateOrder::MonthFirst), Some(ymd(2024, 2, 1)));
    }

    #[test]
    fn test_no_date() {
        let lines = ["COFFEE 4.50", "THANK YOU"];
        assert_eq!(resolve_date(&lines, DateOrder::MonthFirst), None);
    }
}
