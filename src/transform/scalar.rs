//! Scalar functions for weather and air-quality batch jobs.
//!
//! Everything here is pure. Parsing helpers return `None` instead of
//! failing, and date/time helpers only split on fixed delimiters; they do not
//! validate calendars.

use crate::transform::clean_day::CLEAN_DAYS;
use chrono::{Duration, NaiveDateTime};

const KST_OFFSET_HOURS: i64 = 9;

/// Parses a float, `None` on malformed input.
pub fn floatize(value: &str) -> Option<f64> {
    value.trim().parse().ok()
}

/// Parses an integer, `None` on malformed input (including `"3.5"`).
pub fn intize(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}

pub fn is_number(value: &str) -> bool {
    floatize(value).is_some()
}

/// Season code of a month: Mar–May 0, Jun–Aug 1, Sep–Nov 2, otherwise 3.
///
/// Every value up to 12 that is not in spring, summer or autumn counts as
/// winter (including 0 and negatives); values above 12 are -1.
pub fn weather_season(month: i64) -> i32 {
    match month {
        3..=5 => 0,
        6..=8 => 1,
        9..=11 => 2,
        m if m <= 12 => 3,
        _ => -1,
    }
}

/// Season code of a `YYYY-MM-DD` date.
pub fn date_season(date: &str) -> Option<i32> {
    nth_int(date, '-', 1).map(|m| weather_season(m as i64))
}

/// PM10 band: ≤30 good (1), ≤80 moderate (2), ≤150 bad (3), anything else 0.
///
/// The "very bad" band 4 is guarded by `pm < 150`, which can never hold once
/// the earlier bands failed, so values above 150 land in 0.
pub fn classify_pm10(pm: f64) -> i32 {
    if pm <= 30.0 {
        1
    } else if pm <= 80.0 {
        2
    } else if pm <= 150.0 {
        3
    } else if pm < 150.0 {
        4
    } else {
        0
    }
}

/// PM2.5 band: ≤15 good (1), ≤35 moderate (2), ≤75 bad (3), anything else 0.
///
/// Band 4 is unreachable for the same reason as in [`classify_pm10`].
pub fn classify_pm25(pm: f64) -> i32 {
    if pm <= 15.0 {
        1
    } else if pm <= 35.0 {
        2
    } else if pm <= 75.0 {
        3
    } else if pm < 75.0 {
        4
    } else {
        0
    }
}

fn nth_part(value: &str, delimiter: char, n: usize) -> Option<&str> {
    value.split(delimiter).nth(n)
}

fn nth_int(value: &str, delimiter: char, n: usize) -> Option<i32> {
    nth_part(value, delimiter, n).and_then(|part| part.trim().parse().ok())
}

/// Year of a `YYYY-MM-DD` date.
pub fn year_of(date: &str) -> Option<i32> {
    nth_int(date, '-', 0)
}

pub fn month_of(date: &str) -> Option<i32> {
    nth_int(date, '-', 1)
}

pub fn day_of(date: &str) -> Option<i32> {
    nth_int(date, '-', 2)
}

/// Hour of an `HH:MM` time.
pub fn hour_of(time: &str) -> Option<i32> {
    nth_int(time, ':', 0)
}

pub fn minute_of(time: &str) -> Option<i32> {
    nth_int(time, ':', 1)
}

/// The month field of a `YYYY-MM-DD` date, as text (`"05"`).
pub fn month_str(date: &str) -> Option<&str> {
    nth_part(date, '-', 1)
}

/// Date part of a `YYYY-MM-DD HH:MM` datetime.
pub fn date_part(datetime: &str) -> Option<&str> {
    nth_part(datetime, ' ', 0)
}

/// Time part of a `YYYY-MM-DD HH:MM` datetime.
pub fn time_part(datetime: &str) -> Option<&str> {
    nth_part(datetime, ' ', 1)
}

/// Hour of a `YYYY-MM-DD HH:MM` datetime.
pub fn hour_of_datetime(datetime: &str) -> Option<i32> {
    time_part(datetime).and_then(hour_of)
}

/// Hour of a `YYYY-MM-DD HH` date-hour.
pub fn hour_of_datehour(datehour: &str) -> Option<i32> {
    nth_int(datehour, ' ', 1)
}

fn drop_last_chars(value: &str, n: usize) -> &str {
    match value.char_indices().rev().nth(n - 1) {
        Some((i, _)) => &value[..i],
        None => "",
    }
}

/// `YYYY-MM-DD HH:MM:SS` → `YYYY-MM-DD HH:MM`.
pub fn drop_seconds(datetime: &str) -> &str {
    drop_last_chars(datetime, 3)
}

/// `YYYY-MM-DD` → `YYYY-MM`.
pub fn year_month(date: &str) -> &str {
    drop_last_chars(date, 3)
}

pub fn format_datetime(datetime: NaiveDateTime) -> String {
    datetime.format("%Y-%m-%d %H:%M").to_string()
}

pub fn utc_to_kst(datetime: NaiveDateTime) -> NaiveDateTime {
    datetime + Duration::hours(KST_OFFSET_HOURS)
}

pub fn utc_to_kst_string(datetime: NaiveDateTime) -> String {
    format_datetime(utc_to_kst(datetime))
}

/// `("2019-05-10", "14:20")` → `"2019-05-10 14"`.
pub fn date_hour(date: &str, time: &str) -> String {
    format!("{} {}", date, time.split(':').next().unwrap_or(time))
}

/// `("2019-05-10", "14:20")` → `"2019-05-10 14:20"`.
pub fn date_time(date: &str, time: &str) -> String {
    format!("{} {}", date, time)
}

/// Scales a per-minute quantity to per-hour (× 60).
pub fn joule(value: f64) -> f64 {
    value * 60.0
}

/// Floors an `HH:MM` time to the half hour (`"14:47"` → `"14:30"`).
pub fn floor_30min(time: &str) -> Option<String> {
    let hour = nth_part(time, ':', 0)?;
    let minute = minute_of(time)?;
    let floored = if minute / 30 == 0 { "00" } else { "30" };
    Some(format!("{}:{}", hour, floored))
}

/// Floors an `HH:MM` time to ten minutes (`"14:47"` → `"14:40"`).
pub fn floor_10min(time: &str) -> Option<String> {
    let prefix = time.get(..3)?;
    let minute: i32 = time.get(3..)?.trim().parse().ok()?;
    Some(format!("{}{}0", prefix, minute / 10))
}

pub fn row_sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

pub fn row_avg(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(row_sum(values) / values.len() as f64)
    }
}

pub fn row_max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

pub fn row_min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

/// Whether `date` (`YYYY-MM-DD`) is one of the curated clean reference days.
pub fn is_clean_day(date: &str) -> bool {
    CLEAN_DAYS.binary_search(&date).is_ok()
}
