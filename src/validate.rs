//! Input validation for record fields

use std::fmt;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::{RegistryError, Result};

fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{2})([-/])(\d{2})([-/])(\d{4})$").expect("date pattern is valid")
    })
}

/// Gregorian leap year rule
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Parse a `dd-mm-yyyy` or `dd/mm/yyyy` date, checking it against the calendar
pub fn validate_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();
    let caps = date_pattern().captures(input).ok_or_else(|| {
        RegistryError::InvalidDate(format!("'{}' should be dd-mm-yyyy", input))
    })?;
    if caps[2] != caps[4] {
        return Err(RegistryError::InvalidDate(format!(
            "'{}' mixes separators",
            input
        )));
    }

    // The pattern guarantees plain digits, so these parses cannot overflow.
    let day: u32 = caps[1].parse().unwrap_or_default();
    let month: u32 = caps[3].parse().unwrap_or_default();
    let year: i32 = caps[5].parse().unwrap_or_default();

    if !(1..=12).contains(&month) {
        return Err(RegistryError::InvalidDate(format!(
            "month must be between 1 and 12, got {}",
            month
        )));
    }
    if year < 1 {
        return Err(RegistryError::InvalidDate("year must be positive".to_string()));
    }
    let max_day = days_in_month(year, month);
    if day < 1 || day > max_day {
        return Err(RegistryError::InvalidDate(format!(
            "day must be between 1 and {} for month {}",
            max_day, month
        )));
    }

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| RegistryError::InvalidDate(input.to_string()))
}

/// Record ids must be positive
pub fn validate_id(id: i64) -> Result<i64> {
    if id <= 0 {
        return Err(RegistryError::InvalidRecord(format!(
            "id must be positive, got {}",
            id
        )));
    }
    Ok(id)
}

/// Trimmed, non-empty name
pub fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(RegistryError::InvalidRecord("name cannot be empty".to_string()));
    }
    Ok(trimmed.to_string())
}

/// Inclusive range check for a numeric field. NaN is always out of range.
pub fn validate_range<T>(field: &str, value: T, min: T, max: T) -> Result<T>
where
    T: PartialOrd + fmt::Display + Copy,
{
    if !(min..=max).contains(&value) {
        return Err(RegistryError::InvalidRecord(format!(
            "{} must be between {} and {}, got {}",
            field, min, max, value
        )));
    }
    Ok(value)
}

/// Parse a yes/no flag
pub fn validate_flag(field: &str, input: &str) -> Result<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" => Ok(true),
        "no" | "n" | "false" => Ok(false),
        other => Err(RegistryError::InvalidRecord(format!(
            "{} must be yes or no, got '{}'",
            field, other
        ))),
    }
}
