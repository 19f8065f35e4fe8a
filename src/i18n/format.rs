//! Locale-aware date display.
//!
//! Content dates are ISO-8601 strings, either a plain date ("2024-01-03") or
//! a full timestamp. Pages show them long-form: "January 3, 2024" in English
//! and "٣ كانون الثاني ٢٠٢٤" in Arabic (Levantine month names, Arabic-Indic
//! digits, as used in Palestine).

use crate::i18n::Locale;
use chrono::{DateTime, Datelike, NaiveDate};

const ENGLISH_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const ARABIC_MONTHS: [&str; 12] = [
    "كانون الثاني",
    "شباط",
    "آذار",
    "نيسان",
    "أيار",
    "حزيران",
    "تموز",
    "آب",
    "أيلول",
    "تشرين الأول",
    "تشرين الثاني",
    "كانون الأول",
];

/// Calendar date of an ISO-8601 date or timestamp, as written (no timezone shift).
pub fn calendar_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}

/// Format an ISO-8601 date for display. Unparseable input is returned as-is.
pub fn format_long_date(value: &str, locale: Locale) -> String {
    let Some(date) = calendar_date(value) else {
        return value.to_string();
    };

    let month = date.month0() as usize;
    match locale {
        Locale::En => format!("{} {}, {}", ENGLISH_MONTHS[month], date.day(), date.year()),
        Locale::Ar => format!(
            "{} {} {}",
            to_arabic_digits(&date.day().to_string()),
            ARABIC_MONTHS[month],
            to_arabic_digits(&date.year().to_string())
        ),
    }
}

/// Replace ASCII digits with Arabic-Indic digits.
pub fn to_arabic_digits(value: &str) -> String {
    value
        .chars()
        .map(|c| match c.to_digit(10) {
            Some(d) => char::from_u32(0x0660 + d).unwrap_or(c),
            None => c,
        })
        .collect()
}
