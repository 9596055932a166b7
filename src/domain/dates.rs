// src/domain/dates.rs

use chrono::{DateTime, Datelike, NaiveDate, Weekday};

const FORM_DATE: &str = "%Y-%m-%d";

/// Form value to epoch millis at UTC midnight. Takes `YYYY-MM-DD`, or a bare
/// `YYYY-MM` / `YYYY` meaning the first of that month or year.
/// Blank or unparseable input is `None`, and so is a raw number.
pub fn to_epoch_maybe(value: &str) -> Option<i64> {
    let value = value.trim();
    let date = match value.len() {
        10 => NaiveDate::parse_from_str(value, FORM_DATE).ok(),
        7 => NaiveDate::parse_from_str(&format!("{value}-01"), FORM_DATE).ok(),
        4 if value.bytes().all(|b| b.is_ascii_digit()) => {
            NaiveDate::from_ymd_opt(value.parse().ok()?, 1, 1)
        }
        _ => None,
    }?;
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp_millis())
}

/// Epoch millis back to the `YYYY-MM-DD` the date inputs expect.
pub fn from_epoch(ms: Option<i64>) -> String {
    date_of(ms)
        .map(|d| d.format(FORM_DATE).to_string())
        .unwrap_or_default()
}

/// `M/D/YYYY`, the way popups and the report show dates.
pub fn display_date(ms: Option<i64>) -> Option<String> {
    date_of(ms).map(|d| format!("{}/{}/{}", d.month(), d.day(), d.year()))
}

/// 0 = Sunday .. 6 = Saturday
pub fn weekday_of(value: &str) -> Option<u8> {
    NaiveDate::parse_from_str(value.trim(), FORM_DATE)
        .ok()
        .map(|d| d.weekday().num_days_from_sunday() as u8)
}

pub fn is_weekend(ms: Option<i64>) -> bool {
    date_of(ms)
        .map(|d| matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .unwrap_or(false)
}

fn date_of(ms: Option<i64>) -> Option<NaiveDate> {
    let ms = ms.filter(|ms| *ms != 0)?;
    DateTime::from_timestamp_millis(ms).map(|dt| dt.date_naive())
}
