// src/domain/description.rs

//! Builds the single free-text `Description` the layer stores from the
//! structured time pickers, and reads it back when a sale is edited.

use crate::errors::{AdminError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

const RANGE_SEPARATOR: &str = " & ";
const DETAILS_SEPARATOR: &str = ": ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Meridiem {
    AM,
    PM,
}

impl Meridiem {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "AM" => Some(Self::AM),
            "PM" => Some(Self::PM),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AM => "AM",
            Self::PM => "PM",
        }
    }
}

/// A 12-hour clock time as picked in the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOfDay {
    pub hour: u8,
    pub minute: u8,
    pub meridiem: Meridiem,
}

impl TimeOfDay {
    pub const fn new(hour: u8, minute: u8, meridiem: Meridiem) -> Self {
        Self {
            hour,
            minute,
            meridiem,
        }
    }

    pub fn try_new(hour: u8, minute: u8, meridiem: Meridiem) -> Result<Self> {
        if !(1..=12).contains(&hour) {
            return Err(AdminError::Validation(format!("Hour must be 1-12, got {hour}")));
        }
        if minute > 59 {
            return Err(AdminError::Validation(format!("Minute must be 0-59, got {minute}")));
        }
        Ok(Self::new(hour, minute, meridiem))
    }

    pub const fn default_start() -> Self {
        Self::new(7, 0, Meridiem::AM)
    }

    pub const fn default_end() -> Self {
        Self::new(2, 0, Meridiem::PM)
    }

    pub fn minutes_since_midnight(&self) -> u32 {
        let hour = u32::from(self.hour % 12);
        let offset = match self.meridiem {
            Meridiem::AM => 0,
            Meridiem::PM => 12 * 60,
        };
        hour * 60 + u32::from(self.minute) + offset
    }

    /// Parses `H:MM AM`.
    pub fn parse(raw: &str) -> Option<Self> {
        let (clock, meridiem) = raw.trim().split_once(' ')?;
        let (hour, minute) = clock.split_once(':')?;
        if minute.len() != 2 {
            return None;
        }
        let hour = hour.parse().ok()?;
        let minute = minute.parse().ok()?;
        Self::try_new(hour, minute, Meridiem::parse(meridiem)?).ok()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02} {}", self.hour, self.minute, self.meridiem.as_str())
    }
}

/// One day of a multi-day sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayEntry {
    pub id: u64,
    /// 0 = Sunday .. 6 = Saturday
    pub weekday: u8,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl DayEntry {
    pub fn new(id: u64, weekday: u8) -> Self {
        Self {
            id,
            weekday: weekday % 7,
            start: TimeOfDay::default_start(),
            end: TimeOfDay::default_end(),
        }
    }

    pub fn day_name(&self) -> &'static str {
        DAY_NAMES[usize::from(self.weekday % 7)]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schedule {
    SingleDay { start: TimeOfDay, end: TimeOfDay },
    MultiDay(Vec<DayEntry>),
}

pub fn format_range(start: &TimeOfDay, end: &TimeOfDay) -> String {
    format!("{start} - {end}")
}

/// `"<range> & <range>: <details>"`. Blank details drop the `": ..."` suffix.
pub fn compose_description(schedule: &Schedule, details: &str) -> String {
    let times = match schedule {
        Schedule::SingleDay { start, end } => format_range(start, end),
        Schedule::MultiDay(days) => days
            .iter()
            .map(|day| format!("{} {}", day.day_name(), format_range(&day.start, &day.end)))
            .collect::<Vec<_>>()
            .join(RANGE_SEPARATOR),
    };

    let details = details.trim();
    match (times.is_empty(), details.is_empty()) {
        (_, true) => times,
        (true, false) => details.to_string(),
        (false, false) => format!("{times}{DETAILS_SEPARATOR}{details}"),
    }
}

/// Ranges that end at or before they start. Shown to the user, never enforced.
pub fn schedule_warnings(schedule: &Schedule) -> Vec<String> {
    let check = |label: &str, start: &TimeOfDay, end: &TimeOfDay| {
        (end.minutes_since_midnight() <= start.minutes_since_midnight())
            .then(|| format!("{label}ends at {end}, not after {start}"))
    };

    match schedule {
        Schedule::SingleDay { start, end } => check("Sale ", start, end).into_iter().collect(),
        Schedule::MultiDay(days) => days
            .iter()
            .filter_map(|day| check(&format!("{} ", day.day_name()), &day.start, &day.end))
            .collect(),
    }
}

/// Recovers the schedule and item list from a stored description.
/// Descriptions not written by [`compose_description`] come back as plain details.
pub fn parse_description(description: &str) -> (Option<Schedule>, String) {
    let description = description.trim();
    if let Some(schedule) = parse_ranges(description) {
        return (Some(schedule), String::new());
    }
    if let Some((head, details)) = description.split_once(DETAILS_SEPARATOR) {
        if let Some(schedule) = parse_ranges(head) {
            return (Some(schedule), details.trim().to_string());
        }
    }
    (None, description.to_string())
}

fn parse_ranges(head: &str) -> Option<Schedule> {
    let mut days = Vec::new();
    let mut single = None;

    for (i, part) in head.split(RANGE_SEPARATOR).enumerate() {
        let (day, range) = match DAY_NAMES
            .iter()
            .position(|name| part.starts_with(&format!("{name} ")))
        {
            Some(weekday) => (Some(weekday as u8), &part[DAY_NAMES[weekday].len() + 1..]),
            None => (None, part),
        };
        let (start, end) = range.split_once(" - ")?;
        let start = TimeOfDay::parse(start)?;
        let end = TimeOfDay::parse(end)?;

        match day {
            Some(weekday) => days.push(DayEntry {
                id: i as u64 + 1,
                weekday,
                start,
                end,
            }),
            None => single = Some((start, end)),
        }
    }

    match (single, days.is_empty()) {
        (Some((start, end)), true) => Some(Schedule::SingleDay { start, end }),
        (None, false) => Some(Schedule::MultiDay(days)),
        _ => None,
    }
}

/// Weekday for a newly added sale day: the day after the last entry,
/// or `fallback` when there are none yet.
pub fn next_weekday(days: &[DayEntry], fallback: u8) -> u8 {
    days.last()
        .map(|last| (last.weekday + 1) % 7)
        .unwrap_or(fallback % 7)
}
