//! Month/day handling for holiday date keys ("MM-DD")

use chrono::NaiveDate;

pub const MONTH_NAMES: [&str; 12] = [
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

/// Leap year used to validate keys, so that 02-29 is accepted
const REFERENCE_LEAP_YEAR: i32 = 2024;

/// A validated calendar day without a year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthDay {
    pub month: u32,
    pub day: u32,
}

impl MonthDay {
    pub fn new(month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(REFERENCE_LEAP_YEAR, month, day)?;
        Some(Self { month, day })
    }

    /// Parse a strict "MM-DD" key
    pub fn parse(key: &str) -> Option<Self> {
        let (mm, dd) = key.trim().split_once('-')?;
        if mm.len() != 2 || dd.len() != 2 {
            return None;
        }
        if !mm.bytes().chain(dd.bytes()).all(|b| b.is_ascii_digit()) {
            return None;
        }
        Self::new(mm.parse().ok()?, dd.parse().ok()?)
    }

    /// Parse a display date like "March 14"
    pub fn from_pretty(text: &str) -> Option<Self> {
        let mut parts = text.split_whitespace();
        let month_name = parts.next()?;
        let day: u32 = parts.next()?.trim_end_matches(',').parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        let month = MONTH_NAMES
            .iter()
            .position(|m| m.eq_ignore_ascii_case(month_name))?;
        Self::new(month as u32 + 1, day)
    }

    pub fn month_key(&self) -> String {
        format!("{:02}", self.month)
    }

    /// ISO date in the given year; None when the day does not exist that year (Feb 29)
    pub fn in_year(&self, year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, self.month, self.day)
    }
}

pub fn month_name(month: u32) -> Option<&'static str> {
    MONTH_NAMES.get(month.checked_sub(1)? as usize).copied()
}

/// Format "MM-DD" as "Month D".
///
/// Lenient: an unknown month is kept as written and a key that cannot be split
/// is returned unchanged, so a bad key never aborts rendering.
pub fn pretty_date(date: &str) -> String {
    let Some((mm, dd)) = date.split_once('-') else {
        return date.to_string();
    };
    if dd.contains('-') {
        return date.to_string();
    }
    let Ok(day) = dd.trim().parse::<u32>() else {
        return date.to_string();
    };
    let month = mm
        .trim()
        .parse::<u32>()
        .ok()
        .and_then(month_name)
        .map(str::to_string)
        .unwrap_or_else(|| mm.to_string());
    format!("{} {}", month, day)
}

/// Sort key placing unparseable dates after every real day
pub fn calendar_sort_key(date: &str) -> (u32, u32) {
    MonthDay::parse(date).map_or((99, 99), |md| (md.month, md.day))
}
