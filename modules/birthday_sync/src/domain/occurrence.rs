//! Next calendar occurrence of a yearly month/day pair.
//!
//! Feb 29 only exists in leap years, so its occurrences are searched
//! forward year by year instead of being shifted to Feb 28 or Mar 1.

use chrono::{Datelike, Days, NaiveDate};

/// Years probed before giving up on a month/day that does not exist.
/// Eight covers the longest gap between leap years (e.g. 2096 → 2104).
const MAX_YEAR_PROBES: i32 = 8;

/// A recurring calendar day. Only the nominal ranges are checked here:
/// `4/31` is accepted and simply never occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonthDay {
    month: u32,
    day: u32,
}

impl MonthDay {
    pub fn new(month: u32, day: u32) -> Option<Self> {
        ((1..=12).contains(&month) && (1..=31).contains(&day)).then_some(Self { month, day })
    }

    /// Both parts must be present; the year of a birthday is irrelevant.
    pub fn from_parts(month: Option<u32>, day: Option<u32>) -> Option<Self> {
        Self::new(month?, day?)
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }
}

/// First valid date for `md` in `year` or a following year.
fn first_valid_from(md: MonthDay, year: i32) -> Option<NaiveDate> {
    (year..year + MAX_YEAR_PROBES).find_map(|y| NaiveDate::from_ymd_opt(y, md.month, md.day))
}

/// The earliest date on or after `reference` that falls on `md`.
pub fn next_occurrence(md: MonthDay, reference: NaiveDate) -> Option<NaiveDate> {
    let candidate = first_valid_from(md, reference.year())?;
    if candidate < reference {
        first_valid_from(md, reference.year() + 1)
    } else {
        Some(candidate)
    }
}

/// Whether `date` lies in `[reference, reference + window_days]`.
pub fn within_window(date: NaiveDate, reference: NaiveDate, window_days: u32) -> bool {
    match reference.checked_add_days(Days::new(u64::from(window_days))) {
        Some(upper) => date >= reference && date <= upper,
        None => date >= reference,
    }
}
