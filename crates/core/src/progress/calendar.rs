//! Business-day working-hours calendar.
//!
//! Computes the monthly working-hour baseline: every day in the month
//! that is neither a weekend day nor a configured holiday counts for
//! eight hours. Per-user overrides are resolved by the service layer,
//! which has access to user settings.

use std::collections::HashSet;

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use redtrack_domain::constants::{default_holidays, HOURS_PER_WORKING_DAY};

/// Calendar with an injectable holiday table.
#[derive(Debug, Clone)]
pub struct WorkingHoursCalendar {
    holidays: HashSet<NaiveDate>,
}

impl Default for WorkingHoursCalendar {
    fn default() -> Self {
        Self::new(default_holidays())
    }
}

impl WorkingHoursCalendar {
    /// Create a calendar with the given holiday dates.
    pub fn new(holidays: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self { holidays: holidays.into_iter().collect() }
    }

    /// Working hours for the month containing `date`.
    ///
    /// Result = working days x 8. Always non-negative, never fails.
    pub fn month_working_hours(&self, date: NaiveDate) -> f64 {
        let (start, end) = month_bounds(date);

        let mut working_days = 0u32;
        let mut day = start;
        while day <= end {
            let weekday = day.weekday();
            if weekday != Weekday::Sat && weekday != Weekday::Sun && !self.holidays.contains(&day) {
                working_days += 1;
            }
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }

        f64::from(working_days) * HOURS_PER_WORKING_DAY
    }
}

/// First and last day of the month containing `date`.
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = date.with_day(1).unwrap_or(date);
    let end = start
        .checked_add_months(Months::new(1))
        .and_then(|next| next.checked_sub_days(Days::new(1)))
        .unwrap_or(date);
    (start, end)
}
