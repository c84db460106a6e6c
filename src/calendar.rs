//! Calendar-month arithmetic and lenient date parsing.
//!
//! Subtracting/adding N months from a date normalizes the year-month and
//! clamps the day to the target month's last day when necessary (e.g.
//! `2025-02-28` minus 2 months is `2024-12-28`; `2025-03-31` minus 1 month
//! is `2025-02-28`, not an overflow into March).

use chrono::{Datelike, NaiveDate};

/// Number of days in `year`-`month` (1-indexed month).
fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let first_of_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .expect("computed next-month start is always a valid date");
    let first_of_this =
        NaiveDate::from_ymd_opt(year, month, 1).expect("month is always in 1..=12");
    (first_of_next - first_of_this).num_days() as u32
}

/// Shift `date` by `delta_months` calendar months (positive = forward,
/// negative = backward), clamping the day-of-month to the target month's
/// last day when the original day doesn't exist there.
pub fn shift_months(date: NaiveDate, delta_months: i32) -> NaiveDate {
    let total_months = date.year() * 12 + (date.month() as i32 - 1) + delta_months;
    let target_year = total_months.div_euclid(12);
    let target_month = (total_months.rem_euclid(12) + 1) as u32;
    let target_day = date.day().min(days_in_month(target_year, target_month));
    NaiveDate::from_ymd_opt(target_year, target_month, target_day)
        .expect("clamped day is always valid for its month")
}

/// Subtract `months` calendar months from `date`. Convenience wrapper used
/// by the uncleared-items rule and the tax-cadence rules.
pub fn subtract_months(date: NaiveDate, months: u32) -> NaiveDate {
    shift_months(date, -(months as i32))
}

/// Add `months` calendar months to `date`.
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    shift_months(date, months as i32)
}

/// Parse a date accepting ISO-8601 (`YYYY-MM-DD`) first, then the
/// `DD/MM/YYYY` form some evidence manifests use. Returns `None` if
/// neither matches.
pub fn parse_lenient_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(d);
    }
    NaiveDate::parse_from_str(trimmed, "%d/%m/%Y").ok()
}

/// Number of whole days between a return's `start_date` and `end_date`,
/// inclusive of both endpoints — used to infer tax filing cadence.
pub fn inclusive_day_span(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}
