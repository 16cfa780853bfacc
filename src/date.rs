//! date.rs
//!
//! Formats the account-creation timestamp for the profile card, including the
//! elapsed account tenure as "X years, Y months, Z days".
//!
//! Chrono has no built-in year/month/day diff, so the calendar-aware
//! borrowing rules are implemented manually. This logic correctly handles:
//!   • month underflow (borrowing from years)
//!   • day underflow (borrowing from previous month)
//!   • leap years
//!   • varying month lengths

use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// "Member Since" value: the join date plus how long ago that was.
pub fn member_since(joined: DateTime<Utc>, today: NaiveDate) -> String {
    let joined = joined.date_naive();
    format!(
        "{} ({} ago)",
        joined.format("%b %-d, %Y"),
        tenure_string(joined, today)
    )
}

/// Returns elapsed calendar time between two dates as a string
pub fn tenure_string(start: NaiveDate, today: NaiveDate) -> String {
    let mut years = today.year() - start.year();
    let mut months = today.month() as i32 - start.month() as i32;
    let mut days = today.day() as i32 - start.day() as i32;

    // Fix day underflow
    if days < 0 {
        months -= 1;

        // Determine the previous month relative to `today`.
        let (prev_year, prev_month) = if today.month() == 1 {
            (today.year() - 1, 12)
        } else {
            (today.year(), today.month() - 1)
        };

        // Add days from the previous month (28–31 depending on month & leap year)
        days += days_in_month(prev_year, prev_month) as i32;
    }

    // Fix month underflow
    if months < 0 {
        years -= 1;
        months += 12;
    }

    format!(
        "{} year{}, {} month{}, {} day{}",
        years,
        plural(years),
        months,
        plural(months),
        days,
        plural(days)
    )
}

fn plural(n: i32) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Returns number of days in a given year/month (handles leap years)
fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 30, // should never occur but keeps function total
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}
