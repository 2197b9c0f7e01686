/// Calendar arithmetic helpers.
use chrono::{Datelike, NaiveDate};

/// Returns `true` if provided year is leap.
#[inline]
pub(crate) fn is_leap_year(year: u16) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Returns number of days in specified month.
pub(crate) fn days_in_month(year: u16, month: u16) -> u16 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => panic!("invalid month: {month}"),
    }
}

/// Day of week for the given date, Sunday = 0.
pub(crate) fn day_of_week(year: u16, month: u16, day: u16) -> u16 {
    NaiveDate::from_ymd_opt(i32::from(year), u32::from(month), u32::from(day))
        .map(|date| date.weekday().num_days_from_sunday() as u16)
        .unwrap_or_else(|| panic!("invalid date: {year:04}-{month:02}-{day:02}"))
}

/// Day of the month holding the last occurrence of the given weekday.
pub(crate) fn last_dow(year: u16, month: u16, dow: u16) -> u16 {
    let last = days_in_month(year, month);
    last - (day_of_week(year, month, last) + 7 - dow) % 7
}

/// Day of the month holding the n-th occurrence of the given weekday,
/// or `None` when the month has fewer than `nth` such weekdays.
pub(crate) fn nth_dow(year: u16, month: u16, dow: u16, nth: u16) -> Option<u16> {
    let first = day_of_week(year, month, 1);
    let day = 1 + (nth - 1) * 7 + (dow + 7 - first) % 7;
    (day <= days_in_month(year, month)).then_some(day)
}

/// The weekday nearest to the given day, never leaving the month.
pub(crate) fn nearest_weekday(year: u16, month: u16, day: u16) -> u16 {
    let last = days_in_month(year, month);
    match day_of_week(year, month, day) {
        // sunday: forward, unless that crosses the month end
        0 => {
            if day == last {
                day - 2
            } else {
                day + 1
            }
        }
        // saturday: backward, unless that crosses the month start
        6 => {
            if day == 1 {
                day + 2
            } else {
                day - 1
            }
        }
        _ => day,
    }
}
