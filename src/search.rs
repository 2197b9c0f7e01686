//! Calendar walk: advances a wall-clock cursor field by field and
//! materialises candidates in the caller's time zone.
//!
//! Time-zone transitions need two extra moves beyond the plain walk:
//!
//! * a wall clock that does not exist (spring-forward gap) is skipped by
//!   resuming the walk at the first instant after the gap;
//! * a fall-back transition shortly after the search start replays a span of
//!   wall clocks that the forward walk has already passed, so that span is
//!   walked once more and the earliest candidate of the two walks wins.

use crate::{
    expression::Expression,
    field::{MAX_YEAR, MIN_YEAR},
};
use chrono::{DateTime, Datelike, LocalResult, NaiveDateTime, Offset, TimeDelta, TimeZone, Timelike};

/// Transitions shift by at most two hours; a fold farther out than this
/// cannot replay wall clocks the walk has already passed.
const FOLD_PROBE_SECONDS: i64 = 3 * 3600;

/// Smallest matching instant strictly after `from`, or `None` when nothing
/// matches before the end of the year horizon.
pub(crate) fn next_after<Tz: TimeZone>(expression: &Expression, from: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    let tz = from.timezone();
    let lower = from.clone().with_nanosecond(0)?;
    let start = lower.clone().checked_add_signed(TimeDelta::seconds(1))?;

    let ahead = walk(expression, start.naive_local(), &tz, &lower, None);
    let replayed = replayed_span_candidate(expression, &start, &tz, &lower);

    match (ahead, replayed) {
        (Some(a), Some(b)) => Some(if b < a { b } else { a }),
        (a, None) => a,
        (None, b) => b,
    }
}

/// Wall-clock cursor of the search; ordered like the timestamps it denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Cursor {
    year: u16,
    month: u16,
    day: u16,
    hour: u16,
    minute: u16,
    second: u16,
}

impl Cursor {
    const MIN: Self = Self {
        year: MIN_YEAR,
        month: 1,
        day: 1,
        hour: 0,
        minute: 0,
        second: 0,
    };

    fn from_naive(t: NaiveDateTime) -> Self {
        Self {
            year: t.year() as u16,
            month: t.month() as u16,
            day: t.day() as u16,
            hour: t.hour() as u16,
            minute: t.minute() as u16,
            second: t.second() as u16,
        }
    }

    fn bump_year(&mut self) {
        *self = Self {
            year: self.year + 1,
            ..Self::MIN
        };
    }

    fn bump_month(&mut self) {
        self.month += 1;
        self.day = 1;
        self.hour = 0;
        self.minute = 0;
        self.second = 0;
    }

    fn bump_day(&mut self) {
        self.day += 1;
        self.hour = 0;
        self.minute = 0;
        self.second = 0;
    }

    fn bump_hour(&mut self) {
        self.hour += 1;
        self.minute = 0;
        self.second = 0;
    }

    fn bump_minute(&mut self) {
        self.minute += 1;
        self.second = 0;
    }
}

fn first_ge(set: &[u16], value: u16) -> Option<u16> {
    set.get(set.partition_point(|&x| x < value)).copied()
}

/// Walks wall clocks upward from `start`, materialising every full match in
/// `tz` and returning the first candidate instant past `lower`. A candidate
/// at or beyond `limit` (wall-clock) ends the walk.
fn walk<Tz: TimeZone>(
    expression: &Expression,
    start: NaiveDateTime,
    tz: &Tz,
    lower: &DateTime<Tz>,
    limit: Option<NaiveDateTime>,
) -> Option<DateTime<Tz>> {
    if start.year() > i32::from(MAX_YEAR) {
        return None;
    }
    let mut cursor = if start.year() < i32::from(MIN_YEAR) {
        Cursor::MIN
    } else {
        Cursor::from_naive(start)
    };
    let limit = limit.map(Cursor::from_naive);

    loop {
        let year = first_ge(&expression.years, cursor.year)?;
        if year > cursor.year {
            cursor = Cursor { year, ..Cursor::MIN };
        }

        let Some(month) = first_ge(&expression.months, cursor.month) else {
            cursor.bump_year();
            continue;
        };
        if month > cursor.month {
            cursor.month = month;
            cursor.day = 1;
            cursor.hour = 0;
            cursor.minute = 0;
            cursor.second = 0;
        }

        let days = expression.days_in(cursor.year, cursor.month);
        let Some(day) = first_ge(&days, cursor.day) else {
            cursor.bump_month();
            continue;
        };
        if day > cursor.day {
            cursor.day = day;
            cursor.hour = 0;
            cursor.minute = 0;
            cursor.second = 0;
        }

        let Some(hour) = first_ge(&expression.hours, cursor.hour) else {
            cursor.bump_day();
            continue;
        };
        if hour > cursor.hour {
            cursor.hour = hour;
            cursor.minute = 0;
            cursor.second = 0;
        }

        let Some(minute) = first_ge(&expression.minutes, cursor.minute) else {
            cursor.bump_hour();
            continue;
        };
        if minute > cursor.minute {
            cursor.minute = minute;
            cursor.second = 0;
        }

        let Some(second) = first_ge(&expression.seconds, cursor.second) else {
            cursor.bump_minute();
            continue;
        };
        cursor.second = second;

        if limit.is_some_and(|limit| cursor >= limit) {
            return None;
        }

        match tz.with_ymd_and_hms(
            i32::from(cursor.year),
            u32::from(cursor.month),
            u32::from(cursor.day),
            u32::from(cursor.hour),
            u32::from(cursor.minute),
            u32::from(cursor.second),
        ) {
            LocalResult::Single(t) => {
                if &t > lower {
                    return Some(t);
                }
            }
            LocalResult::Ambiguous(first, second) => {
                if &first > lower {
                    return Some(first);
                }
                if &second > lower {
                    return Some(second);
                }
            }
            LocalResult::None => {
                // the cursor fell into a gap: resume at the instant right
                // after it and re-verify against the sets
                let resumed = gap_end(tz, cursor);
                cursor = Cursor::from_naive(resumed.naive_local());
                continue;
            }
        }

        cursor.second += 1;
    }
}

/// When a fall-back transition follows `start` closely enough to replay wall
/// clocks older than `start`'s, walks that replayed span at the later offset.
fn replayed_span_candidate<Tz: TimeZone>(
    expression: &Expression,
    start: &DateTime<Tz>,
    tz: &Tz,
    lower: &DateTime<Tz>,
) -> Option<DateTime<Tz>> {
    let offset = start.offset().fix().local_minus_utc();
    let probe = tz.timestamp_opt(start.timestamp() + FOLD_PROBE_SECONDS, 0).single()?;
    if probe.offset().fix().local_minus_utc() >= offset {
        return None;
    }

    // first instant at the post-transition offset
    let (mut lo, mut hi) = (start.timestamp(), probe.timestamp());
    while hi - lo > 1 {
        let mid = (lo + hi) / 2;
        if tz.timestamp_opt(mid, 0).single()?.offset().fix().local_minus_utc() == offset {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    let fold = tz.timestamp_opt(hi, 0).single()?;

    let replay_start = fold.naive_local();
    if replay_start >= start.naive_local() {
        return None;
    }
    walk(expression, replay_start, tz, lower, Some(start.naive_local()))
}

/// First instant after the gap the cursor's wall clock fell into.
fn gap_end<Tz: TimeZone>(tz: &Tz, cursor: Cursor) -> DateTime<Tz> {
    let wall = chrono::NaiveDate::from_ymd_opt(
        i32::from(cursor.year),
        u32::from(cursor.month),
        u32::from(cursor.day),
    )
    .and_then(|date| {
        date.and_hms_opt(
            u32::from(cursor.hour),
            u32::from(cursor.minute),
            u32::from(cursor.second),
        )
    })
    .expect("cursor holds a valid date");

    let base = wall.and_utc().timestamp();
    let (mut lo, mut hi) = (base - 2 * 86_400, base + 2 * 86_400);
    while hi - lo > 1 {
        let mid = (lo + hi) / 2;
        if tz.timestamp_opt(mid, 0).unwrap().naive_local() > wall {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    tz.timestamp_opt(hi, 0).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::Los_Angeles;

    #[test]
    fn gap_end_skips_spring_forward() {
        // 2019-03-10 02:30 does not exist in Los Angeles
        let cursor = Cursor {
            year: 2019,
            month: 3,
            day: 10,
            hour: 2,
            minute: 30,
            second: 0,
        };
        let resumed = gap_end(&Los_Angeles, cursor);
        assert_eq!(resumed.to_rfc3339(), "2019-03-10T03:00:00-07:00");
    }

    #[test]
    fn replay_detected_before_fall_back() {
        let expression = crate::parse("30 1 * * * 2019").unwrap();
        // 01:30 PDT, half an hour before the clocks go back
        let start = Los_Angeles.with_ymd_and_hms(2019, 11, 3, 1, 30, 1).earliest().unwrap();
        let lower = Los_Angeles.with_ymd_and_hms(2019, 11, 3, 1, 30, 0).earliest().unwrap();

        let candidate = replayed_span_candidate(&expression, &start, &Los_Angeles, &lower).unwrap();
        assert_eq!(candidate.to_rfc3339(), "2019-11-03T01:30:00-08:00");
    }

    #[test]
    fn no_replay_in_plain_time() {
        let expression = crate::parse("30 1 * * * 2019").unwrap();
        let start = Los_Angeles.with_ymd_and_hms(2019, 6, 1, 12, 0, 0).unwrap();
        assert!(replayed_span_candidate(&expression, &start, &Los_Angeles, &start).is_none());
    }

    #[test]
    fn cursor_ordering() {
        let earlier = Cursor {
            year: 2024,
            month: 5,
            day: 31,
            hour: 23,
            minute: 59,
            second: 59,
        };
        let later = Cursor {
            year: 2024,
            month: 6,
            day: 1,
            hour: 0,
            minute: 0,
            second: 0,
        };
        assert!(earlier < later);
    }
}
