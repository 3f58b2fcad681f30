//! Calendar date/time conversions using O(1) algorithms
//!
//! Howard Hinnant's `civil_from_days` and `days_from_civil`
//! (http://howardhinnant.github.io/date_algorithms.html).  Used by the host
//! RTC to advance a stored reading and by the ESP-IDF RTC to talk to
//! `settimeofday`.  All values are in the zone the time service reported;
//! no offset is applied.

use crate::app::reading::TimeReading;

const SECONDS_PER_DAY: i64 = 86_400;

/// Check if year is a leap year (Gregorian calendar)
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` (1-12) of `year`.  Returns 0 for an invalid month.
pub fn days_in_month(year: i32, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Convert civil date (year, month, day) to days since 1970-01-01.
pub fn days_from_civil(year: i32, month: u8, day: u8) -> i64 {
    let m = i64::from(month);
    let d = i64::from(day);

    // Shift so March is month 0 and the leap day falls at the end of the year
    let (y, m) = if m <= 2 {
        (i64::from(year) - 1, m + 9)
    } else {
        (i64::from(year), m - 3)
    };

    let era = (if y >= 0 { y } else { y - 399 }) / 400;
    let yoe = y - era * 400; // [0, 399]
    let doy = (153 * m + 2) / 5 + d - 1; // [0, 365]
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy; // [0, 146096]

    era * 146_097 + doe - 719_468 // 719468 = days from 0000-03-01 to 1970-01-01
}

/// Convert days since 1970-01-01 to civil date (year, month, day).
pub fn civil_from_days(days: i64) -> (i32, u8, u8) {
    let z = days + 719_468;
    let era = (if z >= 0 { z } else { z - 146_096 }) / 146_097;
    let doe = z - era * 146_097; // [0, 146096]
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365; // [0, 399]
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100); // [0, 365]
    let mp = (5 * doy + 2) / 153; // [0, 11], 0 = March
    let d = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let m = (if mp < 10 { mp + 3 } else { mp - 9 }) as u8;

    let year = if m <= 2 { y + 1 } else { y };
    (year as i32, m, d)
}

/// Day of week for a day count, Sunday = 0 (1970-01-01 was a Thursday).
pub fn weekday_from_days(days: i64) -> u8 {
    (days + 4).rem_euclid(7) as u8
}

/// Ordinal day of the year, 1-based.
pub fn day_of_year(year: i32, month: u8, day: u8) -> u16 {
    (days_from_civil(year, month, day) - days_from_civil(year, 1, 1) + 1) as u16
}

/// Seconds since 1970-01-01T00:00:00 of the reading's wall-clock fields.
pub fn to_epoch_seconds(r: &TimeReading) -> i64 {
    days_from_civil(i32::from(r.year), r.month, r.day) * SECONDS_PER_DAY
        + i64::from(r.hour) * 3600
        + i64::from(r.minute) * 60
        + i64::from(r.second)
}

/// Build a reading from epoch seconds, deriving weekday and yearday.
pub fn from_epoch_seconds(secs: i64, is_dst: bool) -> TimeReading {
    let days = secs.div_euclid(SECONDS_PER_DAY);
    let secs_today = secs.rem_euclid(SECONDS_PER_DAY);
    let (year, month, day) = civil_from_days(days);
    TimeReading {
        year: year as u16,
        month,
        day,
        hour: (secs_today / 3600) as u8,
        minute: ((secs_today % 3600) / 60) as u8,
        second: (secs_today % 60) as u8,
        day_of_week: weekday_from_days(days),
        day_of_year: day_of_year(year, month, day),
        is_dst,
    }
}

/// Move a reading forward by `elapsed_secs`.
///
/// While the date is unchanged the service-supplied weekday and yearday are
/// kept verbatim; once the date rolls over they are recomputed.
pub fn advance(r: &TimeReading, elapsed_secs: u64) -> TimeReading {
    if elapsed_secs == 0 {
        return *r;
    }
    let start = to_epoch_seconds(r);
    let mut next = from_epoch_seconds(start + elapsed_secs as i64, r.is_dst);
    if start.div_euclid(SECONDS_PER_DAY) == (start + elapsed_secs as i64).div_euclid(SECONDS_PER_DAY) {
        next.day_of_week = r.day_of_week;
        next.day_of_year = r.day_of_year;
    }
    next
}
