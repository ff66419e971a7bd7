//! Pillar calculations.
//!
//! Solar terms are approximated by fixed calendar days; real term times drift
//! by up to a day from year to year, so births within a day of a cutover may
//! land in the neighbouring month or year.

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};

use super::chart::Pillar;

/// Li Chun (立春, Start of Spring) opens the Chinese year.
const LI_CHUN: (u32, u32) = (2, 4);

/// 4 CE is 甲子, stem 0 / branch 0 of the sixty-year cycle.
const CYCLE_ORIGIN_YEAR: i64 = 4;

/// JDN of 2000-01-01, taken as the 甲子 day.
pub const REFERENCE_JDN: i64 = 2_451_545;

/// Day of month on which each calendar month's solar month begins (Jan..Dec).
const JIEQI_START_DAYS: [u32; 12] = [6, 4, 6, 5, 6, 6, 7, 7, 8, 8, 7, 7];

/// Branch whose solar month starts in each calendar month (Jan..Dec).
const MONTH_BRANCHES: [usize; 12] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 0];

const TIGER_BRANCH: i64 = 2;

/// Stem of the Tiger month, keyed by year stem mod 5.
const TIGER_MONTH_STEMS: [i64; 5] = [2, 4, 6, 8, 0];

/// Stem of the Rat hour, keyed by day stem mod 5.
const RAT_HOUR_STEMS: [i64; 5] = [0, 2, 4, 6, 8];

/// Gregorian year whose Chinese year contains `date`.
pub fn effective_year(date: NaiveDate) -> i32 {
    if (date.month(), date.day()) < LI_CHUN {
        date.year() - 1
    } else {
        date.year()
    }
}

pub fn year_pillar(date: NaiveDate) -> Pillar {
    let offset = i64::from(effective_year(date)) - CYCLE_ORIGIN_YEAR;
    Pillar::new(offset, offset)
}

pub fn month_branch_index(date: NaiveDate) -> usize {
    let month = date.month0() as usize;
    if date.day() >= JIEQI_START_DAYS[month] {
        MONTH_BRANCHES[month]
    } else {
        (MONTH_BRANCHES[month] + 11) % 12
    }
}

pub fn month_pillar(date: NaiveDate) -> Pillar {
    let year_stem = year_pillar(date).stem_index();
    let tiger_stem = TIGER_MONTH_STEMS[year_stem % 5];
    let branch = month_branch_index(date) as i64;
    let steps_from_tiger = (branch - TIGER_BRANCH).rem_euclid(12);
    Pillar::new(tiger_stem + steps_from_tiger, branch)
}

/// Julian Day Number of a proleptic Gregorian date.
pub fn julian_day_number(year: i32, month: u32, day: u32) -> i64 {
    let (mut y, mut m) = (i64::from(year), i64::from(month));
    if m <= 2 {
        y -= 1;
        m += 12;
    }
    let century = y.div_euclid(100);
    let correction = 2 - century + century.div_euclid(4);

    // floor(365.25 * (y + 4716)) and floor(30.6001 * (m + 1)) in integers
    (1461 * (y + 4716)).div_euclid(4) + (306_001 * (m + 1)) / 10_000 + i64::from(day) + correction
        - 1524
}

pub fn day_pillar(date: NaiveDate) -> Pillar {
    let offset = julian_day_number(date.year(), date.month(), date.day()) - REFERENCE_JDN;
    Pillar::new(offset, offset)
}

/// Branch of the double-hour containing `time`. Blocks start on odd hours and
/// the Rat block wraps midnight (23:00-00:59).
pub fn hour_branch_index(time: NaiveTime) -> usize {
    ((time.hour() as usize + 1) / 2) % 12
}

pub fn hour_pillar(date: NaiveDate, time: Option<NaiveTime>) -> Option<Pillar> {
    let time = time?;
    let day_stem = day_pillar(date).stem_index();
    let branch = hour_branch_index(time) as i64;
    Some(Pillar::new(RAT_HOUR_STEMS[day_stem % 5] + branch, branch))
}
