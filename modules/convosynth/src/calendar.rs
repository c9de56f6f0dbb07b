//! Temporal sampling: when a conversation happens and what that implies.
//!
//! During the special period (modelled on Ramadan) the day splits into a
//! daytime span `[05:00, 18:30)` and a nighttime span `>= 18:30 or <= 02:00`.
//! Minutes in `(02:00, 05:00)` belong to neither span and are treated as
//! regular time by the category and template logic.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use rand::Rng;

pub const DAY_START_MINUTE: u32 = 5 * 60;
pub const DAY_END_MINUTE: u32 = 18 * 60 + 30;
pub const NIGHT_END_MINUTE: u32 = 2 * 60;
const LAST_MINUTE: u32 = 23 * 60 + 59;

const SPECIAL_NIGHT_PROBABILITY: f64 = 0.6;
const SPECIAL_EVENING_PROBABILITY: f64 = 0.7;
const REGULAR_DAYTIME_PROBABILITY: f64 = 0.65;

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

// =============================================================================
// Date ranges
// =============================================================================

/// Inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Days between start and end; zero for single-day or inverted ranges.
    pub fn span_days(&self) -> u64 {
        (self.end - self.start).num_days().max(0) as u64
    }
}

// =============================================================================
// Special period table
// =============================================================================

/// Per-year special period dates, with a generic fallback for years missing
/// from the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialPeriods {
    table: BTreeMap<i32, DateRange>,
}

impl Default for SpecialPeriods {
    fn default() -> Self {
        Self::ramadan()
    }
}

impl SpecialPeriods {
    /// Built-in Ramadan dates.
    pub fn ramadan() -> Self {
        Self::from_table([
            (2024, DateRange::new(ymd(2024, 3, 11), ymd(2024, 4, 9))),
            (2025, DateRange::new(ymd(2025, 3, 1), ymd(2025, 3, 31))),
        ])
    }

    pub fn from_table(entries: impl IntoIterator<Item = (i32, DateRange)>) -> Self {
        Self {
            table: entries.into_iter().collect(),
        }
    }

    /// Range used for years without a table entry: March 10 to April 8.
    pub fn fallback_range(year: i32) -> DateRange {
        DateRange::new(ymd(year, 3, 10), ymd(year, 4, 8))
    }

    pub fn range_for_year(&self, year: i32) -> DateRange {
        self.table
            .get(&year)
            .copied()
            .unwrap_or_else(|| Self::fallback_range(year))
    }

    pub fn is_special_period_date(&self, date: NaiveDate) -> bool {
        self.range_for_year(date.year()).contains(date)
    }

    pub fn context(&self, timestamp: NaiveDateTime) -> TimeContext {
        if !self.is_special_period_date(timestamp.date()) {
            return TimeContext::Regular;
        }
        let minute = minute_of_day(timestamp);
        if is_daytime_minute(minute) {
            TimeContext::SpecialDaytime
        } else if is_nighttime_minute(minute) {
            TimeContext::SpecialNighttime
        } else {
            TimeContext::SpecialGap
        }
    }
}

// =============================================================================
// Time of day
// =============================================================================

/// How a timestamp is classified for category weighting and templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeContext {
    /// Outside the special period.
    Regular,
    SpecialDaytime,
    SpecialNighttime,
    /// Inside the special period but between 02:01 and 04:59.
    SpecialGap,
}

impl TimeContext {
    pub fn is_special(&self) -> bool {
        !matches!(self, Self::Regular)
    }
}

pub fn minute_of_day(timestamp: NaiveDateTime) -> u32 {
    timestamp.hour() * 60 + timestamp.minute()
}

pub fn is_daytime_minute(minute: u32) -> bool {
    (DAY_START_MINUTE..DAY_END_MINUTE).contains(&minute)
}

pub fn is_nighttime_minute(minute: u32) -> bool {
    minute >= DAY_END_MINUTE || minute <= NIGHT_END_MINUTE
}

// =============================================================================
// Sampler
// =============================================================================

/// Draws conversation timestamps inside a date window.
#[derive(Debug, Clone)]
pub struct TemporalSampler {
    window: DateRange,
    periods: SpecialPeriods,
}

impl TemporalSampler {
    pub fn new(window: DateRange, periods: SpecialPeriods) -> Self {
        Self { window, periods }
    }

    pub fn periods(&self) -> &SpecialPeriods {
        &self.periods
    }

    /// Uniform day in the window, then a clock time drawn from the period's
    /// distribution. Seconds are always zero.
    pub fn sample_timestamp<R: Rng + ?Sized>(&self, rng: &mut R) -> NaiveDateTime {
        let offset = rng.random_range(0..=self.window.span_days());
        let date = self
            .window
            .start
            .checked_add_days(Days::new(offset))
            .unwrap_or(self.window.start);

        let minute = if self.periods.is_special_period_date(date) {
            special_period_minute(rng)
        } else {
            regular_minute(rng)
        };

        let time = NaiveTime::from_hms_opt(minute / 60, minute % 60, 0).unwrap_or(NaiveTime::MIN);
        date.and_time(time)
    }
}

/// 60% nighttime (70% evening to midnight, 30% after midnight), 40% daytime.
fn special_period_minute<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    if rng.random::<f64>() < SPECIAL_NIGHT_PROBABILITY {
        if rng.random::<f64>() < SPECIAL_EVENING_PROBABILITY {
            rng.random_range(DAY_END_MINUTE..=LAST_MINUTE)
        } else {
            rng.random_range(0..=NIGHT_END_MINUTE)
        }
    } else {
        rng.random_range(DAY_START_MINUTE..DAY_END_MINUTE)
    }
}

/// 65% between 07:00 and 18:59, otherwise 19:00 to 23:59.
fn regular_minute<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    let hour = if rng.random::<f64>() < REGULAR_DAYTIME_PROBABILITY {
        rng.random_range(7..=18)
    } else {
        rng.random_range(19..=23)
    };
    hour * 60 + rng.random_range(0..=59)
}
