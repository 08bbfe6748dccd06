//! Calendar-month windows over record creation times (UTC).

use crate::model::record::Record;
use chrono::{DateTime, Datelike, TimeZone, Utc};

/// Records created this calendar month vs the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MonthlyDelta {
    pub current_month: usize,
    pub previous_month: usize,
    /// `current_month - previous_month`.
    pub delta: i64,
}

/// `[start, end)` epoch-ms bounds of the month `offset` months from `now`'s
/// month (`0` = current, `-1` = previous).
pub fn month_window_ms(now: DateTime<Utc>, offset: i32) -> Option<(i64, i64)> {
    let start = month_start(now.year(), now.month(), offset)?;
    let end = month_start(now.year(), now.month(), offset + 1)?;
    Some((start.timestamp_millis(), end.timestamp_millis()))
}

fn month_start(year: i32, month: u32, offset: i32) -> Option<DateTime<Utc>> {
    let index = year.checked_mul(12)? + i32::try_from(month).ok()? - 1 + offset;
    let target_year = index.div_euclid(12);
    let target_month = u32::try_from(index.rem_euclid(12)).ok()? + 1;
    Utc.with_ymd_and_hms(target_year, target_month, 1, 0, 0, 0)
        .single()
}

/// Records whose `created_at_ms` falls inside `[start_ms, end_ms)`.
pub fn created_between<R: Record>(records: &[R], start_ms: i64, end_ms: i64) -> usize {
    records
        .iter()
        .filter(|record| (start_ms..end_ms).contains(&record.created_at_ms()))
        .count()
}

pub fn monthly_delta<R: Record>(records: &[R], now: DateTime<Utc>) -> MonthlyDelta {
    let count = |offset| {
        month_window_ms(now, offset)
            .map_or(0, |(start, end)| created_between(records, start, end))
    };
    let current_month = count(0);
    let previous_month = count(-1);
    MonthlyDelta {
        current_month,
        previous_month,
        delta: current_month as i64 - previous_month as i64,
    }
}
