//! Status counts and percentage distributions.

use crate::model::record::Record;
use crate::model::status::Status;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Dashboard percentages use one decimal place unless configured otherwise.
pub const DEFAULT_PERCENT_PRECISION: u32 = 1;

/// Rounds half away from zero to `precision` decimal places.
pub fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10_f64.powi(i32::try_from(precision).unwrap_or(i32::MAX).min(9));
    (value * factor).round() / factor
}

/// `part / total × 100`, rounded; `0.0` when `total` is zero.
pub fn percentage(part: usize, total: usize, precision: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_to(part as f64 * 100.0 / total as f64, precision)
}

/// Decimal variant of [`percentage`] for money shares.
pub fn percentage_of_amount(part: Decimal, total: Decimal, precision: u32) -> f64 {
    if total.is_zero() {
        return 0.0;
    }
    part.checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.checked_div(total))
        .and_then(|share| share.round_dp(precision).to_f64())
        .unwrap_or(0.0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusBucket<S> {
    pub status: S,
    pub label: &'static str,
    pub count: usize,
    pub percent: f64,
}

/// Per-status counts and shares in `Status::ALL` order.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusDistribution<S> {
    pub total: usize,
    pub buckets: Vec<StatusBucket<S>>,
}

impl<S: Status> StatusDistribution<S> {
    pub fn count(&self, status: S) -> usize {
        self.bucket(status).map_or(0, |bucket| bucket.count)
    }

    pub fn percent(&self, status: S) -> f64 {
        self.bucket(status).map_or(0.0, |bucket| bucket.percent)
    }

    /// Sum of bucket percentages; 100 within rounding when non-empty.
    pub fn percent_sum(&self) -> f64 {
        self.buckets.iter().map(|bucket| bucket.percent).sum()
    }

    fn bucket(&self, status: S) -> Option<&StatusBucket<S>> {
        self.buckets.iter().find(|bucket| bucket.status == status)
    }
}

/// Counts per status, including zero buckets, in `Status::ALL` order.
pub fn status_counts<R: Record>(records: &[R]) -> Vec<(R::Status, usize)> {
    <R::Status as Status>::ALL
        .iter()
        .map(|status| {
            let count = records
                .iter()
                .filter(|record| record.status() == *status)
                .count();
            (*status, count)
        })
        .collect()
}

pub fn status_distribution<R: Record>(
    records: &[R],
    precision: u32,
) -> StatusDistribution<R::Status> {
    let total = records.len();
    let buckets = status_counts(records)
        .into_iter()
        .map(|(status, count)| StatusBucket {
            status,
            label: status.label(),
            count,
            percent: percentage(count, total, precision),
        })
        .collect();
    StatusDistribution { total, buckets }
}

/// Share of one free-form category (department, client, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryShare {
    pub key: String,
    pub count: usize,
    pub percent: f64,
}

/// Groups items by `key`; largest group first, ties by key.
///
/// Blank keys are grouped under `fallback`.
pub fn category_breakdown<'a, T, K>(
    items: impl IntoIterator<Item = &'a T>,
    key: impl Fn(&'a T) -> K,
    fallback: &str,
    precision: u32,
) -> Vec<CategoryShare>
where
    T: 'a,
    K: AsRef<str>,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut total = 0;
    for item in items {
        let value = key(item);
        let trimmed = value.as_ref().trim();
        let name = if trimmed.is_empty() { fallback } else { trimmed };
        *counts.entry(name.to_string()).or_default() += 1;
        total += 1;
    }

    let mut shares = counts
        .into_iter()
        .map(|(key, count)| CategoryShare {
            percent: percentage(count, total, precision),
            key,
            count,
        })
        .collect::<Vec<_>>();
    shares.sort_by(|left, right| {
        right
            .count
            .cmp(&left.count)
            .then_with(|| left.key.cmp(&right.key))
    });
    shares
}
