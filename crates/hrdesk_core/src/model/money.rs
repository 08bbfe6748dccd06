//! Decimal helpers for currency amounts.
//!
//! Arithmetic here saturates instead of panicking; record validation keeps
//! stored amounts far below the point where saturation kicks in.

use super::record::ValidationError;
use rust_decimal::{Decimal, RoundingStrategy};

/// Largest accepted amount in whole currency units (ten trillion).
pub const MAX_AMOUNT_UNITS: i64 = 10_000_000_000_000;

/// Largest accepted invoice line quantity.
pub const MAX_QUANTITY: u32 = 1_000_000;

pub fn max_amount() -> Decimal {
    Decimal::from(MAX_AMOUNT_UNITS)
}

/// Rounds to cents, half away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `base × percent / 100`, unrounded.
pub fn percent_of(base: Decimal, percent: Decimal) -> Decimal {
    base.saturating_mul(percent) / Decimal::ONE_HUNDRED
}

/// Saturating sum of amounts.
pub fn sum_money(amounts: impl IntoIterator<Item = Decimal>) -> Decimal {
    amounts
        .into_iter()
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

pub(crate) fn is_percent(value: Decimal) -> bool {
    value >= Decimal::ZERO && value <= Decimal::ONE_HUNDRED
}

/// Rejects negative amounts and amounts above [`MAX_AMOUNT_UNITS`].
pub(crate) fn check_amount(field: &'static str, value: Decimal) -> Result<(), ValidationError> {
    if value < Decimal::ZERO {
        return Err(ValidationError::InvalidValue {
            field,
            reason: "must not be negative".to_string(),
        });
    }
    if value > max_amount() {
        return Err(ValidationError::InvalidValue {
            field,
            reason: format!("must not exceed {MAX_AMOUNT_UNITS}"),
        });
    }
    Ok(())
}
