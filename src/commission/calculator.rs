use chrono::{DateTime, Datelike, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::CommissionError;
use crate::gateway::models::Refund;
use crate::store::models::CommissionType;

const HUNDRED: Decimal = dec!(100);

/// Payment amount minus every positive refund, in minor units.
///
/// May go negative when refunds exceed the charge.
pub fn net_sale_amount(amount: i64, refunds: &[Refund]) -> i64 {
    refunds
        .iter()
        .filter(|refund| refund.amount > 0)
        .fold(amount, |net, refund| net - refund.amount)
}

/// Commission owed on a net sale, truncated to whole minor units.
///
/// Percentage values are whole percents: `20` pays a fifth of the sale.
pub fn commission_amount(
    net_amount: i64,
    commission_type: CommissionType,
    value: Decimal,
) -> Result<i64, CommissionError> {
    if net_amount <= 0 {
        return Ok(0);
    }

    let overflow = || CommissionError::CommissionOverflow { net_amount, value };

    let total = match commission_type {
        CommissionType::Fixed => value,
        CommissionType::Percentage => Decimal::from(net_amount)
            .checked_div(HUNDRED)
            .and_then(|v| v.checked_mul(value))
            .and_then(|v| v.checked_div(HUNDRED))
            .and_then(|v| v.checked_mul(HUNDRED))
            .ok_or_else(overflow)?,
    };

    total.trunc().to_i64().ok_or_else(overflow)
}

/// Whole calendar months between two instants, regardless of order
pub fn months_between(a: DateTime<Utc>, b: DateTime<Utc>) -> i64 {
    let (start, end) = if a <= b { (a, b) } else { (b, a) };

    let mut months = (end.year() - start.year()) as i64 * 12
        + end.month() as i64
        - start.month() as i64;

    // a month only counts once its day-of-month (and time) has come around
    if (end.day(), end.time()) < (start.day(), start.time()) {
        months -= 1;
    }

    months
}
