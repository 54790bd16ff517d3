//! Conversions between major-unit decimals and provider minor units.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{CommerceError, Result};

/// Number of minor units in one major unit for the supported currencies.
const MINOR_UNIT_SCALE: u32 = 2;

/// Convert a major-unit amount to integer minor units.
///
/// Rounds half away from zero, so `45.995` becomes `4600`.
///
/// # Errors
///
/// Returns `CommerceError::AmountOutOfRange` if the result does not fit in an `i64`.
pub fn to_minor_units(amount: Decimal) -> Result<i64> {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|scaled| scaled.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|rounded| rounded.to_i64())
        .ok_or_else(|| CommerceError::AmountOutOfRange(amount.to_string()))
}

/// Convert integer minor units to a major-unit amount with two decimal places.
#[must_use]
pub fn from_minor_units(minor: i64) -> Decimal {
    Decimal::new(minor, MINOR_UNIT_SCALE)
}

/// Format an amount the way the admin views display money, e.g. `£1,234.50`.
///
/// Unknown currency codes are rendered as an upper-case code prefix (`CHF 12.00`).
#[must_use]
pub fn format_currency(amount: Decimal, currency: &str) -> String {
    let code = currency.to_ascii_uppercase();
    let prefix = match code.as_str() {
        "GBP" => "£".to_string(),
        "USD" => "US$".to_string(),
        "EUR" => "€".to_string(),
        "CAD" => "CA$".to_string(),
        _ => format!("{code} "),
    };

    let rounded = amount.round_dp_with_strategy(MINOR_UNIT_SCALE, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let text = format!("{:.2}", rounded.abs());
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    format!("{sign}{prefix}{}.{fraction}", group_thousands(whole))
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
