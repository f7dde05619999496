//! # Money Module
//!
//! Two-decimal monetary amounts on top of `rust_decimal` so balance
//! arithmetic never touches binary floating point. Amounts cross the HTTP
//! boundary as fixed two-digit strings.

use crate::error::{CoreError, CoreResult};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Fractional digits for every monetary amount.
pub const SCALE: u32 = 2;

/// Round an amount to the monetary scale (banker's rounding per Decimal default).
pub fn round(amount: Decimal) -> Decimal {
    amount.round_dp(SCALE)
}

/// Format an amount as a fixed two-digit string ("300.00", "-25.00").
pub fn to_money_string(amount: Decimal) -> String {
    let mut amount = amount.round_dp(SCALE);
    amount.rescale(SCALE);
    amount.to_string()
}

/// Parse a monetary amount from its boundary representation.
///
/// Accepts plain decimal strings with at most two fractional digits.
pub fn parse_amount(s: &str) -> CoreResult<Decimal> {
    let amount = Decimal::from_str(s.trim())
        .map_err(|_| CoreError::InvalidAmount(format!("not a decimal amount: {s}")))?;
    if amount.scale() > SCALE {
        return Err(CoreError::InvalidAmount(format!(
            "more than {SCALE} fractional digits: {s}"
        )));
    }
    Ok(amount)
}
