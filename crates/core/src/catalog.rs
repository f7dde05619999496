//! Fixed service catalogs: streaming subscriptions and mobile operators.
//!
//! Prices come from the bank's catalog, never from the client; a tampered
//! request price is ignored.

use crate::error::{CoreError, CoreResult};
use rust_decimal::Decimal;

/// A purchasable streaming subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamingService {
    pub id: &'static str,
    pub name: &'static str,
    /// Monthly price in minor-unit-exact decimals.
    price_cents: i64,
}

impl StreamingService {
    pub fn price(&self) -> Decimal {
        Decimal::new(self.price_cents, 2)
    }
}

const STREAMING_CATALOG: [StreamingService; 4] = [
    StreamingService { id: "netflix", name: "Netflix", price_cents: 15_99 },
    StreamingService { id: "spotify", name: "Spotify Premium", price_cents: 9_99 },
    StreamingService { id: "disney", name: "Disney+", price_cents: 7_99 },
    StreamingService { id: "prime", name: "Prime Video", price_cents: 8_99 },
];

/// Look up a streaming service by its catalog id.
pub fn streaming_service(id: &str) -> CoreResult<StreamingService> {
    STREAMING_CATALOG
        .iter()
        .find(|s| s.id == id)
        .copied()
        .ok_or_else(|| CoreError::UnknownService(id.to_string()))
}

/// Mobile operators accepted for recharges.
pub const OPERATORS: [&str; 4] = ["movistar", "claro", "tigo", "virgin"];

/// Validate a recharge operator.
pub fn validate_operator(operator: &str) -> CoreResult<()> {
    if OPERATORS.contains(&operator) {
        Ok(())
    } else {
        Err(CoreError::UnknownOperator(operator.to_string()))
    }
}

/// Validate a recharge phone number (10 to 15 characters).
pub fn validate_phone_number(phone: &str) -> CoreResult<()> {
    if (10..=15).contains(&phone.len()) {
        Ok(())
    } else {
        Err(CoreError::InvalidPhoneNumber(phone.to_string()))
    }
}
