//! # Error Module
//!
//! Domain validation errors, independent of storage and transport.

use rust_decimal::Decimal;
use thiserror::Error;

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    // === Amount errors ===
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Amount out of range: must be between {min} and {max}")]
    AmountOutOfRange { min: Decimal, max: Decimal },

    // === Credential errors ===
    #[error("PIN must be exactly 4 numeric digits")]
    InvalidPin,

    #[error("PIN confirmation does not match")]
    PinMismatch,

    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    // === Catalog errors ===
    #[error("Unknown streaming service: {0}")]
    UnknownService(String),

    #[error("Unknown mobile operator: {0}")]
    UnknownOperator(String),

    #[error("Invalid phone number: {0}")]
    InvalidPhoneNumber(String),
}

/// Result type alias for CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn out_of_range(min: Decimal, max: Decimal) -> Self {
        Self::AmountOutOfRange { min, max }
    }
}
