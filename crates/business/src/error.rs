//! Business layer errors
//!
//! The full error taxonomy of the bank: validation, authentication,
//! lockout, lookup, funds and storage failures. Typed (not anyhow) so the
//! HTTP layer can map each variant to a status code.

use bancoseguro_core::CoreError;
use bancoseguro_persistence::PersistenceError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Business operation errors.
#[derive(Debug, Error)]
pub enum BusinessError {
    // === Validation errors ===
    #[error(transparent)]
    Invalid(#[from] CoreError),

    // === Authentication errors ===
    #[error("No session")]
    Unauthenticated,

    #[error("Invalid credentials")]
    InvalidCredentials { attempts_remaining: Option<i32> },

    #[error("Account is locked")]
    AccountLocked,

    #[error("Current PIN is incorrect")]
    IncorrectPin,

    #[error("Credential hashing failed")]
    Hashing,

    // === Lookup errors ===
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Recipient not found: {0}")]
    RecipientNotFound(String),

    // === Business-rule errors ===
    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds {
        required: Decimal,
        available: Decimal,
    },

    #[error("Cannot transfer to yourself")]
    SelfTransfer,

    #[error("Username already taken: {0}")]
    UsernameTaken(String),

    // === Wrapped errors ===
    #[error("Storage error: {0}")]
    Store(#[from] PersistenceError),
}

/// Result type alias for business operations.
pub type BusinessResult<T> = Result<T, BusinessError>;

impl BusinessError {
    pub fn insufficient_funds(required: Decimal, available: Decimal) -> Self {
        Self::InsufficientFunds {
            required,
            available,
        }
    }

    pub fn is_insufficient_funds(&self) -> bool {
        matches!(self, Self::InsufficientFunds { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }
}
