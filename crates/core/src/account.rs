//! # Account Module
//!
//! An account is the user's identity plus a single mutable balance. The
//! credential is a 4-digit PIN stored only as an Argon2id hash; repeated
//! failed logins drive the lockout state machine.

use crate::error::{CoreError, CoreResult};
use crate::money;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Store-assigned account identifier.
pub type AccountId = i64;

/// Failed logins tolerated before the account locks.
pub const MAX_LOGIN_ATTEMPTS: i32 = 3;

/// A user's account record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    /// Unique, case-sensitive, immutable after creation.
    pub username: String,
    /// Argon2id PHC string; never compared in plaintext.
    pub pin_hash: String,
    /// Two-decimal balance; never negative after a committed operation.
    pub balance: Decimal,
    /// Consecutive failed logins, reset to 0 on success.
    pub login_attempts: i32,
    /// Set once `login_attempts` reaches the limit; cleared only externally.
    pub is_locked: bool,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Failed attempts left before the account locks.
    pub fn attempts_remaining(&self) -> i32 {
        (MAX_LOGIN_ATTEMPTS - self.login_attempts).max(0)
    }

    /// Client-facing view: id, username and balance only.
    pub fn summary(&self) -> AccountSummary {
        AccountSummary {
            id: self.id,
            username: self.username.clone(),
            balance: money::to_money_string(self.balance),
        }
    }
}

/// Fields needed to create an account; the store assigns id and timestamp.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub pin_hash: String,
    pub balance: Decimal,
}

/// What the client is allowed to see of an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub id: AccountId,
    pub username: String,
    pub balance: String,
}

/// Validate a registration/login username.
pub fn validate_username(username: &str) -> CoreResult<()> {
    if username.trim().is_empty() {
        return Err(CoreError::InvalidUsername("username is required".into()));
    }
    Ok(())
}

/// Validate the PIN format: exactly 4 numeric digits.
pub fn validate_pin(pin: &str) -> CoreResult<()> {
    if pin.len() != 4 || !pin.chars().all(|c| c.is_ascii_digit()) {
        return Err(CoreError::InvalidPin);
    }
    Ok(())
}
