//! Database schema definitions
//!
//! Row types for sqlx mapping from SQLite tables. The schema itself lives
//! in migrations/. Decimals are stored as TEXT to stay exact.

use crate::error::{PersistenceError, PersistenceResult};
use bancoseguro_core::{Account, LedgerEntry, LedgerKind};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Row type for the `users` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub pin_hash: String,
    pub balance: String,
    pub login_attempts: i64,
    pub is_locked: bool,
    pub created_at: DateTime<Utc>,
}

/// Row type for the `transactions` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TransactionRow {
    pub id: i64,
    pub user_id: i64,
    pub tx_type: String,
    pub amount: String,
    pub description: String,
    pub recipient_username: Option<String>,
    pub metadata: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for Account {
    type Error = PersistenceError;

    fn try_from(row: UserRow) -> PersistenceResult<Self> {
        let balance = Decimal::from_str(&row.balance)
            .map_err(|_| PersistenceError::InvalidDecimal(row.balance.clone()))?;
        Ok(Account {
            id: row.id,
            username: row.username,
            pin_hash: row.pin_hash,
            balance,
            login_attempts: row.login_attempts as i32,
            is_locked: row.is_locked,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<TransactionRow> for LedgerEntry {
    type Error = PersistenceError;

    fn try_from(row: TransactionRow) -> PersistenceResult<Self> {
        let amount = Decimal::from_str(&row.amount)
            .map_err(|_| PersistenceError::InvalidDecimal(row.amount.clone()))?;
        let kind = LedgerKind::from_str(&row.tx_type).ok_or_else(|| {
            PersistenceError::InvalidEnumValue {
                field: "tx_type".into(),
                value: row.tx_type.clone(),
            }
        })?;
        let metadata = row
            .metadata
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;
        Ok(LedgerEntry {
            id: row.id,
            account_id: row.user_id,
            kind,
            amount,
            description: row.description,
            counterparty_username: row.recipient_username,
            metadata,
            created_at: row.created_at,
        })
    }
}
