//! # Ledger Module
//!
//! Immutable transaction records. Every committed balance change appends one
//! entry (two for transfers, one per side); entries are read back most
//! recent first and never updated.

use crate::account::AccountId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of balance-affecting event an entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerKind {
    Deposit,
    Withdraw,
    TransferOut,
    TransferIn,
    Service,
    MobileRecharge,
    Game,
}

impl LedgerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerKind::Deposit => "deposit",
            LedgerKind::Withdraw => "withdraw",
            LedgerKind::TransferOut => "transfer_out",
            LedgerKind::TransferIn => "transfer_in",
            LedgerKind::Service => "service",
            LedgerKind::MobileRecharge => "mobile_recharge",
            LedgerKind::Game => "game",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "deposit" => Some(LedgerKind::Deposit),
            "withdraw" => Some(LedgerKind::Withdraw),
            "transfer_out" => Some(LedgerKind::TransferOut),
            "transfer_in" => Some(LedgerKind::TransferIn),
            "service" => Some(LedgerKind::Service),
            "mobile_recharge" => Some(LedgerKind::MobileRecharge),
            "game" => Some(LedgerKind::Game),
            _ => None,
        }
    }
}

impl fmt::Display for LedgerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One immutable record of a balance-affecting event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique, monotonically increasing insertion order.
    pub id: i64,
    pub account_id: AccountId,
    pub kind: LedgerKind,
    /// Magnitude of the applied delta; game entries carry the sign.
    pub amount: Decimal,
    /// Engine-generated summary, not user free text.
    pub description: String,
    /// The other party's username, transfers only.
    pub counterparty_username: Option<String>,
    /// Structured side-data (phone/operator, spin result, transfer note).
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// An entry as the engine hands it to the store; id and timestamp are
/// assigned at insertion.
#[derive(Debug, Clone)]
pub struct NewLedgerEntry {
    pub account_id: AccountId,
    pub kind: LedgerKind,
    pub amount: Decimal,
    pub description: String,
    pub counterparty_username: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

impl NewLedgerEntry {
    pub fn new(
        account_id: AccountId,
        kind: LedgerKind,
        amount: Decimal,
        description: impl Into<String>,
    ) -> Self {
        Self {
            account_id,
            kind,
            amount,
            description: description.into(),
            counterparty_username: None,
            metadata: None,
        }
    }

    pub fn with_counterparty(mut self, username: impl Into<String>) -> Self {
        self.counterparty_username = Some(username.into());
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}
