//! The storage contract shared by the in-memory and SQLite backends.
//!
//! The engine prepares a [`BalanceCommit`] describing every balance write
//! and ledger append of one logical operation; the store applies it as a
//! single transactional unit or not at all.

use crate::error::PersistenceResult;
use async_trait::async_trait;
use bancoseguro_core::{Account, AccountId, LedgerEntry, NewAccount, NewLedgerEntry};
use rust_decimal::Decimal;

/// One account's new balance inside a commit.
#[derive(Debug, Clone)]
pub struct BalanceUpdate {
    pub account_id: AccountId,
    pub new_balance: Decimal,
}

/// Atomic unit of one balance operation: every balance write plus every
/// ledger append. A transfer carries two of each; single-sided operations
/// carry one update and one entry.
#[derive(Debug, Clone, Default)]
pub struct BalanceCommit {
    pub updates: Vec<BalanceUpdate>,
    pub entries: Vec<NewLedgerEntry>,
}

impl BalanceCommit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(mut self, account_id: AccountId, new_balance: Decimal) -> Self {
        self.updates.push(BalanceUpdate {
            account_id,
            new_balance,
        });
        self
    }

    pub fn entry(mut self, entry: NewLedgerEntry) -> Self {
        self.entries.push(entry);
        self
    }
}

/// CRUD over accounts plus the append-only ledger.
///
/// Two interchangeable implementations exist: [`crate::MemoryStore`] for
/// tests and fallback, [`crate::SqliteStore`] for production.
#[async_trait]
pub trait BankStore: Send + Sync {
    /// Look up an account by id.
    async fn account(&self, id: AccountId) -> PersistenceResult<Option<Account>>;

    /// Look up an account by exact (case-sensitive) username.
    async fn account_by_username(&self, username: &str) -> PersistenceResult<Option<Account>>;

    /// Insert a new account; fails with `AlreadyExists` on a username clash.
    async fn create_account(&self, new: NewAccount) -> PersistenceResult<Account>;

    /// Persist the login-attempt counter and lock flag.
    async fn set_login_state(
        &self,
        id: AccountId,
        attempts: i32,
        locked: bool,
    ) -> PersistenceResult<()>;

    /// Replace the stored PIN hash.
    async fn set_pin_hash(&self, id: AccountId, pin_hash: &str) -> PersistenceResult<()>;

    /// Apply all balance updates and ledger appends of one operation
    /// atomically: either every row lands or none does.
    async fn commit(&self, commit: BalanceCommit) -> PersistenceResult<()>;

    /// All ledger entries of an account, most recent first.
    async fn ledger(&self, account_id: AccountId) -> PersistenceResult<Vec<LedgerEntry>>;
}
