//! In-memory `BankStore` for tests and as a database-less fallback.
//!
//! A single mutex guards all maps, which is what makes `commit` atomic:
//! no other caller observes a half-applied transfer.

use crate::error::{PersistenceError, PersistenceResult};
use crate::store::{BalanceCommit, BankStore};
use async_trait::async_trait;
use bancoseguro_core::{Account, AccountId, LedgerEntry, NewAccount, NewLedgerEntry};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Default)]
struct Inner {
    accounts: HashMap<AccountId, Account>,
    entries: Vec<LedgerEntry>,
    next_account_id: AccountId,
    next_entry_id: i64,
}

/// Process-local store backed by plain maps.
#[derive(Debug)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_account_id: 1,
                next_entry_id: 1,
                ..Inner::default()
            }),
        }
    }

    fn append_entry(inner: &mut Inner, entry: NewLedgerEntry) {
        let id = inner.next_entry_id;
        inner.next_entry_id += 1;
        inner.entries.push(LedgerEntry {
            id,
            account_id: entry.account_id,
            kind: entry.kind,
            amount: entry.amount,
            description: entry.description,
            counterparty_username: entry.counterparty_username,
            metadata: entry.metadata,
            created_at: Utc::now(),
        });
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BankStore for MemoryStore {
    async fn account(&self, id: AccountId) -> PersistenceResult<Option<Account>> {
        let inner = self.inner.lock().expect("memory store poisoned");
        Ok(inner.accounts.get(&id).cloned())
    }

    async fn account_by_username(&self, username: &str) -> PersistenceResult<Option<Account>> {
        let inner = self.inner.lock().expect("memory store poisoned");
        Ok(inner
            .accounts
            .values()
            .find(|a| a.username == username)
            .cloned())
    }

    async fn create_account(&self, new: NewAccount) -> PersistenceResult<Account> {
        let mut inner = self.inner.lock().expect("memory store poisoned");
        if inner.accounts.values().any(|a| a.username == new.username) {
            return Err(PersistenceError::already_exists("Account", &new.username));
        }
        let id = inner.next_account_id;
        inner.next_account_id += 1;
        let account = Account {
            id,
            username: new.username,
            pin_hash: new.pin_hash,
            balance: new.balance,
            login_attempts: 0,
            is_locked: false,
            created_at: Utc::now(),
        };
        inner.accounts.insert(id, account.clone());
        Ok(account)
    }

    async fn set_login_state(
        &self,
        id: AccountId,
        attempts: i32,
        locked: bool,
    ) -> PersistenceResult<()> {
        let mut inner = self.inner.lock().expect("memory store poisoned");
        let account = inner
            .accounts
            .get_mut(&id)
            .ok_or_else(|| PersistenceError::not_found("Account", id))?;
        account.login_attempts = attempts;
        account.is_locked = locked;
        Ok(())
    }

    async fn set_pin_hash(&self, id: AccountId, pin_hash: &str) -> PersistenceResult<()> {
        let mut inner = self.inner.lock().expect("memory store poisoned");
        let account = inner
            .accounts
            .get_mut(&id)
            .ok_or_else(|| PersistenceError::not_found("Account", id))?;
        account.pin_hash = pin_hash.to_string();
        Ok(())
    }

    async fn commit(&self, commit: BalanceCommit) -> PersistenceResult<()> {
        let mut inner = self.inner.lock().expect("memory store poisoned");

        // Validate everything before touching state.
        for update in &commit.updates {
            if !inner.accounts.contains_key(&update.account_id) {
                return Err(PersistenceError::not_found("Account", update.account_id));
            }
        }
        for entry in &commit.entries {
            if !inner.accounts.contains_key(&entry.account_id) {
                return Err(PersistenceError::not_found("Account", entry.account_id));
            }
        }

        for update in &commit.updates {
            if let Some(account) = inner.accounts.get_mut(&update.account_id) {
                account.balance = update.new_balance;
            }
        }
        for entry in commit.entries {
            Self::append_entry(&mut inner, entry);
        }
        Ok(())
    }

    async fn ledger(&self, account_id: AccountId) -> PersistenceResult<Vec<LedgerEntry>> {
        let inner = self.inner.lock().expect("memory store poisoned");
        let mut entries: Vec<LedgerEntry> = inner
            .entries
            .iter()
            .filter(|e| e.account_id == account_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(entries)
    }
}
