//! Per-account serialization.
//!
//! Every balance operation holds the account's async mutex across its
//! read-validate-write so two racing debits cannot both pass the funds
//! check against a stale balance. Transfers take both locks in ascending
//! account-id order to rule out deadlock.

use bancoseguro_core::AccountId;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Lazily grown map of one async mutex per account.
#[derive(Debug, Default)]
pub struct AccountLocks {
    locks: DashMap<AccountId, Arc<Mutex<()>>>,
}

impl AccountLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn mutex(&self, id: AccountId) -> Arc<Mutex<()>> {
        self.locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Lock a single account.
    pub async fn lock(&self, id: AccountId) -> OwnedMutexGuard<()> {
        self.mutex(id).lock_owned().await
    }

    /// Lock two distinct accounts; guards come back in argument order.
    pub async fn lock_pair(
        &self,
        a: AccountId,
        b: AccountId,
    ) -> (OwnedMutexGuard<()>, OwnedMutexGuard<()>) {
        debug_assert_ne!(a, b, "pair lock requires distinct accounts");
        if a < b {
            let guard_a = self.lock(a).await;
            let guard_b = self.lock(b).await;
            (guard_a, guard_b)
        } else {
            let guard_b = self.lock(b).await;
            let guard_a = self.lock(a).await;
            (guard_a, guard_b)
        }
    }
}
