//! The balance engine: every operation that mutates an account balance.
//!
//! Common shape: lock the account, load it, validate the business rule,
//! compute the new two-decimal balance, then hand the store one atomic
//! [`BalanceCommit`] carrying the balance write(s) and ledger append(s).

use crate::error::{BusinessError, BusinessResult};
use crate::locks::AccountLocks;
use crate::rng::RandomSource;
use bancoseguro_core::{
    catalog, money, Account, AccountId, CoreError, LedgerEntry, LedgerKind, NewLedgerEntry,
};
use bancoseguro_persistence::{BalanceCommit, BankStore};
use rust_decimal::Decimal;
use serde_json::json;
use std::sync::Arc;

/// Amount bounds per operation, whole dollars.
const WITHDRAW_BOUNDS: (i64, i64) = (10, 5_000);
const DEPOSIT_BOUNDS: (i64, i64) = (10, 10_000);
const TRANSFER_BOUNDS: (i64, i64) = (1, 10_000);
const RECHARGE_BOUNDS: (i64, i64) = (5, 100);

/// Entry cost of one wheel spin.
const SPIN_COST: i64 = 10;

/// Result of a single-sided balance operation.
#[derive(Debug, Clone)]
pub struct Receipt {
    pub new_balance: Decimal,
    pub amount: Decimal,
}

/// Result of a transfer, from the sender's side.
#[derive(Debug, Clone)]
pub struct TransferReceipt {
    pub new_balance: Decimal,
    pub amount: Decimal,
    pub recipient: String,
}

/// Result of a streaming-service payment.
#[derive(Debug, Clone)]
pub struct ServiceReceipt {
    pub new_balance: Decimal,
    pub amount: Decimal,
    pub service_name: String,
}

/// Result of one wheel spin.
#[derive(Debug, Clone)]
pub struct SpinReceipt {
    /// The drawn outcome from the payout table.
    pub outcome: i64,
    /// The delta actually applied after the cost (losses capped at the
    /// remaining balance so it never goes negative).
    pub applied: Decimal,
    pub new_balance: Decimal,
}

/// Validation + mutation logic for every balance operation.
pub struct BalanceEngine {
    store: Arc<dyn BankStore>,
    rng: Arc<dyn RandomSource>,
    locks: AccountLocks,
}

impl BalanceEngine {
    pub fn new(store: Arc<dyn BankStore>, rng: Arc<dyn RandomSource>) -> Self {
        Self {
            store,
            rng,
            locks: AccountLocks::new(),
        }
    }

    /// Load an account by session identity.
    pub async fn account(&self, id: AccountId) -> BusinessResult<Account> {
        self.store
            .account(id)
            .await?
            .ok_or_else(|| BusinessError::AccountNotFound(id.to_string()))
    }

    /// The account's ledger, most recent first.
    pub async fn transactions(&self, id: AccountId) -> BusinessResult<Vec<LedgerEntry>> {
        // Ensure the session still maps to a real account.
        self.account(id).await?;
        Ok(self.store.ledger(id).await?)
    }

    /// Cash withdrawal, bounds [10, 5000].
    pub async fn withdraw(&self, id: AccountId, amount: Decimal) -> BusinessResult<Receipt> {
        let amount = checked_amount(amount, WITHDRAW_BOUNDS)?;

        let _guard = self.locks.lock(id).await;
        let account = self.account(id).await?;
        require_funds(&account, amount)?;

        let new_balance = money::round(account.balance - amount);
        let commit = BalanceCommit::new().update(id, new_balance).entry(
            NewLedgerEntry::new(id, LedgerKind::Withdraw, amount, "Retiro de efectivo"),
        );
        self.store.commit(commit).await?;

        tracing::debug!(account = id, %amount, "withdraw committed");
        Ok(Receipt { new_balance, amount })
    }

    /// Cash deposit, bounds [10, 10000].
    pub async fn deposit(&self, id: AccountId, amount: Decimal) -> BusinessResult<Receipt> {
        let amount = checked_amount(amount, DEPOSIT_BOUNDS)?;

        let _guard = self.locks.lock(id).await;
        let account = self.account(id).await?;

        let new_balance = money::round(account.balance + amount);
        let commit = BalanceCommit::new().update(id, new_balance).entry(
            NewLedgerEntry::new(id, LedgerKind::Deposit, amount, "Depósito de efectivo"),
        );
        self.store.commit(commit).await?;

        tracing::debug!(account = id, %amount, "deposit committed");
        Ok(Receipt { new_balance, amount })
    }

    /// Transfer to another user by username. Debits the sender, credits the
    /// recipient and appends one ledger entry per side, all in one commit.
    pub async fn transfer(
        &self,
        sender_id: AccountId,
        recipient_username: &str,
        amount: Decimal,
        note: Option<&str>,
    ) -> BusinessResult<TransferReceipt> {
        let amount = checked_amount(amount, TRANSFER_BOUNDS)?;

        let recipient = self
            .store
            .account_by_username(recipient_username)
            .await?
            .ok_or_else(|| BusinessError::RecipientNotFound(recipient_username.to_string()))?;
        if recipient.id == sender_id {
            return Err(BusinessError::SelfTransfer);
        }

        // Both balances re-read under both locks; ids ordered inside.
        let _guards = self.locks.lock_pair(sender_id, recipient.id).await;
        let sender = self.account(sender_id).await?;
        let recipient = self.account(recipient.id).await?;
        require_funds(&sender, amount)?;

        let sender_balance = money::round(sender.balance - amount);
        let recipient_balance = money::round(recipient.balance + amount);
        let metadata = note
            .filter(|n| !n.trim().is_empty())
            .map(|n| json!({ "note": n }));

        let mut out = NewLedgerEntry::new(
            sender.id,
            LedgerKind::TransferOut,
            amount,
            format!("Transferencia a {}", recipient.username),
        )
        .with_counterparty(&recipient.username);
        let mut incoming = NewLedgerEntry::new(
            recipient.id,
            LedgerKind::TransferIn,
            amount,
            format!("Transferencia de {}", sender.username),
        )
        .with_counterparty(&sender.username);
        if let Some(metadata) = &metadata {
            out = out.with_metadata(metadata.clone());
            incoming = incoming.with_metadata(metadata.clone());
        }

        let commit = BalanceCommit::new()
            .update(sender.id, sender_balance)
            .update(recipient.id, recipient_balance)
            .entry(out)
            .entry(incoming);
        self.store.commit(commit).await?;

        tracing::info!(
            from = sender.id,
            to = recipient.id,
            %amount,
            "transfer committed"
        );
        Ok(TransferReceipt {
            new_balance: sender_balance,
            amount,
            recipient: recipient.username,
        })
    }

    /// Mobile recharge: phone length [10, 15], known operator, bounds [5, 100].
    pub async fn mobile_recharge(
        &self,
        id: AccountId,
        phone_number: &str,
        operator: &str,
        amount: Decimal,
    ) -> BusinessResult<Receipt> {
        catalog::validate_phone_number(phone_number)?;
        catalog::validate_operator(operator)?;
        let amount = checked_amount(amount, RECHARGE_BOUNDS)?;

        let _guard = self.locks.lock(id).await;
        let account = self.account(id).await?;
        require_funds(&account, amount)?;

        let new_balance = money::round(account.balance - amount);
        let entry = NewLedgerEntry::new(
            id,
            LedgerKind::MobileRecharge,
            amount,
            format!("Recarga {} - {}", operator.to_uppercase(), phone_number),
        )
        .with_metadata(json!({ "phoneNumber": phone_number, "operator": operator }));
        self.store
            .commit(BalanceCommit::new().update(id, new_balance).entry(entry))
            .await?;

        Ok(Receipt { new_balance, amount })
    }

    /// Streaming subscription. The price always comes from the catalog;
    /// whatever the client claims is ignored.
    pub async fn streaming_payment(
        &self,
        id: AccountId,
        service_id: &str,
    ) -> BusinessResult<ServiceReceipt> {
        let service = catalog::streaming_service(service_id)?;
        let amount = service.price();

        let _guard = self.locks.lock(id).await;
        let account = self.account(id).await?;
        require_funds(&account, amount)?;

        let new_balance = money::round(account.balance - amount);
        let entry = NewLedgerEntry::new(
            id,
            LedgerKind::Service,
            amount,
            format!("Suscripción {}", service.name),
        )
        .with_metadata(json!({ "service": service.id }));
        self.store
            .commit(BalanceCommit::new().update(id, new_balance).entry(entry))
            .await?;

        Ok(ServiceReceipt {
            new_balance,
            amount,
            service_name: service.name.to_string(),
        })
    }

    /// One spin of the wheel: fixed entry cost, then one outcome drawn from
    /// the payout table. The cost requires sufficient funds up front; a
    /// losing outcome is capped at the post-cost balance so the committed
    /// balance never goes below zero.
    pub async fn spin_wheel(&self, id: AccountId) -> BusinessResult<SpinReceipt> {
        let cost = Decimal::from(SPIN_COST);

        let _guard = self.locks.lock(id).await;
        let account = self.account(id).await?;
        if account.balance < cost {
            return Err(BusinessError::insufficient_funds(cost, account.balance));
        }

        let outcome = self.rng.wheel_outcome();
        let after_cost = money::round(account.balance - cost);
        let drawn = Decimal::from(outcome);
        let applied = if drawn < Decimal::ZERO {
            drawn.max(-after_cost)
        } else {
            drawn
        };
        let new_balance = money::round(after_cost + applied);

        let mut commit = BalanceCommit::new().update(id, new_balance).entry(
            NewLedgerEntry::new(id, LedgerKind::Game, -cost, "Rueda de la Suerte - Costo"),
        );
        if !applied.is_zero() {
            let label = if applied > Decimal::ZERO { "Premio" } else { "Pérdida" };
            commit = commit.entry(
                NewLedgerEntry::new(
                    id,
                    LedgerKind::Game,
                    applied,
                    format!("Rueda de la Suerte - {label}"),
                )
                .with_metadata(json!({ "spinResult": outcome })),
            );
        }
        self.store.commit(commit).await?;

        tracing::debug!(account = id, outcome, %new_balance, "wheel spin committed");
        Ok(SpinReceipt {
            outcome,
            applied,
            new_balance,
        })
    }
}

/// Round to two digits and enforce whole-dollar operation bounds.
fn checked_amount(amount: Decimal, (min, max): (i64, i64)) -> BusinessResult<Decimal> {
    let amount = money::round(amount);
    if amount < Decimal::from(min) || amount > Decimal::from(max) {
        return Err(CoreError::out_of_range(Decimal::from(min), Decimal::from(max)).into());
    }
    Ok(amount)
}

/// Debit precondition: the account covers the amount.
fn require_funds(account: &Account, amount: Decimal) -> BusinessResult<()> {
    if account.balance < amount {
        return Err(BusinessError::insufficient_funds(amount, account.balance));
    }
    Ok(())
}
