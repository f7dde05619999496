//! SQLite implementation of the [`BankStore`] contract.
//!
//! Pool setup and migrations follow the usual sqlx flow; `commit` wraps all
//! balance updates and ledger inserts of one operation in a database
//! transaction.

pub mod schema;

use crate::error::{PersistenceError, PersistenceResult};
use crate::store::{BalanceCommit, BankStore};
use async_trait::async_trait;
use bancoseguro_core::{money, Account, AccountId, LedgerEntry, NewAccount};
use chrono::Utc;
use schema::{TransactionRow, UserRow};
use sqlx::SqlitePool;

/// Run migrations on an existing pool.
pub async fn run_migrations(pool: &SqlitePool) -> PersistenceResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Create the database file if missing and bring the schema up to date.
pub async fn init_database(database_url: &str) -> PersistenceResult<SqlitePool> {
    let pool = SqlitePool::connect_with(
        database_url
            .parse::<sqlx::sqlite::SqliteConnectOptions>()?
            .create_if_missing(true),
    )
    .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// `BankStore` backed by SQLite.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl BankStore for SqliteStore {
    async fn account(&self, id: AccountId) -> PersistenceResult<Option<Account>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Account::try_from).transpose()
    }

    async fn account_by_username(&self, username: &str) -> PersistenceResult<Option<Account>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Account::try_from).transpose()
    }

    async fn create_account(&self, new: NewAccount) -> PersistenceResult<Account> {
        let created_at = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO users (username, pin_hash, balance, login_attempts, is_locked, created_at)
            VALUES (?, ?, ?, 0, 0, ?)
            "#,
        )
        .bind(&new.username)
        .bind(&new.pin_hash)
        .bind(money::to_money_string(new.balance))
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                PersistenceError::already_exists("Account", &new.username)
            }
            _ => PersistenceError::Database(e),
        })?;

        Ok(Account {
            id: result.last_insert_rowid(),
            username: new.username,
            pin_hash: new.pin_hash,
            balance: new.balance,
            login_attempts: 0,
            is_locked: false,
            created_at,
        })
    }

    async fn set_login_state(
        &self,
        id: AccountId,
        attempts: i32,
        locked: bool,
    ) -> PersistenceResult<()> {
        let result = sqlx::query("UPDATE users SET login_attempts = ?, is_locked = ? WHERE id = ?")
            .bind(attempts)
            .bind(locked)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("Account", id));
        }
        Ok(())
    }

    async fn set_pin_hash(&self, id: AccountId, pin_hash: &str) -> PersistenceResult<()> {
        let result = sqlx::query("UPDATE users SET pin_hash = ? WHERE id = ?")
            .bind(pin_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("Account", id));
        }
        Ok(())
    }

    async fn commit(&self, commit: BalanceCommit) -> PersistenceResult<()> {
        let mut tx = self.pool.begin().await?;

        for update in &commit.updates {
            let result = sqlx::query("UPDATE users SET balance = ? WHERE id = ?")
                .bind(money::to_money_string(update.new_balance))
                .bind(update.account_id)
                .execute(&mut *tx)
                .await?;
            if result.rows_affected() == 0 {
                // Dropping `tx` rolls back everything applied so far.
                return Err(PersistenceError::not_found("Account", update.account_id));
            }
        }

        for entry in &commit.entries {
            let metadata = entry
                .metadata
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?;
            sqlx::query(
                r#"
                INSERT INTO transactions
                    (user_id, tx_type, amount, description, recipient_username, metadata, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(entry.account_id)
            .bind(entry.kind.as_str())
            .bind(money::to_money_string(entry.amount))
            .bind(&entry.description)
            .bind(&entry.counterparty_username)
            .bind(metadata)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn ledger(&self, account_id: AccountId) -> PersistenceResult<Vec<LedgerEntry>> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            "SELECT * FROM transactions WHERE user_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(LedgerEntry::try_from).collect()
    }
}
