//! # BancoSeguro Persistence
//!
//! Storage layer: the [`BankStore`] contract plus its two implementations,
//! an in-memory map store (tests, fallback) and a SQLite store (production).
//! Every balance operation goes through [`BalanceCommit`] so multi-row
//! writes are atomic in both backends.

pub mod error;
pub mod memory;
pub mod sqlite;
pub mod store;

pub use error::{PersistenceError, PersistenceResult};
pub use memory::MemoryStore;
pub use sqlite::{init_database, run_migrations, SqliteStore};
pub use store::{BalanceCommit, BalanceUpdate, BankStore};
