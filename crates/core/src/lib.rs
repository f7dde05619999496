//! # BancoSeguro Core
//!
//! Domain types for the simulated bank: accounts, the immutable ledger,
//! two-decimal money helpers and the fixed service catalogs. No storage or
//! transport concerns live here.

pub mod account;
pub mod catalog;
pub mod error;
pub mod ledger;
pub mod money;

pub use account::{
    validate_pin, validate_username, Account, AccountId, AccountSummary, NewAccount,
    MAX_LOGIN_ATTEMPTS,
};
pub use catalog::{streaming_service, validate_operator, validate_phone_number, StreamingService};
pub use error::{CoreError, CoreResult};
pub use ledger::{LedgerEntry, LedgerKind, NewLedgerEntry};
