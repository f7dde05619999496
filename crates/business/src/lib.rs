//! Business layer: authentication and the balance engine.
//!
//! Sits between the HTTP surface and the stores. All validation, the
//! login/lockout state machine and every balance rule live here; the
//! stores below only persist what this layer decides.

pub mod auth;
pub mod engine;
pub mod error;
pub mod locks;
pub mod rng;

pub use auth::{hash_pin, verify_pin, AuthService};
pub use engine::{BalanceEngine, Receipt, ServiceReceipt, SpinReceipt, TransferReceipt};
pub use error::{BusinessError, BusinessResult};
pub use locks::AccountLocks;
pub use rng::{
    RandomSource, SequenceSource, ThreadRngSource, INITIAL_BALANCE_MAX, INITIAL_BALANCE_MIN,
    WHEEL_OUTCOMES,
};
