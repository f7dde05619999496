//! Randomness behind a seam so tests can supply deterministic sequences.

use rand::Rng;
use rust_decimal::Decimal;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Discrete payout table for the wheel game; one outcome is drawn uniformly
/// per spin.
pub const WHEEL_OUTCOMES: [i64; 10] = [50, -25, 100, -10, 25, -5, 75, -15, 30, -20];

/// Whole-dollar bounds for the balance assigned at registration.
pub const INITIAL_BALANCE_MIN: i64 = 100;
pub const INITIAL_BALANCE_MAX: i64 = 1000;

/// Source of the two random draws the bank needs.
pub trait RandomSource: Send + Sync {
    /// Initial balance for a new account, whole dollars in [100, 1000).
    fn initial_balance(&self) -> Decimal;

    /// One outcome drawn uniformly from [`WHEEL_OUTCOMES`].
    fn wheel_outcome(&self) -> i64;
}

/// Production source backed by the thread-local RNG.
#[derive(Debug, Default)]
pub struct ThreadRngSource;

impl RandomSource for ThreadRngSource {
    fn initial_balance(&self) -> Decimal {
        Decimal::from(rand::thread_rng().gen_range(INITIAL_BALANCE_MIN..INITIAL_BALANCE_MAX))
    }

    fn wheel_outcome(&self) -> i64 {
        let idx = rand::thread_rng().gen_range(0..WHEEL_OUTCOMES.len());
        WHEEL_OUTCOMES[idx]
    }
}

/// Deterministic source fed fixed sequences; draws fall back to defaults
/// when a queue runs dry. Intended for tests.
#[derive(Debug, Default)]
pub struct SequenceSource {
    balances: Mutex<VecDeque<Decimal>>,
    outcomes: Mutex<VecDeque<i64>>,
}

impl SequenceSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_balance(&self, balance: Decimal) {
        self.balances.lock().expect("poisoned").push_back(balance);
    }

    pub fn push_outcome(&self, outcome: i64) {
        self.outcomes.lock().expect("poisoned").push_back(outcome);
    }
}

impl RandomSource for SequenceSource {
    fn initial_balance(&self) -> Decimal {
        self.balances
            .lock()
            .expect("poisoned")
            .pop_front()
            .unwrap_or_else(|| Decimal::from(INITIAL_BALANCE_MIN))
    }

    fn wheel_outcome(&self) -> i64 {
        self.outcomes
            .lock()
            .expect("poisoned")
            .pop_front()
            .unwrap_or(WHEEL_OUTCOMES[0])
    }
}
