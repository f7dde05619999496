//! Shared application state.

use crate::session::SessionStore;
use bancoseguro_business::{AuthService, BalanceEngine, RandomSource};
use bancoseguro_persistence::BankStore;
use std::sync::Arc;

/// Everything the handlers need, cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub engine: Arc<BalanceEngine>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn BankStore>, rng: Arc<dyn RandomSource>) -> Self {
        Self {
            auth: Arc::new(AuthService::new(store.clone(), rng.clone())),
            engine: Arc::new(BalanceEngine::new(store, rng)),
            sessions: Arc::new(SessionStore::new()),
        }
    }
}
