//! Authentication: registration, the login/lockout state machine and PIN
//! changes. PINs are stored as Argon2id hashes only.

use crate::error::{BusinessError, BusinessResult};
use crate::locks::AccountLocks;
use crate::rng::RandomSource;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use bancoseguro_core::{
    validate_pin, validate_username, Account, AccountId, CoreError, NewAccount,
    MAX_LOGIN_ATTEMPTS,
};
use bancoseguro_persistence::{BankStore, PersistenceError};
use rand::rngs::OsRng;
use std::sync::Arc;

/// Hash a PIN using Argon2id.
pub fn hash_pin(pin: &str) -> BusinessResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(pin.as_bytes(), &salt)
        .map_err(|_| BusinessError::Hashing)?;
    Ok(hash.to_string())
}

/// Verify a PIN against its stored hash.
pub fn verify_pin(pin: &str, pin_hash: &str) -> bool {
    match PasswordHash::new(pin_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(pin.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Registration, login and credential management.
pub struct AuthService {
    store: Arc<dyn BankStore>,
    rng: Arc<dyn RandomSource>,
    locks: AccountLocks,
}

impl AuthService {
    pub fn new(store: Arc<dyn BankStore>, rng: Arc<dyn RandomSource>) -> Self {
        Self {
            store,
            rng,
            locks: AccountLocks::new(),
        }
    }

    /// Create a new account with a fresh random balance.
    ///
    /// The username must be unused (case-sensitive); the PIN must be 4
    /// numeric digits and match its confirmation.
    pub async fn register(
        &self,
        username: &str,
        pin: &str,
        confirm_pin: &str,
    ) -> BusinessResult<Account> {
        validate_username(username)?;
        validate_pin(pin)?;
        if pin != confirm_pin {
            return Err(CoreError::PinMismatch.into());
        }

        let new = NewAccount {
            username: username.trim().to_string(),
            pin_hash: hash_pin(pin)?,
            balance: self.rng.initial_balance(),
        };
        let account = self.store.create_account(new).await.map_err(|e| match e {
            PersistenceError::AlreadyExists { .. } => {
                BusinessError::UsernameTaken(username.to_string())
            }
            other => BusinessError::Store(other),
        })?;

        tracing::info!(username = %account.username, id = account.id, "account registered");
        Ok(account)
    }

    /// Authenticate a username/PIN pair.
    ///
    /// State machine per account: `Active` + correct PIN resets the attempt
    /// counter; `Active` + wrong PIN increments it and locks at
    /// [`MAX_LOGIN_ATTEMPTS`]; `Locked` rejects everything until cleared
    /// externally.
    pub async fn login(&self, username: &str, pin: &str) -> BusinessResult<Account> {
        let Some(account) = self.store.account_by_username(username).await? else {
            // Unknown user: no attempts counter to report.
            return Err(BusinessError::InvalidCredentials {
                attempts_remaining: None,
            });
        };

        // The attempt counter is a read-modify-write; hold the account's
        // lock so racing wrong PINs all count, and reload under it.
        let _guard = self.locks.lock(account.id).await;
        let Some(mut account) = self.store.account(account.id).await? else {
            return Err(BusinessError::InvalidCredentials {
                attempts_remaining: None,
            });
        };

        if account.is_locked {
            return Err(BusinessError::AccountLocked);
        }

        if !verify_pin(pin, &account.pin_hash) {
            account.login_attempts += 1;
            let locked = account.login_attempts >= MAX_LOGIN_ATTEMPTS;
            self.store
                .set_login_state(account.id, account.login_attempts, locked)
                .await?;
            if locked {
                tracing::warn!(username = %account.username, "account locked after repeated failures");
            }
            return Err(BusinessError::InvalidCredentials {
                attempts_remaining: Some(account.attempts_remaining()),
            });
        }

        if account.login_attempts != 0 {
            self.store.set_login_state(account.id, 0, false).await?;
            account.login_attempts = 0;
        }
        Ok(account)
    }

    /// Change the PIN: the current one must verify, the new one must be a
    /// valid PIN and match its confirmation. No balance effect.
    pub async fn change_pin(
        &self,
        account_id: AccountId,
        current_pin: &str,
        new_pin: &str,
        confirm_pin: &str,
    ) -> BusinessResult<()> {
        validate_pin(new_pin)?;
        if new_pin != confirm_pin {
            return Err(CoreError::PinMismatch.into());
        }

        let account = self
            .store
            .account(account_id)
            .await?
            .ok_or_else(|| BusinessError::AccountNotFound(account_id.to_string()))?;

        if !verify_pin(current_pin, &account.pin_hash) {
            return Err(BusinessError::IncorrectPin);
        }

        let pin_hash = hash_pin(new_pin)?;
        self.store.set_pin_hash(account_id, &pin_hash).await?;
        Ok(())
    }
}
