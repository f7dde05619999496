//! Cookie-backed sessions.
//!
//! Tokens are random UUIDs mapped to the account id in a process-local
//! `DashMap`; they expire 24 hours after login. A restart therefore logs
//! everyone out, which is acceptable for this service.

use bancoseguro_core::AccountId;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use uuid::Uuid;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "banco_session";

/// Session lifetime in seconds.
const SESSION_TTL_SECS: i64 = 24 * 60 * 60;

#[derive(Debug, Clone)]
struct Session {
    account_id: AccountId,
    expires_at: DateTime<Utc>,
}

/// Token to session map.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<String, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session for an account and return its token.
    pub fn create(&self, account_id: AccountId) -> String {
        let token = Uuid::new_v4().to_string();
        self.sessions.insert(
            token.clone(),
            Session {
                account_id,
                expires_at: Utc::now() + Duration::seconds(SESSION_TTL_SECS),
            },
        );
        token
    }

    /// Resolve a token to its account. Expired sessions are dropped on
    /// lookup and resolve to `None`.
    pub fn resolve(&self, token: &str) -> Option<AccountId> {
        let expired = match self.sessions.get(token) {
            Some(session) if session.expires_at > Utc::now() => {
                return Some(session.account_id);
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            self.sessions.remove(token);
        }
        None
    }

    /// Drop a session if it exists.
    pub fn revoke(&self, token: &str) {
        self.sessions.remove(token);
    }
}

/// `Set-Cookie` value for a fresh session token.
pub fn session_cookie(token: &str) -> String {
    format!(
        "{SESSION_COOKIE}={token}; HttpOnly; Path=/; SameSite=Lax; Max-Age={SESSION_TTL_SECS}"
    )
}

/// `Set-Cookie` value that clears the session cookie.
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0")
}

/// Pull the session token out of a `Cookie` header value.
pub fn token_from_cookie_header(header: &str) -> Option<&str> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then_some(value)
    })
}
