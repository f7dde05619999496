//! HTTP surface of the bank: axum router, handlers, cookie sessions and
//! error-to-status mapping.

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod session;
pub mod state;

pub use config::AppConfig;
pub use routes::router;
pub use session::{SessionStore, SESSION_COOKIE};
pub use state::AppState;
