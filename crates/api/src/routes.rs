//! Router assembly.

use crate::handlers;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .route("/auth/logout", post(handlers::logout))
        .route("/auth/me", get(handlers::me))
        .route("/banking/withdraw", post(handlers::withdraw))
        .route("/banking/deposit", post(handlers::deposit))
        .route("/banking/transfer", post(handlers::transfer))
        .route("/banking/balance", get(handlers::balance))
        .route("/banking/transactions", get(handlers::transactions))
        .route("/services/mobile-recharge", post(handlers::mobile_recharge))
        .route("/services/streaming", post(handlers::streaming))
        .route("/games/wheel", post(handlers::wheel))
        .route("/security/change-pin", post(handlers::change_pin))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
