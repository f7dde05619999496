//! Request handlers and wire types.
//!
//! All request and response bodies are camelCase JSON; monetary amounts
//! cross the boundary as fixed two-digit strings.

use crate::error::ApiError;
use crate::session;
use crate::state::AppState;
use axum::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bancoseguro_business::BusinessError;
use bancoseguro_core::{money, AccountId, LedgerEntry};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// The authenticated account behind the request's session cookie.
pub struct AuthSession {
    pub account_id: AccountId,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let account_id = parts
            .headers
            .get(header::COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(session::token_from_cookie_header)
            .and_then(|token| state.sessions.resolve(token))
            .ok_or(ApiError(BusinessError::Unauthenticated))?;
        Ok(Self { account_id })
    }
}

// === Wire types ===

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub pin: String,
    pub confirm_pin: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub pin: String,
}

#[derive(Debug, Deserialize)]
pub struct AmountRequest {
    pub amount: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub recipient_username: String,
    pub amount: String,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RechargeRequest {
    pub phone_number: String,
    pub operator: String,
    pub amount: String,
}

/// Parse a boundary amount string (at most two fractional digits).
fn parse_amount(raw: &str) -> Result<Decimal, ApiError> {
    money::parse_amount(raw)
        .map_err(BusinessError::from)
        .map_err(ApiError::from)
}

#[derive(Debug, Deserialize)]
pub struct StreamingRequest {
    pub service: String,
    /// Client-claimed price; the catalog price is charged regardless.
    #[serde(default)]
    #[allow(dead_code)]
    pub price: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePinRequest {
    pub current_pin: String,
    pub new_pin: String,
    pub confirm_pin: String,
}

/// A ledger entry as the client sees it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionView {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl From<LedgerEntry> for TransactionView {
    fn from(entry: LedgerEntry) -> Self {
        Self {
            id: entry.id,
            kind: entry.kind.as_str().to_string(),
            amount: money::to_money_string(entry.amount),
            description: entry.description,
            recipient_username: entry.counterparty_username,
            metadata: entry.metadata,
            created_at: entry.created_at,
        }
    }
}

// === Auth ===

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Response, ApiError> {
    let account = state
        .auth
        .register(&req.username, &req.pin, &req.confirm_pin)
        .await?;
    // Registration opens a session right away.
    let token = state.sessions.create(account.id);
    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, session::session_cookie(&token))],
        Json(json!({ "user": account.summary() })),
    )
        .into_response())
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let account = state.auth.login(&req.username, &req.pin).await?;
    let token = state.sessions.create(account.id);
    Ok((
        [(header::SET_COOKIE, session::session_cookie(&token))],
        Json(json!({ "user": account.summary() })),
    )
        .into_response())
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(session::token_from_cookie_header)
    {
        state.sessions.revoke(token);
    }
    (
        [(header::SET_COOKIE, session::clear_session_cookie())],
        Json(json!({ "message": "Sesión cerrada" })),
    )
        .into_response()
}

pub async fn me(
    State(state): State<AppState>,
    auth: AuthSession,
) -> Result<Json<serde_json::Value>, ApiError> {
    let account = state.engine.account(auth.account_id).await?;
    Ok(Json(json!({ "user": account.summary() })))
}

// === Banking ===

pub async fn withdraw(
    State(state): State<AppState>,
    auth: AuthSession,
    Json(req): Json<AmountRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let amount = parse_amount(&req.amount)?;
    let receipt = state.engine.withdraw(auth.account_id, amount).await?;
    Ok(Json(json!({
        "message": "Retiro exitoso",
        "newBalance": money::to_money_string(receipt.new_balance),
        "amount": money::to_money_string(receipt.amount),
    })))
}

pub async fn deposit(
    State(state): State<AppState>,
    auth: AuthSession,
    Json(req): Json<AmountRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let amount = parse_amount(&req.amount)?;
    let receipt = state.engine.deposit(auth.account_id, amount).await?;
    Ok(Json(json!({
        "message": "Depósito exitoso",
        "newBalance": money::to_money_string(receipt.new_balance),
        "amount": money::to_money_string(receipt.amount),
    })))
}

pub async fn transfer(
    State(state): State<AppState>,
    auth: AuthSession,
    Json(req): Json<TransferRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let amount = parse_amount(&req.amount)?;
    let receipt = state
        .engine
        .transfer(
            auth.account_id,
            &req.recipient_username,
            amount,
            req.note.as_deref(),
        )
        .await?;
    Ok(Json(json!({
        "message": "Transferencia exitosa",
        "newBalance": money::to_money_string(receipt.new_balance),
        "amount": money::to_money_string(receipt.amount),
        "recipient": receipt.recipient,
    })))
}

pub async fn balance(
    State(state): State<AppState>,
    auth: AuthSession,
) -> Result<Json<serde_json::Value>, ApiError> {
    let account = state.engine.account(auth.account_id).await?;
    Ok(Json(json!({
        "balance": money::to_money_string(account.balance),
    })))
}

pub async fn transactions(
    State(state): State<AppState>,
    auth: AuthSession,
) -> Result<Json<serde_json::Value>, ApiError> {
    let entries = state.engine.transactions(auth.account_id).await?;
    let views: Vec<TransactionView> = entries.into_iter().map(Into::into).collect();
    Ok(Json(json!({ "transactions": views })))
}

// === Services ===

pub async fn mobile_recharge(
    State(state): State<AppState>,
    auth: AuthSession,
    Json(req): Json<RechargeRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let amount = parse_amount(&req.amount)?;
    let receipt = state
        .engine
        .mobile_recharge(auth.account_id, &req.phone_number, &req.operator, amount)
        .await?;
    Ok(Json(json!({
        "message": "Recarga exitosa",
        "newBalance": money::to_money_string(receipt.new_balance),
        "amount": money::to_money_string(receipt.amount),
        "phoneNumber": req.phone_number,
        "operator": req.operator,
    })))
}

pub async fn streaming(
    State(state): State<AppState>,
    auth: AuthSession,
    Json(req): Json<StreamingRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let receipt = state
        .engine
        .streaming_payment(auth.account_id, &req.service)
        .await?;
    Ok(Json(json!({
        "message": "Pago realizado",
        "newBalance": money::to_money_string(receipt.new_balance),
        "amount": money::to_money_string(receipt.amount),
        "service": receipt.service_name,
    })))
}

// === Games ===

pub async fn wheel(
    State(state): State<AppState>,
    auth: AuthSession,
) -> Result<Json<serde_json::Value>, ApiError> {
    let receipt = state.engine.spin_wheel(auth.account_id).await?;
    let message = if receipt.applied > Decimal::ZERO {
        format!(
            "¡Felicidades! Ganaste ${}",
            money::to_money_string(receipt.applied)
        )
    } else if receipt.applied < Decimal::ZERO {
        format!(
            "Perdiste ${}",
            money::to_money_string(-receipt.applied)
        )
    } else {
        "¡Suerte la próxima vez!".to_string()
    };
    Ok(Json(json!({
        "result": receipt.outcome,
        "newBalance": money::to_money_string(receipt.new_balance),
        "message": message,
    })))
}

// === Security ===

pub async fn change_pin(
    State(state): State<AppState>,
    auth: AuthSession,
    Json(req): Json<ChangePinRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .auth
        .change_pin(
            auth.account_id,
            &req.current_pin,
            &req.new_pin,
            &req.confirm_pin,
        )
        .await?;
    Ok(Json(json!({ "message": "PIN actualizado exitosamente" })))
}

// === Health ===

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
