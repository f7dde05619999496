//! End-to-end tests driving the router through `tower::ServiceExt`.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use bancoseguro_api::{router, AppState, SESSION_COOKIE};
use bancoseguro_business::SequenceSource;
use bancoseguro_persistence::MemoryStore;
use http_body_util::BodyExt;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

struct TestApp {
    app: Router,
    rng: Arc<SequenceSource>,
}

fn test_app() -> TestApp {
    let rng = Arc::new(SequenceSource::new());
    let state = AppState::new(Arc::new(MemoryStore::new()), rng.clone());
    TestApp {
        app: router(state),
        rng,
    }
}

async fn send(
    app: &Router,
    method: &str,
    path: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Option<String>, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .filter(|v| v.starts_with(SESSION_COOKIE))
        .map(str::to_string);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, set_cookie, json)
}

/// Register a user with a known balance; returns the session cookie.
async fn register(app: &TestApp, username: &str, balance: rust_decimal::Decimal) -> String {
    app.rng.push_balance(balance);
    let (status, cookie, body) = send(
        &app.app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "username": username, "pin": "1234", "confirmPin": "1234" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    cookie.expect("registration must set the session cookie")
}

#[tokio::test]
async fn test_health() {
    let app = test_app();
    let (status, _, body) = send(&app.app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_register_login_me() {
    let app = test_app();
    let cookie = register(&app, "alice", dec!(500)).await;

    let (status, _, body) = send(&app.app, "GET", "/auth/me", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "alice");
    assert_eq!(body["user"]["balance"], "500.00");
    assert!(body["user"].get("pinHash").is_none());

    // Duplicate username conflicts; the first registration stays usable.
    let (status, _, body) = send(
        &app.app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "username": "alice", "pin": "9999", "confirmPin": "9999" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "El nombre de usuario ya está en uso");

    let (status, login_cookie, body) = send(
        &app.app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "username": "alice", "pin": "1234" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["balance"], "500.00");
    assert!(login_cookie.is_some());
}

#[tokio::test]
async fn test_register_validation() {
    let app = test_app();
    let (status, _, body) = send(
        &app.app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "username": "alice", "pin": "12", "confirmPin": "12" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "El PIN debe tener exactamente 4 dígitos");

    let (status, _, body) = send(
        &app.app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "username": "alice", "pin": "1234", "confirmPin": "4321" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Los PINs no coinciden");
}

#[tokio::test]
async fn test_lockout_after_three_failures() {
    let app = test_app();
    register(&app, "alice", dec!(500)).await;

    for expected_remaining in [2, 1, 0] {
        let (status, _, body) = send(
            &app.app,
            "POST",
            "/auth/login",
            None,
            Some(json!({ "username": "alice", "pin": "0000" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Credenciales inválidas");
        assert_eq!(body["attemptsRemaining"], expected_remaining);
    }

    // Correct PIN after lockout still refused.
    let (status, _, body) = send(
        &app.app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "username": "alice", "pin": "1234" })),
    )
    .await;
    assert_eq!(status, StatusCode::LOCKED);
    assert_eq!(body["message"], "Cuenta bloqueada. Contacte al banco.");
}

#[tokio::test]
async fn test_unknown_user_has_no_attempts_counter() {
    let app = test_app();
    let (status, _, body) = send(
        &app.app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "username": "ghost", "pin": "1234" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.get("attemptsRemaining").is_none());
}

#[tokio::test]
async fn test_requests_without_session_are_rejected() {
    let app = test_app();
    for (method, path) in [
        ("GET", "/auth/me"),
        ("GET", "/banking/balance"),
        ("GET", "/banking/transactions"),
        ("POST", "/games/wheel"),
    ] {
        let (status, _, body) = send(&app.app, method, path, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {path}");
        assert_eq!(body["message"], "No autenticado");
    }
}

#[tokio::test]
async fn test_logout_invalidates_session() {
    let app = test_app();
    let cookie = register(&app, "alice", dec!(500)).await;

    let (status, cleared, _) = send(&app.app, "POST", "/auth/logout", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cleared.as_deref(), Some("banco_session="));

    let (status, _, _) = send(&app.app, "GET", "/auth/me", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_withdraw_and_deposit() {
    let app = test_app();
    let cookie = register(&app, "alice", dec!(500)).await;

    let (status, _, body) = send(
        &app.app,
        "POST",
        "/banking/withdraw",
        Some(&cookie),
        Some(json!({ "amount": "100" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["newBalance"], "400.00");
    assert_eq!(body["amount"], "100.00");

    let (status, _, body) = send(
        &app.app,
        "POST",
        "/banking/deposit",
        Some(&cookie),
        Some(json!({ "amount": "50.50" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["newBalance"], "450.50");
}

#[tokio::test]
async fn test_overdraw_changes_nothing() {
    let app = test_app();
    let cookie = register(&app, "alice", dec!(50)).await;

    let (status, _, body) = send(
        &app.app,
        "POST",
        "/banking/withdraw",
        Some(&cookie),
        Some(json!({ "amount": "100" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Saldo insuficiente");

    let (_, _, body) = send(&app.app, "GET", "/banking/balance", Some(&cookie), None).await;
    assert_eq!(body["balance"], "50.00");
    let (_, _, body) = send(&app.app, "GET", "/banking/transactions", Some(&cookie), None).await;
    assert_eq!(body["transactions"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_amount_bounds_rejected() {
    let app = test_app();
    let cookie = register(&app, "alice", dec!(500)).await;

    let (status, _, body) = send(
        &app.app,
        "POST",
        "/banking/withdraw",
        Some(&cookie),
        Some(json!({ "amount": "5" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "El monto debe estar entre $10.00 y $5000.00");
}

#[tokio::test]
async fn test_malformed_amount_rejected() {
    let app = test_app();
    let cookie = register(&app, "alice", dec!(500)).await;

    // More than two fractional digits, and not a number at all.
    for raw in ["10.505", "diez"] {
        let (status, _, body) = send(
            &app.app,
            "POST",
            "/banking/deposit",
            Some(&cookie),
            Some(json!({ "amount": raw })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{raw}");
        assert_eq!(body["message"], "Monto inválido");
    }

    let (_, _, body) = send(&app.app, "GET", "/banking/balance", Some(&cookie), None).await;
    assert_eq!(body["balance"], "500.00");
}

#[tokio::test]
async fn test_transfer_rent_scenario() {
    let app = test_app();
    let alice = register(&app, "alice", dec!(500)).await;
    let bob = register(&app, "bob", dec!(300)).await;

    let (status, _, body) = send(
        &app.app,
        "POST",
        "/banking/transfer",
        Some(&alice),
        Some(json!({ "recipientUsername": "bob", "amount": "200", "note": "rent" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["newBalance"], "300.00");
    assert_eq!(body["amount"], "200.00");
    assert_eq!(body["recipient"], "bob");

    let (_, _, body) = send(&app.app, "GET", "/banking/balance", Some(&bob), None).await;
    assert_eq!(body["balance"], "500.00");

    let (_, _, body) = send(&app.app, "GET", "/banking/transactions", Some(&alice), None).await;
    let out = &body["transactions"][0];
    assert_eq!(out["type"], "transfer_out");
    assert_eq!(out["amount"], "200.00");
    assert_eq!(out["recipientUsername"], "bob");
    assert_eq!(out["metadata"]["note"], "rent");

    let (_, _, body) = send(&app.app, "GET", "/banking/transactions", Some(&bob), None).await;
    let incoming = &body["transactions"][0];
    assert_eq!(incoming["type"], "transfer_in");
    assert_eq!(incoming["amount"], "200.00");
    assert_eq!(incoming["recipientUsername"], "alice");
    assert_eq!(incoming["metadata"]["note"], "rent");
}

#[tokio::test]
async fn test_transfer_rejections() {
    let app = test_app();
    let cookie = register(&app, "alice", dec!(500)).await;

    let (status, _, body) = send(
        &app.app,
        "POST",
        "/banking/transfer",
        Some(&cookie),
        Some(json!({ "recipientUsername": "ghost", "amount": "50" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Usuario destinatario no encontrado");

    let (status, _, body) = send(
        &app.app,
        "POST",
        "/banking/transfer",
        Some(&cookie),
        Some(json!({ "recipientUsername": "alice", "amount": "50" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No puedes transferirte a ti mismo");
}

#[tokio::test]
async fn test_mobile_recharge() {
    let app = test_app();
    let cookie = register(&app, "alice", dec!(500)).await;

    let (status, _, body) = send(
        &app.app,
        "POST",
        "/services/mobile-recharge",
        Some(&cookie),
        Some(json!({ "phoneNumber": "3001234567", "operator": "tigo", "amount": "20" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["newBalance"], "480.00");
    assert_eq!(body["phoneNumber"], "3001234567");
    assert_eq!(body["operator"], "tigo");

    let (status, _, body) = send(
        &app.app,
        "POST",
        "/services/mobile-recharge",
        Some(&cookie),
        Some(json!({ "phoneNumber": "3001234567", "operator": "att", "amount": "20" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Operador no válido");
}

#[tokio::test]
async fn test_streaming_ignores_tampered_price() {
    let app = test_app();
    let cookie = register(&app, "alice", dec!(500)).await;

    let (status, _, body) = send(
        &app.app,
        "POST",
        "/services/streaming",
        Some(&cookie),
        Some(json!({ "service": "netflix", "price": "0.01" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    // Catalog price charged, not the client's claim.
    assert_eq!(body["amount"], "15.99");
    assert_eq!(body["newBalance"], "484.01");
    assert_eq!(body["service"], "Netflix");
}

#[tokio::test]
async fn test_wheel_loss_scenario() {
    let app = test_app();
    let cookie = register(&app, "alice", dec!(100)).await;
    app.rng.push_outcome(-25);

    let (status, _, body) = send(&app.app, "POST", "/games/wheel", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], -25);
    assert_eq!(body["newBalance"], "65.00");
    assert_eq!(body["message"], "Perdiste $25.00");

    let (_, _, body) = send(&app.app, "GET", "/banking/transactions", Some(&cookie), None).await;
    let transactions = body["transactions"].as_array().unwrap();
    assert_eq!(transactions.len(), 2);
    assert_eq!(transactions[0]["amount"], "-25.00");
    assert_eq!(transactions[1]["amount"], "-10.00");
}

#[tokio::test]
async fn test_wheel_win_message() {
    let app = test_app();
    let cookie = register(&app, "alice", dec!(100)).await;
    app.rng.push_outcome(50);

    let (status, _, body) = send(&app.app, "POST", "/games/wheel", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], 50);
    assert_eq!(body["newBalance"], "140.00");
    assert_eq!(body["message"], "¡Felicidades! Ganaste $50.00");
}

#[tokio::test]
async fn test_change_pin() {
    let app = test_app();
    let cookie = register(&app, "alice", dec!(500)).await;

    let (status, _, body) = send(
        &app.app,
        "POST",
        "/security/change-pin",
        Some(&cookie),
        Some(json!({ "currentPin": "0000", "newPin": "5678", "confirmPin": "5678" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "PIN actual incorrecto");

    let (status, _, _) = send(
        &app.app,
        "POST",
        "/security/change-pin",
        Some(&cookie),
        Some(json!({ "currentPin": "1234", "newPin": "5678", "confirmPin": "5678" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Old PIN refused, new one accepted.
    let (status, _, _) = send(
        &app.app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "username": "alice", "pin": "1234" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _, _) = send(
        &app.app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "username": "alice", "pin": "5678" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}
