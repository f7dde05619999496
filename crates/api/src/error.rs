//! Business error to HTTP response mapping.
//!
//! Every failure body is `{"message": "..."}` with a Spanish user-facing
//! message; failed logins additionally carry `attemptsRemaining`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bancoseguro_business::BusinessError;
use bancoseguro_core::{money, CoreError};
use serde_json::json;

/// Transport wrapper so `?` works in handlers.
#[derive(Debug)]
pub struct ApiError(pub BusinessError);

impl From<BusinessError> for ApiError {
    fn from(err: BusinessError) -> Self {
        Self(err)
    }
}

fn validation_message(err: &CoreError) -> String {
    match err {
        CoreError::InvalidAmount(_) => "Monto inválido".to_string(),
        CoreError::AmountOutOfRange { min, max } => format!(
            "El monto debe estar entre ${} y ${}",
            money::to_money_string(*min),
            money::to_money_string(*max)
        ),
        CoreError::InvalidPin => "El PIN debe tener exactamente 4 dígitos".to_string(),
        CoreError::PinMismatch => "Los PINs no coinciden".to_string(),
        CoreError::InvalidUsername(_) => "El nombre de usuario es requerido".to_string(),
        CoreError::UnknownService(_) => "Servicio no disponible".to_string(),
        CoreError::UnknownOperator(_) => "Operador no válido".to_string(),
        CoreError::InvalidPhoneNumber(_) => "Número de teléfono inválido".to_string(),
    }
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match &self.0 {
            BusinessError::Invalid(core) => (StatusCode::BAD_REQUEST, validation_message(core)),
            BusinessError::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, "No autenticado".to_string())
            }
            BusinessError::InvalidCredentials { .. } => {
                (StatusCode::UNAUTHORIZED, "Credenciales inválidas".to_string())
            }
            BusinessError::AccountLocked => (
                StatusCode::LOCKED,
                "Cuenta bloqueada. Contacte al banco.".to_string(),
            ),
            BusinessError::IncorrectPin => {
                (StatusCode::UNAUTHORIZED, "PIN actual incorrecto".to_string())
            }
            BusinessError::AccountNotFound(_) => {
                (StatusCode::NOT_FOUND, "Cuenta no encontrada".to_string())
            }
            BusinessError::RecipientNotFound(_) => (
                StatusCode::NOT_FOUND,
                "Usuario destinatario no encontrado".to_string(),
            ),
            BusinessError::InsufficientFunds { .. } => {
                (StatusCode::BAD_REQUEST, "Saldo insuficiente".to_string())
            }
            BusinessError::SelfTransfer => (
                StatusCode::BAD_REQUEST,
                "No puedes transferirte a ti mismo".to_string(),
            ),
            BusinessError::UsernameTaken(_) => (
                StatusCode::CONFLICT,
                "El nombre de usuario ya está en uso".to_string(),
            ),
            BusinessError::Hashing | BusinessError::Store(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error interno del servidor".to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }

        let mut body = json!({ "message": message });
        if let BusinessError::InvalidCredentials {
            attempts_remaining: Some(remaining),
        } = &self.0
        {
            body["attemptsRemaining"] = json!(remaining);
        }
        (status, Json(body)).into_response()
    }
}
