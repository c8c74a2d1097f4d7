use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::api_key;
use crate::configuration::Settings;
use crate::error::{AppError, AuthError, ValidationError};
use crate::store::Storage;

const USER_UPGRADED_EVENT: &str = "user.upgraded";

#[derive(Deserialize)]
pub struct PaymentEvent {
    pub event: String,
    pub data: PaymentEventData,
}

#[derive(Deserialize)]
pub struct PaymentEventData {
    pub user_id: String,
}

/// Receives payment-provider callbacks. The provider authenticates with an
/// `Authorization: ApiKey <key>` header; events other than `user.upgraded`
/// are acknowledged and dropped.
pub async fn payment_webhook(
    req: HttpRequest,
    payload: web::Json<PaymentEvent>,
    storage: web::Data<Storage>,
    settings: web::Data<Settings>,
) -> Result<HttpResponse, AppError> {
    let key = api_key(req.headers())?;
    if key != settings.payments.webhook_key {
        tracing::warn!("payment webhook presented a wrong API key");
        return Err(AuthError::InvalidToken.into());
    }

    if payload.event != USER_UPGRADED_EVENT {
        tracing::debug!(event = %payload.event, "ignoring unhandled payment event");
        return Ok(HttpResponse::NoContent().finish());
    }

    let user_id = Uuid::parse_str(&payload.data.user_id)
        .map_err(|_| ValidationError::InvalidFormat("user_id".to_string()))?;

    let upgraded = storage.users.set_premium(user_id).await?;
    if !upgraded {
        return Err(AppError::NotFound("user".to_string()));
    }

    tracing::info!(user_id = %user_id, "user upgraded to premium");

    Ok(HttpResponse::NoContent().finish())
}
