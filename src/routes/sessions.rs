use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::SessionManager;
use crate::error::AppError;
use crate::routes::users::UserResponse;
use crate::validators::is_valid_email;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Requested access-token lifetime. Clamped to the configured ceiling;
    /// absent or non-positive values fall back to the ceiling.
    pub expires_in_seconds: Option<i64>,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserResponse,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Exchanges credentials for an access token and a refresh token.
///
/// A syntactically invalid email is a `400`; a well-formed email with no
/// matching account, or a wrong password, is a `401` whose body does not say
/// which of the two it was.
pub async fn login(
    form: web::Json<LoginRequest>,
    sessions: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    let email = is_valid_email(&form.email)?;

    let outcome = sessions
        .login(&email, &form.password, form.expires_in_seconds)
        .await?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        access_token: outcome.access_token,
        refresh_token: outcome.refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: outcome.expires_in,
        user: UserResponse::from(&outcome.user),
    }))
}

/// Mints a fresh access token from the refresh token in the
/// `Authorization` header. The refresh token itself is not rotated.
pub async fn refresh(
    req: HttpRequest,
    sessions: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    let refreshed = sessions.refresh(req.headers()).await?;

    Ok(HttpResponse::Ok().json(RefreshResponse {
        access_token: refreshed.access_token,
        token_type: "Bearer".to_string(),
        expires_in: refreshed.expires_in,
    }))
}

/// Revokes the refresh token in the `Authorization` header. Responds `204`
/// whether or not the token was known.
pub async fn revoke(
    req: HttpRequest,
    sessions: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    sessions.revoke(req.headers()).await?;

    Ok(HttpResponse::NoContent().finish())
}
