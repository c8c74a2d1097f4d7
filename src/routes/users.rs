use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::hash_password;
use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::store::{Storage, User};
use crate::validators::{is_valid_email, validate_password};

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub email: String,
    pub password: String,
}

/// Public view of a user account. The password hash never leaves the store
/// layer.
#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub created_at: String,
    pub updated_at: String,
    pub email: String,
    pub is_premium: bool,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
            email: user.email.clone(),
            is_premium: user.is_premium,
        }
    }
}

/// Registers a new account.
///
/// Responds `201 Created` with the stored user. Registration never issues
/// tokens; the client logs in afterwards. A duplicate email yields `409`.
pub async fn create_user(
    form: web::Json<CreateUserRequest>,
    storage: web::Data<Storage>,
) -> Result<HttpResponse, AppError> {
    let email = is_valid_email(&form.email)?;
    validate_password(&form.password)?;
    let hashed_password = hash_password(&form.password)?;

    let user = storage.users.create_user(&email, &hashed_password).await?;

    tracing::info!(user_id = %user.id, "user registered");

    Ok(HttpResponse::Created().json(UserResponse::from(&user)))
}

/// Replaces the caller's email and password. Requires a valid access token.
pub async fn update_user(
    user: web::ReqData<AuthenticatedUser>,
    form: web::Json<UpdateUserRequest>,
    storage: web::Data<Storage>,
) -> Result<HttpResponse, AppError> {
    let user_id = user.into_inner().0;

    let email = is_valid_email(&form.email)?;
    validate_password(&form.password)?;
    let hashed_password = hash_password(&form.password)?;

    let updated = storage
        .users
        .update_user(user_id, &email, &hashed_password)
        .await?
        .ok_or_else(|| AppError::NotFound("user".to_string()))?;

    tracing::info!(user_id = %updated.id, "user credentials updated");

    Ok(HttpResponse::Ok().json(UserResponse::from(&updated)))
}
