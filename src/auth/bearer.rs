//! Authorization header parsing
//!
//! Grammar: the first whitespace-separated word is the scheme (matched
//! case-insensitively), everything after it is the credential. Interior runs
//! of whitespace in the credential collapse to single spaces; surrounding
//! whitespace is dropped.

use actix_web::http::header::{self, HeaderMap};

use crate::error::{AppError, AuthError};

/// Extract a bearer token from the Authorization header.
pub fn bearer_token(headers: &HeaderMap) -> Result<String, AppError> {
    extract_credential(headers, "bearer")
}

/// Extract an API key (scheme `ApiKey`) from the Authorization header.
pub fn api_key(headers: &HeaderMap) -> Result<String, AppError> {
    extract_credential(headers, "apikey")
}

fn extract_credential(headers: &HeaderMap, scheme: &str) -> Result<String, AppError> {
    let raw = headers
        .get(header::AUTHORIZATION)
        .ok_or(AppError::Auth(AuthError::MissingToken))?
        .to_str()
        .map_err(|_| AppError::Auth(AuthError::MalformedHeader))?;

    let mut parts = raw.split_whitespace();
    match parts.next() {
        Some(word) if word.eq_ignore_ascii_case(scheme) => (),
        _ => return Err(AppError::Auth(AuthError::MalformedHeader)),
    }

    let credential = parts.collect::<Vec<&str>>().join(" ");
    if credential.is_empty() {
        return Err(AppError::Auth(AuthError::EmptyToken));
    }

    Ok(credential)
}
