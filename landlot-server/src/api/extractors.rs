//! Custom Axum extractors for request authentication.
//!
//! Provides `AdminAuth`, which verifies the `X-Landlot-Admin` header
//! against the argon2 hash of the admin secret.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use landlot_sdk::signature::ADMIN_AUTH_HEADER;

use crate::state::AppState;

/// An Axum extractor that verifies the `X-Landlot-Admin` header carries
/// the plaintext admin secret.
///
/// Implements `FromRequestParts` so it can be combined with `Json<T>`,
/// `Path<T>`, etc.
pub struct AdminAuth;

/// Errors returned by the [`AdminAuth`] extractor.
#[derive(Debug)]
pub enum AdminAuthError {
    MissingHeader,
    InvalidHeader,
    VerificationFailed,
}

impl IntoResponse for AdminAuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AdminAuthError::MissingHeader => {
                (StatusCode::UNAUTHORIZED, "missing X-Landlot-Admin header")
            }
            AdminAuthError::InvalidHeader => {
                (StatusCode::BAD_REQUEST, "invalid X-Landlot-Admin header")
            }
            AdminAuthError::VerificationFailed => {
                (StatusCode::UNAUTHORIZED, "admin secret verification failed")
            }
        };
        (status, message).into_response()
    }
}

impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = AdminAuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        use argon2::{Argon2, PasswordHash, PasswordVerifier};

        let secret = parts
            .headers
            .get(ADMIN_AUTH_HEADER)
            .ok_or(AdminAuthError::MissingHeader)?
            .to_str()
            .map_err(|_| AdminAuthError::InvalidHeader)?;

        let admin = state.config.admin.read().await;
        let parsed_hash = PasswordHash::new(&admin.secret_hash)
            .map_err(|_| AdminAuthError::VerificationFailed)?;

        Argon2::default()
            .verify_password(secret.as_bytes(), &parsed_hash)
            .map_err(|_| AdminAuthError::VerificationFailed)?;

        drop(admin);
        Ok(AdminAuth)
    }
}
