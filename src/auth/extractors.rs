use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::warn;
use uuid::Uuid;

use super::jwt::JwtKeys;
use crate::error::AppError;

pub const MISSING_TOKEN: &str = "Token não fornecido";
pub const MALFORMED_TOKEN: &str = "Formato de token inválido";
pub const INVALID_TOKEN: &str = "Token inválido ou expirado";

/// Extracts and validates the bearer JWT, yielding the caller's identity.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

/// Pulls the token out of `Authorization: Bearer <token>`.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let auth = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::unauthorized(MISSING_TOKEN))?
        .to_str()
        .map_err(|_| AppError::unauthorized(MALFORMED_TOKEN))?;

    let mut parts = auth.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(AppError::unauthorized(MALFORMED_TOKEN)),
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;

        let keys = JwtKeys::from_ref(state);
        match keys.verify(token) {
            Ok(identity) => Ok(AuthUser {
                id: identity.user_id,
                email: identity.email,
            }),
            Err(e) => {
                warn!(error = %e, "invalid or expired token");
                Err(AppError::unauthorized(INVALID_TOKEN))
            }
        }
    }
}
