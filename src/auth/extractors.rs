use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use crate::accounts::Account;
use crate::auth::{jwt::JwtKeys, services};
use crate::errors::AppError;
use crate::state::AppState;

/// Resolves the bearer token to the caller's current account.
pub struct AuthAccount(pub Account);

#[async_trait]
impl FromRequestParts<AppState> for AuthAccount {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let account = services::resolve(state.store.as_ref(), &keys, bearer_token(&parts.headers))
            .await?;
        Ok(AuthAccount(account))
    }
}

/// Token from `Authorization: Bearer <token>`.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let auth = headers.get(AUTHORIZATION)?.to_str().ok()?;
    auth.strip_prefix("Bearer ")
        .or_else(|| auth.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
