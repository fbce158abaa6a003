use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    routing::post,
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{AccountSummary, AuthResponse, LoginRequest, SignupRequest},
        jwt::JwtKeys,
        services,
    },
    errors::{AppError, FieldError},
    response::ApiResponse,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
}

fn body_error(rejection: JsonRejection) -> AppError {
    AppError::Validation(vec![FieldError::new("body", rejection.body_text())])
}

#[instrument(skip_all)]
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<ApiResponse<AuthResponse>, AppError> {
    let Json(payload) = payload.map_err(body_error)?;
    let keys = JwtKeys::from_ref(&state);
    let (account, token) = services::register(state.store.as_ref(), &keys, payload).await?;
    Ok(ApiResponse::ok(AuthResponse {
        token,
        user: AccountSummary::from(&account),
    }))
}

#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<ApiResponse<AuthResponse>, AppError> {
    let Json(payload) = payload.map_err(body_error)?;
    let keys = JwtKeys::from_ref(&state);
    let (account, token) = services::authenticate(state.store.as_ref(), &keys, payload).await?;
    Ok(ApiResponse::ok(AuthResponse {
        token,
        user: AccountSummary::from(&account),
    }))
}
