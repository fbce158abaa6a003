use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::accounts::{Account, NewAccount};
use crate::auth::dto::{LoginRequest, SignupRequest};
use crate::auth::jwt::JwtKeys;
use crate::auth::password::{hash_password, verify_against_dummy, verify_password};
use crate::errors::{AppError, FieldError};
use crate::store::Store;

pub const MIN_PASSWORD_CHARS: usize = 6;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn validate_signup(req: &SignupRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if !is_valid_email(&req.email) {
        errors.push(FieldError::new("email", "Invalid email"));
    }
    if req.password.chars().count() < MIN_PASSWORD_CHARS {
        errors.push(FieldError::new(
            "password",
            format!("Password must be at least {MIN_PASSWORD_CHARS} characters"),
        ));
    }
    errors
}

fn validate_login(req: &LoginRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if !is_valid_email(&req.email) {
        errors.push(FieldError::new("email", "Invalid email"));
    }
    if req.password.is_empty() {
        errors.push(FieldError::new("password", "Password is required"));
    }
    errors
}

/// Create a free-tier account and issue its first token.
pub async fn register(
    store: &dyn Store,
    keys: &JwtKeys,
    mut req: SignupRequest,
) -> Result<(Account, String), AppError> {
    req.email = normalize_email(&req.email);
    let errors = validate_signup(&req);
    if !errors.is_empty() {
        warn!(fields = errors.len(), "signup rejected by validation");
        return Err(AppError::Validation(errors));
    }

    if store.find_account_by_email(&req.email).await?.is_some() {
        warn!(email = %req.email, "email already registered");
        return Err(AppError::DuplicateEmail);
    }

    let password_hash = hash_password(req.password).await?;
    let name = req
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    // unique index still guards the race between the lookup and this insert
    let account = store
        .create_account(NewAccount {
            email: req.email,
            password_hash,
            name,
        })
        .await?;

    let token = keys.sign(account.id, &account.email)?;
    info!(account_id = %account.id, "account registered");
    Ok((account, token))
}

/// Check credentials and issue a token. Unknown email and wrong password are
/// indistinguishable to the caller.
pub async fn authenticate(
    store: &dyn Store,
    keys: &JwtKeys,
    mut req: LoginRequest,
) -> Result<(Account, String), AppError> {
    req.email = normalize_email(&req.email);
    let errors = validate_login(&req);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let Some(account) = store.find_account_by_email(&req.email).await? else {
        verify_against_dummy(req.password).await;
        warn!("login for unknown email");
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password(req.password, account.password_hash.clone()).await? {
        warn!(account_id = %account.id, "login with wrong password");
        return Err(AppError::InvalidCredentials);
    }

    let token = keys.sign(account.id, &account.email)?;
    info!(account_id = %account.id, "account logged in");
    Ok((account, token))
}

/// Resolve a bearer token to its current account. No side effects.
pub async fn resolve(
    store: &dyn Store,
    keys: &JwtKeys,
    token: Option<&str>,
) -> Result<Account, AppError> {
    let token = token.ok_or(AppError::Unauthenticated)?;
    let claims = keys.verify(token).map_err(|e| {
        warn!(error = %e, "invalid or expired token");
        AppError::Unauthenticated
    })?;

    match store.find_account_by_id(claims.sub).await? {
        Some(account) => Ok(account),
        None => {
            warn!(account_id = %claims.sub, "token for missing account");
            Err(AppError::Unauthenticated)
        }
    }
}
