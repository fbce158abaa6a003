use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::accounts::{Account, Plan};

/// Request body for signup. Missing fields deserialize empty and fail validation.
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

/// Request body for login.
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Returned after signup or login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: AccountSummary,
}

/// Public part of the account returned to the client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub plan: Plan,
    pub credits_remaining: i32,
}

impl From<&Account> for AccountSummary {
    fn from(a: &Account) -> Self {
        Self {
            id: a.id,
            email: a.email.clone(),
            name: a.name.clone(),
            plan: a.plan,
            credits_remaining: a.credits_remaining,
        }
    }
}
