use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Credits granted to every new account.
pub const SIGNUP_CREDITS: i32 = 3;

/// Billing tier. Only `Free` accounts are metered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Plan {
    Free,
    Pro,
}

impl Plan {
    pub fn as_str(self) -> &'static str {
        match self {
            Plan::Free => "FREE",
            Plan::Pro => "PRO",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "FREE" => Some(Plan::Free),
            "PRO" => Some(Plan::Pro),
            _ => None,
        }
    }
}

/// Raw `users` row.
#[derive(Debug, FromRow)]
pub struct AccountRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub plan: String,
    pub credits_remaining: i32,
    pub created_at: OffsetDateTime,
}

/// Account record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, not exposed in JSON
    pub name: Option<String>,
    pub plan: Plan,
    pub credits_remaining: i32,
    pub created_at: OffsetDateTime,
}

impl Account {
    /// Whether the quota gate lets this account start an analysis.
    pub fn has_quota(&self) -> bool {
        match self.plan {
            Plan::Pro => true,
            Plan::Free => self.credits_remaining > 0,
        }
    }
}

impl TryFrom<AccountRow> for Account {
    type Error = anyhow::Error;

    fn try_from(r: AccountRow) -> Result<Self, Self::Error> {
        let plan = Plan::parse(&r.plan)
            .ok_or_else(|| anyhow::anyhow!("unknown plan '{}' for user {}", r.plan, r.id))?;
        Ok(Self {
            id: r.id,
            email: r.email,
            password_hash: r.password_hash,
            name: r.name,
            plan,
            credits_remaining: r.credits_remaining,
            created_at: r.created_at,
        })
    }
}

/// Input for account creation. Always starts on the free tier.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
}
