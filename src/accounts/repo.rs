use anyhow::Context;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::accounts::repo_types::{Account, AccountRow, NewAccount, Plan, SIGNUP_CREDITS};
use crate::store::StoreError;

/// Find an account by id.
pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Account>> {
    let row = sqlx::query_as::<_, AccountRow>(
        r#"
        SELECT id, email, password_hash, name, plan, credits_remaining, created_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
    .context("find user by id")?;
    row.map(Account::try_from).transpose()
}

/// Find an account by (normalised) email.
pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<Account>> {
    let row = sqlx::query_as::<_, AccountRow>(
        r#"
        SELECT id, email, password_hash, name, plan, credits_remaining, created_at
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(db)
    .await
    .context("find user by email")?;
    row.map(Account::try_from).transpose()
}

/// Create a free-tier account. A unique violation on `email` maps to `DuplicateEmail`.
pub async fn create(db: &PgPool, new: &NewAccount) -> Result<Account, StoreError> {
    let res = sqlx::query_as::<_, AccountRow>(
        r#"
        INSERT INTO users (email, password_hash, name, plan, credits_remaining)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, email, password_hash, name, plan, credits_remaining, created_at
        "#,
    )
    .bind(&new.email)
    .bind(&new.password_hash)
    .bind(&new.name)
    .bind(Plan::Free.as_str())
    .bind(SIGNUP_CREDITS)
    .fetch_one(db)
    .await;

    match res {
        Ok(row) => Ok(Account::try_from(row)?),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(StoreError::DuplicateEmail),
        Err(e) => Err(StoreError::Database(anyhow::Error::new(e).context("insert user"))),
    }
}

/// Take one credit from a free-tier account, only if one is left.
/// Returns the new balance, or `None` when no row matched (no credit left).
pub async fn decrement_credits_tx(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> anyhow::Result<Option<i32>> {
    let remaining = sqlx::query_scalar::<_, i32>(
        r#"
        UPDATE users
           SET credits_remaining = credits_remaining - 1
         WHERE id = $1
           AND plan = 'FREE'
           AND credits_remaining > 0
        RETURNING credits_remaining
        "#,
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await
    .context("decrement credits")?;
    Ok(remaining)
}

/// Current plan of an account, read inside the caller's transaction.
pub async fn plan_tx(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> anyhow::Result<Option<Plan>> {
    let plan = sqlx::query_scalar::<_, String>("SELECT plan FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .context("read plan")?;
    plan.map(|p| {
        Plan::parse(&p).ok_or_else(|| anyhow::anyhow!("unknown plan '{p}' for user {id}"))
    })
    .transpose()
}
