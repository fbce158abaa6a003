use anyhow::Context;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::accounts::{repo as accounts_repo, Account, Plan};
use crate::analysis::repo_types::{AnalysisRecord, CommittedAnalysis, NewAnalysis};
use crate::store::StoreError;

/// Insert an analysis row within a transaction.
pub async fn insert_analysis_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    new: &NewAnalysis,
) -> anyhow::Result<AnalysisRecord> {
    let record = sqlx::query_as::<_, AnalysisRecord>(
        r#"
        INSERT INTO analyses (id, user_id, resume_text, job_description, score, missing_keywords, suggestions)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, user_id, resume_text, job_description, score, missing_keywords, suggestions, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(&new.resume_text)
    .bind(&new.job_description)
    .bind(new.score)
    .bind(&new.missing_keywords)
    .bind(&new.suggestions)
    .fetch_one(&mut **tx)
    .await
    .context("insert analysis")?;
    Ok(record)
}

/// Persist the analysis and charge the account in one transaction.
///
/// The insert runs first, then the conditional decrement for free-tier accounts.
/// If the decrement matches nothing and the account is still free-tier, the
/// transaction is rolled back and `QuotaExhausted` is returned, so a record
/// never exists without its charge.
pub async fn commit_analysis(
    db: &PgPool,
    account: &Account,
    new: &NewAnalysis,
) -> Result<CommittedAnalysis, StoreError> {
    let mut tx = db.begin().await.context("begin tx")?;

    let record = insert_analysis_tx(&mut tx, account.id, new).await?;

    let credits_remaining = match account.plan {
        Plan::Pro => None,
        Plan::Free => match accounts_repo::decrement_credits_tx(&mut tx, account.id).await? {
            Some(left) => Some(left),
            None => {
                // upgraded since the gate: nothing to charge
                if accounts_repo::plan_tx(&mut tx, account.id).await? != Some(Plan::Pro) {
                    tx.rollback().await.context("rollback tx")?;
                    return Err(StoreError::QuotaExhausted);
                }
                None
            }
        },
    };

    tx.commit().await.context("commit tx")?;

    Ok(CommittedAnalysis {
        record,
        credits_remaining,
    })
}
