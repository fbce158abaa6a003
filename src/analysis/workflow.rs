use tracing::{debug, info, warn};

use crate::accounts::Account;
use crate::analysis::dto::{AnalyzeInput, AnalyzeResponse, UNMETERED_CREDITS};
use crate::analysis::repo_types::NewAnalysis;
use crate::errors::AppError;
use crate::state::AppState;

/// Shortest accepted job description, counted in characters after trimming.
pub const MIN_JOB_DESCRIPTION_CHARS: usize = 50;

/// Validate, gate on quota, extract, score, then persist and charge in one step.
///
/// Nothing is persisted or charged unless every earlier step succeeded.
pub async fn run_analysis(
    state: &AppState,
    account: &Account,
    input: AnalyzeInput,
) -> Result<AnalyzeResponse, AppError> {
    let file = input.file.ok_or(AppError::MissingFile)?;
    // stored as submitted; only the checks see the trimmed form
    let job_description = input
        .job_description
        .filter(|j| !j.trim().is_empty())
        .ok_or(AppError::MissingJobDescription)?;
    if job_description.trim().chars().count() < MIN_JOB_DESCRIPTION_CHARS {
        return Err(AppError::JobDescriptionTooShort);
    }

    if !account.has_quota() {
        warn!(account_id = %account.id, "analysis refused: no credits");
        return Err(AppError::QuotaExhausted);
    }

    debug!(kind = ?file.kind, size = file.bytes.len(), file_name = ?file.file_name, "extracting résumé text");
    let resume_text = state.extractor.extract(file.bytes, file.kind).await?;
    if resume_text.trim().is_empty() {
        return Err(AppError::NoTextExtracted);
    }

    let scored = state.scorer.score(&resume_text, &job_description).await?;
    debug!(score = scored.score, "résumé scored");

    let committed = state
        .store
        .commit_analysis(
            account,
            NewAnalysis {
                resume_text,
                job_description,
                score: scored.score,
                missing_keywords: scored.missing_keywords,
                suggestions: scored.suggestions,
            },
        )
        .await?;

    info!(
        account_id = %account.id,
        analysis_id = %committed.record.id,
        credits_remaining = ?committed.credits_remaining,
        "analysis stored"
    );

    let record = committed.record;
    Ok(AnalyzeResponse {
        id: record.id,
        score: record.score,
        missing_keywords: record.missing_keywords,
        suggestions: record.suggestions,
        credits_remaining: committed.credits_remaining.unwrap_or(UNMETERED_CREDITS),
    })
}
