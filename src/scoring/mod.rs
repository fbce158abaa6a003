//! Résumé scoring against a job description, delegated to an external
//! language-model API.
//!
//! The model's reply is untrusted: it is de-fenced, decoded and checked against
//! the expected shape before anything downstream sees it. Nothing is clamped or
//! defaulted.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod openai;
pub mod prompts;

pub use openai::OpenAiScorer;

pub const MAX_SCORE: i64 = 100;
pub const MAX_MISSING_KEYWORDS: usize = 5;
pub const MIN_SUGGESTIONS: usize = 3;
pub const MAX_SUGGESTIONS: usize = 4;

#[derive(Debug, Error)]
pub enum ScoringError {
    /// Transport failure, timeout, rate limit or any non-success reply.
    #[error("scorer unavailable: {0}")]
    Unavailable(String),

    /// The reply did not decode into a valid score object.
    #[error("malformed score response: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub score: i32,
    pub missing_keywords: Vec<String>,
    pub suggestions: Vec<String>,
}

#[async_trait]
pub trait Scorer: Send + Sync {
    /// One external call per invocation; no retries.
    async fn score(&self, resume_text: &str, job_description: &str)
        -> Result<ScoreResult, ScoringError>;
}

#[derive(Debug, Deserialize)]
struct RawScore {
    score: i64,
    #[serde(rename = "missingKeywords", alias = "missing_keywords")]
    missing_keywords: Vec<String>,
    suggestions: Vec<String>,
}

/// Decode a raw model reply into a validated [`ScoreResult`].
pub fn parse_score_reply(raw: &str) -> Result<ScoreResult, ScoringError> {
    let cleaned = strip_json_fences(raw);
    if cleaned.is_empty() {
        return Err(ScoringError::Malformed("empty reply".into()));
    }

    let parsed: RawScore =
        serde_json::from_str(cleaned).map_err(|e| ScoringError::Malformed(e.to_string()))?;

    if !(0..=MAX_SCORE).contains(&parsed.score) {
        return Err(ScoringError::Malformed(format!(
            "score {} outside 0..={MAX_SCORE}",
            parsed.score
        )));
    }
    if parsed.missing_keywords.len() > MAX_MISSING_KEYWORDS {
        return Err(ScoringError::Malformed(format!(
            "{} missing keywords, at most {MAX_MISSING_KEYWORDS} allowed",
            parsed.missing_keywords.len()
        )));
    }
    if !(MIN_SUGGESTIONS..=MAX_SUGGESTIONS).contains(&parsed.suggestions.len()) {
        return Err(ScoringError::Malformed(format!(
            "{} suggestions, expected {MIN_SUGGESTIONS}..={MAX_SUGGESTIONS}",
            parsed.suggestions.len()
        )));
    }

    Ok(ScoreResult {
        score: parsed.score as i32,
        missing_keywords: parsed.missing_keywords,
        suggestions: parsed.suggestions,
    })
}

/// Strips ```json ... ``` or ``` ... ``` fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```JSON"))
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(rest) => rest
            .trim_start()
            .strip_suffix("```")
            .unwrap_or(rest)
            .trim(),
        None => text,
    }
}
