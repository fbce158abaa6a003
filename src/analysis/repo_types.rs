use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Persisted result of scoring one résumé against one job description.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AnalysisRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub resume_text: String,
    pub job_description: String,
    pub score: i32,
    pub missing_keywords: Vec<String>,
    pub suggestions: Vec<String>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewAnalysis {
    pub resume_text: String,
    pub job_description: String,
    pub score: i32,
    pub missing_keywords: Vec<String>,
    pub suggestions: Vec<String>,
}

/// Outcome of the atomic persist-and-charge step.
#[derive(Debug, Clone)]
pub struct CommittedAnalysis {
    pub record: AnalysisRecord,
    /// Balance after the charge; `None` for unmetered accounts.
    pub credits_remaining: Option<i32>,
}
