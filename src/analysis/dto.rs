use bytes::Bytes;
use serde::Serialize;
use uuid::Uuid;

use crate::documents::DocumentKind;

/// Value reported as `creditsRemaining` for unmetered (Pro) accounts.
pub const UNMETERED_CREDITS: i32 = 999;

/// A résumé upload that already passed the type and size checks.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub kind: DocumentKind,
    pub bytes: Bytes,
    pub file_name: Option<String>,
}

#[derive(Debug, Default)]
pub struct AnalyzeInput {
    pub file: Option<UploadedFile>,
    pub job_description: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub id: Uuid,
    pub score: i32,
    pub missing_keywords: Vec<String>,
    pub suggestions: Vec<String>,
    pub credits_remaining: i32,
}
