use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::documents::ExtractError;
use crate::scoring::ScoringError;
use crate::store::StoreError;

/// One rejected request field, reported in the `errors` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Request-level error. Handlers return `Result<T, AppError>`; the response
/// carries a stable code and a generic message, never the underlying cause.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed: {0:?}")]
    Validation(Vec<FieldError>),

    #[error("email already registered")]
    DuplicateEmail,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("unauthenticated")]
    Unauthenticated,

    #[error("resume file missing")]
    MissingFile,

    #[error("job description missing")]
    MissingJobDescription,

    #[error("job description too short")]
    JobDescriptionTooShort,

    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("file too large")]
    FileTooLarge,

    #[error("no credits remaining")]
    QuotaExhausted,

    #[error("extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("no text extracted")]
    NoTextExtracted,

    #[error("scoring unavailable: {0}")]
    ScoringUnavailable(String),

    #[error("malformed score response: {0}")]
    MalformedScoreResponse(String),

    #[error("route not found")]
    NotFound,

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::DuplicateEmail
            | AppError::MissingFile
            | AppError::MissingJobDescription
            | AppError::JobDescriptionTooShort
            | AppError::UnsupportedFileType(_)
            | AppError::ExtractionFailed(_)
            | AppError::NoTextExtracted => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::FileTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::QuotaExhausted => StatusCode::FORBIDDEN,
            AppError::ScoringUnavailable(_) => StatusCode::BAD_GATEWAY,
            AppError::MalformedScoreResponse(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::DuplicateEmail => "DUPLICATE_EMAIL",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::Unauthenticated => "UNAUTHENTICATED",
            AppError::MissingFile => "MISSING_FILE",
            AppError::MissingJobDescription => "MISSING_JOB_DESCRIPTION",
            AppError::JobDescriptionTooShort => "JOB_DESCRIPTION_TOO_SHORT",
            AppError::UnsupportedFileType(_) => "UNSUPPORTED_FILE_TYPE",
            AppError::FileTooLarge => "FILE_TOO_LARGE",
            AppError::QuotaExhausted => "QUOTA_EXHAUSTED",
            AppError::ExtractionFailed(_) => "EXTRACTION_FAILED",
            AppError::NoTextExtracted => "NO_TEXT_EXTRACTED",
            AppError::ScoringUnavailable(_) => "SCORING_UNAVAILABLE",
            AppError::MalformedScoreResponse(_) => "MALFORMED_SCORE_RESPONSE",
            AppError::NotFound => "NOT_FOUND",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn public_message(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "Invalid request",
            AppError::DuplicateEmail => "Email already registered",
            AppError::InvalidCredentials => "Invalid credentials",
            AppError::Unauthenticated => "Authentication required",
            AppError::MissingFile => "Resume file required",
            AppError::MissingJobDescription => "Job description required",
            AppError::JobDescriptionTooShort => "Job description too short (min 50 characters)",
            AppError::UnsupportedFileType(_) => "Invalid file type. Upload a PDF or DOCX file",
            AppError::FileTooLarge => "File too large (max 5 MB)",
            AppError::QuotaExhausted => "No credits remaining. Please upgrade to Pro.",
            AppError::ExtractionFailed(_) => "Could not read the uploaded file",
            AppError::NoTextExtracted => "Could not extract text from file",
            AppError::ScoringUnavailable(_) => "Analysis service unavailable",
            AppError::MalformedScoreResponse(_) => "Analysis failed",
            AppError::NotFound => "Route not found",
            AppError::Internal(_) => "An internal server error occurred",
        }
    }
}

impl From<ExtractError> for AppError {
    fn from(e: ExtractError) -> Self {
        AppError::ExtractionFailed(e.to_string())
    }
}

impl From<ScoringError> for AppError {
    fn from(e: ScoringError) -> Self {
        match e {
            ScoringError::Unavailable(msg) => AppError::ScoringUnavailable(msg),
            ScoringError::Malformed(msg) => AppError::MalformedScoreResponse(msg),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail => AppError::DuplicateEmail,
            StoreError::QuotaExhausted => AppError::QuotaExhausted,
            StoreError::Database(e) => AppError::Internal(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Internal(e) => tracing::error!(error = ?e, "internal error"),
            AppError::ScoringUnavailable(_) | AppError::MalformedScoreResponse(_) => {
                tracing::error!(error = %self, "scoring failed")
            }
            AppError::ExtractionFailed(_) => tracing::warn!(error = %self, "extraction failed"),
            _ => {}
        }

        let mut body = json!({
            "success": false,
            "code": self.code(),
            "error": self.public_message(),
        });
        if let AppError::Validation(errors) = &self {
            body["errors"] = json!(errors);
        }

        (status, Json(body)).into_response()
    }
}
