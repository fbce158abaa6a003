use axum::{
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart, State,
    },
    http::StatusCode,
    routing::post,
    Router,
};
use bytes::BytesMut;
use tracing::{instrument, warn};

use crate::{
    analysis::{
        dto::{AnalyzeInput, AnalyzeResponse, UploadedFile},
        workflow,
    },
    auth::extractors::AuthAccount,
    documents::DocumentKind,
    errors::{AppError, FieldError},
    response::ApiResponse,
    state::AppState,
};

/// Largest accepted résumé upload.
pub const MAX_RESUME_BYTES: usize = 5 * 1024 * 1024;
// room for the job description and multipart framing
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn analysis_routes() -> Router<AppState> {
    Router::new()
        .route("/analyze", post(analyze))
        .layer(DefaultBodyLimit::max(MAX_RESUME_BYTES + MULTIPART_OVERHEAD))
}

#[instrument(skip_all, fields(user_id = %account.0.id))]
pub async fn analyze(
    State(state): State<AppState>,
    account: AuthAccount,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<ApiResponse<AnalyzeResponse>, AppError> {
    let multipart = multipart.map_err(|rejection| {
        warn!(error = %rejection, "analyze without a multipart body");
        AppError::MissingFile
    })?;
    let input = read_form(multipart).await?;
    let out = workflow::run_analysis(&state, &account.0, input).await?;
    Ok(ApiResponse::ok(out))
}

async fn read_form(mut multipart: Multipart) -> Result<AnalyzeInput, AppError> {
    let mut input = AnalyzeInput::default();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("resume") => input.file = Some(read_resume(field).await?),
            Some("jobDescription") => {
                input.job_description = Some(field.text().await.map_err(multipart_error)?)
            }
            _ => {}
        }
    }
    Ok(input)
}

async fn read_resume(mut field: Field<'_>) -> Result<UploadedFile, AppError> {
    let content_type = field.content_type().unwrap_or_default().to_string();
    let kind = DocumentKind::from_mime(&content_type)
        .ok_or_else(|| AppError::UnsupportedFileType(content_type.clone()))?;
    let file_name = field.file_name().map(str::to_string);

    let mut buf = BytesMut::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if buf.len() + chunk.len() > MAX_RESUME_BYTES {
            return Err(AppError::FileTooLarge);
        }
        buf.extend_from_slice(&chunk);
    }

    Ok(UploadedFile {
        kind,
        bytes: buf.freeze(),
        file_name,
    })
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::FileTooLarge;
    }
    AppError::Validation(vec![FieldError::new("body", err.body_text())])
}
