//! Project API endpoints.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
};

use super::{ApiResult, MessageResponse};
use crate::aoi::{validate_upload, HintPolicy};
use crate::errors::{messages, AppError};
use crate::models::{fields, AoiUpload, ProjectSubmission};
use crate::AppState;

pub const PROJECT_CREATED: &str = "Project created successfully";

/// POST /api/projects - Validate the AOI of a new project.
///
/// Nothing is persisted; a 200 only acknowledges that the AOI is valid.
pub async fn create_project(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult {
    let mut multipart = multipart.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let submission = read_submission(&mut multipart).await?;

    let Some(aoi) = submission.area_of_interest.as_ref() else {
        tracing::info!("Project submission without an AOI file");
        return Err(AppError::BadRequest(messages::MISSING_AOI.to_string()));
    };

    let policy = HintPolicy::from_strict(state.config.reject_advisory_hints);
    validate_upload(state.storage.clone(), &aoi.bytes, policy).await?;

    tracing::info!(
        name = ?submission.name,
        start_date = ?submission.start_date,
        end_date = ?submission.end_date,
        file_name = %aoi.file_name,
        size = aoi.bytes.len(),
        "Project created"
    );
    Ok(MessageResponse::new(PROJECT_CREATED))
}

/// Collect the multipart fields of a submission.
async fn read_submission(multipart: &mut Multipart) -> Result<ProjectSubmission, AppError> {
    let mut submission = ProjectSubmission::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();

        if name == fields::AREA_OF_INTEREST {
            if submission.area_of_interest.is_some() {
                return Err(AppError::BadRequest(messages::DUPLICATE_AOI.to_string()));
            }
            // A plain text part under the AOI name is not an upload.
            let Some(file_name) = field.file_name().map(str::to_string) else {
                return Err(AppError::BadRequest(messages::MISSING_AOI.to_string()));
            };
            let bytes = field.bytes().await.map_err(multipart_error)?;
            submission.area_of_interest = Some(AoiUpload { file_name, bytes });
        } else if field.file_name().is_some() {
            return Err(AppError::BadRequest(format!(
                "Unexpected file field: {}",
                name
            )));
        } else {
            let value = field.text().await.map_err(multipart_error)?;
            submission.set_text(&name, value);
        }
    }

    Ok(submission)
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::BadRequest(format!("Failed to parse multipart data: {}", err))
    }
}
