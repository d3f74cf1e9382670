//! AOI upload validation pipeline.
//!
//! An upload is persisted to transient storage, read back, parsed and hinted,
//! in that order. The transient file is released on every outcome and a
//! failed release never changes the outcome.

use std::sync::Arc;

use serde_json::Value;

use crate::errors::AppError;
use crate::geojson::{self, Hint};
use crate::storage::{TransientFile, TransientStorage};

/// Which hints reject an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintPolicy {
    /// Any hint rejects the upload.
    RejectAll,
    /// Only error-level hints reject the upload.
    RejectErrors,
}

impl HintPolicy {
    pub fn from_strict(reject_advisory_hints: bool) -> Self {
        if reject_advisory_hints {
            HintPolicy::RejectAll
        } else {
            HintPolicy::RejectErrors
        }
    }

    /// Hints that cause rejection under this policy, in document order.
    pub fn blocking(&self, hints: Vec<Hint>) -> Vec<Hint> {
        match self {
            HintPolicy::RejectAll => hints,
            HintPolicy::RejectErrors => hints.into_iter().filter(Hint::is_error).collect(),
        }
    }
}

/// Validate an uploaded AOI through transient storage.
pub async fn validate_upload(
    storage: Arc<dyn TransientStorage>,
    bytes: &[u8],
    policy: HintPolicy,
) -> Result<(), AppError> {
    let file = TransientFile::create(storage, bytes).await.map_err(|e| {
        tracing::error!("Error storing the AOI file: {}", e);
        AppError::Storage(e)
    })?;

    let outcome = inspect(&file, policy).await;
    file.release().await;
    outcome
}

async fn inspect(file: &TransientFile, policy: HintPolicy) -> Result<(), AppError> {
    let text = file.read_text().await.map_err(|e| {
        tracing::error!(path = %file.path().display(), "Error reading the file: {}", e);
        AppError::Operational(e)
    })?;

    let document: Value = serde_json::from_str(&text).map_err(|e| {
        tracing::warn!("Error parsing the file: {}", e);
        AppError::Format(e)
    })?;

    let hints = policy.blocking(geojson::hint(&document));
    if hints.is_empty() {
        Ok(())
    } else {
        tracing::info!(defects = hints.len(), "AOI rejected by GeoJSON hinting");
        Err(AppError::Semantic(hints))
    }
}
