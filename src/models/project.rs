//! Project submission model.

use axum::body::Bytes;

/// Multipart field names of a project submission.
pub mod fields {
    pub const NAME: &str = "name";
    pub const DESCRIPTION: &str = "description";
    pub const START_DATE: &str = "startDate";
    pub const END_DATE: &str = "endDate";
    pub const AREA_OF_INTEREST: &str = "areaOfInterest";
}

/// The uploaded area of interest file.
#[derive(Debug, Clone)]
pub struct AoiUpload {
    pub file_name: String,
    pub bytes: Bytes,
}

/// A project submission as received. Text fields are carried verbatim and
/// are never validated server side.
#[derive(Debug, Clone, Default)]
pub struct ProjectSubmission {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub area_of_interest: Option<AoiUpload>,
}

impl ProjectSubmission {
    /// Store a text field. Unknown names are ignored.
    pub fn set_text(&mut self, name: &str, value: String) {
        match name {
            fields::NAME => self.name = Some(value),
            fields::DESCRIPTION => self.description = Some(value),
            fields::START_DATE => self.start_date = Some(value),
            fields::END_DATE => self.end_date = Some(value),
            _ => tracing::debug!(field = name, "Ignoring unknown form field"),
        }
    }
}
