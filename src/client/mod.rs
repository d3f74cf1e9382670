//! Project form collector.
//!
//! Holds the state of one project form: the text inputs, the selected AOI
//! with its parsed preview, and the notification produced by a submission.
//! Rendering the preview and the notification is left to the caller.

use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use thiserror::Error;

use crate::models::fields;

pub const SUCCESS_MESSAGE: &str = "Project created successfully";
pub const FAILURE_MESSAGE: &str = "Error creating project. Please try again.";

/// Local failures that prevent a submission from being sent.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to read AOI file {}: {source}", .path.display())]
    ReadAoi {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("failed to build request: {0}")]
    Request(#[from] reqwest::Error),
}

/// Outcome shown to the user after a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

impl Notification {
    pub fn success() -> Self {
        Self {
            severity: Severity::Success,
            message: SUCCESS_MESSAGE.to_string(),
        }
    }

    pub fn failure() -> Self {
        Self {
            severity: Severity::Error,
            message: FAILURE_MESSAGE.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.severity == Severity::Success
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lon: f64,
}

/// Outer ring of the first polygon in an AOI, in map order.
#[derive(Debug, Clone, PartialEq)]
pub struct AoiPreview {
    pub ring: Vec<LatLng>,
}

impl AoiPreview {
    pub fn from_document(document: &Value) -> Option<Self> {
        let polygon = first_polygon(document)?;
        let ring: Vec<LatLng> = polygon
            .get(0)?
            .as_array()?
            .iter()
            .filter_map(|position| {
                // GeoJSON positions are [lon, lat]
                let lon = position.get(0)?.as_f64()?;
                let lat = position.get(1)?.as_f64()?;
                Some(LatLng { lat, lon })
            })
            .collect();

        if ring.is_empty() {
            None
        } else {
            Some(Self { ring })
        }
    }

    /// Center of the ring's bounding box.
    pub fn center(&self) -> LatLng {
        let (mut min_lat, mut max_lat) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_lon, mut max_lon) = (f64::INFINITY, f64::NEG_INFINITY);
        for vertex in &self.ring {
            min_lat = min_lat.min(vertex.lat);
            max_lat = max_lat.max(vertex.lat);
            min_lon = min_lon.min(vertex.lon);
            max_lon = max_lon.max(vertex.lon);
        }
        LatLng {
            lat: (min_lat + max_lat) / 2.0,
            lon: (min_lon + max_lon) / 2.0,
        }
    }
}

/// Coordinates of the first polygon found in a GeoJSON value.
fn first_polygon(value: &Value) -> Option<&Value> {
    match value.get("type")?.as_str()? {
        "Polygon" => value.get("coordinates"),
        "MultiPolygon" => value.get("coordinates")?.get(0),
        "Feature" => first_polygon(value.get("geometry")?),
        "FeatureCollection" => value
            .get("features")?
            .as_array()?
            .iter()
            .find_map(first_polygon),
        "GeometryCollection" => value
            .get("geometries")?
            .as_array()?
            .iter()
            .find_map(first_polygon),
        _ => None,
    }
}

/// A selected AOI file.
#[derive(Debug)]
pub struct AoiSelection {
    pub file_name: String,
    pub bytes: Vec<u8>,
    document: Result<Value, serde_json::Error>,
}

impl AoiSelection {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let document = serde_json::from_slice(&bytes);
        if let Err(e) = &document {
            tracing::warn!(file = %file_name, "AOI file is not valid JSON: {}", e);
        }
        Self {
            file_name,
            bytes,
            document,
        }
    }

    pub fn document(&self) -> Option<&Value> {
        self.document.as_ref().ok()
    }

    pub fn parse_error(&self) -> Option<&serde_json::Error> {
        self.document.as_ref().err()
    }

    pub fn preview(&self) -> Option<AoiPreview> {
        AoiPreview::from_document(self.document()?)
    }
}

/// State of one project form.
#[derive(Debug, Default)]
pub struct ProjectForm {
    pub name: String,
    pub description: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    aoi: Option<AoiSelection>,
}

impl ProjectForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and select an AOI file. A file that is not JSON is still
    /// selected; only an unreadable file is an error.
    pub async fn select_aoi(&mut self, path: impl AsRef<Path>) -> Result<&AoiSelection, ClientError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|source| ClientError::ReadAoi {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "aoi.json".to_string());
        let selection: &AoiSelection = self.aoi.insert(AoiSelection::new(file_name, bytes));
        Ok(selection)
    }

    pub fn set_aoi(&mut self, selection: AoiSelection) {
        self.aoi = Some(selection);
    }

    pub fn aoi(&self) -> Option<&AoiSelection> {
        self.aoi.as_ref()
    }

    pub fn preview(&self) -> Option<AoiPreview> {
        self.aoi.as_ref()?.preview()
    }

    /// Multipart names of required inputs that are absent or empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.is_empty() {
            missing.push(fields::NAME);
        }
        if self.description.is_empty() {
            missing.push(fields::DESCRIPTION);
        }
        if self.start_date.is_none() {
            missing.push(fields::START_DATE);
        }
        if self.end_date.is_none() {
            missing.push(fields::END_DATE);
        }
        if self.aoi.is_none() {
            missing.push(fields::AREA_OF_INTEREST);
        }
        missing
    }

    fn payload(&self) -> Result<Form, ClientError> {
        let missing = self.missing_fields();
        let (Some(start_date), Some(end_date), Some(aoi)) = (self.start_date, self.end_date, &self.aoi)
        else {
            return Err(ClientError::MissingFields(missing));
        };
        if !missing.is_empty() {
            return Err(ClientError::MissingFields(missing));
        }

        let file = Part::bytes(aoi.bytes.clone())
            .file_name(aoi.file_name.clone())
            .mime_str("application/json")?;

        Ok(Form::new()
            .text(fields::NAME, self.name.clone())
            .text(fields::DESCRIPTION, self.description.clone())
            .text(fields::START_DATE, start_date.to_string())
            .text(fields::END_DATE, end_date.to_string())
            .part(fields::AREA_OF_INTEREST, file))
    }
}

/// Sends project forms to the intake service.
#[derive(Debug, Clone)]
pub struct ProjectClient {
    http: reqwest::Client,
    endpoint: String,
}

impl ProjectClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            endpoint: format!("{}/api/projects", base_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Submit the form once. Server and network failures become an error
    /// notification; only an incomplete form is returned as `Err`.
    pub async fn submit(&self, form: &ProjectForm) -> Result<Notification, ClientError> {
        let payload = form.payload()?;

        match self.http.post(&self.endpoint).multipart(payload).send().await {
            Ok(response) if response.status().is_success() => Ok(Notification::success()),
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                tracing::error!(%status, body = %body, "Error creating project");
                Ok(Notification::failure())
            }
            Err(e) => {
                tracing::error!("Error creating project: {}", e);
                Ok(Notification::failure())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn square_feature() -> Value {
        json!({
            "type": "Feature",
            "properties": {},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[17.8, 53.9], [17.9, 53.9], [17.9, 54.0], [17.8, 54.0], [17.8, 53.9]]]
            }
        })
    }

    fn complete_form() -> ProjectForm {
        let mut form = ProjectForm::new();
        form.name = "Coastal survey".to_string();
        form.description = "Dune erosion baseline".to_string();
        form.start_date = NaiveDate::from_ymd_opt(2024, 3, 1);
        form.end_date = NaiveDate::from_ymd_opt(2024, 9, 30);
        form.set_aoi(AoiSelection::new(
            "aoi.json",
            square_feature().to_string().into_bytes(),
        ));
        form
    }

    #[test]
    fn test_preview_swaps_to_lat_lon() {
        let preview = AoiPreview::from_document(&square_feature()).unwrap();
        assert_eq!(preview.ring.len(), 5);
        assert_eq!(preview.ring[0], LatLng { lat: 53.9, lon: 17.8 });

        let center = preview.center();
        assert!((center.lat - 53.95).abs() < 1e-9);
        assert!((center.lon - 17.85).abs() < 1e-9);
    }

    #[test]
    fn test_preview_finds_nested_polygon() {
        let collection = json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {}, "geometry": {"type": "Point", "coordinates": [1, 2]}},
                square_feature()
            ]
        });
        assert!(AoiPreview::from_document(&collection).is_some());

        let multi = json!({
            "type": "MultiPolygon",
            "coordinates": [[[[0, 0], [1, 0], [1, 1], [0, 0]]]]
        });
        assert_eq!(AoiPreview::from_document(&multi).unwrap().ring.len(), 4);
    }

    #[test]
    fn test_preview_absent_without_polygon() {
        assert!(AoiPreview::from_document(&json!({"type": "Point", "coordinates": [30, 10]})).is_none());
        assert!(AoiPreview::from_document(&json!({"type": "Polygon", "coordinates": []})).is_none());
        assert!(AoiPreview::from_document(&json!("Polygon")).is_none());
    }

    #[test]
    fn test_invalid_json_selection_is_kept() {
        let selection = AoiSelection::new("notes.txt", b"not json".to_vec());
        assert!(selection.document().is_none());
        assert!(selection.parse_error().is_some());
        assert!(selection.preview().is_none());

        let mut form = complete_form();
        form.set_aoi(selection);
        assert!(form.missing_fields().is_empty());
        assert!(form.payload().is_ok());
    }

    #[test]
    fn test_missing_fields() {
        let form = ProjectForm::new();
        assert_eq!(
            form.missing_fields(),
            vec!["name", "description", "startDate", "endDate", "areaOfInterest"]
        );

        let mut form = complete_form();
        form.description.clear();
        assert_eq!(form.missing_fields(), vec!["description"]);
        assert!(matches!(
            form.payload(),
            Err(ClientError::MissingFields(missing)) if missing == vec!["description"]
        ));
    }

    #[test]
    fn test_dates_are_not_ordered() {
        let mut form = complete_form();
        form.start_date = NaiveDate::from_ymd_opt(2025, 1, 1);
        form.end_date = NaiveDate::from_ymd_opt(2024, 1, 1);
        assert!(form.missing_fields().is_empty());
    }

    #[tokio::test]
    async fn test_select_aoi_reads_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("field.geojson");
        std::fs::write(&path, square_feature().to_string()).unwrap();

        let mut form = ProjectForm::new();
        let selection = form.select_aoi(&path).await.unwrap();
        assert_eq!(selection.file_name, "field.geojson");
        assert!(form.preview().is_some());
    }

    #[tokio::test]
    async fn test_select_missing_file_fails() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let mut form = ProjectForm::new();

        let err = form
            .select_aoi(temp_dir.path().join("absent.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::ReadAoi { .. }));
        assert!(form.aoi().is_none());
    }

    #[tokio::test]
    async fn test_submit_refuses_incomplete_form() {
        // Nothing listens here; the form must be rejected before any request.
        let client = ProjectClient::new("http://127.0.0.1:9/");
        assert_eq!(client.endpoint(), "http://127.0.0.1:9/api/projects");

        let err = client.submit(&ProjectForm::new()).await.unwrap_err();
        assert!(matches!(err, ClientError::MissingFields(_)));
    }
}
