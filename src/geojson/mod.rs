//! Structural GeoJSON hinting.
//!
//! Walks a parsed JSON value and reports every structural defect it finds
//! instead of stopping at the first one. Each hint carries a JSON Pointer to
//! the offending member so callers can locate it in the uploaded document.

mod geometry;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Severity of a hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HintLevel {
    /// The document violates GeoJSON structure.
    Error,
    /// The document is usable but deviates from a recommendation.
    Message,
}

/// A single structural defect found in a GeoJSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hint {
    pub message: String,
    pub level: HintLevel,
    /// JSON Pointer to the member the hint refers to ("" is the root).
    pub path: String,
}

impl Hint {
    pub fn is_error(&self) -> bool {
        self.level == HintLevel::Error
    }
}

/// GeoJSON object types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoJsonType {
    Point,
    MultiPoint,
    LineString,
    MultiLineString,
    Polygon,
    MultiPolygon,
    GeometryCollection,
    Feature,
    FeatureCollection,
}

impl GeoJsonType {
    pub const ALL: [GeoJsonType; 9] = [
        GeoJsonType::Point,
        GeoJsonType::MultiPoint,
        GeoJsonType::LineString,
        GeoJsonType::MultiLineString,
        GeoJsonType::Polygon,
        GeoJsonType::MultiPolygon,
        GeoJsonType::GeometryCollection,
        GeoJsonType::Feature,
        GeoJsonType::FeatureCollection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GeoJsonType::Point => "Point",
            GeoJsonType::MultiPoint => "MultiPoint",
            GeoJsonType::LineString => "LineString",
            GeoJsonType::MultiLineString => "MultiLineString",
            GeoJsonType::Polygon => "Polygon",
            GeoJsonType::MultiPolygon => "MultiPolygon",
            GeoJsonType::GeometryCollection => "GeometryCollection",
            GeoJsonType::Feature => "Feature",
            GeoJsonType::FeatureCollection => "FeatureCollection",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    pub fn is_geometry(&self) -> bool {
        !matches!(self, GeoJsonType::Feature | GeoJsonType::FeatureCollection)
    }
}

/// Hint a parsed JSON value against GeoJSON structure rules.
///
/// Returns hints in document order. An empty list means the value is a
/// structurally valid GeoJSON object.
pub fn hint(value: &Value) -> Vec<Hint> {
    let mut hinter = Hinter::default();
    hinter.root(value);
    hinter.hints
}

#[derive(Default)]
struct Hinter {
    hints: Vec<Hint>,
}

fn member(path: &str, name: &str) -> String {
    format!("{}/{}", path, name)
}

fn index(path: &str, i: usize) -> String {
    format!("{}/{}", path, i)
}

impl Hinter {
    fn error(&mut self, path: &str, message: impl Into<String>) {
        self.push(path, message, HintLevel::Error);
    }

    fn advise(&mut self, path: &str, message: impl Into<String>) {
        self.push(path, message, HintLevel::Message);
    }

    fn push(&mut self, path: &str, message: impl Into<String>, level: HintLevel) {
        self.hints.push(Hint {
            message: message.into(),
            level,
            path: path.to_string(),
        });
    }

    fn root(&mut self, value: &Value) {
        let Some(object) = value.as_object() else {
            self.error("", "The root of a GeoJSON object must be an object.");
            return;
        };

        if let Some(kind) = self.type_member(object, "") {
            self.object(kind, object, "");
        }
    }

    /// Resolve the `type` member, reporting a missing, non-string or unknown type.
    fn type_member(&mut self, object: &Map<String, Value>, path: &str) -> Option<GeoJsonType> {
        let Some(value) = object.get("type") else {
            self.error(path, "\"type\" member required");
            return None;
        };
        let type_path = member(path, "type");
        let Some(name) = value.as_str() else {
            self.error(&type_path, "\"type\" member must be a string");
            return None;
        };

        if let Some(kind) = GeoJsonType::from_name(name) {
            return Some(kind);
        }

        match GeoJsonType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(name))
        {
            Some(expected) => self.error(
                &type_path,
                format!(
                    "Expected {} but got {} (case sensitive)",
                    expected.as_str(),
                    name
                ),
            ),
            None => self.error(&type_path, format!("The type {} is unknown", name)),
        }
        None
    }

    fn object(&mut self, kind: GeoJsonType, object: &Map<String, Value>, path: &str) {
        self.common_members(object, path);
        match kind {
            GeoJsonType::Feature => self.feature(object, path),
            GeoJsonType::FeatureCollection => self.feature_collection(object, path),
            GeoJsonType::GeometryCollection => self.geometry_collection(object, path),
            _ => self.simple_geometry(kind, object, path),
        }
    }

    fn common_members(&mut self, object: &Map<String, Value>, path: &str) {
        if let Some(bbox) = object.get("bbox") {
            self.bbox(bbox, &member(path, "bbox"));
        }
        if object.contains_key("crs") {
            self.advise(
                &member(path, "crs"),
                "old-style crs member is not recommended",
            );
        }
    }

    fn bbox(&mut self, value: &Value, path: &str) {
        let Some(items) = value.as_array() else {
            self.error(path, "bbox member must be an array of numbers");
            return;
        };
        if !items.iter().all(Value::is_number) {
            self.error(path, "each element in a bbox member must be a number");
        }
        if items.len() < 4 || items.len() % 2 != 0 {
            self.error(
                path,
                "bbox must contain an even number of at least four numbers",
            );
        }
    }

    fn feature(&mut self, object: &Map<String, Value>, path: &str) {
        match object.get("properties") {
            None => self.error(path, "\"properties\" member required"),
            Some(Value::Object(_)) | Some(Value::Null) => {}
            Some(_) => self.error(
                &member(path, "properties"),
                "\"properties\" member should be an object or null",
            ),
        }

        match object.get("geometry") {
            None => self.error(path, "\"geometry\" member required"),
            Some(Value::Null) => {}
            Some(Value::Object(geometry)) => self.geometry_object(geometry, &member(path, "geometry")),
            Some(_) => self.error(
                &member(path, "geometry"),
                "\"geometry\" member should be an object or null",
            ),
        }

        if let Some(id) = object.get("id") {
            if !(id.is_string() || id.is_number()) {
                self.error(
                    &member(path, "id"),
                    "Feature \"id\" member must have a string or number value",
                );
            }
        }
    }

    fn feature_collection(&mut self, object: &Map<String, Value>, path: &str) {
        let features_path = member(path, "features");
        match object.get("features") {
            None => self.error(path, "\"features\" member required"),
            Some(Value::Array(features)) => {
                for (i, feature) in features.iter().enumerate() {
                    let feature_path = index(&features_path, i);
                    let Some(feature) = feature.as_object() else {
                        self.error(&feature_path, "every feature must be an object");
                        continue;
                    };
                    match self.type_member(feature, &feature_path) {
                        Some(GeoJsonType::Feature) => {
                            self.common_members(feature, &feature_path);
                            self.feature(feature, &feature_path);
                        }
                        Some(_) => self.error(
                            &member(&feature_path, "type"),
                            "GeoJSON features must have a type=Feature member",
                        ),
                        None => {}
                    }
                }
            }
            Some(_) => self.error(&features_path, "\"features\" member should be an array"),
        }
    }

    fn geometry_collection(&mut self, object: &Map<String, Value>, path: &str) {
        let geometries_path = member(path, "geometries");
        match object.get("geometries") {
            None => self.error(path, "\"geometries\" member required"),
            Some(Value::Array(geometries)) => {
                for (i, geometry) in geometries.iter().enumerate() {
                    let geometry_path = index(&geometries_path, i);
                    let Some(geometry) = geometry.as_object() else {
                        self.error(&geometry_path, "every geometry must be an object");
                        continue;
                    };
                    if geometry.get("type").and_then(Value::as_str) == Some("GeometryCollection") {
                        self.advise(
                            &geometry_path,
                            "GeometryCollection should avoid nested geometry collections",
                        );
                    }
                    self.geometry_object(geometry, &geometry_path);
                }
            }
            Some(_) => self.error(&geometries_path, "\"geometries\" member should be an array"),
        }
    }

    /// Hint an object that must be a geometry rather than a feature.
    fn geometry_object(&mut self, object: &Map<String, Value>, path: &str) {
        let Some(kind) = self.type_member(object, path) else {
            return;
        };
        if !kind.is_geometry() {
            self.error(
                &member(path, "type"),
                format!("{} is not a geometry type", kind.as_str()),
            );
            return;
        }
        self.object(kind, object, path);
    }

    fn simple_geometry(&mut self, kind: GeoJsonType, object: &Map<String, Value>, path: &str) {
        match object.get("coordinates") {
            None => self.error(path, "\"coordinates\" member required"),
            Some(coordinates) => self.coordinates(kind, coordinates, &member(path, "coordinates")),
        }
    }
}
