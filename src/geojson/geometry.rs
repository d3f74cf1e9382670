//! Coordinate shape checks for simple geometries.

use serde_json::Value;

use super::{index, GeoJsonType, Hinter};

type Position = Vec<f64>;

/// Twice the signed area of a closed ring; positive when counter-clockwise.
fn signed_area(ring: &[Position]) -> f64 {
    ring.windows(2)
        .map(|pair| pair[0][0] * pair[1][1] - pair[1][0] * pair[0][1])
        .sum()
}

impl Hinter {
    pub(super) fn coordinates(&mut self, kind: GeoJsonType, coordinates: &Value, path: &str) {
        match kind {
            GeoJsonType::Point => {
                self.position(coordinates, path);
            }
            GeoJsonType::MultiPoint => {
                if let Some(items) = self.elements(coordinates, path) {
                    for (i, item) in items.iter().enumerate() {
                        self.position(item, &index(path, i));
                    }
                }
            }
            GeoJsonType::LineString => self.line_string(coordinates, path),
            GeoJsonType::MultiLineString => {
                if let Some(items) = self.elements(coordinates, path) {
                    for (i, item) in items.iter().enumerate() {
                        self.line_string(item, &index(path, i));
                    }
                }
            }
            GeoJsonType::Polygon => self.polygon(coordinates, path),
            GeoJsonType::MultiPolygon => {
                if let Some(items) = self.elements(coordinates, path) {
                    for (i, item) in items.iter().enumerate() {
                        self.polygon(item, &index(path, i));
                    }
                }
            }
            GeoJsonType::GeometryCollection | GeoJsonType::Feature | GeoJsonType::FeatureCollection => {}
        }
    }

    fn elements<'v>(&mut self, value: &'v Value, path: &str) -> Option<&'v Vec<Value>> {
        let items = value.as_array();
        if items.is_none() {
            self.error(path, "coordinates must be an array");
        }
        items
    }

    /// Returns the numeric position if it is well formed.
    fn position(&mut self, value: &Value, path: &str) -> Option<Position> {
        let Some(items) = value.as_array() else {
            self.error(path, "position should be an array");
            return None;
        };
        if items.len() < 2 {
            self.error(path, "position must have 2 or more elements");
            return None;
        }
        if items.len() > 3 {
            self.advise(path, "position should not have more than 3 elements");
        }

        let mut position = Vec::with_capacity(items.len());
        let mut numeric = true;
        for (i, item) in items.iter().enumerate() {
            match item.as_f64() {
                Some(n) => position.push(n),
                None => {
                    self.error(&index(path, i), "each element in a position must be a number");
                    numeric = false;
                }
            }
        }
        numeric.then_some(position)
    }

    fn positions(&mut self, items: &[Value], path: &str) -> Option<Vec<Position>> {
        let positions: Vec<Option<Position>> = items
            .iter()
            .enumerate()
            .map(|(i, item)| self.position(item, &index(path, i)))
            .collect();
        positions.into_iter().collect()
    }

    fn line_string(&mut self, value: &Value, path: &str) {
        let Some(items) = self.elements(value, path) else {
            return;
        };
        if items.len() < 2 {
            self.error(path, "a LineString must have 2 or more positions");
        }
        self.positions(items, path);
    }

    /// Returns the ring's positions if it is a valid closed ring.
    fn linear_ring(&mut self, value: &Value, path: &str) -> Option<Vec<Position>> {
        let items = self.elements(value, path)?;
        let mut valid = true;
        if items.len() < 4 {
            self.error(
                path,
                "a LinearRing of coordinates needs to have four or more positions",
            );
            valid = false;
        }

        let positions = self.positions(items, path)?;
        if positions.first() != positions.last() {
            self.error(
                path,
                "the first and last positions in a LinearRing of coordinates must be the same",
            );
            valid = false;
        }
        valid.then_some(positions)
    }

    fn polygon(&mut self, value: &Value, path: &str) {
        let Some(rings) = self.elements(value, path) else {
            return;
        };

        let mut follows_right_hand_rule = true;
        for (i, ring) in rings.iter().enumerate() {
            let Some(ring) = self.linear_ring(ring, &index(path, i)) else {
                continue;
            };
            let area = signed_area(&ring);
            // Exterior ring counter-clockwise, holes clockwise.
            if (i == 0 && area < 0.0) || (i > 0 && area > 0.0) {
                follows_right_hand_rule = false;
            }
        }

        if !follows_right_hand_rule {
            self.advise(
                path,
                "Polygons and MultiPolygons should follow the right-hand rule",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geojson::{hint, HintLevel};
    use serde_json::json;

    #[test]
    fn test_signed_area_orientation() {
        let ccw = vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
            vec![0.0, 1.0],
            vec![0.0, 0.0],
        ];
        assert_eq!(signed_area(&ccw), 2.0);

        let cw: Vec<Position> = ccw.iter().rev().cloned().collect();
        assert_eq!(signed_area(&cw), -2.0);
    }

    #[test]
    fn test_position_arity() {
        let hints = hint(&json!({"type": "Point", "coordinates": [1, 2, 3, 4]}));
        assert_eq!(hints.len(), 1);
        assert_eq!(hints[0].level, HintLevel::Message);
        assert_eq!(hints[0].message, "position should not have more than 3 elements");

        let hints = hint(&json!({"type": "Point", "coordinates": [1, "2"]}));
        assert_eq!(hints.len(), 1);
        assert_eq!(hints[0].path, "/coordinates/1");
        assert_eq!(hints[0].message, "each element in a position must be a number");

        let hints = hint(&json!({"type": "Point", "coordinates": "1,2"}));
        assert_eq!(hints[0].message, "position should be an array");
    }

    #[test]
    fn test_three_dimensional_positions_are_valid() {
        assert!(hint(&json!({"type": "Point", "coordinates": [1.5, 2.5, 100]})).is_empty());
    }

    #[test]
    fn test_line_string_needs_two_positions() {
        let hints = hint(&json!({"type": "LineString", "coordinates": [[0, 0]]}));
        assert_eq!(hints.len(), 1);
        assert_eq!(hints[0].message, "a LineString must have 2 or more positions");

        let hints = hint(&json!({
            "type": "MultiLineString",
            "coordinates": [[[0, 0], [1, 1]], [[0, 0]]]
        }));
        assert_eq!(hints.len(), 1);
        assert_eq!(hints[0].path, "/coordinates/1");
    }

    #[test]
    fn test_multi_point() {
        assert!(hint(&json!({"type": "MultiPoint", "coordinates": []})).is_empty());

        let hints = hint(&json!({"type": "MultiPoint", "coordinates": [[0, 0], [1]]}));
        assert_eq!(hints.len(), 1);
        assert_eq!(hints[0].path, "/coordinates/1");
    }

    #[test]
    fn test_coordinates_must_be_array() {
        let hints = hint(&json!({"type": "Polygon", "coordinates": {"ring": []}}));
        assert_eq!(hints.len(), 1);
        assert_eq!(hints[0].message, "coordinates must be an array");
    }

    #[test]
    fn test_ring_closure_compares_numerically() {
        let value = json!({
            "type": "Polygon",
            "coordinates": [[[0, 0], [1.0, 0], [1, 1], [0, 1], [0.0, 0.0]]]
        });
        assert!(hint(&value).is_empty());
    }

    #[test]
    fn test_clockwise_exterior_is_advisory() {
        let hints = hint(&json!({
            "type": "Polygon",
            "coordinates": [[[0, 0], [0, 1], [1, 1], [1, 0], [0, 0]]]
        }));
        assert_eq!(hints.len(), 1);
        assert_eq!(hints[0].level, HintLevel::Message);
        assert_eq!(hints[0].path, "/coordinates");
        assert_eq!(
            hints[0].message,
            "Polygons and MultiPolygons should follow the right-hand rule"
        );
    }

    #[test]
    fn test_hole_winding() {
        let exterior = json!([[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]]);
        let cw_hole = json!([[2, 2], [2, 4], [4, 4], [4, 2], [2, 2]]);
        let ccw_hole = json!([[2, 2], [4, 2], [4, 4], [2, 4], [2, 2]]);

        assert!(hint(&json!({"type": "Polygon", "coordinates": [exterior, cw_hole]})).is_empty());

        let hints = hint(&json!({"type": "Polygon", "coordinates": [exterior, ccw_hole]}));
        assert_eq!(hints.len(), 1);
        assert!(!hints[0].is_error());
    }

    #[test]
    fn test_multi_polygon_paths() {
        let hints = hint(&json!({
            "type": "MultiPolygon",
            "coordinates": [
                [[[0, 0], [1, 0], [1, 1], [0, 1], [0, 0]]],
                [[[5, 5], [6, 5], [6, 6], [5, 6]]]
            ]
        }));
        assert_eq!(hints.len(), 1);
        assert_eq!(hints[0].path, "/coordinates/1/0");
        assert!(hints[0].is_error());
    }
}
