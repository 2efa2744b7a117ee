use geo::LineString;
use serde::{Deserialize, Serialize};

use crate::distance::GeoPoint;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    #[serde(default)]
    pub points: Vec<GeoPoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leg {
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// A candidate route as handed over by the directions provider.
///
/// The display strings are carried through untouched for reporting; the
/// analysis only ever looks at the points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    #[serde(default)]
    pub legs: Vec<Leg>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_text: Option<String>,
}

impl Route {
    /// Single-leg, single-step route over `points`.
    pub fn from_points(points: impl IntoIterator<Item = GeoPoint>) -> Self {
        Self {
            legs: vec![Leg {
                steps: vec![Step { points: points.into_iter().collect() }],
            }],
            ..Self::default()
        }
    }

    pub fn with_display(mut self, distance_text: impl Into<String>, duration_text: impl Into<String>) -> Self {
        self.distance_text = Some(distance_text.into());
        self.duration_text = Some(duration_text.into());
        self
    }

    /// Legs -> steps -> points in traversal order. Recomputable at will.
    pub fn points(&self) -> impl Iterator<Item = GeoPoint> + '_ {
        self.legs
            .iter()
            .flat_map(|leg| leg.steps.iter())
            .flat_map(|step| step.points.iter().copied())
    }

    /// Path geometry for the presentation layer.
    pub fn line_string(&self) -> LineString<f64> {
        self.points().map(geo::Coord::from).collect()
    }
}

/// Flattens a route into one ordered point sequence. Empty routes give an empty Vec.
pub fn extract_points(route: &Route) -> Vec<GeoPoint> {
    route.points().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng)
    }

    #[test]
    fn flattens_in_traversal_order() {
        let route = Route {
            legs: vec![
                Leg {
                    steps: vec![
                        Step { points: vec![p(1.0, 1.0), p(1.0, 2.0)] },
                        Step { points: vec![] },
                        Step { points: vec![p(1.0, 2.0), p(1.0, 3.0)] },
                    ],
                },
                Leg { steps: vec![] },
                Leg { steps: vec![Step { points: vec![p(2.0, 3.0)] }] },
            ],
            ..Route::default()
        };

        let pts = extract_points(&route);
        assert_eq!(pts, vec![p(1.0, 1.0), p(1.0, 2.0), p(1.0, 2.0), p(1.0, 3.0), p(2.0, 3.0)]);
        // restartable
        assert_eq!(extract_points(&route), pts);
    }

    #[test]
    fn empty_route_yields_no_points() {
        assert!(extract_points(&Route::default()).is_empty());
        let hollow = Route { legs: vec![Leg { steps: vec![Step::default()] }], ..Route::default() };
        assert!(extract_points(&hollow).is_empty());
    }

    #[test]
    fn line_string_is_lon_lat() {
        let ls = Route::from_points([p(6.9, 79.8), p(7.0, 80.0)]).line_string();
        let coords: Vec<_> = ls.coords().map(|c| (c.x, c.y)).collect();
        assert_eq!(coords, vec![(79.8, 6.9), (80.0, 7.0)]);
    }

    #[test]
    fn deserializes_provider_shape() {
        let json = r#"{
            "legs": [{ "steps": [{ "points": [{ "lat": 6.9, "lng": 79.8 }] }] }],
            "distanceText": "12 km",
            "durationText": "25 mins"
        }"#;
        let route: Route = serde_json::from_str(json).unwrap();
        assert_eq!(route.distance_text.as_deref(), Some("12 km"));
        assert_eq!(extract_points(&route), vec![p(6.9, 79.8)]);
    }
}
