use std::fmt;

use itertools::Itertools;
use serde::Serialize;

use crate::distance::distance;
use crate::route::Route;
use crate::safety::{RiskAssessment, RiskLevel, RiskTier};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub name: String,
    pub category: String,
    pub tier: RiskTier,
    pub distance_meters: f64,
}

/// Route metadata side by side with what the risk analysis found on it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteReport {
    pub distance_text: Option<String>,
    pub duration_text: Option<String>,
    /// Sum of great-circle hops between consecutive points.
    pub path_length_meters: f64,
    pub risk_level: RiskLevel,
    pub affected: Vec<ReportRow>,
    pub recommendations: Vec<String>,
}

impl RouteReport {
    pub fn new(route: &Route, assessment: &RiskAssessment) -> Self {
        let path_length_meters: f64 = route.points().tuple_windows().map(|(a, b)| distance(a, b)).sum();
        let affected = assessment
            .affected_zones
            .iter()
            .map(|p| ReportRow {
                name: p.zone.name.clone(),
                category: p.zone.category.clone(),
                tier: p.tier,
                distance_meters: p.distance_meters,
            })
            .collect();
        Self {
            distance_text: route.distance_text.clone(),
            duration_text: route.duration_text.clone(),
            path_length_meters,
            risk_level: assessment.risk_level,
            affected,
            recommendations: assessment.recommendations.clone(),
        }
    }
}

impl fmt::Display for RouteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let length = match &self.distance_text {
            Some(text) => text.clone(),
            None => format!("{:.1} km", self.path_length_meters / 1000.0),
        };
        let duration = self.duration_text.as_deref().unwrap_or("n/a");
        writeln!(f, "Route: {length}, {duration}")?;
        writeln!(f, "Risk level: {}", self.risk_level)?;
        if self.affected.is_empty() {
            writeln!(f, "Affected zones: none")?;
        } else {
            writeln!(f, "Affected zones ({}):", self.affected.len())?;
            for row in &self.affected {
                writeln!(
                    f,
                    "  - {} [{}, {:?}] {:.0} m from route",
                    row.name, row.category, row.tier, row.distance_meters
                )?;
            }
        }
        write!(f, "{}", self.recommendations.iter().map(|r| format!("* {r}")).join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::GeoPoint;
    use crate::safety::{CategoryTable, classify};
    use crate::zone::HazardZone;

    fn flooded_route() -> (Route, RiskAssessment) {
        let route = Route::from_points([GeoPoint::new(6.9, 79.86), GeoPoint::new(6.9361, 79.8612)])
            .with_display("4.1 km", "9 mins");
        let zone = HazardZone::new("f1", "Kelani overflow", "Floods", GeoPoint::new(6.9271, 79.8612), 2_000.0).unwrap();
        let assessment = classify(&route, &[zone], &CategoryTable::default());
        (route, assessment)
    }

    #[test]
    fn lists_affected_zones_with_metadata() {
        let (route, assessment) = flooded_route();
        let report = RouteReport::new(&route, &assessment);
        assert_eq!(report.distance_text.as_deref(), Some("4.1 km"));
        assert_eq!(report.affected.len(), 1);
        assert_eq!(report.affected[0].name, "Kelani overflow");
        assert_eq!(report.affected[0].tier, RiskTier::High);
        assert!(report.path_length_meters > 3_900.0 && report.path_length_meters < 4_100.0);

        let text = report.to_string();
        assert!(text.starts_with("Route: 4.1 km, 9 mins\nRisk level: high\n"));
        assert!(text.contains("Kelani overflow [Floods, High]"));
        assert!(text.ends_with(&format!("* {}", RiskLevel::High.recommendation())));
    }

    #[test]
    fn safe_route_without_display_text() {
        let route = Route::from_points([GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 0.01)]);
        let report = RouteReport::new(&route, &RiskAssessment::safe());
        let text = report.to_string();
        assert!(text.starts_with("Route: 1.1 km, n/a\n"));
        assert!(text.contains("Affected zones: none"));
    }
}
