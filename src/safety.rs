use std::collections::HashMap;
use std::fmt;

use itertools::Itertools;
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::distance::GeoPoint;
use crate::error::Result;
use crate::proximity::{DEFAULT_INDEX_THRESHOLD, PointSet};
use crate::route::{Route, extract_points};
use crate::zone::{HazardZone, HazardZoneRecord, validate_zones};

/// Severity of a single hazard category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "low" => Some(RiskTier::Low),
            "medium" => Some(RiskTier::Medium),
            "high" => Some(RiskTier::High),
            _ => None,
        }
    }
}

/// Overall verdict for a route. Declaration order is the severity order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Safe,
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// 0 = safe .. 3 = high
    pub fn rank(self) -> u8 {
        self as u8
    }

    pub fn recommendation(self) -> &'static str {
        match self {
            RiskLevel::High => "Avoid this route: it passes through high-risk hazard zones.",
            RiskLevel::Medium => "Proceed with caution: moderate hazards reported along this route.",
            RiskLevel::Low => "Minor hazards reported along this route; expect delays.",
            RiskLevel::Safe => "This route is safe: no hazard zones detected along the path.",
        }
    }
}

impl From<RiskTier> for RiskLevel {
    fn from(tier: RiskTier) -> Self {
        match tier {
            RiskTier::Low => RiskLevel::Low,
            RiskTier::Medium => RiskLevel::Medium,
            RiskTier::High => RiskLevel::High,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Safe => "safe",
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        };
        f.write_str(s)
    }
}

/// Category label -> tier. Labels match case-insensitively with whitespace
/// collapsed; anything unknown is `Low` so no hazard is ever dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTable {
    tiers: HashMap<String, RiskTier>,
}

impl Default for CategoryTable {
    fn default() -> Self {
        let defaults = [
            ("Floods", RiskTier::High),
            ("Landslides", RiskTier::High),
            ("Tsunami", RiskTier::High),
            ("Wildfire", RiskTier::High),
            ("Earthquake", RiskTier::High),
            ("High Wind", RiskTier::Medium),
            ("Wildlife Movement", RiskTier::Medium),
            ("Heavy Rain", RiskTier::Medium),
            ("Fog", RiskTier::Medium),
            ("Power Outage", RiskTier::Low),
            ("Utility Outage", RiskTier::Low),
            ("Water Supply Disruption", RiskTier::Low),
            ("Road Works", RiskTier::Low),
        ];
        defaults
            .into_iter()
            .fold(Self::empty(), |table, (category, tier)| table.with(category, tier))
    }
}

impl CategoryTable {
    pub fn empty() -> Self {
        Self { tiers: HashMap::new() }
    }

    pub fn with(mut self, category: &str, tier: RiskTier) -> Self {
        self.insert(category, tier);
        self
    }

    pub fn insert(&mut self, category: &str, tier: RiskTier) {
        self.tiers.insert(normalize(category), tier);
    }

    pub fn tier_of(&self, category: &str) -> RiskTier {
        self.tiers.get(&normalize(category)).copied().unwrap_or(RiskTier::Low)
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}

fn normalize(label: &str) -> String {
    label.split_whitespace().join(" ").to_lowercase()
}

/// A zone together with how close one route gets to its center.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneProximity {
    pub zone: HazardZone,
    pub distance_meters: f64,
    pub tier: RiskTier,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub risk_level: RiskLevel,
    /// Nearest first; equal distances keep zone input order.
    pub affected_zones: Vec<ZoneProximity>,
    /// Over every zone considered, affected or not. `+inf` when nothing was measured.
    pub min_distance_to_zone: f64,
    pub high_risk_count: usize,
    pub medium_risk_count: usize,
    pub low_risk_count: usize,
    pub recommendations: Vec<String>,
}

impl RiskAssessment {
    fn from_level(
        risk_level: RiskLevel,
        affected_zones: Vec<ZoneProximity>,
        min_distance_to_zone: f64,
        counts: [usize; 3],
    ) -> Self {
        let [high_risk_count, medium_risk_count, low_risk_count] = counts;
        Self {
            risk_level,
            affected_zones,
            min_distance_to_zone,
            high_risk_count,
            medium_risk_count,
            low_risk_count,
            recommendations: vec![risk_level.recommendation().to_string()],
        }
    }

    pub fn safe() -> Self {
        Self::from_level(RiskLevel::Safe, Vec::new(), f64::INFINITY, [0; 3])
    }
}

// Running state of the reduction over zones.
struct Findings {
    min_distance: f64,
    affected: Vec<(usize, ZoneProximity)>,
    high: usize,
    medium: usize,
    low: usize,
}

impl Findings {
    fn new() -> Self {
        Self { min_distance: f64::INFINITY, affected: Vec::new(), high: 0, medium: 0, low: 0 }
    }

    fn record(mut self, order: usize, zone: &HazardZone, distance: f64, table: &CategoryTable) -> Self {
        self.min_distance = self.min_distance.min(distance);
        if distance <= zone.radius_meters {
            let tier = table.tier_of(&zone.category);
            match tier {
                RiskTier::High => self.high += 1,
                RiskTier::Medium => self.medium += 1,
                RiskTier::Low => self.low += 1,
            }
            self.affected.push((order, ZoneProximity { zone: zone.clone(), distance_meters: distance, tier }));
        }
        self
    }

    // Worst tier present wins.
    fn level(&self) -> RiskLevel {
        if self.high > 0 {
            RiskLevel::High
        } else if self.medium > 0 {
            RiskLevel::Medium
        } else if self.low > 0 {
            RiskLevel::Low
        } else {
            RiskLevel::Safe
        }
    }

    fn finish(self) -> RiskAssessment {
        let level = self.level();
        let affected = self
            .affected
            .into_iter()
            .sorted_by(|(ia, a), (ib, b)| a.distance_meters.total_cmp(&b.distance_meters).then(ia.cmp(ib)))
            .map(|(_, proximity)| proximity)
            .collect();
        RiskAssessment::from_level(level, affected, self.min_distance, [self.high, self.medium, self.low])
    }
}

/// Risk classifier with its category policy injected.
#[derive(Debug, Clone)]
pub struct Classifier {
    table: CategoryTable,
    index_threshold: usize,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(CategoryTable::default())
    }
}

impl Classifier {
    pub fn new(table: CategoryTable) -> Self {
        Self { table, index_threshold: DEFAULT_INDEX_THRESHOLD }
    }

    pub fn with_index_threshold(mut self, index_threshold: usize) -> Self {
        self.index_threshold = index_threshold;
        self
    }

    pub fn table(&self) -> &CategoryTable {
        &self.table
    }

    /// Classifies one route against an already validated zone snapshot. Never fails.
    pub fn classify(&self, route: &Route, zones: &[HazardZone]) -> RiskAssessment {
        classify_with(&self.table, self.index_threshold, route, zones)
    }

    /// Validates raw zone records, then classifies.
    pub fn analyze(&self, route: &Route, records: Vec<HazardZoneRecord>) -> Result<RiskAssessment> {
        let zones = validate_zones(records)?;
        Ok(self.classify(route, &zones))
    }

    /// One assessment per route, in input order. Routes are evaluated in parallel.
    pub fn assess_all(&self, routes: &[Route], zones: &[HazardZone]) -> Vec<RiskAssessment> {
        routes.par_iter().map(|route| self.classify(route, zones)).collect()
    }
}

/// `Classifier::classify` over a borrowed table, default indexing.
pub fn classify(route: &Route, zones: &[HazardZone], table: &CategoryTable) -> RiskAssessment {
    classify_with(table, DEFAULT_INDEX_THRESHOLD, route, zones)
}

/// Point set to measure against, or `None` when there is nothing to measure.
/// Zones are checked first so an index is never built for an empty snapshot.
fn coverage<'a>(points: &'a [GeoPoint], zones: &[HazardZone], index_threshold: usize) -> Option<PointSet<'a>> {
    if zones.is_empty() || points.is_empty() {
        return None;
    }
    Some(PointSet::build(points, index_threshold))
}

fn classify_with(table: &CategoryTable, index_threshold: usize, route: &Route, zones: &[HazardZone]) -> RiskAssessment {
    let points = extract_points(route);
    let Some(point_set) = coverage(&points, zones, index_threshold) else {
        debug!(zones = zones.len(), points = points.len(), "no coverage data, route treated as safe");
        return RiskAssessment::safe();
    };

    let assessment = zones
        .iter()
        .enumerate()
        .fold(Findings::new(), |findings, (order, zone)| {
            findings.record(order, zone, point_set.nearest_distance(zone), table)
        })
        .finish();

    debug!(
        level = %assessment.risk_level,
        affected = assessment.affected_zones.len(),
        min_distance_m = assessment.min_distance_to_zone,
        "route classified"
    );
    assessment
}
