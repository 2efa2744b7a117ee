use std::cmp::Ordering;

use serde::Serialize;

use crate::error::Result;
use crate::route::Route;
use crate::safety::{Classifier, RiskAssessment};
use crate::zone::{HazardZoneRecord, validate_zones};

/// Safer first: risk level rank, then fewer affected zones.
/// Assessments equal on both keys compare `Equal`, so a stable sort keeps caller order.
pub fn compare(a: &RiskAssessment, b: &RiskAssessment) -> Ordering {
    a.risk_level
        .rank()
        .cmp(&b.risk_level.rank())
        .then_with(|| a.affected_zones.len().cmp(&b.affected_zones.len()))
}

/// Indices into `assessments`, safest first. Lets callers reorder their own
/// route list in lock-step.
pub fn ranking_order(assessments: &[RiskAssessment]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..assessments.len()).collect();
    order.sort_by(|&i, &j| compare(&assessments[i], &assessments[j]));
    order
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRoute {
    /// Position of the route in the caller's input.
    pub index: usize,
    pub assessment: RiskAssessment,
}

/// Assesses every candidate and ranks them. Element 0 is the default pick;
/// every alternative is kept.
pub fn rank_routes(
    classifier: &Classifier,
    routes: &[Route],
    records: Vec<HazardZoneRecord>,
) -> Result<Vec<RankedRoute>> {
    let zones = validate_zones(records)?;
    let mut ranked: Vec<RankedRoute> = classifier
        .assess_all(routes, &zones)
        .into_iter()
        .enumerate()
        .map(|(index, assessment)| RankedRoute { index, assessment })
        .collect();
    ranked.sort_by(|a, b| compare(&a.assessment, &b.assessment));
    Ok(ranked)
}
