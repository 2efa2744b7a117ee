//! Route risk analysis.
//!
//! Given candidate routes (ordered point sequences) and a snapshot of hazard
//! zones, classify each route as `safe < low < medium < high` and rank the
//! candidates safest first.
//!
//! ```text
//! Route + zones -> extract_points / nearest_distance -> classify -> RiskAssessment -> compare -> ranking
//! ```
//!
//! Everything here is a pure function of its inputs; nothing is cached
//! between calls.

pub mod compare;
pub mod config;
pub mod distance;
pub mod error;
pub mod proximity;
pub mod report;
pub mod route;
pub mod safety;
pub mod zone;

pub use compare::{RankedRoute, compare, rank_routes, ranking_order};
pub use config::Config;
pub use distance::{GeoPoint, distance};
pub use error::{Result, RiskError};
pub use proximity::nearest_distance;
pub use report::RouteReport;
pub use route::{Leg, Route, Step, extract_points};
pub use safety::{CategoryTable, Classifier, RiskAssessment, RiskLevel, RiskTier, ZoneProximity, classify};
pub use zone::{HazardZone, HazardZoneRecord, validate_zones};
