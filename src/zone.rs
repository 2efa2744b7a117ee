use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::distance::GeoPoint;
use crate::error::{Result, RiskError};

/// A zone exactly as the hazard store publishes it. Nothing here is trusted yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HazardZoneRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub category: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub radius_meters: Option<f64>,
}

/// Validated hazard zone: radius is finite and strictly positive.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HazardZone {
    pub id: String,
    pub name: String,
    pub category: String,
    pub center: GeoPoint,
    pub radius_meters: f64,
}

impl HazardZone {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        center: GeoPoint,
        radius_meters: f64,
    ) -> Result<Self> {
        let id = id.into();
        check_radius(&id, Some(radius_meters))?;
        Ok(Self {
            id,
            name: name.into(),
            category: category.into(),
            center,
            radius_meters,
        })
    }
}

impl TryFrom<HazardZoneRecord> for HazardZone {
    type Error = RiskError;

    fn try_from(rec: HazardZoneRecord) -> Result<Self> {
        let radius = check_radius(&rec.id, rec.radius_meters)?;
        Ok(Self {
            id: rec.id,
            name: rec.name,
            category: rec.category,
            center: GeoPoint::new(rec.lat, rec.lng),
            radius_meters: radius,
        })
    }
}

fn check_radius(zone_id: &str, radius: Option<f64>) -> Result<f64> {
    let reason = match radius {
        None => "radius is missing".to_string(),
        Some(r) if !r.is_finite() => format!("radius {r} is not finite"),
        Some(r) if r <= 0.0 => format!("radius {r} must be positive"),
        Some(r) => return Ok(r),
    };
    warn!(zone_id, %reason, "rejecting hazard zone");
    Err(RiskError::InvalidZoneData { zone_id: zone_id.to_string(), reason })
}

/// Validates a whole snapshot; the first bad zone fails the call.
pub fn validate_zones(records: impl IntoIterator<Item = HazardZoneRecord>) -> Result<Vec<HazardZone>> {
    records.into_iter().map(HazardZone::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, radius: Option<f64>) -> HazardZoneRecord {
        HazardZoneRecord {
            id: id.to_string(),
            name: format!("zone {id}"),
            category: "Floods".to_string(),
            lat: 6.9271,
            lng: 79.8612,
            radius_meters: radius,
        }
    }

    #[test]
    fn accepts_positive_radius() {
        let zone = HazardZone::try_from(record("z1", Some(2000.0))).unwrap();
        assert_eq!(zone.center, GeoPoint::new(6.9271, 79.8612));
        assert_eq!(zone.radius_meters, 2000.0);
    }

    #[test]
    fn rejects_bad_radius() {
        for radius in [None, Some(0.0), Some(-5.0), Some(f64::NAN), Some(f64::INFINITY)] {
            let err = HazardZone::try_from(record("bad", radius)).unwrap_err();
            assert!(
                matches!(&err, RiskError::InvalidZoneData { zone_id, .. } if zone_id == "bad"),
                "{radius:?} -> {err}"
            );
        }
        assert!(HazardZone::new("c", "c", "Fog", GeoPoint::new(0.0, 0.0), 0.0).is_err());
    }

    #[test]
    fn snapshot_fails_on_first_bad_zone() {
        let err = validate_zones(vec![record("ok", Some(10.0)), record("zero", Some(0.0)), record("none", None)])
            .unwrap_err();
        assert!(err.to_string().contains("'zero'"));
    }

    #[test]
    fn deserializes_store_shape() {
        let json = r#"{"id":"z9","name":"Kelani basin","category":"Floods","lat":6.95,"lng":79.9,"radiusMeters":1500}"#;
        let rec: HazardZoneRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.radius_meters, Some(1500.0));
        let missing: HazardZoneRecord =
            serde_json::from_str(r#"{"id":"z0","category":"Fog","lat":0,"lng":0}"#).unwrap();
        assert!(HazardZone::try_from(missing).is_err());
    }
}
