use serde::{Deserialize, Serialize};

/// Mean Earth radius used for every distance the engine reports.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// WGS-84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<GeoPoint> for geo::Coord<f64> {
    fn from(p: GeoPoint) -> Self {
        // geo is x = lon, y = lat
        geo::Coord { x: p.lng, y: p.lat }
    }
}

/// Great-circle distance in meters (haversine).
pub fn distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = (b.lat - a.lat).abs().to_radians();
    let dlng = (b.lng - a.lng).abs().to_radians();

    // abs() keeps every term identical under argument swap, so the result is symmetric bit for bit.
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).max(0.0).sqrt());
    EARTH_RADIUS_M * c
}
