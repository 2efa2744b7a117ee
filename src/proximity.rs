use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::distance::{EARTH_RADIUS_M, GeoPoint, distance};
use crate::zone::HazardZone;

/// Point count above which an R-tree pays for itself.
pub const DEFAULT_INDEX_THRESHOLD: usize = 256;

// 1 mm expressed on the unit sphere. Covers rounding in the 3-D embedding.
const CHORD_SLACK: f64 = 1e-3 / EARTH_RADIUS_M;

/// Minimum distance from any route point to the zone center, `+inf` for no points.
pub fn nearest_distance(points: &[GeoPoint], zone: &HazardZone) -> f64 {
    scan(points, zone.center)
}

fn scan(points: &[GeoPoint], target: GeoPoint) -> f64 {
    points
        .iter()
        .map(|&p| distance(p, target))
        .fold(f64::INFINITY, f64::min)
}

/// Route point on the unit sphere. Chord length there is monotonic in
/// great-circle distance, so Euclidean nearest == haversine nearest.
#[derive(Debug, Clone, Copy)]
pub struct SpherePoint {
    xyz: [f64; 3],
    geo: GeoPoint,
}

fn unit_vector(p: GeoPoint) -> [f64; 3] {
    let (lat, lng) = (p.lat.to_radians(), p.lng.to_radians());
    [lat.cos() * lng.cos(), lat.cos() * lng.sin(), lat.sin()]
}

impl RTreeObject for SpherePoint {
    type Envelope = AABB<[f64; 3]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.xyz)
    }
}

impl PointDistance for SpherePoint {
    fn distance_2(&self, point: &[f64; 3]) -> f64 {
        let dx = self.xyz[0] - point[0];
        let dy = self.xyz[1] - point[1];
        let dz = self.xyz[2] - point[2];
        dx * dx + dy * dy + dz * dz
    }
}

/// Route points prepared for repeated nearest-distance queries, one per zone.
///
/// Small routes are scanned linearly; large ones go through an R-tree. Both
/// paths return the same value: the tree only narrows candidates, the final
/// number is always the haversine minimum over those candidates.
pub enum PointSet<'a> {
    Scan(&'a [GeoPoint]),
    Indexed(RTree<SpherePoint>),
}

impl<'a> PointSet<'a> {
    pub fn build(points: &'a [GeoPoint], index_threshold: usize) -> Self {
        if points.len() <= index_threshold {
            return PointSet::Scan(points);
        }
        let items = points
            .iter()
            .map(|&geo| SpherePoint { xyz: unit_vector(geo), geo })
            .collect();
        PointSet::Indexed(RTree::bulk_load(items))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            PointSet::Scan(points) => points.is_empty(),
            PointSet::Indexed(tree) => tree.size() == 0,
        }
    }

    pub fn nearest_distance(&self, zone: &HazardZone) -> f64 {
        match self {
            PointSet::Scan(points) => scan(points, zone.center),
            PointSet::Indexed(tree) => {
                let query = unit_vector(zone.center);
                let Some(nearest) = tree.nearest_neighbor(&query) else {
                    return f64::INFINITY;
                };
                let reach = (nearest.distance_2(&query).sqrt() + CHORD_SLACK).powi(2);
                tree.locate_within_distance(query, reach)
                    .map(|sp| distance(sp.geo, zone.center))
                    .fold(f64::INFINITY, f64::min)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone_at(lat: f64, lng: f64) -> HazardZone {
        HazardZone::new("z", "z", "Floods", GeoPoint::new(lat, lng), 100.0).unwrap()
    }

    /// Deterministic zig-zag across southern Sri Lanka.
    fn wiggly_route(n: usize) -> Vec<GeoPoint> {
        (0..n)
            .map(|i| {
                let t = i as f64 / n as f64;
                GeoPoint::new(6.0 + 2.0 * t + 0.01 * ((i * 7919) % 13) as f64, 79.5 + 1.5 * t)
            })
            .collect()
    }

    #[test]
    fn empty_points_give_infinity() {
        assert_eq!(nearest_distance(&[], &zone_at(0.0, 0.0)), f64::INFINITY);
        let set = PointSet::build(&[], 0);
        assert!(set.is_empty());
        assert_eq!(set.nearest_distance(&zone_at(0.0, 0.0)), f64::INFINITY);
    }

    #[test]
    fn picks_the_closest_point() {
        let pts = [GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 0.01), GeoPoint::new(0.0, 0.02)];
        let zone = zone_at(0.0, 0.011);
        let d = nearest_distance(&pts, &zone);
        assert_eq!(d, distance(pts[1], zone.center));
    }

    #[test]
    fn zone_on_route_point_is_zero() {
        let pts = wiggly_route(50);
        let zone = zone_at(pts[17].lat, pts[17].lng);
        assert_eq!(nearest_distance(&pts, &zone), 0.0);
    }

    #[test]
    fn index_matches_linear_scan_exactly() {
        let pts = wiggly_route(2_000);
        let indexed = PointSet::build(&pts, 16);
        assert!(matches!(indexed, PointSet::Indexed(_)));

        let centers = [(6.5, 80.0), (7.9, 81.0), (6.0, 79.5), (9.0, 79.0), (-30.0, 10.0), (6.2501, 79.68)];
        for (lat, lng) in centers {
            let zone = zone_at(lat, lng);
            assert_eq!(indexed.nearest_distance(&zone), nearest_distance(&pts, &zone), "center {lat},{lng}");
        }
    }

    #[test]
    fn small_sets_stay_linear() {
        let pts = wiggly_route(10);
        assert!(matches!(PointSet::build(&pts, DEFAULT_INDEX_THRESHOLD), PointSet::Scan(_)));
    }
}
