use foundation::geo::GeoPoint;

use crate::boundary::{CountryBoundary, Polygon};

const EDGE_EPSILON: f64 = 1e-12;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RingLocation {
    Inside,
    OnEdge,
    Outside,
}

/// Whether `point` lies inside the country.
///
/// Fails closed: a missing boundary (not loaded yet, or failed to load) and
/// non-finite coordinates both yield `false`. Points on an outer edge count
/// as inside; points inside a hole do not.
pub fn contains(point: GeoPoint, boundary: Option<&CountryBoundary>) -> bool {
    let Some(boundary) = boundary else {
        return false;
    };
    if !point.is_finite() || !boundary.bbox().contains(point) {
        return false;
    }
    boundary
        .polygons()
        .iter()
        .any(|poly| polygon_contains(poly, point))
}

pub fn polygon_contains(poly: &Polygon, point: GeoPoint) -> bool {
    if !poly.bbox().contains(point) {
        return false;
    }
    match ring_location(poly.exterior(), point) {
        RingLocation::Outside => false,
        RingLocation::OnEdge => true,
        RingLocation::Inside => poly
            .holes()
            .iter()
            .all(|hole| ring_location(hole, point) != RingLocation::Inside),
    }
}

/// Even-odd ray cast against a single ring, with an explicit edge check.
pub fn ring_location(ring: &[GeoPoint], p: GeoPoint) -> RingLocation {
    if ring.len() < 3 {
        return RingLocation::Outside;
    }

    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let a = ring[i];
        let b = ring[j];
        j = i;

        if on_segment(p, a, b) {
            return RingLocation::OnEdge;
        }

        if (a.lat_deg > p.lat_deg) != (b.lat_deg > p.lat_deg) {
            let x_cross = (b.lon_deg - a.lon_deg) * (p.lat_deg - a.lat_deg)
                / (b.lat_deg - a.lat_deg)
                + a.lon_deg;
            if p.lon_deg < x_cross {
                inside = !inside;
            }
        }
    }

    if inside {
        RingLocation::Inside
    } else {
        RingLocation::Outside
    }
}

fn on_segment(p: GeoPoint, a: GeoPoint, b: GeoPoint) -> bool {
    let cross = (b.lon_deg - a.lon_deg) * (p.lat_deg - a.lat_deg)
        - (b.lat_deg - a.lat_deg) * (p.lon_deg - a.lon_deg);
    if cross.abs() > EDGE_EPSILON {
        return false;
    }
    p.lon_deg >= a.lon_deg.min(b.lon_deg)
        && p.lon_deg <= a.lon_deg.max(b.lon_deg)
        && p.lat_deg >= a.lat_deg.min(b.lat_deg)
        && p.lat_deg <= a.lat_deg.max(b.lat_deg)
}

#[cfg(test)]
mod tests {
    use super::{RingLocation, contains, ring_location};
    use crate::boundary::{CountryBoundary, Polygon};
    use foundation::geo::GeoPoint;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(x0, y0),
            GeoPoint::new(x1, y0),
            GeoPoint::new(x1, y1),
            GeoPoint::new(x0, y1),
            GeoPoint::new(x0, y0),
        ]
    }

    /// Two landmasses; the western one has a lake.
    fn boundary() -> CountryBoundary {
        let west = Polygon::new(rect(-100.0, 40.0, -60.0, 60.0), vec![rect(-90.0, 45.0, -80.0, 50.0)])
            .expect("west");
        let east = Polygon::new(rect(-55.0, 45.0, -50.0, 50.0), Vec::new()).expect("east");
        CountryBoundary::new(vec![west, east]).expect("boundary")
    }

    #[test]
    fn interior_points_are_inside() {
        let b = boundary();
        assert!(contains(GeoPoint::new(-79.38, 43.65), Some(&b)));
        assert!(contains(GeoPoint::new(-52.5, 47.5), Some(&b)));
    }

    #[test]
    fn exterior_points_are_outside() {
        let b = boundary();
        assert!(!contains(GeoPoint::new(0.0, 0.0), Some(&b)));
        // Between the two landmasses, inside the overall bbox.
        assert!(!contains(GeoPoint::new(-57.0, 47.0), Some(&b)));
    }

    #[test]
    fn points_in_a_hole_are_outside() {
        let b = boundary();
        assert!(!contains(GeoPoint::new(-85.0, 47.5), Some(&b)));
    }

    #[test]
    fn hole_edge_belongs_to_the_country() {
        let b = boundary();
        assert!(contains(GeoPoint::new(-90.0, 47.5), Some(&b)));
    }

    #[test]
    fn missing_boundary_fails_closed() {
        assert!(!contains(GeoPoint::new(-79.38, 43.65), None));
    }

    #[test]
    fn non_finite_points_are_rejected() {
        let b = boundary();
        assert!(!contains(GeoPoint::new(f64::NAN, 43.0), Some(&b)));
        assert!(!contains(GeoPoint::new(-79.0, f64::INFINITY), Some(&b)));
    }

    #[test]
    fn ring_without_closing_vertex_works() {
        let tri = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(10.0, 0.0),
            GeoPoint::new(0.0, 10.0),
        ];
        assert_eq!(ring_location(&tri, GeoPoint::new(2.0, 2.0)), RingLocation::Inside);
        assert_eq!(ring_location(&tri, GeoPoint::new(5.0, 5.0)), RingLocation::OnEdge);
        assert_eq!(ring_location(&tri, GeoPoint::new(6.0, 6.0)), RingLocation::Outside);
    }
}
