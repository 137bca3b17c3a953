use crate::geo::GeoPoint;

/// Axis-aligned bounding box in lon/lat degrees.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb2 {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl Aabb2 {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Aabb2 { min, max }
    }

    /// Smallest box covering `points`, or `None` when empty.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a GeoPoint>) -> Option<Self> {
        let mut it = points.into_iter();
        let first = it.next()?;
        let mut b = Aabb2::new([first.lon_deg, first.lat_deg], [first.lon_deg, first.lat_deg]);
        for p in it {
            b.min[0] = b.min[0].min(p.lon_deg);
            b.min[1] = b.min[1].min(p.lat_deg);
            b.max[0] = b.max[0].max(p.lon_deg);
            b.max[1] = b.max[1].max(p.lat_deg);
        }
        Some(b)
    }

    /// Inclusive containment test.
    pub fn contains(&self, p: GeoPoint) -> bool {
        p.lon_deg >= self.min[0]
            && p.lon_deg <= self.max[0]
            && p.lat_deg >= self.min[1]
            && p.lat_deg <= self.max[1]
    }

    pub fn clamp(&self, p: GeoPoint) -> GeoPoint {
        GeoPoint::new(
            p.lon_deg.max(self.min[0]).min(self.max[0]),
            p.lat_deg.max(self.min[1]).min(self.max[1]),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Aabb2;
    use crate::geo::GeoPoint;

    #[test]
    fn from_points_covers_all() {
        let pts = [
            GeoPoint::new(1.0, 5.0),
            GeoPoint::new(-2.0, 3.0),
            GeoPoint::new(4.0, -1.0),
        ];
        let b = Aabb2::from_points(&pts).expect("non-empty");
        assert_eq!(b.min, [-2.0, -1.0]);
        assert_eq!(b.max, [4.0, 5.0]);
        assert!(pts.iter().all(|p| b.contains(*p)));
    }

    #[test]
    fn empty_input_has_no_bounds() {
        assert!(Aabb2::from_points(&[]).is_none());
    }

    #[test]
    fn clamp_pulls_points_inside() {
        let b = Aabb2::new([0.0, 0.0], [10.0, 10.0]);
        assert_eq!(b.clamp(GeoPoint::new(-5.0, 20.0)), GeoPoint::new(0.0, 10.0));
    }
}
