use foundation::bounds::Aabb2;
use foundation::geo::GeoPoint;

/// Closed ring of lon/lat vertices. A duplicated closing vertex is optional.
pub type Ring = Vec<GeoPoint>;

/// One landmass: an exterior ring plus zero or more holes.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    exterior: Ring,
    holes: Vec<Ring>,
    bbox: Aabb2,
}

impl Polygon {
    /// Returns `None` if the exterior ring has fewer than three vertices.
    pub fn new(exterior: Ring, holes: Vec<Ring>) -> Option<Self> {
        if exterior.len() < 3 {
            return None;
        }
        let bbox = Aabb2::from_points(&exterior)?;
        Some(Self {
            exterior,
            holes,
            bbox,
        })
    }

    /// GeoJSON ring order: first ring exterior, the rest holes.
    pub fn from_rings(mut rings: Vec<Ring>) -> Option<Self> {
        if rings.is_empty() {
            return None;
        }
        let exterior = rings.remove(0);
        Self::new(exterior, rings)
    }

    pub fn exterior(&self) -> &[GeoPoint] {
        &self.exterior
    }

    pub fn holes(&self) -> &[Ring] {
        &self.holes
    }

    pub fn bbox(&self) -> Aabb2 {
        self.bbox
    }
}

/// Static country outline, possibly made of several disjoint landmasses.
///
/// Loaded once at startup and immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryBoundary {
    polygons: Vec<Polygon>,
    bbox: Aabb2,
}

impl CountryBoundary {
    /// Returns `None` when there is no usable polygon.
    pub fn new(polygons: Vec<Polygon>) -> Option<Self> {
        let first = polygons.first()?.bbox;
        let bbox = polygons.iter().skip(1).fold(first, |acc, p| {
            let b = p.bbox;
            Aabb2::new(
                [acc.min[0].min(b.min[0]), acc.min[1].min(b.min[1])],
                [acc.max[0].max(b.max[0]), acc.max[1].max(b.max[1])],
            )
        });
        Some(Self { polygons, bbox })
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    pub fn bbox(&self) -> Aabb2 {
        self.bbox
    }
}

/// Load status of the boundary resource.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum BoundaryState {
    #[default]
    Loading,
    Ready(CountryBoundary),
    Failed(String),
}

impl BoundaryState {
    pub fn boundary(&self) -> Option<&CountryBoundary> {
        match self {
            BoundaryState::Ready(b) => Some(b),
            BoundaryState::Loading | BoundaryState::Failed(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BoundaryState, CountryBoundary, Polygon};
    use foundation::geo::GeoPoint;

    fn square(x0: f64, y0: f64, size: f64) -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(x0, y0),
            GeoPoint::new(x0 + size, y0),
            GeoPoint::new(x0 + size, y0 + size),
            GeoPoint::new(x0, y0 + size),
            GeoPoint::new(x0, y0),
        ]
    }

    #[test]
    fn degenerate_rings_are_rejected() {
        assert!(Polygon::new(vec![GeoPoint::new(0.0, 0.0)], Vec::new()).is_none());
        assert!(Polygon::from_rings(Vec::new()).is_none());
        assert!(CountryBoundary::new(Vec::new()).is_none());
    }

    #[test]
    fn boundary_bbox_spans_all_parts() {
        let a = Polygon::new(square(0.0, 0.0, 1.0), Vec::new()).expect("polygon");
        let b = Polygon::new(square(10.0, -5.0, 2.0), Vec::new()).expect("polygon");
        let boundary = CountryBoundary::new(vec![a, b]).expect("boundary");
        assert_eq!(boundary.bbox().min, [0.0, -5.0]);
        assert_eq!(boundary.bbox().max, [12.0, 1.0]);
    }

    #[test]
    fn only_ready_state_exposes_boundary() {
        let p = Polygon::new(square(0.0, 0.0, 1.0), Vec::new()).expect("polygon");
        let ready = BoundaryState::Ready(CountryBoundary::new(vec![p]).expect("boundary"));
        assert!(ready.boundary().is_some());
        assert!(BoundaryState::Loading.boundary().is_none());
        assert!(BoundaryState::Failed("404".into()).boundary().is_none());
    }
}
