use std::fs;
use std::path::{Path, PathBuf};

use scene::boundary::{CountryBoundary, Polygon};
use tracing::{debug, warn};

use crate::geojson::{GeoJsonDocument, GeoJsonError, Geometry};

#[derive(Debug)]
pub enum BoundaryLoadError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(GeoJsonError),
    /// The document parsed but carried no usable polygon.
    NoPolygons,
}

impl std::fmt::Display for BoundaryLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoundaryLoadError::Io { path, source } => {
                write!(f, "failed to read boundary {}: {source}", path.display())
            }
            BoundaryLoadError::Parse(e) => write!(f, "failed to parse boundary: {e}"),
            BoundaryLoadError::NoPolygons => write!(f, "boundary contains no polygon geometry"),
        }
    }
}

impl std::error::Error for BoundaryLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BoundaryLoadError::Io { source, .. } => Some(source),
            BoundaryLoadError::Parse(e) => Some(e),
            BoundaryLoadError::NoPolygons => None,
        }
    }
}

impl From<GeoJsonError> for BoundaryLoadError {
    fn from(e: GeoJsonError) -> Self {
        BoundaryLoadError::Parse(e)
    }
}

pub fn load_boundary_from_path(path: impl AsRef<Path>) -> Result<CountryBoundary, BoundaryLoadError> {
    let path = path.as_ref();
    let payload = fs::read_to_string(path).map_err(|source| BoundaryLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_boundary_from_str(&payload)
}

pub fn load_boundary_from_str(payload: &str) -> Result<CountryBoundary, BoundaryLoadError> {
    let doc = GeoJsonDocument::from_str(payload)?;
    boundary_from_document(&doc)
}

/// Merges every polygonal feature into one boundary. Non-polygonal features
/// are skipped, as are polygons with a degenerate exterior ring.
pub fn boundary_from_document(doc: &GeoJsonDocument) -> Result<CountryBoundary, BoundaryLoadError> {
    let mut polygons = Vec::new();
    let mut skipped = 0usize;

    for geometry in doc.geometries() {
        match geometry {
            Geometry::Polygon(rings) => match Polygon::from_rings(rings.clone()) {
                Some(p) => polygons.push(p),
                None => skipped += 1,
            },
            Geometry::MultiPolygon(parts) => {
                for rings in parts {
                    match Polygon::from_rings(rings.clone()) {
                        Some(p) => polygons.push(p),
                        None => skipped += 1,
                    }
                }
            }
            other => debug!(kind = other.type_name(), "skipping non-polygon boundary feature"),
        }
    }

    if skipped > 0 {
        warn!(skipped, "dropped degenerate boundary polygons");
    }
    debug!(polygons = polygons.len(), "boundary loaded");

    CountryBoundary::new(polygons).ok_or(BoundaryLoadError::NoPolygons)
}

#[cfg(test)]
mod tests {
    use super::{BoundaryLoadError, load_boundary_from_path, load_boundary_from_str};
    use foundation::geo::GeoPoint;
    use scene::containment::contains;

    const TWO_FEATURES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"name": "mainland"},
             "geometry": {"type": "Polygon", "coordinates": [
                [[-140,42],[-53,42],[-53,70],[-140,70],[-140,42]],
                [[-90,45],[-80,45],[-80,50],[-90,50],[-90,45]]
             ]}},
            {"type": "Feature", "properties": {"name": "islands"},
             "geometry": {"type": "MultiPolygon", "coordinates": [
                [[[-100,75],[-80,75],[-80,82],[-100,82],[-100,75]]],
                [[[0,0],[1,1]]]
             ]}},
            {"type": "Feature", "properties": {},
             "geometry": {"type": "Point", "coordinates": [-75, 45]}}
        ]
    }"#;

    #[test]
    fn merges_all_polygonal_features() {
        let boundary = load_boundary_from_str(TWO_FEATURES).expect("load");
        assert_eq!(boundary.polygons().len(), 2);
        assert!(contains(GeoPoint::new(-79.38, 43.65), Some(&boundary)));
        assert!(contains(GeoPoint::new(-90.0, 78.0), Some(&boundary)));
        assert!(!contains(GeoPoint::new(-85.0, 47.0), Some(&boundary)));
    }

    #[test]
    fn points_only_document_has_no_polygons() {
        let payload = r#"{"type": "Point", "coordinates": [-75, 45]}"#;
        assert!(matches!(
            load_boundary_from_str(payload),
            Err(BoundaryLoadError::NoPolygons)
        ));
    }

    #[test]
    fn parse_errors_are_wrapped() {
        assert!(matches!(
            load_boundary_from_str("{"),
            Err(BoundaryLoadError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_boundary_from_path("/nonexistent/canada.geojson").expect_err("missing");
        assert!(err.to_string().contains("canada.geojson"));
    }
}
