use foundation::geo::GeoPoint;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(GeoPoint),
    MultiPoint(Vec<GeoPoint>),
    LineString(Vec<GeoPoint>),
    MultiLineString(Vec<Vec<GeoPoint>>),
    Polygon(Vec<Vec<GeoPoint>>),
    MultiPolygon(Vec<Vec<Vec<GeoPoint>>>),
}

impl Geometry {
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Point(_) => "Point",
            Geometry::MultiPoint(_) => "MultiPoint",
            Geometry::LineString(_) => "LineString",
            Geometry::MultiLineString(_) => "MultiLineString",
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPolygon(_) => "MultiPolygon",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: Option<String>,
    pub properties: Map<String, Value>,
    /// `None` for features with a `null` geometry.
    pub geometry: Option<Geometry>,
}

/// Normalized GeoJSON payload.
///
/// A `FeatureCollection`, a single `Feature`, or a bare geometry object are
/// all accepted; the latter two become a one-element feature list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeoJsonDocument {
    pub features: Vec<Feature>,
}

#[derive(Debug)]
pub enum GeoJsonError {
    Json(serde_json::Error),
    NotAnObject,
    UnsupportedType(String),
    InvalidFeature { index: usize, reason: String },
}

impl std::fmt::Display for GeoJsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeoJsonError::Json(e) => write!(f, "JSON parse error: {e}"),
            GeoJsonError::NotAnObject => write!(f, "expected a GeoJSON object"),
            GeoJsonError::UnsupportedType(ty) => write!(f, "unsupported GeoJSON type: {ty}"),
            GeoJsonError::InvalidFeature { index, reason } => {
                write!(f, "invalid feature at index {index}: {reason}")
            }
        }
    }
}

impl std::error::Error for GeoJsonError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GeoJsonError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl GeoJsonDocument {
    pub fn from_str(payload: &str) -> Result<Self, GeoJsonError> {
        let value: Value = serde_json::from_str(payload).map_err(GeoJsonError::Json)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, GeoJsonError> {
        let obj = value.as_object().ok_or(GeoJsonError::NotAnObject)?;
        let ty = obj
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or(GeoJsonError::NotAnObject)?;

        match ty {
            "FeatureCollection" => {
                let features_val = obj
                    .get("features")
                    .and_then(|v| v.as_array())
                    .ok_or_else(|| GeoJsonError::InvalidFeature {
                        index: 0,
                        reason: "FeatureCollection missing features array".to_string(),
                    })?;
                let mut features = Vec::with_capacity(features_val.len());
                for (index, feat_val) in features_val.iter().enumerate() {
                    let feature = parse_feature(feat_val)
                        .map_err(|reason| GeoJsonError::InvalidFeature { index, reason })?;
                    features.push(feature);
                }
                Ok(Self { features })
            }
            "Feature" => {
                let feature = parse_feature(value)
                    .map_err(|reason| GeoJsonError::InvalidFeature { index: 0, reason })?;
                Ok(Self {
                    features: vec![feature],
                })
            }
            "Point" | "MultiPoint" | "LineString" | "MultiLineString" | "Polygon"
            | "MultiPolygon" => {
                let geometry = parse_geometry(value)
                    .map_err(|reason| GeoJsonError::InvalidFeature { index: 0, reason })?;
                Ok(Self {
                    features: vec![Feature {
                        id: None,
                        properties: Map::new(),
                        geometry: Some(geometry),
                    }],
                })
            }
            other => Err(GeoJsonError::UnsupportedType(other.to_string())),
        }
    }

    pub fn geometries(&self) -> impl Iterator<Item = &Geometry> {
        self.features.iter().filter_map(|f| f.geometry.as_ref())
    }
}

fn parse_feature(value: &Value) -> Result<Feature, String> {
    let feat_obj = value
        .as_object()
        .ok_or("feature must be an object".to_string())?;

    let feat_type = feat_obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("feature missing type".to_string())?;
    if feat_type != "Feature" {
        return Err(format!("unexpected feature type: {feat_type}"));
    }

    let id = match feat_obj.get("id") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    let properties = feat_obj
        .get("properties")
        .and_then(|v| v.as_object())
        .cloned()
        .unwrap_or_default();

    let geometry = match feat_obj.get("geometry") {
        None | Some(Value::Null) => None,
        Some(v) => Some(parse_geometry(v)?),
    };

    Ok(Feature {
        id,
        properties,
        geometry,
    })
}

fn parse_geometry(value: &Value) -> Result<Geometry, String> {
    let obj = value
        .as_object()
        .ok_or("geometry must be an object".to_string())?;
    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("geometry missing type".to_string())?;

    let coords = obj
        .get("coordinates")
        .ok_or("geometry missing coordinates".to_string())?;

    match ty {
        "Point" => Ok(Geometry::Point(parse_point(coords)?)),
        "MultiPoint" => Ok(Geometry::MultiPoint(parse_points(coords)?)),
        "LineString" => Ok(Geometry::LineString(parse_points(coords)?)),
        "MultiLineString" => Ok(Geometry::MultiLineString(parse_rings(coords)?)),
        "Polygon" => Ok(Geometry::Polygon(parse_rings(coords)?)),
        "MultiPolygon" => Ok(Geometry::MultiPolygon(parse_multi_polygon(coords)?)),
        other => Err(format!("unsupported geometry type: {other}")),
    }
}

pub(crate) fn parse_point(coords: &Value) -> Result<GeoPoint, String> {
    let arr = coords
        .as_array()
        .ok_or("position must be an array".to_string())?;
    if arr.len() < 2 {
        return Err("position must have [lon, lat]".to_string());
    }
    let lon = arr[0].as_f64().ok_or("lon must be a number".to_string())?;
    let lat = arr[1].as_f64().ok_or("lat must be a number".to_string())?;
    Ok(GeoPoint::new(lon, lat))
}

fn parse_points(coords: &Value) -> Result<Vec<GeoPoint>, String> {
    let arr = coords
        .as_array()
        .ok_or("coordinates must be an array".to_string())?;
    arr.iter().map(parse_point).collect()
}

fn parse_rings(coords: &Value) -> Result<Vec<Vec<GeoPoint>>, String> {
    let rings = coords
        .as_array()
        .ok_or("coordinates must be an array of rings".to_string())?;
    rings.iter().map(parse_points).collect()
}

fn parse_multi_polygon(coords: &Value) -> Result<Vec<Vec<Vec<GeoPoint>>>, String> {
    let polys = coords
        .as_array()
        .ok_or("MultiPolygon coordinates must be an array of polygons".to_string())?;
    polys.iter().map(parse_rings).collect()
}

#[cfg(test)]
mod tests {
    use super::{GeoJsonDocument, GeoJsonError, Geometry};

    #[test]
    fn parses_feature_collection() {
        let payload = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "id": 7, "properties": {"name": "a"},
                 "geometry": {"type": "Point", "coordinates": [-79.38, 43.65]}},
                {"type": "Feature", "properties": null, "geometry": null}
            ]
        }"#;
        let doc = GeoJsonDocument::from_str(payload).expect("parse");
        assert_eq!(doc.features.len(), 2);
        assert_eq!(doc.features[0].id.as_deref(), Some("7"));
        assert_eq!(doc.geometries().count(), 1);
    }

    #[test]
    fn bare_geometry_becomes_single_feature() {
        let payload = r#"{"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]]}"#;
        let doc = GeoJsonDocument::from_str(payload).expect("parse");
        assert_eq!(doc.features.len(), 1);
        assert!(matches!(doc.features[0].geometry, Some(Geometry::Polygon(_))));
    }

    #[test]
    fn single_feature_is_accepted() {
        let payload = r#"{"type": "Feature", "properties": {},
            "geometry": {"type": "MultiPolygon", "coordinates": [[[[0,0],[1,0],[1,1],[0,0]]]]}}"#;
        let doc = GeoJsonDocument::from_str(payload).expect("parse");
        assert_eq!(
            doc.features[0].geometry.as_ref().map(Geometry::type_name),
            Some("MultiPolygon")
        );
    }

    #[test]
    fn reports_bad_feature_index() {
        let payload = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": [1, 2]}},
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": ["x", 2]}}
        ]}"#;
        match GeoJsonDocument::from_str(payload) {
            Err(GeoJsonError::InvalidFeature { index, .. }) => assert_eq!(index, 1),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_types_and_bad_json() {
        assert!(matches!(
            GeoJsonDocument::from_str(r#"{"type": "Topology"}"#),
            Err(GeoJsonError::UnsupportedType(_))
        ));
        assert!(matches!(
            GeoJsonDocument::from_str("not json"),
            Err(GeoJsonError::Json(_))
        ));
    }
}
