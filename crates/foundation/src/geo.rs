use serde::{Deserialize, Serialize};

/// Geographic position in degrees (WGS84 longitude/latitude order).
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon_deg: f64,
    pub lat_deg: f64,
}

impl GeoPoint {
    pub const fn new(lon_deg: f64, lat_deg: f64) -> Self {
        Self { lon_deg, lat_deg }
    }

    pub fn is_finite(&self) -> bool {
        self.lon_deg.is_finite() && self.lat_deg.is_finite()
    }

    /// Rounds both coordinates to `decimals` places (5 places is roughly 1 m).
    pub fn rounded(self, decimals: u32) -> Self {
        Self {
            lon_deg: round_to_decimals(self.lon_deg, decimals),
            lat_deg: round_to_decimals(self.lat_deg, decimals),
        }
    }
}

impl From<[f64; 2]> for GeoPoint {
    fn from(v: [f64; 2]) -> Self {
        Self::new(v[0], v[1])
    }
}

pub fn round_to_decimals(v: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (v * scale).round() / scale
}

pub fn wrap_lon_deg(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

#[cfg(test)]
mod tests {
    use super::{GeoPoint, round_to_decimals, wrap_lon_deg};

    #[test]
    fn rounds_to_five_decimals() {
        let p = GeoPoint::new(-79.383_456_78, 43.653_221_9).rounded(5);
        assert_eq!(p, GeoPoint::new(-79.38346, 43.65322));
    }

    #[test]
    fn round_keeps_short_values() {
        assert_eq!(round_to_decimals(-79.38, 5), -79.38);
        assert_eq!(round_to_decimals(0.0, 5), 0.0);
    }

    #[test]
    fn wraps_longitude_into_range() {
        assert!((wrap_lon_deg(190.0) - -170.0).abs() < 1e-9);
        assert!((wrap_lon_deg(-190.0) - 170.0).abs() < 1e-9);
        assert!((wrap_lon_deg(45.0) - 45.0).abs() < 1e-9);
    }

    #[test]
    fn non_finite_points_are_flagged() {
        assert!(!GeoPoint::new(f64::NAN, 1.0).is_finite());
        assert!(GeoPoint::new(1.0, 2.0).is_finite());
    }
}
