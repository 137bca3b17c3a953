//! Spherical Web Mercator helpers.
//!
//! Screen math uses the tile convention of vector map engines: at zoom `z`
//! the whole world is `TILE_SIZE_PX * 2^z` pixels wide.

use crate::geo::{GeoPoint, wrap_lon_deg};

/// WGS84 semi-major axis (meters).
pub const WGS84_A: f64 = 6_378_137.0;

pub const MERCATOR_MAX_LAT_DEG: f64 = 85.05112878;

pub const TILE_SIZE_PX: f64 = 512.0;

pub fn world_width_m() -> f64 {
    2.0 * std::f64::consts::PI * WGS84_A
}

pub fn mercator_x_m(lon_deg: f64) -> f64 {
    WGS84_A * lon_deg.to_radians()
}

pub fn mercator_y_m(lat_deg: f64) -> f64 {
    let lat = lat_deg
        .clamp(-MERCATOR_MAX_LAT_DEG, MERCATOR_MAX_LAT_DEG)
        .to_radians();
    WGS84_A * (0.5 * (std::f64::consts::FRAC_PI_2 + lat)).tan().ln()
}

pub fn inverse_mercator_lon_deg(x_m: f64) -> f64 {
    (x_m / WGS84_A).to_degrees()
}

pub fn inverse_mercator_lat_deg(y_m: f64) -> f64 {
    let lat = 2.0 * (y_m / WGS84_A).exp().atan() - std::f64::consts::FRAC_PI_2;
    lat.to_degrees()
}

/// Pixels per Mercator meter at `zoom`.
pub fn scale_px_per_m(zoom: f64) -> f64 {
    TILE_SIZE_PX * 2f64.powf(zoom) / world_width_m()
}

/// Projects `p` into screen pixels for a camera centered on `center`, with
/// the camera center drawn at the middle of a `width` x `height` container.
pub fn project_to_px(p: GeoPoint, center: GeoPoint, zoom: f64, width: f64, height: f64) -> [f64; 2] {
    let scale = scale_px_per_m(zoom);
    let ww = world_width_m();
    let dx = (mercator_x_m(p.lon_deg) - mercator_x_m(center.lon_deg) + 0.5 * ww).rem_euclid(ww)
        - 0.5 * ww;
    let dy = mercator_y_m(p.lat_deg) - mercator_y_m(center.lat_deg);
    [width * 0.5 + dx * scale, height * 0.5 - dy * scale]
}

/// Inverse of [`project_to_px`].
pub fn unproject_from_px(
    px: [f64; 2],
    center: GeoPoint,
    zoom: f64,
    width: f64,
    height: f64,
) -> GeoPoint {
    let scale = scale_px_per_m(zoom);
    let x_m = mercator_x_m(center.lon_deg) + (px[0] - width * 0.5) / scale;
    let y_m = mercator_y_m(center.lat_deg) + (height * 0.5 - px[1]) / scale;
    GeoPoint::new(
        wrap_lon_deg(inverse_mercator_lon_deg(x_m)),
        inverse_mercator_lat_deg(y_m).clamp(-MERCATOR_MAX_LAT_DEG, MERCATOR_MAX_LAT_DEG),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn mercator_roundtrip_latitude() {
        let lat = 43.65;
        assert_close(inverse_mercator_lat_deg(mercator_y_m(lat)), lat, 1e-9);
    }

    #[test]
    fn center_projects_to_container_middle() {
        let c = GeoPoint::new(-96.8, 62.4);
        let px = project_to_px(c, c, 4.0, 800.0, 600.0);
        assert_close(px[0], 400.0, 1e-9);
        assert_close(px[1], 300.0, 1e-9);
    }

    #[test]
    fn project_unproject_roundtrip() {
        let c = GeoPoint::new(-96.8, 62.4);
        let p = GeoPoint::new(-79.38, 43.65);
        let px = project_to_px(p, c, 5.0, 1024.0, 768.0);
        let back = unproject_from_px(px, c, 5.0, 1024.0, 768.0);
        assert_close(back.lon_deg, p.lon_deg, 1e-9);
        assert_close(back.lat_deg, p.lat_deg, 1e-9);
    }

    #[test]
    fn north_is_up_on_screen() {
        let c = GeoPoint::new(0.0, 0.0);
        let north = project_to_px(GeoPoint::new(0.0, 10.0), c, 2.0, 100.0, 100.0);
        assert!(north[1] < 50.0);
    }

    #[test]
    fn world_is_tile_size_wide_at_zoom_zero() {
        assert_close(scale_px_per_m(0.0) * world_width_m(), TILE_SIZE_PX, 1e-9);
    }
}
