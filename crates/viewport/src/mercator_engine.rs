//! In-memory Web Mercator engine.
//!
//! Implements [`MapEngine`] with the same screen math a vector tile engine
//! uses (512 px tiles), and animates camera transitions when the host calls
//! [`MercatorEngine::tick`]. Used by the CLI and throughout the tests.

use foundation::bounds::Aabb2;
use foundation::geo::GeoPoint;
use foundation::math::easing::Easing;
use foundation::math::mercator::{
    inverse_mercator_lat_deg, inverse_mercator_lon_deg, mercator_x_m, mercator_y_m,
    project_to_px, unproject_from_px,
};
use foundation::screen::{ScreenPoint, ScreenRect};

use crate::engine::{EngineError, MapEngine, ViewState};

#[derive(Debug, Clone, PartialEq)]
struct Transition {
    from: ViewState,
    to: ViewState,
    elapsed_ms: f64,
    duration_ms: f64,
    easing: Easing,
}

impl Transition {
    fn sample(&self) -> ViewState {
        let t = if self.duration_ms <= 0.0 {
            1.0
        } else {
            self.elapsed_ms / self.duration_ms
        };
        let k = self.easing.apply(t);

        // Interpolate in Mercator meters so straight screen paths stay straight.
        let x0 = mercator_x_m(self.from.lon_deg);
        let y0 = mercator_y_m(self.from.lat_deg);
        let x1 = mercator_x_m(self.to.lon_deg);
        let y1 = mercator_y_m(self.to.lat_deg);
        ViewState::new(
            inverse_mercator_lon_deg(x0 + (x1 - x0) * k),
            inverse_mercator_lat_deg(y0 + (y1 - y0) * k),
            self.from.zoom + (self.to.zoom - self.from.zoom) * k,
        )
    }

    fn is_done(&self) -> bool {
        self.elapsed_ms >= self.duration_ms
    }
}

#[derive(Debug, Clone)]
pub struct MercatorEngine {
    camera: ViewState,
    container: ScreenRect,
    min_zoom: f64,
    max_zoom: f64,
    max_bounds: Option<Aabb2>,
    transition: Option<Transition>,
    drag_pan: bool,
    drag_pan_supported: bool,
    resize_count: u32,
}

impl MercatorEngine {
    pub fn new(camera: ViewState, container: ScreenRect) -> Self {
        Self {
            camera,
            container,
            min_zoom: 0.0,
            max_zoom: 22.0,
            max_bounds: None,
            transition: None,
            drag_pan: true,
            drag_pan_supported: true,
            resize_count: 0,
        }
    }

    pub fn with_zoom_range(mut self, min_zoom: f64, max_zoom: f64) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom.max(min_zoom);
        self.camera = self.constrain(self.camera);
        self
    }

    /// Keeps the camera center inside `bounds`.
    pub fn with_max_bounds(mut self, bounds: Aabb2) -> Self {
        self.max_bounds = Some(bounds);
        self.camera = self.constrain(self.camera);
        self
    }

    /// Simulates an engine whose drag-pan handler is unavailable.
    pub fn without_drag_pan(mut self) -> Self {
        self.drag_pan_supported = false;
        self
    }

    pub fn set_container(&mut self, container: ScreenRect) {
        self.container = container;
    }

    pub fn drag_pan_enabled(&self) -> bool {
        self.drag_pan
    }

    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    pub fn resize_count(&self) -> u32 {
        self.resize_count
    }

    /// Final camera of the in-flight transition, or the current camera.
    pub fn target_camera(&self) -> ViewState {
        self.transition
            .as_ref()
            .map(|t| t.to)
            .unwrap_or(self.camera)
    }

    /// Advances the in-flight transition by `dt_ms`.
    pub fn tick(&mut self, dt_ms: f64) {
        let Some(tr) = self.transition.as_mut() else {
            return;
        };
        tr.elapsed_ms += dt_ms.max(0.0);
        if tr.is_done() {
            self.camera = tr.to;
            self.transition = None;
        } else {
            self.camera = tr.sample();
        }
    }

    /// Runs the in-flight transition to completion.
    pub fn finish(&mut self) {
        if let Some(tr) = self.transition.take() {
            self.camera = tr.to;
        }
    }

    fn constrain(&self, view: ViewState) -> ViewState {
        let zoom = view.zoom.clamp(self.min_zoom, self.max_zoom);
        let center = match self.max_bounds {
            Some(b) => b.clamp(view.center()),
            None => view.center(),
        };
        ViewState { zoom, ..view }.with_center(center)
    }

    fn start(&mut self, to: ViewState, duration_ms: f64, easing: Easing) {
        let to = self.constrain(to);
        if duration_ms <= 0.0 {
            self.transition = None;
            self.camera = to;
            return;
        }
        self.transition = Some(Transition {
            from: self.camera,
            to,
            elapsed_ms: 0.0,
            duration_ms,
            easing,
        });
    }
}

impl MapEngine for MercatorEngine {
    fn camera(&self) -> ViewState {
        self.camera
    }

    fn container_rect(&self) -> Option<ScreenRect> {
        if self.container.width <= 0.0 || self.container.height <= 0.0 {
            return None;
        }
        Some(self.container)
    }

    fn project(&self, point: GeoPoint) -> Option<ScreenPoint> {
        if !point.is_finite() {
            return None;
        }
        let c = self.container_rect()?;
        let [x, y] = project_to_px(point, self.camera.center(), self.camera.zoom, c.width, c.height);
        Some(ScreenPoint::new(x, y))
    }

    fn unproject(&self, px: ScreenPoint) -> Option<GeoPoint> {
        let c = self.container_rect()?;
        let p = unproject_from_px(
            [px.x, px.y],
            self.camera.center(),
            self.camera.zoom,
            c.width,
            c.height,
        );
        p.is_finite().then_some(p)
    }

    fn jump_to(&mut self, view: ViewState) {
        self.start(view, 0.0, Easing::Linear);
    }

    fn fly_to(&mut self, center: GeoPoint, zoom: f64, duration_ms: f64) {
        let to = ViewState::new(center.lon_deg, center.lat_deg, zoom);
        self.start(to, duration_ms, Easing::EaseOutCubic);
    }

    fn ease_to(&mut self, center: GeoPoint, duration_ms: f64, easing: Easing) {
        let to = self.camera.with_center(center);
        self.start(to, duration_ms, easing);
    }

    fn pan_by(&mut self, dx: f64, dy: f64, duration_ms: f64, easing: Easing) {
        let Some(c) = self.container_rect() else {
            return;
        };
        let target = c.center().offset(dx, dy);
        if let Some(center) = self.unproject(target) {
            self.ease_to(center, duration_ms, easing);
        }
    }

    fn set_drag_pan(&mut self, enabled: bool) -> Result<(), EngineError> {
        if !self.drag_pan_supported {
            return Err(EngineError::Rejected("dragPan handler unavailable".to_string()));
        }
        self.drag_pan = enabled;
        Ok(())
    }

    fn resize(&mut self) {
        self.resize_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::MercatorEngine;
    use crate::engine::{EngineError, MapEngine, ViewState};
    use foundation::bounds::Aabb2;
    use foundation::geo::GeoPoint;
    use foundation::math::easing::Easing;
    use foundation::screen::{ScreenPoint, ScreenRect};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn engine() -> MercatorEngine {
        MercatorEngine::new(
            ViewState::new(-96.8283, 62.3947, 4.0),
            ScreenRect::new(0.0, 0.0, 1000.0, 800.0),
        )
    }

    #[test]
    fn camera_center_projects_to_container_middle() {
        let e = engine();
        let px = e.project(e.camera().center()).expect("project");
        assert_close(px.x, 500.0, 1e-9);
        assert_close(px.y, 400.0, 1e-9);
    }

    #[test]
    fn ease_to_reaches_target_after_duration() {
        let mut e = engine();
        let target = GeoPoint::new(-79.38, 43.65);
        e.ease_to(target, 1400.0, Easing::EaseOutCubic);
        assert!(e.is_animating());
        e.tick(700.0);
        let mid = e.camera();
        assert!(mid.lon_deg > -96.8283 && mid.lon_deg < -79.38);
        e.tick(700.0);
        assert!(!e.is_animating());
        assert_close(e.camera().lon_deg, -79.38, 1e-9);
        assert_close(e.camera().lat_deg, 43.65, 1e-9);
        assert_eq!(e.camera().zoom, 4.0);
    }

    #[test]
    fn new_transition_supersedes_in_flight_one() {
        let mut e = engine();
        e.fly_to(GeoPoint::new(-79.38, 43.65), 10.0, 1500.0);
        e.tick(100.0);
        e.ease_to(GeoPoint::new(-123.1, 49.28), 1400.0, Easing::Linear);
        e.finish();
        assert_close(e.camera().lon_deg, -123.1, 1e-9);
        // Zoom is whatever the superseded flight had reached, not 10.
        assert!(e.camera().zoom < 10.0);
    }

    #[test]
    fn zoom_and_center_are_constrained() {
        let mut e = engine()
            .with_zoom_range(4.0, 20.0)
            .with_max_bounds(Aabb2::new([-141.0, 41.7], [-52.6, 83.1]));
        e.fly_to(GeoPoint::new(2.35, 48.85), 25.0, 0.0);
        assert_eq!(e.camera().zoom, 20.0);
        assert_close(e.camera().lon_deg, -52.6, 1e-12);
    }

    #[test]
    fn pan_by_moves_offset_point_to_center() {
        let mut e = engine();
        let expected = e.unproject(ScreenPoint::new(600.0, 350.0)).expect("unproject");
        e.pan_by(100.0, -50.0, 0.0, Easing::Linear);
        assert_close(e.camera().lon_deg, expected.lon_deg, 1e-9);
        assert_close(e.camera().lat_deg, expected.lat_deg, 1e-9);
    }

    #[test]
    fn unlaid_container_has_no_projection() {
        let mut e = engine();
        e.set_container(ScreenRect::new(0.0, 0.0, 0.0, 0.0));
        assert!(e.container_rect().is_none());
        assert!(e.project(GeoPoint::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn drag_pan_can_be_unavailable() {
        let mut e = engine().without_drag_pan();
        assert!(matches!(e.set_drag_pan(false), Err(EngineError::Rejected(_))));
        assert!(e.drag_pan_enabled());
    }
}
