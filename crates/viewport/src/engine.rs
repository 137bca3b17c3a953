use foundation::geo::GeoPoint;
use foundation::math::easing::Easing;
use foundation::screen::{ScreenPoint, ScreenRect};

/// Camera of a 2D Web Mercator map: center plus zoom.
#[derive(Debug, Copy, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct ViewState {
    pub lon_deg: f64,
    pub lat_deg: f64,
    pub zoom: f64,
}

impl ViewState {
    pub const fn new(lon_deg: f64, lat_deg: f64, zoom: f64) -> Self {
        Self {
            lon_deg,
            lat_deg,
            zoom,
        }
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(self.lon_deg, self.lat_deg)
    }

    pub fn with_center(self, center: GeoPoint) -> Self {
        Self {
            lon_deg: center.lon_deg,
            lat_deg: center.lat_deg,
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The engine refused the call (handler missing, invalid state).
    Rejected(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Rejected(reason) => write!(f, "map engine rejected call: {reason}"),
        }
    }
}

impl std::error::Error for EngineError {}

/// The map-rendering engine as seen by the controller.
///
/// Camera transitions are owned by the engine. Starting a new one supersedes
/// whatever is in flight.
pub trait MapEngine {
    /// Current (possibly mid-transition) camera.
    fn camera(&self) -> ViewState;

    /// Container rectangle in window pixels, `None` before layout.
    fn container_rect(&self) -> Option<ScreenRect>;

    fn project(&self, point: GeoPoint) -> Option<ScreenPoint>;

    fn unproject(&self, px: ScreenPoint) -> Option<GeoPoint>;

    fn jump_to(&mut self, view: ViewState);

    fn fly_to(&mut self, center: GeoPoint, zoom: f64, duration_ms: f64);

    fn ease_to(&mut self, center: GeoPoint, duration_ms: f64, easing: Easing);

    /// Pans so that the point `(dx, dy)` pixels away from the center becomes
    /// the new center.
    fn pan_by(&mut self, dx: f64, dy: f64, duration_ms: f64, easing: Easing);

    fn set_drag_pan(&mut self, enabled: bool) -> Result<(), EngineError>;

    /// Re-reads the container size after a layout change.
    fn resize(&mut self);
}
