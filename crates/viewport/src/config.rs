use foundation::bounds::Aabb2;
use foundation::geo::GeoPoint;
use serde::{Deserialize, Serialize};

use crate::engine::ViewState;
use crate::placement::PlacementConfig;
use crate::popup::{PopupSize, SizeBounds};
use crate::search::SearchOptions;

/// South-west / north-east corners the camera may not leave.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaxBounds {
    pub south_west: GeoPoint,
    pub north_east: GeoPoint,
}

impl MaxBounds {
    pub fn to_aabb(self) -> Aabb2 {
        Aabb2::new(
            [self.south_west.lon_deg, self.south_west.lat_deg],
            [self.north_east.lon_deg, self.north_east.lat_deg],
        )
    }
}

impl Default for MaxBounds {
    fn default() -> Self {
        Self {
            south_west: GeoPoint::new(-141.002197, 41.676556),
            north_east: GeoPoint::new(-52.620281, 83.110626),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeolocationConfig {
    /// Zoom for the silent placement on startup.
    pub initial_zoom: f64,
    /// "Locate me" flight.
    pub locate_zoom: f64,
    pub locate_duration_ms: f64,
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            initial_zoom: 10.0,
            locate_zoom: 12.0,
            locate_duration_ms: 2000.0,
        }
    }
}

/// Everything tunable about one map instance. Every field has a default,
/// so a partial JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub initial_view: ViewState,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub max_bounds: MaxBounds,
    pub country_name: String,
    pub placement: PlacementConfig,
    pub popup_bounds: SizeBounds,
    pub popup_default: PopupSize,
    pub search: SearchOptions,
    pub geolocation: GeolocationConfig,
    /// Delay before the engine re-reads its container after the side panel
    /// opens or closes (matches the panel's CSS transition).
    pub side_panel_resize_delay_ms: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            initial_view: ViewState::new(-96.8283, 62.3947, 4.0),
            min_zoom: 4.0,
            max_zoom: 20.0,
            max_bounds: MaxBounds::default(),
            country_name: "Canada".to_string(),
            placement: PlacementConfig::default(),
            popup_bounds: SizeBounds::default(),
            popup_default: PopupSize::default(),
            search: SearchOptions::default(),
            geolocation: GeolocationConfig::default(),
            side_panel_resize_delay_ms: 350.0,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Json(serde_json::Error),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Json(e) => write!(f, "invalid config JSON: {e}"),
            ConfigError::Invalid(reason) => write!(f, "invalid config: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Json(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl MapConfig {
    pub fn from_json_str(payload: &str) -> Result<Self, ConfigError> {
        let config: MapConfig = serde_json::from_str(payload).map_err(ConfigError::Json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_zoom.is_finite() && self.max_zoom.is_finite()) || self.min_zoom > self.max_zoom
        {
            return Err(ConfigError::Invalid(format!(
                "zoom range {}..{} is empty",
                self.min_zoom, self.max_zoom
            )));
        }
        let b = self.max_bounds;
        if !(b.south_west.is_finite() && b.north_east.is_finite())
            || b.south_west.lon_deg >= b.north_east.lon_deg
            || b.south_west.lat_deg >= b.north_east.lat_deg
        {
            return Err(ConfigError::Invalid("max bounds are inverted".to_string()));
        }
        if !self.popup_bounds.is_valid() {
            return Err(ConfigError::Invalid("popup size bounds are inverted".to_string()));
        }
        let p = &self.placement;
        if !(0.0..=1.0).contains(&p.preferred_fraction) {
            return Err(ConfigError::Invalid(format!(
                "preferred fraction {} outside 0..1",
                p.preferred_fraction
            )));
        }
        if p.duration_ms < 0.0 || self.side_panel_resize_delay_ms < 0.0 {
            return Err(ConfigError::Invalid("durations must be non-negative".to_string()));
        }
        if self.country_name.trim().is_empty() {
            return Err(ConfigError::Invalid("country name is empty".to_string()));
        }
        Ok(())
    }
}
