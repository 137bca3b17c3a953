//! Camera placement that keeps an opened popup fully on screen.
//!
//! The popup is anchored above its marker, so the marker has to sit low
//! enough for the whole card (plus padding) to fit above it, but not so low
//! that it slides under the bottom chrome.

use foundation::geo::GeoPoint;
use foundation::math::clamp_low_wins;
use foundation::math::easing::Easing;
use foundation::screen::{ScreenPoint, ScreenRect, WindowSize};
use scene::story::Story;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::controller::ViewportController;
use crate::engine::MapEngine;
use crate::popup::PopupSize;

/// Which horizontal center the marker is moved to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizontalAnchor {
    /// Middle of the browser window, expressed in container coordinates.
    /// Keeps the card centered on screen when a side panel shifts the map.
    #[default]
    Window,
    /// Middle of the map container.
    Container,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    pub top_padding_px: f64,
    pub bottom_padding_px: f64,
    /// Space between the card and its marker.
    pub gap_px: f64,
    /// Preferred marker height as a fraction of the container height.
    pub preferred_fraction: f64,
    pub duration_ms: f64,
    #[serde(skip)]
    pub easing: Easing,
    pub anchor: HorizontalAnchor,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            top_padding_px: 24.0,
            bottom_padding_px: 90.0,
            gap_px: 16.0,
            preferred_fraction: 0.72,
            duration_ms: 1400.0,
            easing: Easing::EaseOutCubic,
            anchor: HorizontalAnchor::Window,
        }
    }
}

/// Where the marker should end up, in container pixels.
///
/// When the card is too tall for the container the lower bound wins, so the
/// top of the card stays visible.
pub fn target_marker_position(
    config: &PlacementConfig,
    container: ScreenRect,
    window: WindowSize,
    popup: PopupSize,
) -> ScreenPoint {
    let min_y = (popup.height + config.top_padding_px + config.gap_px).ceil();
    let preferred_y = (container.height * config.preferred_fraction).floor();
    let max_y = (container.height - config.bottom_padding_px).floor();
    let y = clamp_low_wins(preferred_y, min_y, max_y);

    let x = match config.anchor {
        HorizontalAnchor::Window => window.width / 2.0 - container.left,
        HorizontalAnchor::Container => container.width / 2.0,
    };
    ScreenPoint::new(x, y)
}

#[derive(Debug, Clone, Default)]
pub struct PopupPlacementEngine {
    config: PlacementConfig,
}

impl PopupPlacementEngine {
    pub fn new(config: PlacementConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    /// Starts an eased camera move that brings `story`'s marker to the
    /// target position and returns the destination center. `None` (and no
    /// camera change) when the engine is not ready.
    pub fn center_for<E: MapEngine>(
        &self,
        viewport: &mut ViewportController<E>,
        story: &Story,
        popup: PopupSize,
    ) -> Option<GeoPoint> {
        let container = viewport.container_bounds()?;
        let target = target_marker_position(&self.config, container, viewport.window_size(), popup);

        let camera = viewport.camera()?;
        let marker_px = viewport.project_to_screen(story.position)?;
        let center_px = viewport.project_to_screen(camera.center())?;

        let dx = marker_px.x - target.x;
        let dy = marker_px.y - target.y;
        let new_center = viewport.unproject_from_screen(center_px.offset(dx, dy))?;

        debug!(story = %story.id, dx, dy, "placing popup");
        viewport.ease_to(new_center, self.config.duration_ms, self.config.easing);
        Some(new_center)
    }
}
