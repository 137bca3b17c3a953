//! Offline checks against boundary files and story feeds.

use std::path::Path;

use foundation::geo::GeoPoint;
use foundation::ids::StoryId;
use foundation::screen::ScreenRect;
use layers::labels::marker_aria_label;
use layers::markers::MarkerColorCache;
use scene::query::TagQuery;
use scene::story::Story;
use serde::Serialize;
use viewport::click::{ClickOutcome, CountryClickRouter};
use viewport::config::MapConfig;
use viewport::controller::ViewportController;
use viewport::engine::{MapEngine, ViewState};
use viewport::mercator_engine::MercatorEngine;
use viewport::placement::PopupPlacementEngine;
use viewport::popup::PopupSize;

#[derive(Debug)]
pub enum ToolError {
    Io(std::io::Error),
    Boundary(formats::BoundaryLoadError),
    Feed(formats::StoryFeedError),
    Config(viewport::config::ConfigError),
    UnknownStory(String),
    Placement(String),
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolError::Io(e) => write!(f, "io error: {e}"),
            ToolError::Boundary(e) => write!(f, "{e}"),
            ToolError::Feed(e) => write!(f, "{e}"),
            ToolError::Config(e) => write!(f, "{e}"),
            ToolError::UnknownStory(id) => write!(f, "no story with id {id}"),
            ToolError::Placement(reason) => write!(f, "placement failed: {reason}"),
        }
    }
}

impl std::error::Error for ToolError {}

impl From<std::io::Error> for ToolError {
    fn from(e: std::io::Error) -> Self {
        ToolError::Io(e)
    }
}

impl From<formats::BoundaryLoadError> for ToolError {
    fn from(e: formats::BoundaryLoadError) -> Self {
        ToolError::Boundary(e)
    }
}

impl From<formats::StoryFeedError> for ToolError {
    fn from(e: formats::StoryFeedError) -> Self {
        ToolError::Feed(e)
    }
}

impl From<viewport::config::ConfigError> for ToolError {
    fn from(e: viewport::config::ConfigError) -> Self {
        ToolError::Config(e)
    }
}

pub fn load_config(path: Option<&Path>) -> Result<MapConfig, ToolError> {
    match path {
        Some(p) => Ok(MapConfig::from_json_str(&std::fs::read_to_string(p)?)?),
        None => Ok(MapConfig::default()),
    }
}

pub fn load_feed(path: &Path) -> Result<Vec<Story>, ToolError> {
    let payload = std::fs::read_to_string(path)?;
    Ok(formats::parse_story_feed(&payload)?)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClickReport {
    pub accepted: bool,
    pub point: Option<GeoPoint>,
    pub message: Option<String>,
}

pub fn check_click(
    boundary_path: &Path,
    click: GeoPoint,
    config: &MapConfig,
) -> Result<ClickReport, ToolError> {
    let boundary = formats::load_boundary_from_path(boundary_path)?;
    let router = CountryClickRouter::new(config.country_name.clone());
    Ok(match router.handle_map_click(click, Some(&boundary)) {
        ClickOutcome::Accepted(point) => ClickReport {
            accepted: true,
            point: Some(point),
            message: None,
        },
        ClickOutcome::Rejected(r) => ClickReport {
            accepted: false,
            point: None,
            message: Some(router.rejection_message(r)),
        },
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerReport {
    pub id: String,
    pub tag: String,
    pub color: String,
    pub label: String,
}

/// Marker colors and labels for the stories that pass `tags`.
pub fn marker_report(stories: &[Story], tags: &[String]) -> Vec<MarkerReport> {
    let visible = TagQuery::with_tags(tags.iter().cloned()).filter(stories);
    let mut cache = MarkerColorCache::new();
    cache.update(&visible);
    visible
        .iter()
        .map(|s| MarkerReport {
            id: s.id.to_string(),
            tag: s.tag.clone(),
            color: cache.color_for(s).to_hex(),
            label: marker_aria_label(s),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlacementReport {
    pub center: ViewState,
    pub marker_x: f64,
    pub marker_y: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct PlaceRequest {
    pub container: ScreenRect,
    pub window_width: f64,
    pub window_height: f64,
    pub popup: PopupSize,
}

/// Runs popup placement for one story from the configured initial view and
/// reports where the camera settles.
pub fn place(
    stories: &[Story],
    id: &str,
    request: PlaceRequest,
    config: &MapConfig,
) -> Result<PlacementReport, ToolError> {
    let story = stories
        .iter()
        .find(|s| s.id == StoryId::new(id))
        .ok_or_else(|| ToolError::UnknownStory(id.to_string()))?;

    let engine = MercatorEngine::new(config.initial_view, request.container)
        .with_zoom_range(config.min_zoom, config.max_zoom)
        .with_max_bounds(config.max_bounds.to_aabb());
    let mut viewport = ViewportController::new(config.initial_view);
    viewport.mount(engine);
    viewport.set_window_size(request.window_width, request.window_height);

    let popup = config.popup_bounds.clamp(request.popup);
    PopupPlacementEngine::new(config.placement)
        .center_for(&mut viewport, story, popup)
        .ok_or_else(|| ToolError::Placement("container has no size".to_string()))?;

    if let Some(engine) = viewport.engine_mut() {
        engine.finish();
    }
    viewport.sync_from_engine();

    let marker = viewport
        .project_to_screen(story.position)
        .ok_or_else(|| ToolError::Placement("marker not projectable".to_string()))?;
    let center = viewport
        .engine()
        .map(|e| e.camera())
        .unwrap_or_else(|| viewport.view_state());
    Ok(PlacementReport {
        center,
        marker_x: marker.x,
        marker_y: marker.y,
    })
}

#[cfg(test)]
mod tests {
    use super::{PlaceRequest, marker_report, place};
    use foundation::geo::GeoPoint;
    use foundation::screen::ScreenRect;
    use pretty_assertions::assert_eq;
    use scene::story::Story;
    use viewport::config::MapConfig;
    use viewport::popup::PopupSize;

    fn stories() -> Vec<Story> {
        vec![
            Story::new("a", GeoPoint::new(-79.38, 43.65), "Hopeful")
                .with_title("Garden")
                .with_secondary_tags(["Food & water"]),
            Story::new("b", GeoPoint::new(-123.12, 49.28), "Unknown").with_title("Rain"),
        ]
    }

    #[test]
    fn report_lists_colors_for_visible_stories() {
        let all = marker_report(&stories(), &[]);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].color, "#22c55e");
        assert_eq!(all[0].label, "Garden. Emotion: Hopeful. Topic: Food & water.");
        assert_eq!(all[1].color, "#94a3b8");

        let filtered = marker_report(&stories(), &["Unknown".to_string()]);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "b");
    }

    #[test]
    fn place_settles_marker_on_target() {
        let request = PlaceRequest {
            container: ScreenRect::new(0.0, 0.0, 1200.0, 900.0),
            window_width: 1200.0,
            window_height: 900.0,
            popup: PopupSize::default(),
        };
        let report = place(&stories(), "a", request, &MapConfig::default()).expect("place");
        assert!((report.marker_x - 600.0).abs() < 1e-6);
        assert!((report.marker_y - 648.0).abs() < 1e-6);
    }

    #[test]
    fn place_rejects_unknown_ids() {
        let request = PlaceRequest {
            container: ScreenRect::new(0.0, 0.0, 800.0, 600.0),
            window_width: 800.0,
            window_height: 600.0,
            popup: PopupSize::default(),
        };
        assert!(place(&stories(), "zzz", request, &MapConfig::default()).is_err());
    }
}
