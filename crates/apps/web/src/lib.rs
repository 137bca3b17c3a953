//! Browser entry points for the story map.
//!
//! The page owns the map library, the geocoder and the DOM; it forwards
//! events here and the viewport crate decides what the camera, popup and
//! search box do.

use foundation::geo::GeoPoint;
use foundation::ids::StoryId;
use foundation::time::Time;
use gloo_net::http::Request;
use layers::labels::marker_aria_label;
use runtime::frame::Frame;
use runtime::orientation::{LandscapePrompt, OrientationService, is_mobile_device};
use scene::query::TagQuery;
use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};
use viewport::click::ClickOutcome;
use viewport::config::MapConfig;
use viewport::geolocation::GeolocationError;
use viewport::resize::PointerEvent;
use viewport::search::Key;
use viewport::story_map::StoryMap;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::Element;

mod bridge;
use bridge::{
    JsCreationFlow, JsGeocoderFactory, JsMap, JsNotifier, NoCreationFlow, WebEngine,
    WebPointerPlatform, WebSearchHost, log,
};

static INITIALIZED: AtomicBool = AtomicBool::new(false);

type WebStoryMap = StoryMap<WebEngine, WebPointerPlatform, WebSearchHost>;

struct WebState {
    map: Option<WebStoryMap>,
    flow: Option<JsCreationFlow>,
    orientation: OrientationService,
    frame: Frame,
    last_frame_ms: Option<f64>,
}

thread_local! {
    static STATE: RefCell<WebState> = RefCell::new(WebState {
        map: None,
        flow: None,
        orientation: OrientationService::new(false, false),
        frame: Frame::new(0, 0.0),
        last_frame_ms: None,
    });
}

/// Runs `f` against the mounted map. Calls made while the state is already
/// borrowed (a map callback re-entering during a camera call) are dropped.
fn with_map<F, R>(f: F) -> R
where
    F: FnOnce(&mut WebStoryMap, &mut Option<JsCreationFlow>) -> R,
    R: Default,
{
    STATE
        .try_with(|state| {
            let Ok(mut s) = state.try_borrow_mut() else {
                log("story map busy; event dropped");
                return R::default();
            };
            let WebState { map, flow, .. } = &mut *s;
            match map.as_mut() {
                Some(m) => f(m, flow),
                None => R::default(),
            }
        })
        .unwrap_or_default()
}

fn with_state<F, R>(f: F) -> R
where
    F: FnOnce(&mut WebState) -> R,
    R: Default,
{
    STATE
        .try_with(|state| match state.try_borrow_mut() {
            Ok(mut s) => f(&mut s),
            Err(_) => R::default(),
        })
        .unwrap_or_default()
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }
    console_error_panic_hook::set_once();
    Ok(())
}

fn pointer_event(ev: &web_sys::PointerEvent) -> PointerEvent {
    PointerEvent::new(ev.pointer_id(), f64::from(ev.client_x()), f64::from(ev.client_y()))
}

fn pointer_closure(handler: fn(&mut WebStoryMap, PointerEvent)) -> Closure<dyn FnMut(web_sys::PointerEvent)> {
    Closure::wrap(Box::new(move |ev: web_sys::PointerEvent| {
        let event = pointer_event(&ev);
        with_map(|map, _| handler(map, event));
    }) as Box<dyn FnMut(web_sys::PointerEvent)>)
}

// ── lifecycle ────────────────────────────────────────────────

/// Mounts the story map on an initialized map library instance.
///
/// `config_json` overrides [`MapConfig`] defaults; `notify(message,
/// isError)` shows user-facing messages.
#[wasm_bindgen]
pub fn mount(
    map: JsMap,
    geocoder: JsGeocoderFactory,
    search_container: Option<Element>,
    resize_handle: Option<Element>,
    notify: js_sys::Function,
    config_json: Option<String>,
) -> Result<(), JsValue> {
    let config = match config_json.as_deref() {
        Some(json) => {
            MapConfig::from_json_str(json).map_err(|e| JsValue::from_str(&e.to_string()))?
        }
        None => MapConfig::default(),
    };

    // The previous map shares the search container; it has to be gone
    // before the new widget is created there.
    let previous = with_state(|s| {
        s.last_frame_ms = None;
        s.map.take()
    });
    if let Some(mut previous) = previous {
        previous.unmount();
    }

    let platform = WebPointerPlatform::new(
        resize_handle,
        pointer_closure(WebStoryMap::on_pointer_move),
        pointer_closure(WebStoryMap::on_pointer_up),
        pointer_closure(WebStoryMap::on_pointer_cancel),
    );
    let host = WebSearchHost::new(map.clone(), geocoder, search_container);
    let mut story_map = StoryMap::new(config, platform, host, Box::new(JsNotifier::new(notify)));

    if let Some(window) = web_sys::window() {
        let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        if width > 0.0 && height > 0.0 {
            story_map.viewport_mut().set_window_size(width, height);
        }
    }
    story_map.mount(WebEngine::new(map));

    STATE
        .try_with(|state| {
            state
                .try_borrow_mut()
                .map(|mut s| s.map = Some(story_map))
                .map_err(|_| JsValue::from_str("story map busy"))
        })
        .map_err(|_| JsValue::from_str("story map state unavailable"))??;
    Ok(())
}

/// Tears the map down. Safe to call more than once.
#[wasm_bindgen]
pub fn unmount() {
    let taken = with_state(|s| {
        s.flow = None;
        s.map.take()
    });
    if let Some(mut map) = taken {
        map.unmount();
    }
}

/// Registers the page's story submission form.
#[wasm_bindgen]
pub fn set_creation_flow(flow: JsCreationFlow) {
    with_state(|s| s.flow = Some(flow));
}

/// Drives deferred work. Call once per `requestAnimationFrame` with its
/// timestamp.
#[wasm_bindgen]
pub fn animation_frame(timestamp_ms: f64) {
    let frame = with_state(|s| {
        let dt_s = s
            .last_frame_ms
            .map(|last| ((timestamp_ms - last) / 1000.0).max(0.0))
            .unwrap_or(0.0);
        s.last_frame_ms = Some(timestamp_ms);
        s.frame = Frame::at(s.frame.index + 1, dt_s, Time::from_millis(timestamp_ms));
        Some(s.frame)
    });
    if let Some(frame) = frame {
        with_map(|map, _| map.on_animation_frame(frame));
    }
}

// ── data ─────────────────────────────────────────────────────

/// Fetches the country boundary GeoJSON. Until it arrives, clicks are
/// rejected.
#[wasm_bindgen]
pub fn load_boundary(url: String) {
    spawn_local(async move {
        match fetch_boundary(&url).await {
            Ok(boundary) => with_map(|map, _| map.set_boundary(boundary)),
            Err(err) => {
                log(&format!("boundary load failed: {err}"));
                with_map(|map, _| map.boundary_failed(err));
            }
        }
    });
}

async fn fetch_boundary(url: &str) -> Result<scene::boundary::CountryBoundary, String> {
    let resp = Request::get(url).send().await.map_err(|e| e.to_string())?;
    if !resp.ok() {
        return Err(format!("HTTP {} for {url}", resp.status()));
    }
    let text = resp.text().await.map_err(|e| e.to_string())?;
    formats::load_boundary_from_str(&text).map_err(|e| e.to_string())
}

/// Replaces the story set from a backend JSON payload. Returns how many
/// stories were accepted.
#[wasm_bindgen]
pub fn set_stories_json(json: &str) -> Result<usize, JsValue> {
    let stories = formats::parse_story_feed(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let count = stories.len();
    with_map(|map, _| map.set_stories(stories));
    Ok(count)
}

#[wasm_bindgen]
pub fn set_tag_filter(tags: Vec<String>) {
    with_map(|map, _| map.set_tag_filter(TagQuery::with_tags(tags)));
}

#[wasm_bindgen]
pub fn toggle_tag(tag: &str) {
    with_map(|map, _| map.toggle_tag(tag));
}

/// Distinct primary tags across all stories, as a JSON array.
#[wasm_bindgen]
pub fn all_tags_json() -> String {
    let tags = with_map(|map, _| map.all_tags());
    serde_json::to_string(&tags).unwrap_or_else(|_| "[]".to_string())
}

/// Markers to render: `[{id, lon, lat, color, label}]`.
#[wasm_bindgen]
pub fn visible_markers_json() -> String {
    let markers = with_map(|map, _| {
        map.visible_stories()
            .iter()
            .map(|s| {
                serde_json::json!({
                    "id": s.id.as_str(),
                    "lon": s.position.lon_deg,
                    "lat": s.position.lat_deg,
                    "color": map.marker_color(s).to_hex(),
                    "label": marker_aria_label(s),
                })
            })
            .collect::<Vec<_>>()
    });
    serde_json::Value::Array(markers).to_string()
}

// ── popup ────────────────────────────────────────────────────

/// Opens the popup for a story and moves the camera so it fits.
#[wasm_bindgen]
pub fn select_story(id: &str) -> bool {
    with_map(|map, _| map.select_story(&StoryId::new(id)).is_some())
}

#[wasm_bindgen]
pub fn close_popup() {
    with_map(|map, _| map.close_popup());
}

/// Content and size of the open popup, or `None` when closed.
#[wasm_bindgen]
pub fn popup_card_json() -> Option<String> {
    let card = with_map(|map, _| map.popup_card())?;
    let badge = card.badge.map(|b| {
        serde_json::json!({
            "label": b.label,
            "color": b.color.to_hex(),
            "background": b.background,
        })
    });
    Some(
        serde_json::json!({
            "title": card.title,
            "description": card.description,
            "image": card.image,
            "badge": badge,
            "secondaryTags": card.secondary_tags,
            "date": card.date,
            "width": card.size.width,
            "height": card.size.height,
        })
        .to_string(),
    )
}

/// Starts a popup resize drag from the handle's `pointerdown`.
#[wasm_bindgen]
pub fn on_resize_handle_down(ev: web_sys::PointerEvent) -> bool {
    let event = pointer_event(&ev);
    let started = with_map(|map, _| map.on_resize_handle_down(event));
    if started {
        ev.prevent_default();
        ev.stop_propagation();
    }
    started
}

// ── clicks ───────────────────────────────────────────────────

#[wasm_bindgen]
pub fn activate_create_mode() {
    with_map(|map, flow| match flow.as_mut() {
        Some(f) => map.activate_create_mode(f),
        None => map.activate_create_mode(&mut NoCreationFlow),
    });
}

/// Validates a map click. Returns whether it landed inside the country.
#[wasm_bindgen]
pub fn on_map_click(lon: f64, lat: f64) -> bool {
    let click = GeoPoint::new(lon, lat);
    with_map(|map, flow| {
        let outcome = match flow.as_mut() {
            Some(f) => map.on_map_click(click, f),
            None => map.on_map_click(click, &mut NoCreationFlow),
        };
        matches!(outcome, ClickOutcome::Accepted(_))
    })
}

#[wasm_bindgen]
pub fn on_map_right_click() {
    with_map(|map, flow| match flow.as_mut() {
        Some(f) => map.on_map_right_click(f),
        None => map.on_map_right_click(&mut NoCreationFlow),
    });
}

// ── search ───────────────────────────────────────────────────

/// The geocoder picked a place.
#[wasm_bindgen]
pub fn on_search_result(lon: f64, lat: f64) {
    with_map(|map, _| map.on_search_result(GeoPoint::new(lon, lat)));
}

#[wasm_bindgen]
pub fn on_search_click() {
    with_map(|map, _| map.on_search_click());
}

#[wasm_bindgen]
pub fn on_search_hover(entered: bool) {
    with_map(|map, _| {
        if entered {
            map.search_mut().on_hover_enter();
        } else {
            map.search_mut().on_hover_leave();
        }
    });
}

#[wasm_bindgen]
pub fn on_search_focus(focused: bool) {
    with_map(|map, _| {
        if focused {
            map.search_mut().on_focus_in();
        } else {
            map.search_mut().on_focus_out();
        }
    });
}

#[wasm_bindgen]
pub fn on_pointer_down_outside_search() {
    with_map(|map, _| map.search_mut().on_pointer_down_outside());
}

#[wasm_bindgen]
pub fn search_expanded() -> bool {
    with_map(|map, _| map.search().is_expanded())
}

/// Keyboard events (`KeyboardEvent.key`).
#[wasm_bindgen]
pub fn on_key(key: &str) {
    let key = if key == "Escape" { Key::Escape } else { Key::Other };
    with_map(|map, _| map.on_key(key));
}

// ── layout ───────────────────────────────────────────────────

/// Window resize. Returns whether the rotate-device prompt should show.
#[wasm_bindgen]
pub fn on_window_resize(width: f64, height: f64) -> bool {
    with_map(|map, _| map.on_window_resize(width, height));
    with_state(|s| s.orientation.on_viewport_changed(width, height) == LandscapePrompt::Shown)
}

#[wasm_bindgen]
pub fn on_side_panel_toggled() {
    with_map(|map, _| map.on_side_panel_toggled());
}

/// Applies the persisted landscape preference and classifies the device.
#[wasm_bindgen]
pub fn init_orientation(force_landscape: bool) -> bool {
    let Some(window) = web_sys::window() else {
        return false;
    };
    let ua = window.navigator().user_agent().unwrap_or_default();
    let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let has_touch = window.navigator().max_touch_points() > 0;
    let mobile = is_mobile_device(&ua, width, has_touch);
    with_state(|s| {
        s.orientation.dispose();
        s.orientation = OrientationService::new(force_landscape, mobile);
        s.orientation.on_viewport_changed(width, height) == LandscapePrompt::Shown
    })
}

/// Updates the landscape preference. Returns whether the prompt shows now.
#[wasm_bindgen]
pub fn set_force_landscape(force: bool) -> bool {
    with_state(|s| {
        s.orientation.set_force_landscape(force);
        s.orientation.prompt() == LandscapePrompt::Shown
    })
}

// ── geolocation ──────────────────────────────────────────────

#[wasm_bindgen]
pub fn on_initial_position(lon: f64, lat: f64) {
    with_map(|map, _| map.on_initial_position(Ok(GeoPoint::new(lon, lat))));
}

/// `code` is `GeolocationPositionError.code` (0 when geolocation is missing).
#[wasm_bindgen]
pub fn on_initial_position_error(code: u16, message: &str) {
    let err = GeolocationError::from_code(code, message);
    with_map(|map, _| map.on_initial_position(Err(err)));
}

#[wasm_bindgen]
pub fn on_locate_success(lon: f64, lat: f64) {
    with_map(|map, _| map.on_locate_result(Ok(GeoPoint::new(lon, lat))));
}

#[wasm_bindgen]
pub fn on_locate_error(code: u16, message: &str) {
    let err = GeolocationError::from_code(code, message);
    with_map(|map, _| map.on_locate_result(Err(err)));
}
