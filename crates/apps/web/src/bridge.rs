//! Adapters from the page's JavaScript objects to the viewport traits.
//!
//! The page hands in thin wrapper objects around the map library and the
//! geocoder; everything those wrappers expose is flat numbers and strings.

use foundation::geo::GeoPoint;
use foundation::math::easing::Easing;
use foundation::screen::{ScreenPoint, ScreenRect};
use viewport::click::Notifier;
use viewport::engine::{EngineError, MapEngine, ViewState};
use viewport::resize::{CaptureError, PointerPlatform};
use viewport::search::{SearchHost, SearchWidget, WidgetError, WidgetOptions};
use viewport::story_map::StoryCreationFlow;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Element;

#[wasm_bindgen]
extern "C" {
    /// Map library wrapper. `project`/`unproject` return `[x, y]` /
    /// `[lon, lat]`; `containerRect` returns `[left, top, width, height]`
    /// relative to the window.
    #[derive(Clone)]
    pub type JsMap;

    #[wasm_bindgen(method, js_name = centerLon)]
    fn center_lon(this: &JsMap) -> f64;
    #[wasm_bindgen(method, js_name = centerLat)]
    fn center_lat(this: &JsMap) -> f64;
    #[wasm_bindgen(method)]
    fn zoom(this: &JsMap) -> f64;
    #[wasm_bindgen(method)]
    fn loaded(this: &JsMap) -> bool;
    #[wasm_bindgen(method, js_name = containerRect)]
    fn container_rect(this: &JsMap) -> js_sys::Array;
    #[wasm_bindgen(method)]
    fn project(this: &JsMap, lon: f64, lat: f64) -> js_sys::Array;
    #[wasm_bindgen(method)]
    fn unproject(this: &JsMap, x: f64, y: f64) -> js_sys::Array;
    #[wasm_bindgen(method, js_name = jumpTo)]
    fn jump_to(this: &JsMap, lon: f64, lat: f64, zoom: f64);
    #[wasm_bindgen(method, js_name = flyTo)]
    fn fly_to(this: &JsMap, lon: f64, lat: f64, zoom: f64, duration_ms: f64);
    #[wasm_bindgen(method, js_name = easeTo)]
    fn ease_to(this: &JsMap, lon: f64, lat: f64, duration_ms: f64, easing: &str);
    #[wasm_bindgen(method, js_name = panBy)]
    fn pan_by(this: &JsMap, dx: f64, dy: f64, duration_ms: f64, easing: &str);
    #[wasm_bindgen(method, catch, js_name = setDragPan)]
    fn set_drag_pan(this: &JsMap, enabled: bool) -> Result<(), JsValue>;
    #[wasm_bindgen(method)]
    fn resize(this: &JsMap);

    /// Builds geocoder widgets inside a container element.
    pub type JsGeocoderFactory;

    #[wasm_bindgen(method, catch)]
    fn create(
        this: &JsGeocoderFactory,
        container: &Element,
        access_token: &str,
        country_code: &str,
        placeholder: &str,
        zoom: f64,
        marker: bool,
        fly_to: bool,
    ) -> Result<JsGeocoder, JsValue>;

    pub type JsGeocoder;

    #[wasm_bindgen(method, catch)]
    fn clear(this: &JsGeocoder) -> Result<(), JsValue>;
    #[wasm_bindgen(method, js_name = clearInput)]
    fn clear_input(this: &JsGeocoder);
    #[wasm_bindgen(method, js_name = blurInput)]
    fn blur_input(this: &JsGeocoder);
    #[wasm_bindgen(method, js_name = focusInput)]
    fn focus_input(this: &JsGeocoder);
    #[wasm_bindgen(method)]
    fn remove(this: &JsGeocoder);

    /// Story submission form owned by the page.
    pub type JsCreationFlow;

    #[wasm_bindgen(method, js_name = openForm)]
    fn open_form_at(this: &JsCreationFlow, lon: f64, lat: f64);
    #[wasm_bindgen(method, js_name = createModeChanged)]
    fn report_create_mode(this: &JsCreationFlow, active: bool);
}

pub(crate) fn log(msg: &str) {
    web_sys::console::log_1(&JsValue::from_str(msg));
}

pub(crate) fn js_error_text(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

fn pair(values: &js_sys::Array) -> Option<(f64, f64)> {
    let a = values.get(0).as_f64()?;
    let b = values.get(1).as_f64()?;
    (a.is_finite() && b.is_finite()).then_some((a, b))
}

fn easing_name(easing: Easing) -> &'static str {
    match easing {
        Easing::Linear => "linear",
        Easing::EaseOutCubic => "ease-out-cubic",
    }
}

// ── engine ───────────────────────────────────────────────────

#[derive(Clone)]
pub struct WebEngine {
    map: JsMap,
}

impl WebEngine {
    pub fn new(map: JsMap) -> Self {
        Self { map }
    }
}

impl MapEngine for WebEngine {
    fn camera(&self) -> ViewState {
        ViewState::new(self.map.center_lon(), self.map.center_lat(), self.map.zoom())
    }

    fn container_rect(&self) -> Option<ScreenRect> {
        let r = self.map.container_rect();
        let left = r.get(0).as_f64()?;
        let top = r.get(1).as_f64()?;
        let width = r.get(2).as_f64()?;
        let height = r.get(3).as_f64()?;
        (width > 0.0 && height > 0.0).then(|| ScreenRect::new(left, top, width, height))
    }

    fn project(&self, point: GeoPoint) -> Option<ScreenPoint> {
        let (x, y) = pair(&self.map.project(point.lon_deg, point.lat_deg))?;
        Some(ScreenPoint::new(x, y))
    }

    fn unproject(&self, px: ScreenPoint) -> Option<GeoPoint> {
        let (lon, lat) = pair(&self.map.unproject(px.x, px.y))?;
        Some(GeoPoint::new(lon, lat))
    }

    fn jump_to(&mut self, view: ViewState) {
        self.map.jump_to(view.lon_deg, view.lat_deg, view.zoom);
    }

    fn fly_to(&mut self, center: GeoPoint, zoom: f64, duration_ms: f64) {
        self.map.fly_to(center.lon_deg, center.lat_deg, zoom, duration_ms);
    }

    fn ease_to(&mut self, center: GeoPoint, duration_ms: f64, easing: Easing) {
        self.map
            .ease_to(center.lon_deg, center.lat_deg, duration_ms, easing_name(easing));
    }

    fn pan_by(&mut self, dx: f64, dy: f64, duration_ms: f64, easing: Easing) {
        self.map.pan_by(dx, dy, duration_ms, easing_name(easing));
    }

    fn set_drag_pan(&mut self, enabled: bool) -> Result<(), EngineError> {
        self.map
            .set_drag_pan(enabled)
            .map_err(|e| EngineError::Rejected(js_error_text(&e)))
    }

    fn resize(&mut self) {
        self.map.resize();
    }
}

// ── search ───────────────────────────────────────────────────

pub struct WebSearchWidget {
    inner: JsGeocoder,
}

impl SearchWidget for WebSearchWidget {
    fn clear_query(&mut self) -> Result<(), WidgetError> {
        self.inner
            .clear()
            .map_err(|e| WidgetError::Operation(js_error_text(&e)))
    }

    fn clear_input(&mut self) {
        self.inner.clear_input();
    }

    fn blur_input(&mut self) {
        self.inner.blur_input();
    }

    fn focus_input(&mut self) {
        self.inner.focus_input();
    }

    fn remove(&mut self) {
        self.inner.remove();
    }
}

pub struct WebSearchHost {
    map: JsMap,
    factory: JsGeocoderFactory,
    container: Option<Element>,
}

impl WebSearchHost {
    pub fn new(map: JsMap, factory: JsGeocoderFactory, container: Option<Element>) -> Self {
        Self {
            map,
            factory,
            container,
        }
    }
}

impl SearchHost for WebSearchHost {
    type Widget = WebSearchWidget;

    fn engine_ready(&self) -> bool {
        self.map.loaded()
    }

    fn container_ready(&self) -> bool {
        self.container.as_ref().is_some_and(|c| c.is_connected())
    }

    fn create_widget(&mut self, options: &WidgetOptions) -> Result<Self::Widget, WidgetError> {
        let container = self
            .container
            .as_ref()
            .ok_or_else(|| WidgetError::Create("search container missing".to_string()))?;
        let inner = self
            .factory
            .create(
                container,
                &options.access_token,
                &options.country_code,
                &options.placeholder,
                options.zoom,
                options.marker,
                options.fly_to,
            )
            .map_err(|e| WidgetError::Create(js_error_text(&e)))?;
        Ok(WebSearchWidget { inner })
    }

    fn clear_container(&mut self) {
        if let Some(c) = &self.container {
            c.set_inner_html("");
        }
    }
}

// ── pointer ──────────────────────────────────────────────────

type PointerClosure = Closure<dyn FnMut(web_sys::PointerEvent)>;

/// Drag listeners go on the document in the capture phase, ahead of any
/// handler that stops propagation of `pointerup`.
pub(crate) const DRAG_LISTENER_CAPTURE: bool = true;

pub(crate) const DRAG_EVENTS: [&str; 3] = ["pointermove", "pointerup", "pointercancel"];

/// Pointer capture and document listeners for popup resizing.
///
/// The listener closures live as long as the platform; attaching and
/// detaching only registers them with the document, so a listener can
/// safely end the drag it is running in.
pub struct WebPointerPlatform {
    document: Option<web_sys::Document>,
    handle: Option<Element>,
    on_move: PointerClosure,
    on_up: PointerClosure,
    on_cancel: PointerClosure,
    attached: bool,
}

impl WebPointerPlatform {
    pub fn new(
        handle: Option<Element>,
        on_move: PointerClosure,
        on_up: PointerClosure,
        on_cancel: PointerClosure,
    ) -> Self {
        Self {
            document: web_sys::window().and_then(|w| w.document()),
            handle,
            on_move,
            on_up,
            on_cancel,
            attached: false,
        }
    }

    fn listeners(&self) -> [(&'static str, &PointerClosure); 3] {
        let [moved, up, cancel] = DRAG_EVENTS;
        [(moved, &self.on_move), (up, &self.on_up), (cancel, &self.on_cancel)]
    }
}

impl PointerPlatform for WebPointerPlatform {
    fn capture_pointer(&mut self, pointer_id: i32) -> Result<(), CaptureError> {
        let handle = self.handle.as_ref().ok_or(CaptureError::Unsupported)?;
        handle
            .set_pointer_capture(pointer_id)
            .map_err(|e| CaptureError::Failed(js_error_text(&e)))
    }

    fn release_pointer(&mut self, pointer_id: i32) {
        if let Some(handle) = &self.handle {
            if handle.has_pointer_capture(pointer_id) {
                let _ = handle.release_pointer_capture(pointer_id);
            }
        }
    }

    fn attach_global_listeners(&mut self) {
        if self.attached {
            return;
        }
        let Some(document) = &self.document else {
            return;
        };
        for (name, cb) in self.listeners() {
            if let Err(e) = document.add_event_listener_with_callback_and_bool(
                name,
                cb.as_ref().unchecked_ref(),
                DRAG_LISTENER_CAPTURE,
            ) {
                log(&format!("failed to attach {name}: {}", js_error_text(&e)));
            }
        }
        self.attached = true;
    }

    fn detach_global_listeners(&mut self) {
        if !self.attached {
            return;
        }
        if let Some(document) = &self.document {
            for (name, cb) in self.listeners() {
                let _ = document.remove_event_listener_with_callback_and_bool(
                    name,
                    cb.as_ref().unchecked_ref(),
                    DRAG_LISTENER_CAPTURE,
                );
            }
        }
        self.attached = false;
    }

    fn set_resizing(&mut self, active: bool) {
        let body = self.document.as_ref().and_then(|d| d.body());
        if let Some(body) = body {
            let classes = body.class_list();
            let _ = if active {
                classes.add_1("resizing")
            } else {
                classes.remove_1("resizing")
            };
        }
    }
}

impl Drop for WebPointerPlatform {
    fn drop(&mut self) {
        self.detach_global_listeners();
        self.set_resizing(false);
    }
}

// ── notifier / creation flow ─────────────────────────────────

/// Calls `notify(message, isError)` on the page.
pub struct JsNotifier {
    callback: js_sys::Function,
}

impl JsNotifier {
    pub fn new(callback: js_sys::Function) -> Self {
        Self { callback }
    }
}

impl Notifier for JsNotifier {
    fn notify(&mut self, message: &str, is_error: bool) {
        if let Err(e) = self.callback.call2(
            &JsValue::NULL,
            &JsValue::from_str(message),
            &JsValue::from_bool(is_error),
        ) {
            log(&format!("notify failed: {}", js_error_text(&e)));
        }
    }
}

impl StoryCreationFlow for JsCreationFlow {
    fn open_form(&mut self, point: GeoPoint) {
        self.open_form_at(point.lon_deg, point.lat_deg);
    }

    fn create_mode_changed(&mut self, active: bool) {
        self.report_create_mode(active);
    }
}

/// Stands in when the page has not registered a creation flow; clicks are
/// still validated but nothing opens.
pub struct NoCreationFlow;

impl StoryCreationFlow for NoCreationFlow {
    fn open_form(&mut self, point: GeoPoint) {
        log(&format!(
            "story form requested at {}, {} with no flow registered",
            point.lon_deg, point.lat_deg
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::{DRAG_EVENTS, DRAG_LISTENER_CAPTURE};

    #[test]
    fn drag_end_listeners_run_in_capture_phase() {
        assert!(DRAG_LISTENER_CAPTURE);
        for name in ["pointermove", "pointerup", "pointercancel"] {
            assert!(DRAG_EVENTS.contains(&name), "{name} not registered");
        }
    }
}
