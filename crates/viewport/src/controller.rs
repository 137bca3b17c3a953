use foundation::geo::GeoPoint;
use foundation::math::easing::Easing;
use foundation::screen::{ScreenPoint, ScreenRect, WindowSize};
use runtime::event_bus::{EventBus, Subscription};
use tracing::{debug, warn};

pub use crate::engine::ViewState;
use crate::engine::MapEngine;

/// Published on the controller's event bus.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewportEvent {
    Moved(ViewState),
    PanningChanged(bool),
}

/// Sole owner of camera mutation.
///
/// Wraps an optional [`MapEngine`]; until one is mounted every operation is a
/// no-op that returns `None`. `ViewState` mirrors the engine camera and is
/// refreshed by [`ViewportController::sync_from_engine`].
pub struct ViewportController<E: MapEngine> {
    engine: Option<E>,
    view: ViewState,
    window: WindowSize,
    panning_enabled: bool,
    events: EventBus<ViewportEvent>,
}

impl<E: MapEngine> std::fmt::Debug for ViewportController<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewportController")
            .field("mounted", &self.engine.is_some())
            .field("view", &self.view)
            .field("window", &self.window)
            .field("panning_enabled", &self.panning_enabled)
            .finish()
    }
}

impl<E: MapEngine> ViewportController<E> {
    pub fn new(initial: ViewState) -> Self {
        Self {
            engine: None,
            view: initial,
            window: WindowSize::default(),
            panning_enabled: true,
            events: EventBus::new(),
        }
    }

    /// Attaches the engine, jumps it to the current view and applies the
    /// remembered panning state.
    pub fn mount(&mut self, mut engine: E) {
        engine.jump_to(self.view);
        if let Err(err) = engine.set_drag_pan(self.panning_enabled) {
            warn!(%err, "could not apply panning state on mount");
        }
        self.engine = Some(engine);
        self.sync_from_engine();
    }

    pub fn unmount(&mut self) -> Option<E> {
        self.engine.take()
    }

    pub fn is_ready(&self) -> bool {
        self.engine.is_some()
    }

    pub fn engine(&self) -> Option<&E> {
        self.engine.as_ref()
    }

    pub fn engine_mut(&mut self) -> Option<&mut E> {
        self.engine.as_mut()
    }

    pub fn view_state(&self) -> ViewState {
        self.view
    }

    /// Live engine camera, which may be mid-transition.
    pub fn camera(&self) -> Option<ViewState> {
        self.engine.as_ref().map(MapEngine::camera)
    }

    /// Copies the engine camera into the view state and publishes `Moved`
    /// when it changed.
    pub fn sync_from_engine(&mut self) {
        let Some(engine) = self.engine.as_ref() else {
            return;
        };
        let cam = engine.camera();
        if cam != self.view {
            self.view = cam;
            self.events.emit(&ViewportEvent::Moved(cam));
        }
    }

    /// Sets the view directly, without animation.
    pub fn jump_to(&mut self, view: ViewState) {
        self.view = view;
        if let Some(engine) = self.engine.as_mut() {
            engine.jump_to(view);
        }
        self.sync_from_engine();
    }

    pub fn fly_to(&mut self, center: GeoPoint, zoom: f64, duration_ms: f64) {
        if let Some(engine) = self.engine.as_mut() {
            engine.fly_to(center, zoom, duration_ms);
        }
    }

    pub fn ease_to(&mut self, center: GeoPoint, duration_ms: f64, easing: Easing) {
        if let Some(engine) = self.engine.as_mut() {
            engine.ease_to(center, duration_ms, easing);
        }
    }

    pub fn pan_by_pixels(&mut self, dx: f64, dy: f64, duration_ms: f64, easing: Easing) {
        if let Some(engine) = self.engine.as_mut() {
            engine.pan_by(dx, dy, duration_ms, easing);
        }
    }

    pub fn project_to_screen(&self, point: GeoPoint) -> Option<ScreenPoint> {
        self.engine.as_ref()?.project(point)
    }

    pub fn unproject_from_screen(&self, px: ScreenPoint) -> Option<GeoPoint> {
        self.engine.as_ref()?.unproject(px)
    }

    pub fn container_bounds(&self) -> Option<ScreenRect> {
        self.engine.as_ref()?.container_rect()
    }

    pub fn panning_enabled(&self) -> bool {
        self.panning_enabled
    }

    /// Best-effort. The requested state is remembered even when the engine
    /// refuses, and re-applied on the next mount.
    pub fn set_panning_enabled(&mut self, enabled: bool) {
        if let Some(engine) = self.engine.as_mut() {
            if let Err(err) = engine.set_drag_pan(enabled) {
                warn!(%err, enabled, "ignoring drag-pan toggle failure");
            }
        }
        if self.panning_enabled != enabled {
            self.panning_enabled = enabled;
            debug!(enabled, "panning toggled");
            self.events.emit(&ViewportEvent::PanningChanged(enabled));
        }
    }

    pub fn window_size(&self) -> WindowSize {
        self.window
    }

    pub fn set_window_size(&mut self, width: f64, height: f64) {
        if width.is_finite() && height.is_finite() && width >= 0.0 && height >= 0.0 {
            self.window = WindowSize::new(width, height);
        }
    }

    /// Forwards a container layout change to the engine.
    pub fn resize(&mut self) {
        if let Some(engine) = self.engine.as_mut() {
            engine.resize();
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&ViewportEvent) + 'static) -> Subscription {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, sub: Subscription) -> bool {
        self.events.unsubscribe(sub)
    }
}
