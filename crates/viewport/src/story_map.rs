//! One interactive story map: owns every viewport component and routes host
//! events to them.

use foundation::geo::GeoPoint;
use foundation::ids::StoryId;
use layers::markers::MarkerColorCache;
use layers::symbology::Color;
use runtime::deferred::DeferredQueue;
use runtime::frame::Frame;
use scene::boundary::{BoundaryState, CountryBoundary};
use scene::query::{TagQuery, all_tags};
use scene::story::Story;
use tracing::{debug, info, warn};

use crate::click::{ClickOutcome, CountryClickRouter, Notifier};
use crate::config::MapConfig;
use crate::controller::ViewportController;
use crate::engine::{MapEngine, ViewState};
use crate::geolocation::GeolocationError;
use crate::placement::PopupPlacementEngine;
use crate::popup::{PopupCard, PopupSession, PopupSize};
use crate::resize::{PointerEvent, PointerPlatform, ResizeSessionManager, ResizeState};
use crate::search::{Key, LocationSearchAdapter, SearchHost};

/// Continuations run on a later animation frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DeferredTask {
    AttachSearch,
    FocusSearchInput,
    ResizeEngine,
}

/// The external story submission flow.
pub trait StoryCreationFlow {
    /// Opens the submission form for a validated location.
    fn open_form(&mut self, point: GeoPoint);

    fn create_mode_changed(&mut self, _active: bool) {}
}

/// "Place a story" mode: the next accepted click picks the location.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CreateMode {
    active: bool,
    coordinates: Option<GeoPoint>,
}

impl CreateMode {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn coordinates(&self) -> Option<GeoPoint> {
        self.coordinates
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    /// Records the point and leaves the mode. `false` when inactive.
    pub fn accept(&mut self, point: GeoPoint) -> bool {
        if !self.active {
            return false;
        }
        self.coordinates = Some(point);
        self.active = false;
        true
    }

    /// Leaves the mode and forgets any picked point. Returns whether the
    /// mode was active.
    pub fn cancel(&mut self) -> bool {
        let was_active = self.active;
        self.active = false;
        self.coordinates = None;
        was_active
    }
}

pub struct StoryMap<E: MapEngine, P: PointerPlatform, H: SearchHost> {
    config: MapConfig,
    viewport: ViewportController<E>,
    platform: P,
    search: LocationSearchAdapter<H>,
    placement: PopupPlacementEngine,
    resize: ResizeSessionManager,
    router: CountryClickRouter,
    notifier: Box<dyn Notifier>,
    colors: MarkerColorCache,
    boundary: BoundaryState,
    stories: Vec<Story>,
    query: TagQuery,
    visible: Vec<Story>,
    popup: Option<PopupSession>,
    create_mode: CreateMode,
    deferred: DeferredQueue<DeferredTask>,
}

impl<E: MapEngine, P: PointerPlatform, H: SearchHost> std::fmt::Debug for StoryMap<E, P, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoryMap")
            .field("viewport", &self.viewport)
            .field("search", &self.search)
            .field("resize", &self.resize)
            .field("stories", &self.stories.len())
            .field("visible", &self.visible.len())
            .field("popup_open", &self.popup.is_some())
            .field("create_mode", &self.create_mode)
            .field("deferred", &self.deferred.len())
            .finish()
    }
}

impl<E: MapEngine, P: PointerPlatform, H: SearchHost> StoryMap<E, P, H> {
    pub fn new(config: MapConfig, platform: P, search_host: H, notifier: Box<dyn Notifier>) -> Self {
        Self {
            viewport: ViewportController::new(config.initial_view),
            platform,
            search: LocationSearchAdapter::new(search_host, config.search.clone()),
            placement: PopupPlacementEngine::new(config.placement),
            resize: ResizeSessionManager::new(config.popup_bounds),
            router: CountryClickRouter::new(config.country_name.clone()),
            notifier,
            colors: MarkerColorCache::new(),
            boundary: BoundaryState::Loading,
            stories: Vec::new(),
            query: TagQuery::new(),
            visible: Vec::new(),
            popup: None,
            create_mode: CreateMode::default(),
            deferred: DeferredQueue::new(),
            config,
        }
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn viewport(&self) -> &ViewportController<E> {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut ViewportController<E> {
        &mut self.viewport
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn search(&self) -> &LocationSearchAdapter<H> {
        &self.search
    }

    pub fn search_mut(&mut self) -> &mut LocationSearchAdapter<H> {
        &mut self.search
    }

    pub fn pending_tasks(&self) -> usize {
        self.deferred.len()
    }

    // ── lifecycle ────────────────────────────────────────────

    /// Mounts `engine`. A map that was unmounted can be mounted again; the
    /// search widget is re-created.
    pub fn mount(&mut self, engine: E) {
        self.viewport.mount(engine);
        self.search.rearm();
        self.attach_search();
    }

    /// Tears everything down: resize session, search widget, pending
    /// continuations. Returns the engine. Safe to call repeatedly; also run
    /// on drop.
    pub fn unmount(&mut self) -> Option<E> {
        self.resize.end_resize(&mut self.viewport, &mut self.platform);
        self.search.unmount();
        self.deferred.clear();
        self.viewport.unmount()
    }

    /// Runs due continuations and refreshes the mirrored view state.
    pub fn on_animation_frame(&mut self, frame: Frame) {
        for task in self.deferred.drain_due(frame) {
            match task {
                DeferredTask::AttachSearch => self.attach_search(),
                DeferredTask::FocusSearchInput => self.search.focus_input(),
                DeferredTask::ResizeEngine => self.viewport.resize(),
            }
        }
        self.viewport.sync_from_engine();
    }

    fn attach_search(&mut self) {
        let status = self.search.try_attach();
        if status.should_retry() {
            self.deferred.schedule_next_frame(DeferredTask::AttachSearch);
        } else {
            debug!(?status, "search attach settled");
        }
    }

    // ── data ─────────────────────────────────────────────────

    pub fn set_stories(&mut self, stories: Vec<Story>) {
        self.stories = stories;
        self.refresh_visible();
    }

    pub fn stories(&self) -> &[Story] {
        &self.stories
    }

    pub fn visible_stories(&self) -> &[Story] {
        &self.visible
    }

    pub fn all_tags(&self) -> Vec<String> {
        all_tags(&self.stories)
    }

    pub fn tag_query(&self) -> &TagQuery {
        &self.query
    }

    pub fn set_tag_filter(&mut self, query: TagQuery) {
        self.query = query;
        self.refresh_visible();
    }

    pub fn toggle_tag(&mut self, tag: &str) {
        self.query.toggle(tag);
        self.refresh_visible();
    }

    fn refresh_visible(&mut self) {
        self.visible = self.query.filter(&self.stories);
        self.colors.update(&self.visible);
    }

    pub fn marker_color(&self, story: &Story) -> Color {
        self.colors.color_for(story)
    }

    pub fn color_cache(&self) -> &MarkerColorCache {
        &self.colors
    }

    pub fn set_boundary(&mut self, boundary: CountryBoundary) {
        info!(polygons = boundary.polygons().len(), "country boundary ready");
        self.boundary = BoundaryState::Ready(boundary);
    }

    pub fn boundary_failed(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(%reason, "failed to load country boundary");
        self.boundary = BoundaryState::Failed(reason);
    }

    pub fn boundary_state(&self) -> &BoundaryState {
        &self.boundary
    }

    // ── clicks & create mode ─────────────────────────────────

    pub fn create_mode(&self) -> CreateMode {
        self.create_mode
    }

    pub fn activate_create_mode(&mut self, flow: &mut impl StoryCreationFlow) {
        if !self.create_mode.is_active() {
            self.create_mode.activate();
            flow.create_mode_changed(true);
        }
    }

    /// Validates a click against the country. Rejections are reported
    /// through the notifier; an accepted click while in create mode opens
    /// the submission form.
    pub fn on_map_click(
        &mut self,
        click: GeoPoint,
        flow: &mut impl StoryCreationFlow,
    ) -> ClickOutcome {
        let outcome = self.router.handle_click(click, &self.boundary);
        match outcome {
            ClickOutcome::Rejected(rejection) => {
                self.notifier
                    .notify(&self.router.rejection_message(rejection), true);
            }
            ClickOutcome::Accepted(point) => {
                if self.create_mode.accept(point) {
                    flow.open_form(point);
                    flow.create_mode_changed(false);
                }
            }
        }
        outcome
    }

    pub fn on_map_right_click(&mut self, flow: &mut impl StoryCreationFlow) {
        if self.create_mode.cancel() {
            flow.create_mode_changed(false);
        }
    }

    // ── popup ────────────────────────────────────────────────

    /// Opens the popup for a visible story at the default size, abandons
    /// any resize in progress and re-centers the camera.
    pub fn select_story(&mut self, id: &StoryId) -> Option<GeoPoint> {
        let story = self.visible.iter().find(|s| &s.id == id)?.clone();
        let size = self.config.popup_default;
        self.popup = Some(PopupSession::open(
            story.clone(),
            size,
            &self.config.popup_bounds,
        ));
        self.resize.end_resize(&mut self.viewport, &mut self.platform);
        self.placement.center_for(&mut self.viewport, &story, size)
    }

    pub fn close_popup(&mut self) {
        self.popup = None;
        self.resize.end_resize(&mut self.viewport, &mut self.platform);
    }

    pub fn popup(&self) -> Option<&PopupSession> {
        self.popup.as_ref()
    }

    pub fn popup_size(&self) -> Option<PopupSize> {
        self.popup.as_ref().map(PopupSession::size)
    }

    pub fn popup_card(&self) -> Option<PopupCard> {
        self.popup.as_ref().map(PopupSession::card)
    }

    // ── resize handle ────────────────────────────────────────

    pub fn on_resize_handle_down(&mut self, event: PointerEvent) -> bool {
        let Some(size) = self.popup_size() else {
            return false;
        };
        self.resize
            .start_resize(event, size, &mut self.viewport, &mut self.platform)
    }

    pub fn on_pointer_move(&mut self, event: PointerEvent) {
        if let Some(size) = self.resize.on_move(event) {
            if let Some(popup) = self.popup.as_mut() {
                popup.set_size(size, &self.config.popup_bounds);
            }
        }
    }

    pub fn on_pointer_up(&mut self, event: PointerEvent) {
        self.finish_resize(event);
    }

    pub fn on_pointer_cancel(&mut self, event: PointerEvent) {
        self.finish_resize(event);
    }

    fn finish_resize(&mut self, event: PointerEvent) {
        let ResizeState::Dragging(session) = self.resize.state() else {
            return;
        };
        if session.pointer_id != event.pointer_id {
            return;
        }
        let Some(size) = self.resize.end_resize(&mut self.viewport, &mut self.platform) else {
            return;
        };
        let Some(popup) = self.popup.as_mut() else {
            return;
        };
        popup.set_size(size, &self.config.popup_bounds);
        let story = popup.story().clone();
        let size = popup.size();
        self.placement.center_for(&mut self.viewport, &story, size);
    }

    // ── search ───────────────────────────────────────────────

    pub fn on_search_result(&mut self, center: GeoPoint) {
        self.search.on_result(center, &mut self.viewport);
    }

    pub fn on_search_click(&mut self) {
        if self.search.on_click() {
            self.deferred.schedule_next_frame(DeferredTask::FocusSearchInput);
        }
    }

    pub fn on_key(&mut self, key: Key) {
        self.search.on_key(key);
    }

    // ── layout ───────────────────────────────────────────────

    pub fn on_window_resize(&mut self, width: f64, height: f64) {
        self.viewport.set_window_size(width, height);
        self.viewport.resize();
    }

    /// The side panel animates its width; the engine re-reads its container
    /// once the transition is over.
    /// Repeated toggles coalesce into one resize.
    pub fn on_side_panel_toggled(&mut self) {
        self.deferred
            .cancel_where(|t| *t == DeferredTask::ResizeEngine);
        self.deferred.schedule_after(
            self.config.side_panel_resize_delay_ms,
            DeferredTask::ResizeEngine,
        );
    }

    // ── geolocation ──────────────────────────────────────────

    /// Startup placement: jump to the user silently, ignore failures.
    pub fn on_initial_position(&mut self, result: Result<GeoPoint, GeolocationError>) {
        match result {
            Ok(p) if p.is_finite() => {
                let view = ViewState::new(p.lon_deg, p.lat_deg, self.config.geolocation.initial_zoom);
                self.viewport.jump_to(view);
            }
            Ok(_) => debug!("ignoring non-finite initial position"),
            Err(err) => info!(%err, "initial geolocation unavailable"),
        }
    }

    /// "Locate me": fly to the user, or tell them why not.
    pub fn on_locate_result(&mut self, result: Result<GeoPoint, GeolocationError>) {
        let geo = self.config.geolocation;
        match result {
            Ok(p) if p.is_finite() => self.viewport.fly_to(p, geo.locate_zoom, geo.locate_duration_ms),
            Ok(_) => self
                .notifier
                .notify(GeolocationError::PositionUnavailable.user_message(), true),
            Err(err) => {
                warn!(%err, "locate failed");
                self.notifier.notify(err.user_message(), true);
            }
        }
    }
}

impl<E: MapEngine, P: PointerPlatform, H: SearchHost> Drop for StoryMap<E, P, H> {
    fn drop(&mut self) {
        self.unmount();
    }
}
