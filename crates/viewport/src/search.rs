use foundation::geo::GeoPoint;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::controller::ViewportController;
use crate::engine::MapEngine;

#[derive(Debug, Clone, PartialEq)]
pub enum WidgetError {
    Create(String),
    Operation(String),
}

impl std::fmt::Display for WidgetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WidgetError::Create(reason) => write!(f, "failed to create search widget: {reason}"),
            WidgetError::Operation(reason) => write!(f, "search widget error: {reason}"),
        }
    }
}

impl std::error::Error for WidgetError {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Geocoding token. Search is disabled without one.
    pub access_token: Option<String>,
    /// ISO 3166-1 alpha-2 country filter.
    pub country_code: String,
    pub placeholder: String,
    pub result_zoom: f64,
    pub fly_duration_ms: f64,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            access_token: None,
            country_code: "ca".to_string(),
            placeholder: "Search a location in Canada".to_string(),
            result_zoom: 10.0,
            fly_duration_ms: 1500.0,
        }
    }
}

/// Construction options handed to the external geocoding widget. The widget
/// never places its own marker or moves the camera itself.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetOptions {
    pub access_token: String,
    pub country_code: String,
    pub placeholder: String,
    pub zoom: f64,
    pub marker: bool,
    pub fly_to: bool,
}

pub trait SearchWidget {
    fn clear_query(&mut self) -> Result<(), WidgetError>;
    fn clear_input(&mut self);
    fn blur_input(&mut self);
    /// Focuses and selects the input text.
    fn focus_input(&mut self);
    fn remove(&mut self);
}

pub trait SearchHost {
    type Widget: SearchWidget;

    fn engine_ready(&self) -> bool;
    fn container_ready(&self) -> bool;
    fn create_widget(&mut self, options: &WidgetOptions) -> Result<Self::Widget, WidgetError>;
    /// Empties the DOM container the widget was attached to.
    fn clear_container(&mut self);
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SearchLifecycle {
    Unattached,
    Attached,
    TornDown,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AttachStatus {
    Attached,
    AlreadyAttached,
    /// Engine or container missing; retry on a later frame.
    NotReady,
    /// No access token configured.
    Disabled,
    TornDown,
    Failed,
}

impl AttachStatus {
    pub fn should_retry(self) -> bool {
        matches!(self, AttachStatus::NotReady)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ExpandState {
    #[default]
    Collapsed,
    Expanded,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Key {
    Escape,
    Other,
}

/// Lifecycle and expand/collapse behavior around an external geocoding
/// widget.
pub struct LocationSearchAdapter<H: SearchHost> {
    host: H,
    options: SearchOptions,
    widget: Option<H::Widget>,
    lifecycle: SearchLifecycle,
    expand: ExpandState,
    focus_inside: bool,
}

impl<H: SearchHost> std::fmt::Debug for LocationSearchAdapter<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationSearchAdapter")
            .field("options", &self.options)
            .field("lifecycle", &self.lifecycle)
            .field("expand", &self.expand)
            .field("focus_inside", &self.focus_inside)
            .finish()
    }
}

impl<H: SearchHost> LocationSearchAdapter<H> {
    pub fn new(host: H, options: SearchOptions) -> Self {
        Self {
            host,
            options,
            widget: None,
            lifecycle: SearchLifecycle::Unattached,
            expand: ExpandState::Collapsed,
            focus_inside: false,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn widget(&self) -> Option<&H::Widget> {
        self.widget.as_ref()
    }

    pub fn lifecycle(&self) -> SearchLifecycle {
        self.lifecycle
    }

    pub fn expand_state(&self) -> ExpandState {
        self.expand
    }

    pub fn is_expanded(&self) -> bool {
        self.expand == ExpandState::Expanded
    }

    pub fn is_enabled(&self) -> bool {
        self.options
            .access_token
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty())
    }

    /// Attaches the widget once engine and container exist. Never blocks:
    /// `NotReady` asks the caller to try again on a later frame.
    pub fn try_attach(&mut self) -> AttachStatus {
        match self.lifecycle {
            SearchLifecycle::TornDown => return AttachStatus::TornDown,
            SearchLifecycle::Attached => return AttachStatus::AlreadyAttached,
            SearchLifecycle::Unattached => {}
        }
        let Some(token) = self
            .options
            .access_token
            .clone()
            .filter(|t| !t.trim().is_empty())
        else {
            return AttachStatus::Disabled;
        };
        if !self.host.engine_ready() || !self.host.container_ready() {
            return AttachStatus::NotReady;
        }

        let options = WidgetOptions {
            access_token: token,
            country_code: self.options.country_code.clone(),
            placeholder: self.options.placeholder.clone(),
            zoom: self.options.result_zoom,
            marker: false,
            fly_to: false,
        };
        match self.host.create_widget(&options) {
            Ok(widget) => {
                self.widget = Some(widget);
                self.lifecycle = SearchLifecycle::Attached;
                info!("location search attached");
                AttachStatus::Attached
            }
            Err(err) => {
                warn!(%err, "location search unavailable");
                AttachStatus::Failed
            }
        }
    }

    /// Lets a torn-down adapter attach again after a remount.
    pub fn rearm(&mut self) {
        if self.lifecycle == SearchLifecycle::TornDown {
            self.lifecycle = SearchLifecycle::Unattached;
            self.focus_inside = false;
        }
    }

    /// A geocoding result was picked.
    pub fn on_result<E: MapEngine>(&mut self, center: GeoPoint, viewport: &mut ViewportController<E>) {
        if !center.is_finite() {
            return;
        }
        viewport.fly_to(center, self.options.result_zoom, self.options.fly_duration_ms);

        if let Some(widget) = self.widget.as_mut() {
            if let Err(err) = widget.clear_query() {
                debug!(%err, "ignoring search clear failure");
            }
            widget.clear_input();
            widget.blur_input();
        }
        self.focus_inside = false;
        self.expand = ExpandState::Collapsed;
    }

    /// Removes the widget. Safe when never attached and when repeated.
    pub fn unmount(&mut self) {
        if let Some(mut widget) = self.widget.take() {
            widget.remove();
        }
        if self.lifecycle != SearchLifecycle::TornDown {
            self.host.clear_container();
        }
        self.lifecycle = SearchLifecycle::TornDown;
        self.expand = ExpandState::Collapsed;
    }

    pub fn on_hover_enter(&mut self) {
        self.expand = ExpandState::Expanded;
    }

    pub fn on_hover_leave(&mut self) {
        if !self.focus_inside {
            self.expand = ExpandState::Collapsed;
        }
    }

    /// Click on the search box. Returns `true` when the input should be
    /// focused on the next frame (after the expand has rendered).
    pub fn on_click(&mut self) -> bool {
        if self.is_expanded() {
            return false;
        }
        self.expand = ExpandState::Expanded;
        true
    }

    /// Deferred half of [`LocationSearchAdapter::on_click`].
    pub fn focus_input(&mut self) {
        if let Some(widget) = self.widget.as_mut() {
            widget.focus_input();
            self.focus_inside = true;
        }
    }

    pub fn on_focus_in(&mut self) {
        self.focus_inside = true;
        self.expand = ExpandState::Expanded;
    }

    pub fn on_focus_out(&mut self) {
        self.focus_inside = false;
    }

    /// Pointer-down anywhere in the document outside the search box.
    pub fn on_pointer_down_outside(&mut self) {
        if self.is_expanded() {
            self.expand = ExpandState::Collapsed;
        }
    }

    pub fn on_key(&mut self, key: Key) {
        if self.is_expanded() && key == Key::Escape {
            self.expand = ExpandState::Collapsed;
            if let Some(widget) = self.widget.as_mut() {
                widget.blur_input();
            }
            self.focus_inside = false;
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{
        AttachStatus, ExpandState, Key, LocationSearchAdapter, SearchHost, SearchLifecycle,
        SearchOptions, SearchWidget, WidgetError, WidgetOptions,
    };
    use crate::controller::ViewportController;
    use crate::engine::ViewState;
    use crate::mercator_engine::MercatorEngine;
    use foundation::geo::GeoPoint;
    use foundation::screen::ScreenRect;
    use std::cell::RefCell;
    use std::rc::Rc;

    pub(crate) type CallLog = Rc<RefCell<Vec<&'static str>>>;

    #[derive(Debug)]
    pub(crate) struct FakeWidget {
        pub log: CallLog,
        pub fail_clear: bool,
    }

    impl SearchWidget for FakeWidget {
        fn clear_query(&mut self) -> Result<(), WidgetError> {
            self.log.borrow_mut().push("clear_query");
            if self.fail_clear {
                return Err(WidgetError::Operation("no query".into()));
            }
            Ok(())
        }
        fn clear_input(&mut self) {
            self.log.borrow_mut().push("clear_input");
        }
        fn blur_input(&mut self) {
            self.log.borrow_mut().push("blur_input");
        }
        fn focus_input(&mut self) {
            self.log.borrow_mut().push("focus_input");
        }
        fn remove(&mut self) {
            self.log.borrow_mut().push("remove");
        }
    }

    #[derive(Debug, Default)]
    pub(crate) struct FakeHost {
        pub engine_ready: bool,
        pub container_ready: bool,
        pub created: u32,
        pub cleared: u32,
        pub last_options: Option<WidgetOptions>,
        pub fail_clear: bool,
        pub log: CallLog,
    }

    impl FakeHost {
        pub(crate) fn ready() -> Self {
            Self {
                engine_ready: true,
                container_ready: true,
                ..Self::default()
            }
        }
    }

    impl SearchHost for FakeHost {
        type Widget = FakeWidget;

        fn engine_ready(&self) -> bool {
            self.engine_ready
        }
        fn container_ready(&self) -> bool {
            self.container_ready
        }
        fn create_widget(&mut self, options: &WidgetOptions) -> Result<FakeWidget, WidgetError> {
            self.created += 1;
            self.last_options = Some(options.clone());
            Ok(FakeWidget {
                log: self.log.clone(),
                fail_clear: self.fail_clear,
            })
        }
        fn clear_container(&mut self) {
            self.cleared += 1;
        }
    }

    pub(crate) fn options_with_token() -> SearchOptions {
        SearchOptions {
            access_token: Some("pk.test".to_string()),
            ..SearchOptions::default()
        }
    }

    #[test]
    fn attaches_once_when_ready() {
        let mut search = LocationSearchAdapter::new(FakeHost::ready(), options_with_token());
        assert_eq!(search.try_attach(), AttachStatus::Attached);
        assert_eq!(search.try_attach(), AttachStatus::AlreadyAttached);
        assert_eq!(search.host().created, 1);

        let opts = search.host().last_options.clone().expect("options");
        assert_eq!(opts.country_code, "ca");
        assert!(!opts.marker && !opts.fly_to);
        assert_eq!(opts.zoom, 10.0);
    }

    #[test]
    fn not_ready_until_engine_and_container_exist() {
        let mut search = LocationSearchAdapter::new(FakeHost::default(), options_with_token());
        assert_eq!(search.try_attach(), AttachStatus::NotReady);
        assert!(search.try_attach().should_retry());
        search.host_mut().engine_ready = true;
        assert_eq!(search.try_attach(), AttachStatus::NotReady);
        search.host_mut().container_ready = true;
        assert_eq!(search.try_attach(), AttachStatus::Attached);
    }

    #[test]
    fn disabled_without_token() {
        let mut search = LocationSearchAdapter::new(FakeHost::ready(), SearchOptions::default());
        assert!(!search.is_enabled());
        assert_eq!(search.try_attach(), AttachStatus::Disabled);
        assert!(!search.try_attach().should_retry());
    }

    #[test]
    fn result_flies_then_clears_blurs_and_collapses() {
        let view = ViewState::new(-96.8, 62.4, 4.0);
        let mut vc = ViewportController::new(view);
        vc.mount(MercatorEngine::new(view, ScreenRect::new(0.0, 0.0, 800.0, 600.0)));

        let mut host = FakeHost::ready();
        host.fail_clear = true;
        let log = host.log.clone();
        let mut search = LocationSearchAdapter::new(host, options_with_token());
        search.try_attach();
        search.on_hover_enter();

        search.on_result(GeoPoint::new(-75.69, 45.42), &mut vc);
        vc.engine_mut().expect("engine").finish();
        vc.sync_from_engine();

        assert_eq!(vc.view_state().zoom, 10.0);
        assert_eq!(*log.borrow(), vec!["clear_query", "clear_input", "blur_input"]);
        assert_eq!(search.expand_state(), ExpandState::Collapsed);
    }

    #[test]
    fn unmount_is_safe_when_never_attached() {
        let mut search = LocationSearchAdapter::new(FakeHost::default(), options_with_token());
        search.unmount();
        search.unmount();
        assert_eq!(search.lifecycle(), SearchLifecycle::TornDown);
        assert_eq!(search.host().cleared, 1);
        assert_eq!(search.try_attach(), AttachStatus::TornDown);
    }

    #[test]
    fn rearm_allows_a_fresh_attach() {
        let mut search = LocationSearchAdapter::new(FakeHost::ready(), options_with_token());
        assert_eq!(search.try_attach(), AttachStatus::Attached);
        search.unmount();
        assert!(search.widget().is_none());

        search.rearm();
        assert_eq!(search.lifecycle(), SearchLifecycle::Unattached);
        assert_eq!(search.try_attach(), AttachStatus::Attached);
        assert_eq!(search.host().created, 2);

        // Rearming a live adapter changes nothing.
        search.rearm();
        assert_eq!(search.try_attach(), AttachStatus::AlreadyAttached);
    }

    #[test]
    fn unmount_removes_widget() {
        let host = FakeHost::ready();
        let log = host.log.clone();
        let mut search = LocationSearchAdapter::new(host, options_with_token());
        search.try_attach();
        search.unmount();
        assert!(search.widget().is_none());
        assert_eq!(*log.borrow(), vec!["remove"]);
    }

    #[test]
    fn expand_collapse_rules() {
        let mut search = LocationSearchAdapter::new(FakeHost::ready(), options_with_token());
        search.try_attach();

        search.on_hover_enter();
        assert!(search.is_expanded());
        search.on_hover_leave();
        assert!(!search.is_expanded());

        // Click on collapsed box expands and wants focus next frame.
        assert!(search.on_click());
        assert!(!search.on_click());
        search.focus_input();
        search.on_hover_leave();
        assert!(search.is_expanded(), "focus inside keeps it open");

        search.on_key(Key::Other);
        assert!(search.is_expanded());
        search.on_key(Key::Escape);
        assert!(!search.is_expanded());

        search.on_focus_in();
        assert!(search.is_expanded());
        search.on_pointer_down_outside();
        assert!(!search.is_expanded());
    }
}
