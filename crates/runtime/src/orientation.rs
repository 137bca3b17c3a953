//! Landscape-orientation preference for small touch devices.
//!
//! Each map owns its own [`OrientationService`]; nothing here is global, so
//! tests and embedders can run independent instances side by side.

use crate::event_bus::{EventBus, Subscription};

const MOBILE_UA_MARKERS: [&str; 8] = [
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

/// Widest viewport still treated as a phone when touch input is present.
const MOBILE_MAX_WIDTH_PX: f64 = 768.0;

/// Visibility of the "rotate your device" prompt.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum LandscapePrompt {
    #[default]
    Hidden,
    Shown,
}

/// Classifies a device from what the platform reports.
pub fn is_mobile_device(user_agent: &str, inner_width_px: f64, has_touch: bool) -> bool {
    let ua = user_agent.to_ascii_lowercase();
    MOBILE_UA_MARKERS.iter().any(|m| ua.contains(m))
        || (inner_width_px <= MOBILE_MAX_WIDTH_PX && has_touch)
}

#[derive(Debug)]
pub struct OrientationService {
    force_landscape: bool,
    is_mobile: bool,
    viewport: Option<(f64, f64)>,
    prompt: LandscapePrompt,
    listeners: EventBus<bool>,
    disposed: bool,
}

impl OrientationService {
    /// `force_landscape` is the persisted user preference (the host owns storage).
    pub fn new(force_landscape: bool, is_mobile: bool) -> Self {
        Self {
            force_landscape,
            is_mobile,
            viewport: None,
            prompt: LandscapePrompt::Hidden,
            listeners: EventBus::new(),
            disposed: false,
        }
    }

    pub fn force_landscape(&self) -> bool {
        self.force_landscape
    }

    pub fn prompt(&self) -> LandscapePrompt {
        self.prompt
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&bool) + 'static) -> Subscription {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, sub: Subscription) -> bool {
        self.listeners.unsubscribe(sub)
    }

    /// Called on resize / orientation change with the new window size.
    pub fn on_viewport_changed(&mut self, width: f64, height: f64) -> LandscapePrompt {
        if self.disposed {
            return self.prompt;
        }
        self.viewport = Some((width, height));
        self.refresh();
        self.prompt
    }

    /// Updates the preference, re-evaluates the prompt and notifies listeners.
    pub fn set_force_landscape(&mut self, force: bool) {
        if self.disposed {
            return;
        }
        self.force_landscape = force;
        if force {
            self.refresh();
        } else {
            self.prompt = LandscapePrompt::Hidden;
        }
        tracing::debug!(force, "landscape preference changed");
        self.listeners.emit(&force);
    }

    /// Drops all listeners and hides the prompt; later calls are no-ops.
    pub fn dispose(&mut self) {
        self.listeners.clear();
        self.prompt = LandscapePrompt::Hidden;
        self.disposed = true;
    }

    fn refresh(&mut self) {
        if !self.force_landscape || !self.is_mobile {
            return;
        }
        let Some((w, h)) = self.viewport else {
            return;
        };
        self.prompt = if h > w {
            LandscapePrompt::Shown
        } else {
            LandscapePrompt::Hidden
        };
    }
}
