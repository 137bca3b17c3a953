use foundation::screen::ScreenPoint;
use tracing::debug;

use crate::controller::ViewportController;
use crate::engine::MapEngine;
use crate::popup::{PopupSize, SizeBounds};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerEvent {
    pub pointer_id: i32,
    /// Client (window) coordinates.
    pub position: ScreenPoint,
}

impl PointerEvent {
    pub const fn new(pointer_id: i32, x: f64, y: f64) -> Self {
        Self {
            pointer_id,
            position: ScreenPoint::new(x, y),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CaptureError {
    Unsupported,
    Failed(String),
}

impl std::fmt::Display for CaptureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureError::Unsupported => write!(f, "pointer capture unsupported"),
            CaptureError::Failed(reason) => write!(f, "pointer capture failed: {reason}"),
        }
    }
}

impl std::error::Error for CaptureError {}

/// Document-level services a drag session needs from the host.
pub trait PointerPlatform {
    /// Routes further events for `pointer_id` to the resize handle.
    fn capture_pointer(&mut self, pointer_id: i32) -> Result<(), CaptureError>;

    fn release_pointer(&mut self, pointer_id: i32);

    /// Window-level move/up/cancel listeners. Must be idempotent.
    fn attach_global_listeners(&mut self);

    fn detach_global_listeners(&mut self);

    /// Document-wide "resizing" marker (cursor, text selection).
    fn set_resizing(&mut self, active: bool);
}

/// An active drag. Exists only between `start_resize` and `end_resize`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ResizeSession {
    pub pointer_id: i32,
    pub start: ScreenPoint,
    pub start_size: PopupSize,
    pub current_size: PopupSize,
    pub captured: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub enum ResizeState {
    #[default]
    Idle,
    Dragging(ResizeSession),
}

/// Drag-to-resize for the popup, mutually exclusive with map panning.
///
/// Every way out of a drag (pointer up, cancel, popup close, new selection,
/// unmount) goes through [`ResizeSessionManager::end_resize`].
#[derive(Debug, Clone, Default)]
pub struct ResizeSessionManager {
    bounds: SizeBounds,
    state: ResizeState,
}

impl ResizeSessionManager {
    pub fn new(bounds: SizeBounds) -> Self {
        Self {
            bounds,
            state: ResizeState::Idle,
        }
    }

    pub fn state(&self) -> &ResizeState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, ResizeState::Dragging(_))
    }

    pub fn bounds(&self) -> &SizeBounds {
        &self.bounds
    }

    /// Returns `false` (and changes nothing) if a drag is already active.
    pub fn start_resize<E: MapEngine, P: PointerPlatform>(
        &mut self,
        event: PointerEvent,
        current: PopupSize,
        viewport: &mut ViewportController<E>,
        platform: &mut P,
    ) -> bool {
        if self.is_dragging() {
            return false;
        }

        let captured = match platform.capture_pointer(event.pointer_id) {
            Ok(()) => true,
            Err(err) => {
                debug!(%err, "continuing resize without pointer capture");
                false
            }
        };
        platform.attach_global_listeners();
        platform.set_resizing(true);
        viewport.set_panning_enabled(false);

        let start_size = self.bounds.clamp(current);
        self.state = ResizeState::Dragging(ResizeSession {
            pointer_id: event.pointer_id,
            start: event.position,
            start_size,
            current_size: start_size,
            captured,
        });
        true
    }

    /// New popup size for a move of the session's pointer. Other pointers
    /// and moves while idle yield `None`.
    pub fn on_move(&mut self, event: PointerEvent) -> Option<PopupSize> {
        let ResizeState::Dragging(session) = &mut self.state else {
            return None;
        };
        if event.pointer_id != session.pointer_id {
            return None;
        }
        let dx = event.position.x - session.start.x;
        let dy = event.position.y - session.start.y;
        let size = self.bounds.clamp(PopupSize::new(
            session.start_size.width + dx,
            session.start_size.height + dy,
        ));
        session.current_size = size;
        Some(size)
    }

    /// Tears down any drag and always leaves panning enabled. Returns the
    /// final size if a drag was active.
    pub fn end_resize<E: MapEngine, P: PointerPlatform>(
        &mut self,
        viewport: &mut ViewportController<E>,
        platform: &mut P,
    ) -> Option<PopupSize> {
        let ended = match std::mem::take(&mut self.state) {
            ResizeState::Idle => None,
            ResizeState::Dragging(session) => {
                if session.captured {
                    platform.release_pointer(session.pointer_id);
                }
                platform.detach_global_listeners();
                platform.set_resizing(false);
                Some(session.current_size)
            }
        };
        viewport.set_panning_enabled(true);
        ended
    }
}
