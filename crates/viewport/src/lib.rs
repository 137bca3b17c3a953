//! Interactive map viewport controller for geotagged stories.
//!
//! Everything here runs on one thread and is driven by the host: input
//! events come in through typed commands on [`story_map::StoryMap`], and
//! deferred continuations are drained on each animation frame.

pub mod click;
pub mod config;
pub mod controller;
pub mod engine;
pub mod geolocation;
pub mod mercator_engine;
pub mod placement;
pub mod popup;
pub mod resize;
pub mod search;
pub mod story_map;

pub use click::*;
pub use config::*;
pub use controller::*;
pub use engine::*;
pub use geolocation::*;
pub use mercator_engine::*;
pub use placement::*;
pub use popup::*;
pub use resize::*;
pub use search::*;
pub use story_map::*;
