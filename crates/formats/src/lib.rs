pub mod boundary_loader;
pub mod geojson;
pub mod story_feed;

pub use boundary_loader::*;
pub use geojson::*;
pub use story_feed::*;
