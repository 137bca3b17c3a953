pub mod deferred;
pub mod event_bus;
pub mod frame;
pub mod orientation;

pub use deferred::*;
pub use event_bus::*;
pub use frame::*;
pub use orientation::*;
