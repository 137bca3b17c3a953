pub mod boundary;
pub mod containment;
pub mod query;
pub mod story;

pub use boundary::*;
pub use containment::*;
pub use query::*;
pub use story::*;
