pub mod labels;
pub mod markers;
pub mod symbology;

pub use labels::*;
pub use markers::*;
pub use symbology::*;
