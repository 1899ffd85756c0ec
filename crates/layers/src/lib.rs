pub mod layer;
pub mod popup;
pub mod proportional;
pub mod radius;
pub mod symbology;

pub use layer::*;
