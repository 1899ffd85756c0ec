pub mod event_bus;
pub mod frame;
pub mod sequence;

pub use event_bus::*;
pub use frame::*;
pub use sequence::*;
