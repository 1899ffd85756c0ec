pub mod filter;
pub mod statistics;
pub mod temporal;

pub use filter::*;
pub use statistics::*;
pub use temporal::*;
