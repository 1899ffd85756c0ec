//! Time-sequenced proportional symbol viewer.
//!
//! Wires a [`SequencerConfig`] to a [`DataSource`] and turns UI events into
//! per-frame symbol snapshots. Drawing is left to the host.

pub mod config;
pub mod session;
pub mod source;

pub use config::*;
pub use session::*;
pub use source::*;
