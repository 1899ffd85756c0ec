use formats::Feature;

use crate::proportional::FrameSymbology;

/// Handle the owning session assigns to each layer it draws.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub u64);

/// A map layer rebuilt from scratch on every frame change.
pub trait Layer {
    type Snapshot;

    fn id(&self) -> LayerId;

    /// Symbols for one frame's already-filtered features.
    fn frame_snapshot(&self, features: &[&Feature], frame: FrameSymbology<'_>) -> Self::Snapshot;
}
