use serde::{Deserialize, Serialize};

/// Flannery appearance-compensation constants.
pub const FLANNERY_SCALE: f64 = 1.0083;
pub const FLANNERY_EXPONENT: f64 = 0.5715;
pub const FLANNERY_MIN_RADIUS: f64 = 5.0;

/// Square-root count scaling constants.
pub const COUNT_MIN_RADIUS: f64 = 4.0;
pub const COUNT_SCALE_FACTOR: f64 = 2.0;

/// Minimum attribute value used to normalize radii. Always finite and > 0.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub struct ScaleAnchor(f64);

impl ScaleAnchor {
    pub fn new(value: f64) -> Option<Self> {
        (value.is_finite() && value > 0.0).then_some(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RadiusFormula {
    /// `1.0083 * (value / anchor)^0.5715 * 5`
    #[default]
    Flannery,
    /// `4 + 2 * sqrt(count)` for small integer counts.
    SqrtCount,
}

impl RadiusFormula {
    pub fn min_radius(self) -> f64 {
        match self {
            RadiusFormula::Flannery => FLANNERY_MIN_RADIUS,
            RadiusFormula::SqrtCount => COUNT_MIN_RADIUS,
        }
    }

    pub fn needs_anchor(self) -> bool {
        matches!(self, RadiusFormula::Flannery)
    }

    /// `None` when the formula cannot place a symbol: Flannery with an absent
    /// value or no anchor. Count scaling always yields a radius.
    pub fn radius(self, value: Option<f64>, anchor: Option<ScaleAnchor>) -> Option<f64> {
        match self {
            RadiusFormula::Flannery => Some(flannery_radius(value?, anchor?)),
            RadiusFormula::SqrtCount => Some(count_radius(value)),
        }
    }
}

/// Flannery-compensated radius, floored at [`FLANNERY_MIN_RADIUS`].
pub fn flannery_radius(value: f64, anchor: ScaleAnchor) -> f64 {
    let ratio = value / anchor.value();
    if !(ratio > 0.0) {
        return FLANNERY_MIN_RADIUS;
    }
    let radius = FLANNERY_SCALE * ratio.powf(FLANNERY_EXPONENT) * FLANNERY_MIN_RADIUS;
    radius.max(FLANNERY_MIN_RADIUS)
}

/// Count radius. Absent counts and counts below one render as a single unit.
pub fn count_radius(count: Option<f64>) -> f64 {
    let n = count.filter(|c| c.is_finite()).unwrap_or(1.0).max(1.0);
    COUNT_MIN_RADIUS + COUNT_SCALE_FACTOR * n.sqrt()
}
