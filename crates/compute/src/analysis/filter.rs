use formats::{Feature, FeatureCollection};
use runtime::frame::Frame;
use serde::{Deserialize, Serialize};

use super::temporal::TemporalAnalysis;

/// Per-dataset rule for turning a frame into a rendered subset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureFilter {
    /// Every feature is kept; the frame names the property to render.
    Attribute,
    /// Only features dated in the frame's month are kept; `value_field` is
    /// rendered for every frame.
    Month {
        date_field: String,
        value_field: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameSelection<'a> {
    pub attribute: &'a str,
    pub features: Vec<&'a Feature>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    FrameKindMismatch { expected: &'static str, frame: Frame },
}

impl std::fmt::Display for FilterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterError::FrameKindMismatch { expected, frame } => {
                write!(f, "expected {expected} frame, got {frame:?}")
            }
        }
    }
}

impl std::error::Error for FilterError {}

impl FeatureFilter {
    pub fn select<'a>(
        &'a self,
        collection: &'a FeatureCollection,
        frame: &'a Frame,
    ) -> Result<FrameSelection<'a>, FilterError> {
        match self {
            FeatureFilter::Attribute => {
                let attribute =
                    frame
                        .as_attribute()
                        .ok_or_else(|| FilterError::FrameKindMismatch {
                            expected: "attribute",
                            frame: frame.clone(),
                        })?;
                Ok(FrameSelection {
                    attribute,
                    features: collection.features.iter().collect(),
                })
            }
            FeatureFilter::Month {
                date_field,
                value_field,
            } => {
                let month = frame
                    .as_month()
                    .ok_or_else(|| FilterError::FrameKindMismatch {
                        expected: "month",
                        frame: frame.clone(),
                    })?;
                let features = collection
                    .features
                    .iter()
                    .filter(|f| TemporalAnalysis::month_of_value(f.property(date_field)) == Some(month))
                    .collect();
                Ok(FrameSelection {
                    attribute: value_field,
                    features,
                })
            }
        }
    }
}
