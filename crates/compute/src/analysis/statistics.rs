use formats::FeatureCollection;
use layers::radius::ScaleAnchor;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ScaleError {
    /// No feature carries a usable value for the requested attributes.
    EmptyDataset,
    /// The minimum is zero or negative, so it cannot normalize radii.
    NonPositiveAnchor(f64),
}

impl std::fmt::Display for ScaleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScaleError::EmptyDataset => write!(f, "no usable values to compute a scale from"),
            ScaleError::NonPositiveAnchor(v) => {
                write!(f, "scale minimum must be positive, got {v}")
            }
        }
    }
}

impl std::error::Error for ScaleError {}

pub struct Statistics;

impl Statistics {
    /// Minimum of `attributes` over every feature, skipping absent values.
    pub fn min_value<S: AsRef<str>>(
        collection: &FeatureCollection,
        attributes: &[S],
    ) -> Result<f64, ScaleError> {
        let mut min: Option<f64> = None;
        for feature in &collection.features {
            for attribute in attributes {
                if let Some(v) = feature.number(attribute.as_ref()) {
                    min = Some(min.map_or(v, |m| m.min(v)));
                }
            }
        }
        min.ok_or(ScaleError::EmptyDataset)
    }

    pub fn scale_anchor<S: AsRef<str>>(
        collection: &FeatureCollection,
        attributes: &[S],
    ) -> Result<ScaleAnchor, ScaleError> {
        let min = Self::min_value(collection, attributes)?;
        ScaleAnchor::new(min).ok_or(ScaleError::NonPositiveAnchor(min))
    }
}
