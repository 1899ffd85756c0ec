use compute::FeatureFilter;
use layers::popup::PopupTemplate;
use layers::proportional::SymbolStyle;
use layers::radius::RadiusFormula;
use layers::symbology::{ColorMode, MarkerStyle};
use runtime::frame::FrameSet;
use serde::{Deserialize, Serialize};

/// Where a dataset's frames come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FrameSource {
    /// Explicit attribute names, in slider order.
    Attributes { names: Vec<String> },
    /// Property names of the first feature that contain `needle`.
    ScanAttributes { needle: String },
    /// January..December, matched against a date property.
    Months {
        date_field: String,
        value_field: String,
    },
}

impl FrameSource {
    pub fn filter(&self) -> FeatureFilter {
        match self {
            FrameSource::Attributes { .. } | FrameSource::ScanAttributes { .. } => {
                FeatureFilter::Attribute
            }
            FrameSource::Months {
                date_field,
                value_field,
            } => FeatureFilter::Month {
                date_field: date_field.clone(),
                value_field: value_field.clone(),
            },
        }
    }

    /// Frames known without looking at the data.
    pub fn fixed_frames(&self) -> Option<FrameSet> {
        match self {
            FrameSource::Attributes { names } => Some(FrameSet::attributes(names.iter().cloned())),
            FrameSource::ScanAttributes { .. } => None,
            FrameSource::Months { .. } => Some(FrameSet::months()),
        }
    }
}

/// One dataset's rendering setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequencerConfig {
    /// Path of the GeoJSON document, relative to the data source root.
    pub dataset_path: String,
    pub frames: FrameSource,
    #[serde(default)]
    pub color_mode: ColorMode,
    /// Unit word after each legend range ("4–6 Vehicles").
    #[serde(default = "default_legend_unit")]
    pub legend_unit: String,
    pub style: SymbolStyle,
}

fn default_legend_unit() -> String {
    "Vehicles".to_string()
}

#[derive(Debug)]
pub struct ConfigError(serde_json::Error);

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid sequencer config: {}", self.0)
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl SequencerConfig {
    pub fn from_json_str(payload: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(payload).map_err(ConfigError)
    }

    /// World megacity populations, one frame per `Pop_YYYY` column.
    pub fn mega_cities() -> Self {
        Self {
            dataset_path: "data/MegaCities.geojson".to_string(),
            frames: FrameSource::ScanAttributes {
                needle: "Pop".to_string(),
            },
            color_mode: ColorMode::Single,
            legend_unit: default_legend_unit(),
            style: SymbolStyle {
                radius: RadiusFormula::Flannery,
                single_color: "#ff7800".to_string(),
                marker: MarkerStyle {
                    color: "#000".to_string(),
                    weight: 1.0,
                    opacity: 1.0,
                    fill_opacity: 0.8,
                },
                popup: PopupTemplate::AttributeSeries {
                    title_field: "City".to_string(),
                    value_prefix: "Population in".to_string(),
                    unit: Some("million".to_string()),
                },
                ..SymbolStyle::default()
            },
        }
    }

    /// DC crash reports by month, sized and classed by vehicle count.
    pub fn dc_crashes() -> Self {
        Self {
            dataset_path: "data/Crashes_in_DC_short.geojson".to_string(),
            frames: FrameSource::Months {
                date_field: "REPORTDATE".to_string(),
                value_field: "TOTAL_VEHICLES".to_string(),
            },
            color_mode: ColorMode::Single,
            legend_unit: default_legend_unit(),
            style: SymbolStyle {
                radius: RadiusFormula::SqrtCount,
                single_color: "#FF5722".to_string(),
                marker: MarkerStyle {
                    color: "#333".to_string(),
                    weight: 1.0,
                    opacity: 1.0,
                    fill_opacity: 0.6,
                },
                popup: PopupTemplate::Fixed {
                    title_label: "Date".to_string(),
                    title_field: "REPORTDATE".to_string(),
                    value_label: "Total Vehicles".to_string(),
                },
                ..SymbolStyle::default()
            },
        }
    }
}
