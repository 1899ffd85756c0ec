use std::collections::BTreeMap;

use formats::Feature;
use serde::{Deserialize, Serialize};

/// Fill palette, one entry per [`ColorClass`], lightest count first.
pub const CLASS_PALETTE: [&str; 9] = [
    "#e7e7e7ff",
    "#7634CD",
    "#273ED7",
    "#20A9ED",
    "#42DC6E",
    "#FFF646",
    "#ff6a00ff",
    "#be3838ff",
    "#000000ff",
];

/// Discrete count bucket.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColorClass {
    One,
    Two,
    Three,
    FourToSix,
    Seven,
    Eight,
    Nine,
    TenToEleven,
    TwelvePlus,
}

impl ColorClass {
    pub const ALL: [ColorClass; 9] = [
        ColorClass::One,
        ColorClass::Two,
        ColorClass::Three,
        ColorClass::FourToSix,
        ColorClass::Seven,
        ColorClass::Eight,
        ColorClass::Nine,
        ColorClass::TenToEleven,
        ColorClass::TwelvePlus,
    ];

    /// Total over every input: zero, negatives, absent values and counts that
    /// fall between buckets all land in the first bucket.
    pub fn classify(count: Option<f64>) -> Self {
        let Some(c) = count else {
            return ColorClass::One;
        };
        if c == 1.0 {
            ColorClass::One
        } else if c == 2.0 {
            ColorClass::Two
        } else if c == 3.0 {
            ColorClass::Three
        } else if (4.0..=6.0).contains(&c) {
            ColorClass::FourToSix
        } else if c == 7.0 {
            ColorClass::Seven
        } else if c == 8.0 {
            ColorClass::Eight
        } else if c == 9.0 {
            ColorClass::Nine
        } else if (10.0..=11.0).contains(&c) {
            ColorClass::TenToEleven
        } else if c >= 12.0 {
            ColorClass::TwelvePlus
        } else {
            ColorClass::One
        }
    }

    pub fn classify_count(count: u64) -> Self {
        Self::classify(Some(count as f64))
    }

    pub fn bucket(self) -> usize {
        self as usize
    }

    pub fn hex(self) -> &'static str {
        CLASS_PALETTE[self.bucket()]
    }

    /// Legend range text, e.g. `4–6`.
    pub fn range_label(self) -> &'static str {
        match self {
            ColorClass::One => "0–1",
            ColorClass::Two => "2",
            ColorClass::Three => "3",
            ColorClass::FourToSix => "4–6",
            ColorClass::Seven => "7",
            ColorClass::Eight => "8",
            ColorClass::Nine => "9",
            ColorClass::TenToEleven => "10–11",
            ColorClass::TwelvePlus => "12+",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub color: &'static str,
    pub label: String,
}

/// Legend rows in bucket order, labelled with `unit` ("Vehicles").
pub fn class_legend(unit: &str) -> Vec<LegendEntry> {
    ColorClass::ALL
        .iter()
        .map(|class| LegendEntry {
            color: class.hex(),
            label: format!("{} {unit}", class.range_label()),
        })
        .collect()
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    #[default]
    Single,
    Class,
}

impl ColorMode {
    /// Parses a radio value; unknown values fall back to single color.
    pub fn from_radio_value(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "class" | "classified" => ColorMode::Class,
            _ => ColorMode::Single,
        }
    }

    pub fn shows_legend(self) -> bool {
        matches!(self, ColorMode::Class)
    }
}

/// Circle-marker paint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerStyle {
    pub color: String,
    pub weight: f32,
    pub opacity: f32,
    pub fill_opacity: f32,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            color: "#000".to_string(),
            weight: 1.0,
            opacity: 1.0,
            fill_opacity: 0.8,
        }
    }
}

/// Line and polygon paint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeStyle {
    pub color: String,
    pub weight: f32,
    pub opacity: f32,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            color: "#ff7800".to_string(),
            weight: 5.0,
            opacity: 0.65,
        }
    }
}

/// Colors shapes by the string value of one property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalStyle {
    pub property: String,
    pub colors: BTreeMap<String, String>,
}

impl CategoricalStyle {
    pub fn color_for(&self, feature: &Feature) -> Option<&str> {
        let key = feature.property(&self.property)?.as_str()?;
        self.colors.get(key).map(String::as_str)
    }
}
