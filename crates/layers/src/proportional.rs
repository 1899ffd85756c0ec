use formats::{Feature, GeoPoint, Geometry};
use serde::{Deserialize, Serialize};

use crate::layer::{Layer, LayerId};
use crate::popup::PopupTemplate;
use crate::radius::{RadiusFormula, ScaleAnchor};
use crate::symbology::{CategoricalStyle, ColorClass, ColorMode, MarkerStyle, ShapeStyle};

/// Everything needed to turn features into styled symbols.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolStyle {
    #[serde(default)]
    pub radius: RadiusFormula,
    /// Fill used in [`ColorMode::Single`].
    pub single_color: String,
    #[serde(default)]
    pub marker: MarkerStyle,
    pub popup: PopupTemplate,
    #[serde(default)]
    pub shapes: ShapeStyle,
    #[serde(default)]
    pub categories: Option<CategoricalStyle>,
    /// Boolean property gating visibility; features without `true` are skipped.
    #[serde(default)]
    pub visibility_field: Option<String>,
}

impl Default for SymbolStyle {
    fn default() -> Self {
        Self {
            radius: RadiusFormula::Flannery,
            single_color: "#ff7800".to_string(),
            marker: MarkerStyle::default(),
            popup: PopupTemplate::None,
            shapes: ShapeStyle::default(),
            categories: None,
            visibility_field: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProportionalMarker {
    pub feature_id: Option<String>,
    pub position: [f64; 2], // lon, lat
    pub value: Option<f64>,
    pub radius: f64,
    pub fill_color: String,
    pub style: MarkerStyle,
    pub popup: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeSymbol {
    pub feature_id: Option<String>,
    pub geometry: Geometry,
    pub style: ShapeStyle,
    pub popup: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProportionalLayerSnapshot {
    pub markers: Vec<ProportionalMarker>,
    pub shapes: Vec<ShapeSymbol>,
}

/// Inputs that change per frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameSymbology<'a> {
    /// Property rendered as symbol size and class.
    pub attribute: &'a str,
    pub anchor: Option<ScaleAnchor>,
    pub color_mode: ColorMode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProportionalLayer {
    id: LayerId,
    style: SymbolStyle,
}

impl ProportionalLayer {
    pub fn new(id: u64, style: SymbolStyle) -> Self {
        Self {
            id: LayerId(id),
            style,
        }
    }

    pub fn style(&self) -> &SymbolStyle {
        &self.style
    }

    /// Points become circle markers; lines and polygons become shapes.
    /// Points the radius formula cannot size are left out.
    pub fn extract<'a>(
        &self,
        features: impl IntoIterator<Item = &'a Feature>,
        frame: FrameSymbology<'_>,
    ) -> ProportionalLayerSnapshot {
        let mut out = ProportionalLayerSnapshot::default();

        for feature in features {
            if let Some(field) = &self.style.visibility_field {
                if !feature.flag(field) {
                    continue;
                }
            }
            let Some(geometry) = &feature.geometry else {
                continue;
            };
            match geometry {
                Geometry::Point(p) => {
                    out.markers.extend(self.marker(feature, p, frame));
                }
                Geometry::MultiPoint(points) => {
                    for p in points {
                        out.markers.extend(self.marker(feature, p, frame));
                    }
                }
                other => out.shapes.push(self.shape(feature, other, frame)),
            }
        }

        out
    }

    fn marker(
        &self,
        feature: &Feature,
        point: &GeoPoint,
        frame: FrameSymbology<'_>,
    ) -> Option<ProportionalMarker> {
        let value = feature.number(frame.attribute);
        let radius = self.style.radius.radius(value, frame.anchor)?;
        let fill_color = match frame.color_mode {
            ColorMode::Single => self.style.single_color.clone(),
            ColorMode::Class => ColorClass::classify(value).hex().to_string(),
        };
        Some(ProportionalMarker {
            feature_id: feature.id.clone(),
            position: [point.lon_deg, point.lat_deg],
            value,
            radius,
            fill_color,
            style: self.style.marker.clone(),
            popup: self.style.popup.render(feature, frame.attribute),
        })
    }

    fn shape(&self, feature: &Feature, geometry: &Geometry, frame: FrameSymbology<'_>) -> ShapeSymbol {
        let mut style = self.style.shapes.clone();
        if let Some(color) = self
            .style
            .categories
            .as_ref()
            .and_then(|c| c.color_for(feature))
        {
            style.color = color.to_string();
        }
        ShapeSymbol {
            feature_id: feature.id.clone(),
            geometry: geometry.clone(),
            style,
            popup: self.style.popup.render(feature, frame.attribute),
        }
    }
}

impl Layer for ProportionalLayer {
    type Snapshot = ProportionalLayerSnapshot;

    fn id(&self) -> LayerId {
        self.id
    }

    fn frame_snapshot(&self, features: &[&Feature], frame: FrameSymbology<'_>) -> Self::Snapshot {
        self.extract(features.iter().copied(), frame)
    }
}
