use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct GeoPoint {
    pub lon_deg: f64,
    pub lat_deg: f64,
}

impl GeoPoint {
    pub fn new(lon_deg: f64, lat_deg: f64) -> Self {
        Self { lon_deg, lat_deg }
    }
}

/// Geometry is carried through untouched; only the point/non-point split
/// matters to symbol rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(GeoPoint),
    MultiPoint(Vec<GeoPoint>),
    LineString(Vec<GeoPoint>),
    MultiLineString(Vec<Vec<GeoPoint>>),
    Polygon(Vec<Vec<GeoPoint>>),
    MultiPolygon(Vec<Vec<Vec<GeoPoint>>>),
}

impl Geometry {
    pub fn as_point(&self) -> Option<&GeoPoint> {
        match self {
            Geometry::Point(p) => Some(p),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: Option<String>,
    pub properties: Map<String, Value>,
    /// `None` for GeoJSON `"geometry": null`.
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeatureCollectionError {
    Json(String),
    NotAFeatureCollection,
    InvalidFeature { index: usize, reason: String },
}

impl std::fmt::Display for FeatureCollectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureCollectionError::Json(msg) => write!(f, "JSON parse error: {msg}"),
            FeatureCollectionError::NotAFeatureCollection => {
                write!(f, "expected GeoJSON FeatureCollection")
            }
            FeatureCollectionError::InvalidFeature { index, reason } => {
                write!(f, "invalid feature at index {index}: {reason}")
            }
        }
    }
}

impl std::error::Error for FeatureCollectionError {}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn from_geojson_str(payload: &str) -> Result<Self, FeatureCollectionError> {
        let value: Value = serde_json::from_str(payload)
            .map_err(|e| FeatureCollectionError::Json(e.to_string()))?;
        Self::from_geojson_value(value)
    }

    pub fn from_geojson_value(value: Value) -> Result<Self, FeatureCollectionError> {
        let obj = value
            .as_object()
            .ok_or(FeatureCollectionError::NotAFeatureCollection)?;
        let ty = obj
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or(FeatureCollectionError::NotAFeatureCollection)?;
        if ty != "FeatureCollection" {
            return Err(FeatureCollectionError::NotAFeatureCollection);
        }

        let features_val = obj
            .get("features")
            .and_then(|v| v.as_array())
            .ok_or(FeatureCollectionError::NotAFeatureCollection)?;

        let mut features = Vec::with_capacity(features_val.len());
        for (index, feat_val) in features_val.iter().enumerate() {
            let feat_obj = feat_val
                .as_object()
                .ok_or(FeatureCollectionError::InvalidFeature {
                    index,
                    reason: "feature must be an object".to_string(),
                })?;

            let id = match feat_obj.get("id") {
                Some(Value::String(s)) => Some(s.clone()),
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            };

            let properties = feat_obj
                .get("properties")
                .and_then(|v| v.as_object())
                .cloned()
                .unwrap_or_default();

            let geometry = match feat_obj.get("geometry") {
                None | Some(Value::Null) => None,
                Some(geometry_val) => Some(
                    parse_geometry(geometry_val)
                        .map_err(|reason| FeatureCollectionError::InvalidFeature { index, reason })?,
                ),
            };

            features.push(Feature {
                id,
                properties,
                geometry,
            });
        }

        Ok(Self { features })
    }

    /// Emits a GeoJSON FeatureCollection for the given subset of features.
    pub fn subset_to_geojson_value<'a>(features: impl IntoIterator<Item = &'a Feature>) -> Value {
        let mut root = Map::new();
        root.insert(
            "type".to_string(),
            Value::String("FeatureCollection".to_string()),
        );
        let features: Vec<Value> = features.into_iter().map(Feature::to_geojson_value).collect();
        root.insert("features".to_string(), Value::Array(features));
        Value::Object(root)
    }

    pub fn to_geojson_value(&self) -> Value {
        Self::subset_to_geojson_value(&self.features)
    }
}

impl Feature {
    pub fn to_geojson_value(&self) -> Value {
        let mut fobj = Map::new();
        fobj.insert("type".to_string(), Value::String("Feature".to_string()));
        if let Some(id) = &self.id {
            fobj.insert("id".to_string(), Value::String(id.clone()));
        }
        fobj.insert(
            "properties".to_string(),
            Value::Object(self.properties.clone()),
        );
        fobj.insert(
            "geometry".to_string(),
            self.geometry
                .as_ref()
                .map(geometry_to_geojson_value)
                .unwrap_or(Value::Null),
        );
        Value::Object(fobj)
    }
}

fn geometry_to_geojson_value(geom: &Geometry) -> Value {
    let (ty, coords) = match geom {
        Geometry::Point(p) => ("Point", point_coords(p)),
        Geometry::MultiPoint(ps) => ("MultiPoint", points_coords(ps)),
        Geometry::LineString(ps) => ("LineString", points_coords(ps)),
        Geometry::MultiLineString(lines) => (
            "MultiLineString",
            Value::Array(lines.iter().map(|l| points_coords(l)).collect()),
        ),
        Geometry::Polygon(rings) => (
            "Polygon",
            Value::Array(rings.iter().map(|r| points_coords(r)).collect()),
        ),
        Geometry::MultiPolygon(polys) => (
            "MultiPolygon",
            Value::Array(
                polys
                    .iter()
                    .map(|poly| Value::Array(poly.iter().map(|r| points_coords(r)).collect()))
                    .collect(),
            ),
        ),
    };
    let mut obj = Map::new();
    obj.insert("type".to_string(), Value::String(ty.to_string()));
    obj.insert("coordinates".to_string(), coords);
    Value::Object(obj)
}

fn point_coords(p: &GeoPoint) -> Value {
    Value::Array(vec![Value::from(p.lon_deg), Value::from(p.lat_deg)])
}

fn points_coords(ps: &[GeoPoint]) -> Value {
    Value::Array(ps.iter().map(point_coords).collect())
}

fn parse_geometry(value: &Value) -> Result<Geometry, String> {
    let Some(obj) = value.as_object() else {
        return Err(format!("geometry is not an object: {value}"));
    };
    let kind = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| "geometry has no type".to_string())?;
    let coords = obj
        .get("coordinates")
        .ok_or_else(|| format!("{kind} has no coordinates"))?;

    Ok(match kind {
        "Point" => Geometry::Point(position(coords)?),
        "MultiPoint" => Geometry::MultiPoint(nested(coords, position)?),
        "LineString" => Geometry::LineString(nested(coords, position)?),
        "MultiLineString" => Geometry::MultiLineString(nested(coords, |l| nested(l, position))?),
        "Polygon" => Geometry::Polygon(nested(coords, |r| nested(r, position))?),
        "MultiPolygon" => Geometry::MultiPolygon(nested(coords, |p| {
            nested(p, |r| nested(r, position))
        })?),
        other => return Err(format!("unsupported geometry type: {other}")),
    })
}

/// `[lon, lat, ...]`; altitude and any further members are ignored.
fn position(value: &Value) -> Result<GeoPoint, String> {
    match value.as_array().map(Vec::as_slice) {
        Some([lon, lat, ..]) => match (lon.as_f64(), lat.as_f64()) {
            (Some(lon), Some(lat)) => Ok(GeoPoint::new(lon, lat)),
            _ => Err(format!("non-numeric position {value}")),
        },
        _ => Err(format!("position needs [lon, lat], got {value}")),
    }
}

/// One level of coordinate nesting.
fn nested<T>(value: &Value, item: impl Fn(&Value) -> Result<T, String>) -> Result<Vec<T>, String> {
    value
        .as_array()
        .ok_or_else(|| format!("expected a coordinate array, got {value}"))?
        .iter()
        .map(item)
        .collect()
}
