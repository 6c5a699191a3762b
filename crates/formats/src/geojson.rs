//! Lenient GeoJSON decoding.
//!
//! Structure is validated strictly (a `FeatureCollection` of `Feature`
//! objects whose coordinates nest the way their geometry type says), but
//! individual positions are kept even when malformed so that converters can
//! skip a single bad coordinate and keep the rest of the feature.

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeoPoint {
    pub lon_deg: f64,
    pub lat_deg: f64,
}

impl GeoPoint {
    pub fn new(lon_deg: f64, lat_deg: f64) -> Self {
        Self { lon_deg, lat_deg }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum MalformedPosition {
    #[error("position is not an array")]
    NotAnArray,
    #[error("position has {0} elements, expected [lon, lat]")]
    Arity(usize),
    #[error("position holds a non-numeric value")]
    NonNumeric,
}

/// One leaf coordinate as found in the source document.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Position {
    Valid(GeoPoint),
    Malformed(MalformedPosition),
}

impl Position {
    pub fn lon_lat(lon_deg: f64, lat_deg: f64) -> Self {
        Position::Valid(GeoPoint::new(lon_deg, lat_deg))
    }

    pub fn point(&self) -> Result<GeoPoint, MalformedPosition> {
        match self {
            Position::Valid(p) => Ok(*p),
            Position::Malformed(m) => Err(*m),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Position),
    MultiPoint(Vec<Position>),
    LineString(Vec<Position>),
    MultiLineString(Vec<Vec<Position>>),
    Polygon(Vec<Vec<Position>>),
    MultiPolygon(Vec<Vec<Vec<Position>>>),
    /// `"geometry": null`
    Null,
    /// Any other geometry type, e.g. `GeometryCollection`.
    Other { kind: String },
}

impl Geometry {
    /// GeoJSON type name.
    pub fn kind(&self) -> &str {
        match self {
            Geometry::Point(_) => "Point",
            Geometry::MultiPoint(_) => "MultiPoint",
            Geometry::LineString(_) => "LineString",
            Geometry::MultiLineString(_) => "MultiLineString",
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPolygon(_) => "MultiPolygon",
            Geometry::Null => "null",
            Geometry::Other { kind } => kind.as_str(),
        }
    }

    /// Visit every leaf position, descending through lines and rings.
    pub fn visit_positions(&self, f: &mut impl FnMut(&Position)) {
        match self {
            Geometry::Point(p) => f(p),
            Geometry::MultiPoint(ps) | Geometry::LineString(ps) => ps.iter().for_each(f),
            Geometry::MultiLineString(nested) | Geometry::Polygon(nested) => {
                for ps in nested {
                    ps.iter().for_each(&mut *f);
                }
            }
            Geometry::MultiPolygon(polys) => {
                for ring in polys.iter().flatten() {
                    ring.iter().for_each(&mut *f);
                }
            }
            Geometry::Null | Geometry::Other { .. } => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: Option<String>,
    pub properties: Map<String, Value>,
    pub geometry: Geometry,
}

impl Feature {
    /// Numeric property lookup; missing keys and non-numbers yield `None`.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.properties.get(key).and_then(Value::as_f64)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

#[derive(Debug, Error)]
pub enum GeoJsonError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected GeoJSON FeatureCollection")]
    NotAFeatureCollection,
    #[error("invalid feature at index {index}: {reason}")]
    InvalidFeature { index: usize, reason: String },
}

impl FeatureCollection {
    pub fn from_geojson_str(payload: &str) -> Result<Self, GeoJsonError> {
        let value: Value = serde_json::from_str(payload)?;
        Self::from_geojson_value(value)
    }

    pub fn from_geojson_slice(payload: &[u8]) -> Result<Self, GeoJsonError> {
        let value: Value = serde_json::from_slice(payload)?;
        Self::from_geojson_value(value)
    }

    pub fn from_geojson_value(value: Value) -> Result<Self, GeoJsonError> {
        let obj = value
            .as_object()
            .ok_or(GeoJsonError::NotAFeatureCollection)?;
        if obj.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
            return Err(GeoJsonError::NotAFeatureCollection);
        }
        let features_val = obj
            .get("features")
            .and_then(Value::as_array)
            .ok_or(GeoJsonError::NotAFeatureCollection)?;

        let mut features = Vec::with_capacity(features_val.len());
        for (index, feat_val) in features_val.iter().enumerate() {
            let feature = parse_feature(feat_val)
                .map_err(|reason| GeoJsonError::InvalidFeature { index, reason })?;
            features.push(feature);
        }

        Ok(Self { features })
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Min and max of a numeric property over the features that carry it.
    pub fn number_range(&self, key: &str) -> Option<(f64, f64)> {
        self.features
            .iter()
            .filter_map(|f| f.number(key))
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

fn parse_feature(value: &Value) -> Result<Feature, String> {
    let obj = value
        .as_object()
        .ok_or_else(|| "feature must be an object".to_string())?;

    let feat_type = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| "feature missing type".to_string())?;
    if feat_type != "Feature" {
        return Err(format!("unexpected feature type: {feat_type}"));
    }

    let id = match obj.get("id") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    let properties = obj
        .get("properties")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    let geometry = match obj.get("geometry") {
        None => return Err("feature missing geometry".to_string()),
        Some(Value::Null) => Geometry::Null,
        Some(g) => parse_geometry(g)?,
    };

    Ok(Feature {
        id,
        properties,
        geometry,
    })
}

fn parse_geometry(value: &Value) -> Result<Geometry, String> {
    let obj = value
        .as_object()
        .ok_or_else(|| "geometry must be an object".to_string())?;
    let ty = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| "geometry missing type".to_string())?;

    let known = matches!(
        ty,
        "Point" | "MultiPoint" | "LineString" | "MultiLineString" | "Polygon" | "MultiPolygon"
    );
    if !known {
        return Ok(Geometry::Other {
            kind: ty.to_string(),
        });
    }

    let coords = obj
        .get("coordinates")
        .ok_or_else(|| format!("{ty} missing coordinates"))?;

    Ok(match ty {
        "Point" => Geometry::Point(parse_position(coords)),
        "MultiPoint" => Geometry::MultiPoint(parse_positions(coords, ty)?),
        "LineString" => Geometry::LineString(parse_positions(coords, ty)?),
        "MultiLineString" => Geometry::MultiLineString(parse_nested(coords, ty)?),
        "Polygon" => Geometry::Polygon(parse_nested(coords, ty)?),
        _ => {
            let polys = as_array(coords, ty)?;
            let mut out = Vec::with_capacity(polys.len());
            for poly in polys {
                out.push(parse_nested(poly, ty)?);
            }
            Geometry::MultiPolygon(out)
        }
    })
}

fn as_array<'a>(value: &'a Value, ty: &str) -> Result<&'a Vec<Value>, String> {
    value
        .as_array()
        .ok_or_else(|| format!("{ty} coordinates must nest arrays"))
}

fn parse_position(value: &Value) -> Position {
    let Some(arr) = value.as_array() else {
        return Position::Malformed(MalformedPosition::NotAnArray);
    };
    if arr.len() != 2 {
        return Position::Malformed(MalformedPosition::Arity(arr.len()));
    }
    match (arr[0].as_f64(), arr[1].as_f64()) {
        (Some(lon), Some(lat)) => Position::lon_lat(lon, lat),
        _ => Position::Malformed(MalformedPosition::NonNumeric),
    }
}

fn parse_positions(value: &Value, ty: &str) -> Result<Vec<Position>, String> {
    Ok(as_array(value, ty)?.iter().map(parse_position).collect())
}

fn parse_nested(value: &Value, ty: &str) -> Result<Vec<Vec<Position>>, String> {
    let arr = as_array(value, ty)?;
    let mut out = Vec::with_capacity(arr.len());
    for inner in arr {
        out.push(parse_positions(inner, ty)?);
    }
    Ok(out)
}
