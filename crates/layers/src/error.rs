use foundation::math::ProjectionError;
use formats::geojson::MalformedPosition;
use thiserror::Error;

use crate::symbology::RampError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayerError {
    #[error("unsupported geometry type `{kind}`")]
    UnsupportedGeometry { kind: String },
    #[error("missing numeric `{key}` property")]
    MissingProperty { key: String },
    #[error("degenerate elevation range: every feature is at {value}")]
    DegenerateRange { value: f64 },
    #[error("ring has {distinct} distinct vertices, need at least 3")]
    DegenerateRing { distinct: usize },
    #[error(transparent)]
    InvalidCoordinate(#[from] ProjectionError),
    #[error(transparent)]
    Malformed(#[from] MalformedPosition),
    #[error("extent is empty or not finite")]
    DegenerateExtent,
    #[error("graticule needs {lines} lines, limit is {limit}")]
    GraticuleTooDense { lines: usize, limit: usize },
    #[error("invalid {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },
    #[error(transparent)]
    Ramp(#[from] RampError),
}

impl LayerError {
    pub(crate) fn missing(key: &str) -> Self {
        LayerError::MissingProperty {
            key: key.to_string(),
        }
    }

    pub(crate) fn unsupported(kind: &str) -> Self {
        LayerError::UnsupportedGeometry {
            kind: kind.to_string(),
        }
    }
}
