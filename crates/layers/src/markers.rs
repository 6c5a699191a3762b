use formats::geojson::{FeatureCollection, Geometry};
use scene::PrimitiveSink;
use scene::components::{Color, MarkerShape, Material, Primitive, Pyramid};
use tracing::info;

use crate::context::PipelineContext;
use crate::error::LayerError;
use crate::layer::{Layer, LayerId, LayerReport};

/// Property holding a point feature's ground elevation.
pub const ELEVATION_KEY: &str = "Elevation";

/// Five-sided pyramid used for every tower marker.
pub const TOWER_PYRAMID: Pyramid = Pyramid {
    base_radius: 0.003,
    height: 0.015,
    radial_segments: 5,
};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MarkerStyle {
    pub shape: MarkerShape,
    pub material: Material,
}

impl MarkerStyle {
    pub fn cell_tower() -> Self {
        Self {
            shape: MarkerShape::Pyramid(TOWER_PYRAMID),
            material: Material::solid(Color::from_hex(0xFA3000)).with_opacity(0.4),
        }
    }

    pub fn fm_tower() -> Self {
        Self {
            shape: MarkerShape::Pyramid(TOWER_PYRAMID),
            material: Material::solid(Color::from_hex(0xFFFF00))
                .with_opacity(0.5)
                .wireframe(),
        }
    }
}

/// One marker per point feature at `(x, y, elevation * z_scale)`.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerLayer {
    id: LayerId,
    name: &'static str,
    style: MarkerStyle,
    key: String,
}

impl MarkerLayer {
    pub fn new(id: u64, name: &'static str, style: MarkerStyle) -> Self {
        Self {
            id: LayerId(id),
            name,
            style,
            key: ELEVATION_KEY.to_string(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn style(&self) -> &MarkerStyle {
        &self.style
    }

    pub fn build(
        &self,
        collection: &FeatureCollection,
        ctx: &PipelineContext,
        sink: &mut impl PrimitiveSink,
    ) -> Result<LayerReport, LayerError> {
        let mut report = LayerReport::new(self);

        for (index, feature) in collection.features.iter().enumerate() {
            report.features_visited += 1;
            let Geometry::Point(position) = &feature.geometry else {
                report.skip_feature(index, LayerError::unsupported(feature.geometry.kind()));
                continue;
            };
            let Some(elevation) = feature.number(&self.key) else {
                report.skip_feature(index, LayerError::missing(&self.key));
                continue;
            };
            match ctx.project_at(position, elevation) {
                Ok(anchor) => {
                    sink.add_primitive(
                        self.id,
                        Primitive::Marker {
                            position: anchor,
                            shape: self.style.shape,
                            material: self.style.material,
                        },
                    );
                    report.primitives_emitted += 1;
                }
                Err(err) => report.skip_feature(index, err),
            }
        }

        info!(
            layer = self.name,
            markers = report.primitives_emitted,
            skipped = report.features_skipped,
            "markers built"
        );
        Ok(report)
    }
}

impl Layer for MarkerLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn name(&self) -> &'static str {
        self.name
    }
}
