use std::num::NonZeroUsize;

use foundation::math::{Vec2, Vec3};
use formats::geojson::{FeatureCollection, Geometry, Position};
use scene::PrimitiveSink;
use scene::components::{Color, Material, Primitive};
use tracing::info;

use crate::context::PipelineContext;
use crate::error::LayerError;
use crate::layer::{Layer, LayerId, LayerReport};

/// Every tenth feature is drawn.
pub const DEFAULT_STRIDE: NonZeroUsize = NonZeroUsize::new(10).unwrap();

/// Outer rings rendered as flat triangle fans around their centroid, placed
/// at the terrain base.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonFanLayer {
    id: LayerId,
    stride: NonZeroUsize,
    material: Material,
}

impl PolygonFanLayer {
    pub fn new(id: u64) -> Self {
        Self {
            id: LayerId(id),
            stride: DEFAULT_STRIDE,
            material: Material::solid(Color::from_hex(0xFF1493))
                .with_opacity(0.5)
                .wireframe(),
        }
    }

    pub fn with_stride(mut self, stride: NonZeroUsize) -> Self {
        self.stride = stride;
        self
    }

    pub fn stride(&self) -> NonZeroUsize {
        self.stride
    }

    pub fn build(
        &self,
        collection: &FeatureCollection,
        ctx: &PipelineContext,
        sink: &mut impl PrimitiveSink,
    ) -> Result<LayerReport, LayerError> {
        let mut report = LayerReport::new(self);
        let z = ctx.base_z();

        for (index, feature) in collection
            .features
            .iter()
            .enumerate()
            .step_by(self.stride.get())
        {
            report.features_visited += 1;
            let Geometry::Polygon(rings) = &feature.geometry else {
                report.skip_feature(index, LayerError::unsupported(feature.geometry.kind()));
                continue;
            };
            let outer = rings.first().map(Vec::as_slice).unwrap_or_default();

            let triangles = project_ring(outer, ctx).and_then(|ring| fan_triangles(&ring, z));
            match triangles {
                Ok(triangles) => {
                    sink.add_primitive(
                        self.id,
                        Primitive::Mesh {
                            triangles,
                            material: self.material,
                        },
                    );
                    report.primitives_emitted += 1;
                }
                Err(err) => report.skip_feature(index, err),
            }
        }

        info!(
            layer = self.name(),
            fans = report.primitives_emitted,
            visited = report.features_visited,
            skipped = report.features_skipped,
            "polygon fans built"
        );
        Ok(report)
    }
}

impl Layer for PolygonFanLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn name(&self) -> &'static str {
        "polygon_fans"
    }
}

fn project_ring(ring: &[Position], ctx: &PipelineContext) -> Result<Vec<Vec2>, LayerError> {
    ring.iter().map(|position| ctx.project(position)).collect()
}

/// Fan triangulation of a planar ring at height `z`: one triangle
/// `(centroid, v[i], v[i + 1])` per edge, wrapping around. Repeated
/// consecutive vertices and the closing duplicate are dropped first.
pub fn fan_triangles(ring: &[Vec2], z: f64) -> Result<Vec<Vec3>, LayerError> {
    let mut vertices = ring.to_vec();
    vertices.dedup();
    if vertices.len() > 1 && vertices.first() == vertices.last() {
        vertices.pop();
    }
    let n = vertices.len();
    if n < 3 {
        return Err(LayerError::DegenerateRing { distinct: n });
    }

    let sum = vertices.iter().fold(Vec2::ZERO, |acc, v| acc + *v);
    let centroid = Vec3::new(sum.x / n as f64, sum.y / n as f64, z);

    let mut triangles = Vec::with_capacity(n * 3);
    for i in 0..n {
        triangles.extend([
            centroid,
            vertices[i].extend(z),
            vertices[(i + 1) % n].extend(z),
        ]);
    }
    Ok(triangles)
}
