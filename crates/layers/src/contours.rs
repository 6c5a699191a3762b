use formats::geojson::{FeatureCollection, Geometry, Position};
use scene::PrimitiveSink;
use scene::components::{Material, Primitive};
use tracing::info;

use crate::context::PipelineContext;
use crate::error::LayerError;
use crate::layer::{Layer, LayerId, LayerReport};
use crate::symbology::ColorRamp;

/// Property holding the elevation of a contour line.
pub const CONTOUR_KEY: &str = "Contour";

/// Contour lines colored by elevation and lifted to `contour * z_scale`.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourLayer {
    id: LayerId,
    key: String,
    ramp: ColorRamp,
}

impl ContourLayer {
    pub fn new(id: u64) -> Self {
        Self {
            id: LayerId(id),
            key: CONTOUR_KEY.to_string(),
            ramp: ColorRamp::default(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn with_ramp(mut self, ramp: ColorRamp) -> Self {
        self.ramp = ramp;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Lowest and highest elevation over the collection, `None` when no
    /// feature carries one.
    pub fn elevation_range(&self, collection: &FeatureCollection) -> Option<(f64, f64)> {
        collection.number_range(&self.key)
    }

    pub fn build(
        &self,
        collection: &FeatureCollection,
        ctx: &PipelineContext,
        sink: &mut impl PrimitiveSink,
    ) -> Result<LayerReport, LayerError> {
        let range = self.elevation_range(collection);
        if let Some((lo, hi)) = range
            && lo == hi
        {
            return Err(LayerError::DegenerateRange { value: lo });
        }

        let mut report = LayerReport::new(self);
        for (index, feature) in collection.features.iter().enumerate() {
            report.features_visited += 1;
            let (Some(contour), Some((lo, hi))) = (feature.number(&self.key), range) else {
                report.skip_feature(index, LayerError::missing(&self.key));
                continue;
            };
            let material = Material::solid(self.ramp.color_for(contour, lo, hi)?);

            match &feature.geometry {
                Geometry::LineString(line) => {
                    self.emit_line(index, line, contour, material, ctx, sink, &mut report);
                }
                Geometry::MultiLineString(lines) => {
                    for line in lines {
                        self.emit_line(index, line, contour, material, ctx, sink, &mut report);
                    }
                }
                other => report.skip_feature(index, LayerError::unsupported(other.kind())),
            }
        }

        info!(
            layer = self.name(),
            lines = report.primitives_emitted,
            skipped = report.features_skipped,
            "contours built"
        );
        Ok(report)
    }

    #[allow(clippy::too_many_arguments)]
    fn emit_line(
        &self,
        index: usize,
        line: &[Position],
        contour: f64,
        material: Material,
        ctx: &PipelineContext,
        sink: &mut impl PrimitiveSink,
        report: &mut LayerReport,
    ) {
        let mut vertices = Vec::with_capacity(line.len());
        for position in line {
            match ctx.project_at(position, contour) {
                Ok(v) => vertices.push(v),
                Err(err) => report.skip_position(index, err),
            }
        }
        if vertices.is_empty() {
            return;
        }
        sink.add_primitive(self.id, Primitive::Line { vertices, material });
        report.primitives_emitted += 1;
    }
}

impl Layer for ContourLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn name(&self) -> &'static str {
        "contours"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation::math::Vec3;
    use pretty_assertions::assert_eq;
    use scene::components::Color;

    fn collection(json: &str) -> FeatureCollection {
        FeatureCollection::from_geojson_str(json).expect("geojson")
    }

    fn ctx() -> PipelineContext {
        PipelineContext::default()
    }

    #[test]
    fn builds_one_line_per_linestring_part() {
        let fc = collection(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{"Contour":100},"geometry":{"type":"LineString","coordinates":[[0.0,0.0],[1.0,1.0]]}},
                {"type":"Feature","properties":{"Contour":300},"geometry":{"type":"MultiLineString","coordinates":[[[2.0,2.0],[3.0,3.0]],[[4.0,4.0],[5.0,5.0]]]}}
            ]}"#,
        );
        let mut out: Vec<Primitive> = Vec::new();
        let report = ContourLayer::new(1).build(&fc, &ctx(), &mut out).unwrap();

        assert_eq!(report.primitives_emitted, 3);
        assert!(report.is_clean());
        assert_eq!(out.len(), 3);

        let Primitive::Line { vertices, material } = &out[0] else {
            panic!("expected a line, got {:?}", out[0]);
        };
        assert_eq!(vertices[1], Vec3::new(1.0, 1.0, 100.0 * 0.0004));
        assert_eq!(material.color, Color::BLUE);
        assert_eq!(out[2].material().color, Color::RED);
    }

    #[test]
    fn all_equal_contours_fail_before_emitting() {
        let fc = collection(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{"Contour":50},"geometry":{"type":"LineString","coordinates":[[0.0,0.0],[1.0,1.0]]}},
                {"type":"Feature","properties":{"Contour":50},"geometry":{"type":"LineString","coordinates":[[2.0,0.0],[3.0,1.0]]}}
            ]}"#,
        );
        let mut out: Vec<Primitive> = Vec::new();
        let err = ContourLayer::new(1).build(&fc, &ctx(), &mut out).unwrap_err();
        assert_eq!(err, LayerError::DegenerateRange { value: 50.0 });
        assert!(out.is_empty());
    }

    #[test]
    fn skips_bad_positions_unsupported_kinds_and_missing_elevation() {
        let fc = collection(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{"Contour":0},"geometry":{"type":"LineString","coordinates":[[0.0,0.0],[1.0],[2.0,2.0]]}},
                {"type":"Feature","properties":{"Contour":10},"geometry":{"type":"Point","coordinates":[0.0,0.0]}},
                {"type":"Feature","properties":{"Name":"x"},"geometry":{"type":"LineString","coordinates":[[0.0,0.0],[1.0,1.0]]}},
                {"type":"Feature","properties":{"Contour":20},"geometry":{"type":"LineString","coordinates":[["a","b"]]}}
            ]}"#,
        );
        let mut out: Vec<Primitive> = Vec::new();
        let report = ContourLayer::new(1).build(&fc, &ctx(), &mut out).unwrap();

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].vertices().len(), 2);
        assert_eq!(report.features_visited, 4);
        assert_eq!(report.features_skipped, 2);
        assert_eq!(report.positions_skipped, 2);
        assert_eq!(report.diagnostics[1].feature, Some(1));
        assert!(report.diagnostics[1].message.contains("Point"));
    }

    #[test]
    fn custom_key_selects_elevation_field() {
        let fc = collection(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{"ELEV":1},"geometry":{"type":"LineString","coordinates":[[0.0,0.0],[1.0,1.0]]}},
                {"type":"Feature","properties":{"ELEV":2},"geometry":{"type":"LineString","coordinates":[[0.0,0.0],[1.0,1.0]]}}
            ]}"#,
        );
        let layer = ContourLayer::new(7).with_key("ELEV");
        let mut out: Vec<(LayerId, Primitive)> = Vec::new();
        let report = layer.build(&fc, &ctx(), &mut out).unwrap();
        assert_eq!(report.primitives_emitted, 2);
        assert!(out.iter().all(|(id, _)| *id == LayerId(7)));
    }
}
