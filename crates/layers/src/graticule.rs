use foundation::bounds::BoundingBox;
use foundation::math::{Crs, Vec3};
use scene::PrimitiveSink;
use scene::components::{Color, Material, Primitive};
use tracing::{debug, info};

use crate::error::LayerError;
use crate::layer::{Layer, LayerId, LayerReport};

/// Upper bound on grid lines for one graticule.
pub const MAX_GRATICULE_LINES: usize = 10_000;

/// Grid spacing in degrees for geographic scenes.
pub const DEFAULT_GRID_SIZE: f64 = 0.1;
/// Grid spacing in meters for projected scenes, about 0.1° of latitude.
pub const METRIC_GRID_SIZE: f64 = 10_000.0;
pub const DEFAULT_SCALE_FACTOR: f64 = 0.5;

/// Rectangular grid on the `z = 0` plane, shrunk about the extent's center
/// and aligned to multiples of the grid size.
#[derive(Debug, Clone, PartialEq)]
pub struct GraticuleLayer {
    id: LayerId,
    grid_size: f64,
    scale_factor: f64,
    material: Material,
}

/// Grid-aligned rectangle the lines span.
#[derive(Debug, Copy, Clone, PartialEq)]
struct GridSpan {
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
}

impl GraticuleLayer {
    pub fn new(id: u64) -> Self {
        Self {
            id: LayerId(id),
            grid_size: DEFAULT_GRID_SIZE,
            scale_factor: DEFAULT_SCALE_FACTOR,
            material: Material::solid(Color::from_hex(0x00FF00)).with_opacity(0.2),
        }
    }

    /// Grid spacing in the planar units of `crs`.
    pub fn for_crs(id: u64, crs: Crs) -> Self {
        Self::new(id).with_grid_size(grid_size_for(crs))
    }

    pub fn with_grid_size(mut self, grid_size: f64) -> Self {
        self.grid_size = grid_size;
        self
    }

    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    pub fn build(
        &self,
        bbox: &BoundingBox,
        sink: &mut impl PrimitiveSink,
    ) -> Result<LayerReport, LayerError> {
        if !(self.grid_size.is_finite() && self.grid_size > 0.0) {
            return Err(LayerError::InvalidParameter {
                name: "grid_size",
                value: self.grid_size,
            });
        }
        if !(self.scale_factor.is_finite() && self.scale_factor > 0.0) {
            return Err(LayerError::InvalidParameter {
                name: "scale_factor",
                value: self.scale_factor,
            });
        }
        if bbox.is_degenerate() {
            return Err(LayerError::DegenerateExtent);
        }

        let mut report = LayerReport::new(self);
        let span = self.span(bbox);
        if span.min_x > span.max_x || span.min_y > span.max_y {
            debug!(?span, "graticule collapsed to nothing");
            return Ok(report);
        }

        let columns = self.steps(span.min_x, span.max_x);
        let rows = self.steps(span.min_y, span.max_y);
        let lines = columns + rows;
        if lines > MAX_GRATICULE_LINES as f64 {
            return Err(LayerError::GraticuleTooDense {
                lines: saturating_count(lines),
                limit: MAX_GRATICULE_LINES,
            });
        }
        let (columns, rows) = (columns as usize, rows as usize);

        for i in 0..columns {
            let x = span.min_x + i as f64 * self.grid_size;
            self.emit(
                sink,
                &mut report,
                Primitive::Line {
                    vertices: vec![
                        Vec3::new(x, span.min_y, 0.0),
                        Vec3::new(x, span.max_y, 0.0),
                    ],
                    material: self.material,
                },
            );
        }
        for i in 0..rows {
            let y = span.min_y + i as f64 * self.grid_size;
            self.emit(
                sink,
                &mut report,
                Primitive::Line {
                    vertices: vec![
                        Vec3::new(span.min_x, y, 0.0),
                        Vec3::new(span.max_x, y, 0.0),
                    ],
                    material: self.material,
                },
            );
        }
        self.emit(
            sink,
            &mut report,
            Primitive::LineLoop {
                vertices: vec![
                    Vec3::new(span.min_x, span.min_y, 0.0),
                    Vec3::new(span.max_x, span.min_y, 0.0),
                    Vec3::new(span.max_x, span.max_y, 0.0),
                    Vec3::new(span.min_x, span.max_y, 0.0),
                ],
                material: self.material,
            },
        );

        info!(columns, rows, "graticule built");
        Ok(report)
    }

    fn span(&self, bbox: &BoundingBox) -> GridSpan {
        let g = self.grid_size;
        let cx = (bbox.min.x + bbox.max.x) / 2.0;
        let cy = (bbox.min.y + bbox.max.y) / 2.0;
        let half_w = (bbox.max.x - bbox.min.x) * self.scale_factor / 2.0;
        let half_h = (bbox.max.y - bbox.min.y) * self.scale_factor / 2.0;

        GridSpan {
            min_x: ((cx - half_w) / g).ceil() * g,
            max_x: ((cx + half_w) / g).floor() * g,
            min_y: ((cy - half_h) / g).ceil() * g,
            max_y: ((cy + half_h) / g).floor() * g,
        }
        .clamped(bbox)
    }

    /// Grid positions from `lo` to `hi` inclusive. Counted in f64 so wide
    /// spans are rejected before any integer conversion.
    fn steps(&self, lo: f64, hi: f64) -> f64 {
        ((hi - lo) / self.grid_size + 1e-9).floor() + 1.0
    }

    fn emit(&self, sink: &mut impl PrimitiveSink, report: &mut LayerReport, primitive: Primitive) {
        sink.add_primitive(self.id, primitive);
        report.primitives_emitted += 1;
    }
}

/// Planar grid spacing suited to the units of `crs`.
pub fn grid_size_for(crs: Crs) -> f64 {
    match crs {
        Crs::Geographic => DEFAULT_GRID_SIZE,
        Crs::WebMercator | Crs::LocalTangent { .. } => METRIC_GRID_SIZE,
    }
}

fn saturating_count(lines: f64) -> usize {
    if lines >= usize::MAX as f64 {
        usize::MAX
    } else {
        lines as usize
    }
}

impl GridSpan {
    fn clamped(self, bbox: &BoundingBox) -> Self {
        Self {
            min_x: self.min_x.max(bbox.min.x),
            max_x: self.max_x.min(bbox.max.x),
            min_y: self.min_y.max(bbox.min.y),
            max_y: self.max_y.min(bbox.max.y),
        }
    }
}

impl Default for GraticuleLayer {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Layer for GraticuleLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn name(&self) -> &'static str {
        "graticule"
    }
}
