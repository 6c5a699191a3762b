use foundation::math::{Projector, Vec2, Vec3};
use formats::geojson::Position;
use formats::manifest::DEFAULT_Z_SCALE;

use crate::error::LayerError;

/// Everything converters share for one scene build.
///
/// `base_elevation` is the lowest contour of the authoritative dataset. It is
/// filled in once that dataset is known and read by the converters that run
/// after it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PipelineContext {
    pub projector: Projector,
    pub z_scale: f64,
    pub base_elevation: f64,
}

impl PipelineContext {
    pub fn new(projector: Projector, z_scale: f64) -> Self {
        Self {
            projector,
            z_scale,
            base_elevation: 0.0,
        }
    }

    pub fn with_base_elevation(mut self, base_elevation: f64) -> Self {
        self.base_elevation = base_elevation;
        self
    }

    /// Scene z for a raw elevation value.
    pub fn scene_z(&self, elevation: f64) -> f64 {
        elevation * self.z_scale
    }

    /// Scene z of the terrain base.
    pub fn base_z(&self) -> f64 {
        self.scene_z(self.base_elevation)
    }

    pub fn project(&self, position: &Position) -> Result<Vec2, LayerError> {
        let p = position.point()?;
        Ok(self.projector.project(p.lon_deg, p.lat_deg)?)
    }

    pub fn project_at(&self, position: &Position, elevation: f64) -> Result<Vec3, LayerError> {
        Ok(self.project(position)?.extend(self.scene_z(elevation)))
    }
}

impl Default for PipelineContext {
    fn default() -> Self {
        Self::new(Projector::default(), DEFAULT_Z_SCALE)
    }
}
