//! Camera framing arithmetic for a planar scene extent.
//!
//! All functions are pure. A degenerate extent (missing, inverted, zero or
//! infinite horizontal size) is an error: it would otherwise place the
//! camera at NaN or infinity.

use foundation::bounds::BoundingBox;
use foundation::math::{Vec2, Vec3};
use serde::Serialize;
use thiserror::Error;

/// Safety margin applied to the fitted camera distance.
pub const FRAMING_MARGIN: f64 = 1.1;

/// Vertical field of view before any viewport adjustment (degrees).
pub const DEFAULT_FOV_DEG: f64 = 75.0;

/// Viewport width at or below which [`MAX_DYNAMIC_FOV_DEG`] applies.
pub const NARROW_VIEWPORT_PX: f64 = 600.0;
/// Viewport width at or above which [`MIN_DYNAMIC_FOV_DEG`] applies.
pub const WIDE_VIEWPORT_PX: f64 = 1200.0;
pub const MAX_DYNAMIC_FOV_DEG: f64 = 90.0;
pub const MIN_DYNAMIC_FOV_DEG: f64 = 60.0;

pub const NEAR_PLANE: f64 = 0.1;
pub const FAR_PLANE: f64 = 1000.0;

#[derive(Debug, Copy, Clone, PartialEq, Error)]
pub enum FramingError {
    #[error("degenerate bounding box: min ({min_x}, {min_y}) max ({max_x}, {max_y})")]
    DegenerateBox {
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
    },
    #[error("vertical field of view must be within (0, 180) degrees, got {0}")]
    InvalidFov(f64),
    #[error("no framing extent available")]
    NoExtent,
}

/// Where the camera sits, what it looks at, and which way is up on screen.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct PerspectiveCamera {
    pub fov_deg: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
}

impl PerspectiveCamera {
    pub fn new(fov_deg: f64, aspect: f64) -> Self {
        Self {
            fov_deg,
            aspect,
            near: NEAR_PLANE,
            far: FAR_PLANE,
        }
    }

    /// Adopt the field of view suited to `viewport_width_px`.
    pub fn fit_viewport(&mut self, viewport_width_px: f64, viewport_height_px: f64) {
        self.fov_deg = dynamic_fov(viewport_width_px);
        if viewport_height_px > 0.0 {
            self.aspect = viewport_width_px / viewport_height_px;
        }
    }
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(DEFAULT_FOV_DEG, 16.0 / 9.0)
    }
}

fn checked(bbox: &BoundingBox) -> Result<Vec2, FramingError> {
    let size = Vec2::new(bbox.max.x - bbox.min.x, bbox.max.y - bbox.min.y);
    let positive = size.x > 0.0 && size.y > 0.0;
    if bbox.is_degenerate() || !positive || !bbox.min.truncate().is_finite() {
        return Err(FramingError::DegenerateBox {
            min_x: bbox.min.x,
            min_y: bbox.min.y,
            max_x: bbox.max.x,
            max_y: bbox.max.y,
        });
    }
    Ok(size)
}

/// Horizontal center of the box, on the `z = 0` plane.
pub fn center(bbox: &BoundingBox) -> Result<Vec3, FramingError> {
    checked(bbox)?;
    Ok(Vec3::new(
        (bbox.min.x + bbox.max.x) / 2.0,
        (bbox.min.y + bbox.max.y) / 2.0,
        0.0,
    ))
}

/// Horizontal extents of the box.
pub fn size(bbox: &BoundingBox) -> Result<Vec2, FramingError> {
    checked(bbox)
}

/// Distance at which a camera with `vertical_fov_deg` sees the whole box
/// (its larger horizontal side), widened by [`FRAMING_MARGIN`].
pub fn camera_distance(bbox: &BoundingBox, vertical_fov_deg: f64) -> Result<f64, FramingError> {
    let size = checked(bbox)?;
    if !(vertical_fov_deg > 0.0 && vertical_fov_deg < 180.0) {
        return Err(FramingError::InvalidFov(vertical_fov_deg));
    }
    let max_dim = size.x.max(size.y);
    let half_fov = vertical_fov_deg.to_radians() / 2.0;
    Ok(max_dim / 2.0 / half_fov.tan() * FRAMING_MARGIN)
}

/// Straight-down view of the whole box with north (+Y) up on screen.
pub fn top_down_pose(bbox: &BoundingBox, vertical_fov_deg: f64) -> Result<CameraPose, FramingError> {
    let c = center(bbox)?;
    let distance = camera_distance(bbox, vertical_fov_deg)?;
    Ok(CameraPose {
        position: Vec3::new(c.x, c.y, distance),
        target: c,
        up: Vec3::Y,
    })
}

/// Field of view for a viewport width: wide viewports get a narrower FOV.
pub fn dynamic_fov(viewport_width_px: f64) -> f64 {
    let t = ((viewport_width_px - NARROW_VIEWPORT_PX) / (WIDE_VIEWPORT_PX - NARROW_VIEWPORT_PX))
        .clamp(0.0, 1.0);
    MAX_DYNAMIC_FOV_DEG + (MIN_DYNAMIC_FOV_DEG - MAX_DYNAMIC_FOV_DEG) * t
}
