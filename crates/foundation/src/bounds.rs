use serde::{Deserialize, Serialize};

use crate::math::{Vec2, Vec3};

/// Axis-aligned scene extent.
///
/// Horizontal bounds come from projected data; the vertical bounds of a
/// dataset extent are unbounded (`±inf`) because elevation is placed
/// separately. A box folded from no points keeps its swapped infinities and
/// reports itself as degenerate.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// The fold identity: every bound swapped to the opposite infinity.
    pub fn empty() -> Self {
        Self {
            min: Vec3::new(f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY),
            max: Vec3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::INFINITY),
        }
    }

    /// Horizontal extent of the given points, vertically unbounded.
    pub fn from_points(points: impl IntoIterator<Item = Vec2>) -> Self {
        points.into_iter().fold(Self::empty(), |mut acc, p| {
            acc.include(p);
            acc
        })
    }

    pub fn include(&mut self, p: Vec2) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    /// Grow the four horizontal bounds by `margin`.
    pub fn padded(self, margin: f64) -> Self {
        Self {
            min: Vec3::new(self.min.x - margin, self.min.y - margin, self.min.z),
            max: Vec3::new(self.max.x + margin, self.max.y + margin, self.max.z),
        }
    }

    /// True when the horizontal extent is missing, inverted or non-finite.
    pub fn is_degenerate(&self) -> bool {
        let w = self.max.x - self.min.x;
        let h = self.max.y - self.min.y;
        !(w.is_finite() && h.is_finite() && w >= 0.0 && h >= 0.0)
    }

    pub fn contains_xy(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Horizontal corners, counter-clockwise from `min`.
    pub fn corners(&self) -> [Vec2; 4] {
        [
            Vec2::new(self.min.x, self.min.y),
            Vec2::new(self.max.x, self.min.y),
            Vec2::new(self.max.x, self.max.y),
            Vec2::new(self.min.x, self.max.y),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::BoundingBox;
    use crate::math::{Vec2, Vec3};

    #[test]
    fn folds_points_and_pads() {
        let bbox = BoundingBox::from_points([
            Vec2::new(1.0, 5.0),
            Vec2::new(-2.0, 3.0),
            Vec2::new(0.5, 7.0),
        ])
        .padded(2.0);
        assert_eq!(bbox.min.x, -4.0);
        assert_eq!(bbox.min.y, 1.0);
        assert_eq!(bbox.max.x, 3.0);
        assert_eq!(bbox.max.y, 9.0);
        assert_eq!(bbox.min.z, f64::NEG_INFINITY);
        assert_eq!(bbox.max.z, f64::INFINITY);
        assert!(!bbox.is_degenerate());
    }

    #[test]
    fn empty_fold_is_degenerate() {
        let bbox = BoundingBox::from_points(std::iter::empty()).padded(2.0);
        assert!(bbox.is_degenerate());
        assert_eq!(bbox.min.x, f64::INFINITY);
        assert_eq!(bbox.max.x, f64::NEG_INFINITY);
    }

    #[test]
    fn single_point_box_is_not_degenerate() {
        let bbox = BoundingBox::from_points([Vec2::new(3.0, 4.0)]);
        assert!(!bbox.is_degenerate());
        assert!(bbox.contains_xy(Vec2::new(3.0, 4.0)));
    }

    #[test]
    fn corners_are_counter_clockwise() {
        let bbox = BoundingBox::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 0.0));
        let c = bbox.corners();
        assert_eq!(c[0], Vec2::new(0.0, 0.0));
        assert_eq!(c[2], Vec2::new(2.0, 1.0));
    }
}
