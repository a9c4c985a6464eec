//! Axis-aligned bounds of the tracked model.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Minimum corner of the bounding box.
    pub min: Vec3,
    /// Maximum corner of the bounding box.
    pub max: Vec3,
}

impl BoundingBox {
    /// Creates a new bounding box from min and max points.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Creates an empty (inverted) bounding box.
    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    /// Creates a bounding box that contains all given points.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        points
            .into_iter()
            .fold(Self::empty(), |bbox, point| bbox.expand_to_include(point))
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Radius of the bounding sphere centered on [`Self::center`].
    pub fn radius(&self) -> f32 {
        self.half_extents().length()
    }

    /// Radius of the circle enclosing the box footprint on the XZ plane.
    pub fn footprint_radius(&self) -> f32 {
        let half = self.half_extents();
        (half.x * half.x + half.z * half.z).sqrt()
    }

    /// Returns true if the bounding box contains the given point (inclusive).
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Returns a new bounding box expanded to include the given point.
    pub fn expand_to_include(&self, point: Vec3) -> BoundingBox {
        BoundingBox {
            min: self.min.min(point),
            max: self.max.max(point),
        }
    }

    /// Returns a copy grown by `margin` on every side.
    pub fn expand_by_scalar(&self, margin: f32) -> BoundingBox {
        BoundingBox {
            min: self.min - Vec3::splat(margin),
            max: self.max + Vec3::splat(margin),
        }
    }

    /// Transforms the bounding box by the given matrix.
    ///
    /// Returns the axis-aligned box containing the eight transformed corners,
    /// which may be larger than the tightest fit for rotated boxes.
    pub fn transform(&self, transform: &Mat4) -> BoundingBox {
        let corners = [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ];

        BoundingBox::from_points(corners.map(|c| transform.transform_point3(c)))
    }

    /// Returns true if the bounding box is valid (non-empty).
    pub fn is_valid(&self) -> bool {
        self.min.cmple(self.max).all()
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    #[test]
    fn test_bounding_box_contains_point() {
        let bbox = BoundingBox::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        assert!(bbox.contains_point(Vec3::ZERO));
        assert!(bbox.contains_point(Vec3::new(1.0, 1.0, 1.0)));
        assert!(!bbox.contains_point(Vec3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_expand_by_scalar_grows_every_side() {
        let bbox = BoundingBox::new(Vec3::ZERO, Vec3::ONE).expand_by_scalar(0.075);
        assert!(bbox.contains_point(Vec3::new(-0.07, 0.5, 1.07)));
        assert!(!bbox.contains_point(Vec3::new(-0.08, 0.5, 0.5)));
    }

    #[test]
    fn test_transform_rotated_box_stays_conservative() {
        let bbox = BoundingBox::new(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        let m = Mat4::from_rotation_translation(
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_4),
            Vec3::new(2.0, 0.0, 0.0),
        );
        let world = bbox.transform(&m);
        assert!(world.contains_point(Vec3::new(2.0, 0.5, 0.0)));
        assert!((world.max.x - (2.0 + 2.0_f32.sqrt())).abs() < 1e-5);
    }

    #[test]
    fn test_empty_box_is_invalid() {
        assert!(!BoundingBox::empty().is_valid());
        assert!(BoundingBox::from_points([Vec3::ZERO]).is_valid());
    }
}
