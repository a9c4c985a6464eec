//! Device pose and surface hit-test capability
//!
//! The AR runtime is an opaque capability: per frame it reports the device
//! pose and answers "which surface lies under this normalized screen point".
//! When the device has no such capability the viewer holds `None` instead of
//! a provider and every AR path becomes a no-op.

use std::collections::VecDeque;

use glam::{Mat4, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::camera::Camera;
use crate::ray::ray_plane_intersection;

/// Position and orientation of the device in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Pose {
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Forward direction (-Z of the device frame).
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Quat::IDENTITY)
    }
}

/// A detected surface under a screen point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitResult {
    pub model_matrix: Mat4,
}

impl HitResult {
    pub fn position(&self) -> Vec3 {
        self.model_matrix.w_axis.truncate()
    }

    pub fn orientation(&self) -> Quat {
        let (_, rotation, _) = self.model_matrix.to_scale_rotation_translation();
        rotation
    }
}

/// Per-frame device pose and ray-surface hit testing.
pub trait PoseProvider {
    /// Current device pose.
    fn device_pose(&self) -> Pose;

    /// Surfaces under a normalized `[0, 1]` screen point, nearest first.
    fn hit_test(&self, normalized: Vec2) -> Vec<HitResult>;

    /// Nearest hit, if any.
    fn first_hit(&self, normalized: Vec2) -> Option<HitResult> {
        self.hit_test(normalized).into_iter().next()
    }
}

/// Simulated AR runtime over an infinite horizontal surface.
///
/// Hit tests cast a ray from the device through the screen point using the
/// given intrinsics. Scheduled dropouts make the next hit tests fail, which
/// reproduces tracking loss near surface edges.
#[derive(Debug, Clone)]
pub struct SimulatedSurface {
    pose: Pose,
    fov: f32,
    aspect: f32,
    /// Height of the surface, or `None` while nothing is detected.
    surface_height: Option<f32>,
    /// One entry per upcoming frame: `true` forces a miss on that frame.
    dropouts: VecDeque<bool>,
    frame_forced_miss: bool,
}

impl SimulatedSurface {
    pub fn new(surface_height: Option<f32>, fov: f32, aspect: f32) -> Self {
        Self {
            pose: Pose::default(),
            fov,
            aspect,
            surface_height,
            dropouts: VecDeque::new(),
            frame_forced_miss: false,
        }
    }

    pub fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }

    pub fn set_surface_height(&mut self, height: Option<f32>) {
        self.surface_height = height;
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// Schedule per-frame outcomes: `true` = forced miss.
    pub fn schedule(&mut self, frames: impl IntoIterator<Item = bool>) {
        self.dropouts.extend(frames);
    }

    /// Force misses for the next `frames` frames.
    pub fn drop_out(&mut self, frames: usize) {
        self.schedule(std::iter::repeat_n(true, frames));
    }

    /// Advance to the next frame, consuming one scheduled outcome.
    pub fn begin_frame(&mut self) {
        self.frame_forced_miss = self.dropouts.pop_front().unwrap_or(false);
    }

    fn camera(&self) -> Camera {
        let mut camera = Camera::new(self.aspect);
        camera.fov = self.fov;
        camera.set_pose(&self.pose);
        camera
    }
}

impl PoseProvider for SimulatedSurface {
    fn device_pose(&self) -> Pose {
        self.pose
    }

    fn hit_test(&self, normalized: Vec2) -> Vec<HitResult> {
        if self.frame_forced_miss {
            return Vec::new();
        }
        let Some(height) = self.surface_height else {
            return Vec::new();
        };

        let ray = self.camera().ray_from_normalized(normalized);
        ray_plane_intersection(&ray, Vec3::new(0.0, height, 0.0), Vec3::Y)
            .map(|point| HitResult {
                model_matrix: Mat4::from_translation(point),
            })
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn looking_down() -> Pose {
        Pose::new(
            Vec3::new(0.0, 1.5, 0.0),
            Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2),
        )
    }

    #[test]
    fn test_center_hit_lies_below_device() {
        let mut surface = SimulatedSurface::new(Some(0.0), 60.0_f32.to_radians(), 1.0);
        surface.set_pose(looking_down());
        surface.begin_frame();

        let hit = surface.first_hit(Vec2::splat(0.5)).unwrap();
        assert!(hit.position().abs_diff_eq(Vec3::ZERO, 1e-4));
    }

    #[test]
    fn test_scheduled_dropout_misses_then_recovers() {
        let mut surface = SimulatedSurface::new(Some(0.0), 60.0_f32.to_radians(), 1.0);
        surface.set_pose(looking_down());
        surface.drop_out(2);

        let outcomes: Vec<bool> = (0..3)
            .map(|_| {
                surface.begin_frame();
                surface.first_hit(Vec2::splat(0.5)).is_some()
            })
            .collect();
        assert_eq!(outcomes, vec![false, false, true]);
    }

    #[test]
    fn test_no_surface_no_hit() {
        let mut surface = SimulatedSurface::new(None, 1.0, 1.0);
        surface.set_pose(looking_down());
        surface.begin_frame();
        assert!(surface.hit_test(Vec2::splat(0.5)).is_empty());
    }
}
