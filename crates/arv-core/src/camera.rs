//! Viewer camera, viewport and staging orbit controls
//!
//! The world is Y-up. In staging mode the camera is driven by
//! [`OrbitControls`]; in AR mode its pose follows the device pose.

use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

use crate::pose::Pose;
use crate::ray::Ray;

/// Size of the render surface in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }

    /// Pixel coordinates (top-left origin) to normalized `[0, 1]` coordinates.
    pub fn to_normalized(&self, pixel: Vec2) -> Vec2 {
        Vec2::new(pixel.x / self.width, pixel.y / self.height)
    }
}

/// Normalized `[0, 1]` screen coordinates (top-left origin) to NDC.
pub fn normalized_to_ndc(normalized: Vec2) -> Vec2 {
    Vec2::new(2.0 * normalized.x - 1.0, 1.0 - 2.0 * normalized.y)
}

/// NDC to normalized `[0, 1]` screen coordinates (top-left origin).
pub fn ndc_to_normalized(ndc: Vec2) -> Vec2 {
    Vec2::new((ndc.x + 1.0) * 0.5, (1.0 - ndc.y) * 0.5)
}

/// Perspective camera
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub rotation: Quat,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// Create a new camera with default parameters
    pub fn new(aspect: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            rotation: Quat::IDENTITY,
            fov: 40.0_f32.to_radians(),
            aspect,
            near: 0.01,
            far: 1000.0,
        }
    }

    /// Update aspect ratio
    pub fn update_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// Follow a device pose (AR mode).
    pub fn set_pose(&mut self, pose: &Pose) {
        self.position = pose.position;
        self.rotation = pose.orientation;
    }

    /// Orient the camera towards `target`.
    pub fn look_at(&mut self, target: Vec3) {
        let view = Mat4::look_at_rh(self.position, target, Vec3::Y);
        let (_, rotation, _) = view.inverse().to_scale_rotation_translation();
        self.rotation = rotation.normalize();
    }

    /// Direction the camera looks along (-Z in camera space).
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position).inverse()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    /// Project a world point to normalized screen coordinates.
    ///
    /// Returns `None` for points behind the camera.
    pub fn project(&self, world: Vec3) -> Option<Vec2> {
        let clip = self.projection_matrix() * self.view_matrix() * world.extend(1.0);
        if clip.w <= 1e-6 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(ndc_to_normalized(Vec2::new(ndc.x, ndc.y)))
    }

    /// Convert normalized screen coordinates to a world ray
    pub fn ray_from_normalized(&self, normalized: Vec2) -> Ray {
        let ndc = normalized_to_ndc(normalized);

        let inv_proj = self.projection_matrix().inverse();
        let inv_view = self.view_matrix().inverse();

        // Near and far points in NDC (glam's perspective_rh maps depth to [0, 1])
        let near_ndc = Vec4::new(ndc.x, ndc.y, 0.0, 1.0);
        let far_ndc = Vec4::new(ndc.x, ndc.y, 1.0, 1.0);

        // Transform to view space
        let near_view = inv_proj * near_ndc;
        let far_view = inv_proj * far_ndc;
        let near_view = near_view.truncate() / near_view.w;
        let far_view = far_view.truncate() / far_view.w;

        // Transform to world space
        let near_world = inv_view.transform_point3(near_view);
        let far_world = inv_view.transform_point3(far_view);

        Ray::new(near_world, far_world - near_world)
    }
}

/// Orbit controls for the staging camera
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitControls {
    pub target: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    pub enabled: bool,
    default_yaw: f32,
    default_pitch: f32,
    default_distance: f32,
}

impl OrbitControls {
    pub fn new(target: Vec3, distance: f32) -> Self {
        let yaw = 45.0_f32.to_radians();
        let pitch = 20.0_f32.to_radians();
        Self {
            target,
            yaw,
            pitch,
            distance,
            enabled: true,
            default_yaw: yaw,
            default_pitch: pitch,
            default_distance: distance,
        }
    }

    /// Frame a bounding sphere and make that the canonical pose.
    pub fn fit(&mut self, center: Vec3, radius: f32, fov: f32) {
        let distance = (radius / (fov * 0.5).sin()).max(0.5);
        self.target = center;
        self.distance = distance;
        self.default_distance = distance;
    }

    /// Orbit around the target. Ignored while disabled.
    pub fn orbit(&mut self, delta_yaw: f32, delta_pitch: f32) {
        if !self.enabled {
            return;
        }
        self.yaw += delta_yaw;
        self.pitch =
            (self.pitch + delta_pitch).clamp(-10.0_f32.to_radians(), 85.0_f32.to_radians());
    }

    /// Zoom towards the target. Ignored while disabled.
    pub fn zoom(&mut self, delta: f32) {
        if !self.enabled {
            return;
        }
        self.distance = (self.distance * (1.0 - delta * 0.1)).clamp(0.1, 100.0);
    }

    /// Return to the canonical default pose.
    pub fn reset(&mut self) {
        self.yaw = self.default_yaw;
        self.pitch = self.default_pitch;
        self.distance = self.default_distance;
    }

    pub fn eye(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    /// Write the orbit pose into `camera`.
    pub fn apply(&self, camera: &mut Camera) {
        camera.position = self.eye();
        camera.look_at(self.target);
    }
}
