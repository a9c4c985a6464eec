//! Surface-tracking reticle
//!
//! While visible, the reticle hit-tests a fixed screen point every frame and
//! eases towards the surface it finds. Without a surface it floats a fixed
//! distance in front of the device. The tracking state is edge-triggered:
//! one event per found/lost transition, never per frame.

use arv_core::{PoseProvider, ReticleConfig};
use glam::{Quat, Vec2, Vec3};

/// Tracking state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReticleEvent {
    /// A surface is under the reticle.
    FoundSurface,
    /// The surface was lost.
    FindingSurface,
}

/// Placement reticle.
#[derive(Debug, Clone)]
pub struct TrackingReticle {
    config: ReticleConfig,
    visible: bool,
    opacity: f32,
    position: Vec3,
    orientation: Quat,
    tracking: bool,
    tracking_blend: f32,
}

impl TrackingReticle {
    /// Create a hidden reticle.
    pub fn new(config: ReticleConfig) -> Self {
        Self {
            config,
            visible: false,
            opacity: 0.0,
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            tracking: false,
            tracking_blend: 0.0,
        }
    }

    /// Start updating and drawing.
    pub fn show(&mut self) {
        self.visible = true;
    }

    /// Stop updating. Tracking state is reset silently so the next session
    /// starts from "finding surface".
    pub fn hide(&mut self) {
        self.visible = false;
        self.tracking = false;
        self.tracking_blend = 0.0;
    }

    /// Whether the reticle is updating.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether a surface was found on the last update.
    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    /// Smoothed tracking state in `[0, 1]`, for fading.
    pub fn tracking_blend(&self) -> f32 {
        self.tracking_blend
    }

    /// Displayed position.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Displayed orientation.
    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    /// Current opacity.
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Set opacity (driven by the viewer's fades).
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    /// Display scale: starts large and shrinks to 1 as the reticle fades in.
    pub fn scale(&self) -> f32 {
        self.config.start_scale + (1.0 - self.config.start_scale) * self.opacity
    }

    /// Per-frame update.
    pub fn update(&mut self, provider: Option<&dyn PoseProvider>) -> Option<ReticleEvent> {
        if !self.visible {
            return None;
        }
        let provider = provider?;

        let point = Vec2::from(self.config.screen_point);
        let found = match provider.first_hit(point) {
            Some(hit) => {
                self.position = self.position.lerp(hit.position(), self.config.ease);
                self.orientation = self.orientation.slerp(hit.orientation(), self.config.ease);
                true
            }
            None => {
                let pose = provider.device_pose();
                let target = pose.position + pose.forward() * self.config.fallback_distance;
                self.position = self.position.lerp(target, self.config.ease);
                false
            }
        };

        let step = if found {
            self.config.blend_step
        } else {
            -self.config.blend_step
        };
        self.tracking_blend = (self.tracking_blend + step).clamp(0.0, 1.0);

        if found == self.tracking {
            return None;
        }
        self.tracking = found;
        tracing::debug!(found, "Reticle tracking changed");
        Some(if found {
            ReticleEvent::FoundSurface
        } else {
            ReticleEvent::FindingSurface
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use arv_core::{Pose, SimulatedSurface};

    fn surface() -> SimulatedSurface {
        let mut surface = SimulatedSurface::new(Some(0.0), 60.0_f32.to_radians(), 1.0);
        surface.set_pose(Pose::new(
            Vec3::new(0.0, 1.0, 0.0),
            Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2),
        ));
        surface
    }

    fn reticle() -> TrackingReticle {
        let mut reticle = TrackingReticle::new(ReticleConfig::default());
        reticle.show();
        reticle
    }

    #[test]
    fn test_hidden_reticle_does_not_update() {
        let mut surface = surface();
        surface.begin_frame();
        let mut reticle = TrackingReticle::new(ReticleConfig::default());
        assert_eq!(reticle.update(Some(&surface)), None);
        assert!(!reticle.is_tracking());
    }

    #[test]
    fn test_no_capability_is_noop() {
        let mut reticle = reticle();
        assert_eq!(reticle.update(None), None);
        assert_eq!(reticle.position(), Vec3::ZERO);
    }

    #[test]
    fn test_one_event_per_transition() {
        let mut surface = surface();
        // hit, miss, hit, miss, then steady hits
        surface.schedule([false, true, false, true, false, false, false]);
        let mut reticle = reticle();

        let events: Vec<_> = (0..7)
            .filter_map(|_| {
                surface.begin_frame();
                reticle.update(Some(&surface))
            })
            .collect();
        assert_eq!(
            events,
            vec![
                ReticleEvent::FoundSurface,
                ReticleEvent::FindingSurface,
                ReticleEvent::FoundSurface,
                ReticleEvent::FindingSurface,
                ReticleEvent::FoundSurface,
            ]
        );
        assert!(reticle.is_tracking());
    }

    #[test]
    fn test_position_eases_towards_hit() {
        let mut surface = surface();
        surface.set_pose(Pose::new(
            Vec3::new(2.0, 1.0, 0.0),
            Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2),
        ));
        let mut reticle = reticle();

        surface.begin_frame();
        reticle.update(Some(&surface));
        assert_relative_eq!(reticle.position().x, 1.0, epsilon = 1e-4);
        surface.begin_frame();
        reticle.update(Some(&surface));
        assert_relative_eq!(reticle.position().x, 1.5, epsilon = 1e-4);
    }

    #[test]
    fn test_lost_surface_floats_in_front_of_device() {
        let mut surface = surface();
        surface.set_surface_height(None);
        let mut reticle = reticle();
        for _ in 0..30 {
            surface.begin_frame();
            reticle.update(Some(&surface));
        }
        // 1.5 below a downward-looking device at height 1.0
        assert!(reticle.position().abs_diff_eq(Vec3::new(0.0, -0.5, 0.0), 1e-3));
        assert_eq!(reticle.tracking_blend(), 0.0);
    }

    #[test]
    fn test_blend_steps_and_clamps() {
        let mut surface = surface();
        let mut reticle = reticle();
        for _ in 0..3 {
            surface.begin_frame();
            reticle.update(Some(&surface));
        }
        assert_relative_eq!(reticle.tracking_blend(), 0.3, epsilon = 1e-5);
        for _ in 0..20 {
            surface.begin_frame();
            reticle.update(Some(&surface));
        }
        assert_eq!(reticle.tracking_blend(), 1.0);
    }

    #[test]
    fn test_scale_shrinks_as_opacity_rises() {
        let mut reticle = reticle();
        assert_relative_eq!(reticle.scale(), 1.5);
        reticle.set_opacity(1.0);
        assert_relative_eq!(reticle.scale(), 1.0);
    }
}
