//! Ground highlight under the grabbed object

use arv_core::{Easing, TrackedObject, Tween};
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3};

use crate::gesture::GestureEvent;

/// Highlight instance data, laid out for a vertex instance buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct HighlightInstance {
    /// Ground-aligned transform.
    pub transform: [[f32; 4]; 4],
    /// Fade amount in `[0, 1]`.
    pub opacity: f32,
    /// Disc radius.
    pub radius: f32,
    /// Padding for alignment.
    pub _pad: [f32; 2],
}

impl Default for HighlightInstance {
    fn default() -> Self {
        Self {
            transform: Mat4::IDENTITY.to_cols_array_2d(),
            opacity: 0.0,
            radius: 1.0,
            _pad: [0.0; 2],
        }
    }
}

/// Shows a highlight while a gesture is in progress and keeps it under the
/// object.
#[derive(Debug, Clone)]
pub struct EffectsCoordinator {
    fade_duration: f32,
    fade: Option<Tween>,
    opacity: f32,
    instance: HighlightInstance,
}

impl EffectsCoordinator {
    /// Create with the highlight hidden.
    pub fn new(fade_duration: f32) -> Self {
        Self {
            fade_duration,
            fade: None,
            opacity: 0.0,
            instance: HighlightInstance::default(),
        }
    }

    /// React to gesture events: fade in on `Down`, out on `Up`.
    pub fn handle(&mut self, event: GestureEvent) {
        let target = match event {
            GestureEvent::Down => 1.0,
            GestureEvent::Up => 0.0,
            _ => return,
        };
        self.fade = Some(Tween::new(
            self.opacity,
            target,
            self.fade_duration,
            Easing::QuadOut,
        ));
    }

    /// Hide immediately, cancelling any fade.
    pub fn hide(&mut self) {
        self.fade = None;
        self.opacity = 0.0;
        self.instance.opacity = 0.0;
    }

    /// Current highlight opacity.
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Advance the fade and follow the object.
    pub fn update(&mut self, dt: f32, object: &TrackedObject) {
        if let Some(fade) = &mut self.fade {
            let done = fade.advance(dt);
            self.opacity = fade.value();
            if done {
                self.fade = None;
            }
        }

        let bounds = object.world_bounds();
        let position = object.world_position();
        let floor = Vec3::new(position.x, bounds.min.y, position.z);
        let (yaw, _, _) = object.world_rotation().to_euler(glam::EulerRot::YXZ);

        self.instance = HighlightInstance {
            transform: Mat4::from_rotation_translation(Quat::from_rotation_y(yaw), floor)
                .to_cols_array_2d(),
            opacity: self.opacity,
            radius: bounds.footprint_radius(),
            _pad: [0.0; 2],
        };
    }

    /// Instance to draw, `None` while fully hidden.
    pub fn instance(&self) -> Option<HighlightInstance> {
        (self.opacity > 0.0).then_some(self.instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use arv_core::BoundingBox;

    fn object() -> TrackedObject {
        TrackedObject::new(BoundingBox::new(
            Vec3::new(-0.5, 0.0, -0.5),
            Vec3::new(0.5, 1.0, 0.5),
        ))
    }

    #[test]
    fn test_instance_is_pod_sized() {
        assert_eq!(std::mem::size_of::<HighlightInstance>(), 80);
        let instance = HighlightInstance::default();
        let bytes = bytemuck::bytes_of(&instance);
        assert_eq!(bytes.len(), 80);
    }

    #[test]
    fn test_fades_in_on_down_and_out_on_up() {
        let mut effects = EffectsCoordinator::new(0.3);
        let object = object();
        assert!(effects.instance().is_none());

        effects.handle(GestureEvent::Down);
        effects.update(0.5, &object);
        assert_relative_eq!(effects.opacity(), 1.0);
        assert!(effects.instance().is_some());

        effects.handle(GestureEvent::DragPan);
        effects.update(0.1, &object);
        assert_relative_eq!(effects.opacity(), 1.0);

        effects.handle(GestureEvent::Up);
        effects.update(0.5, &object);
        assert_relative_eq!(effects.opacity(), 0.0);
        assert!(effects.instance().is_none());
    }

    #[test]
    fn test_hide_cancels_fade_in() {
        let mut effects = EffectsCoordinator::new(0.3);
        let object = object();
        effects.handle(GestureEvent::Down);
        effects.update(0.1, &object);
        assert!(effects.opacity() > 0.0);

        effects.hide();
        assert!(effects.instance().is_none());
        effects.update(1.0, &object);
        assert_eq!(effects.opacity(), 0.0);
        assert!(effects.instance().is_none());
    }

    #[test]
    fn test_follows_object_position_and_yaw() {
        let mut effects = EffectsCoordinator::new(0.3);
        let mut object = object();
        object.translate(Vec3::new(2.0, 0.5, -1.0));
        object.rotate_yaw(Quat::from_rotation_y(0.7));

        effects.handle(GestureEvent::Down);
        effects.update(1.0, &object);

        let instance = effects.instance().unwrap();
        let transform = Mat4::from_cols_array_2d(&instance.transform);
        let (_, rotation, translation) = transform.to_scale_rotation_translation();
        assert!(translation.abs_diff_eq(Vec3::new(2.0, 0.5, -1.0), 1e-5));
        assert!(rotation.abs_diff_eq(Quat::from_rotation_y(0.7), 1e-5));
    }
}
