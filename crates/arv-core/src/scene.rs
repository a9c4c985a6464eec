//! Tracked object and scene membership
//!
//! The model lives in exactly one of two named scene slots. Moving it between
//! the staging scene and the AR scene is an ownership transfer of the
//! [`TrackedObject`] value; the slot that currently holds it is the single
//! source of truth for "which scene is the model in".

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::bounds::BoundingBox;
use crate::error::SceneError;

/// Translation, rotation and scale of a scene node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// The placeable model.
///
/// `container` is the model's parent node: placement and panning move it, so
/// everything under it travels as a unit. `model` is the local transform that
/// rotation gestures and scale tweens act on.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedObject {
    pub container: Transform,
    pub model: Transform,
    /// Model-space bounds, computed once at setup.
    bounds: BoundingBox,
}

impl TrackedObject {
    pub fn new(bounds: BoundingBox) -> Self {
        Self {
            container: Transform::IDENTITY,
            model: Transform::IDENTITY,
            bounds,
        }
    }

    pub fn local_bounds(&self) -> BoundingBox {
        self.bounds
    }

    pub fn world_matrix(&self) -> Mat4 {
        self.container.matrix() * self.model.matrix()
    }

    /// World position of the object's pivot (the container origin).
    pub fn world_position(&self) -> Vec3 {
        self.container.translation
    }

    /// World-space rotation.
    pub fn world_rotation(&self) -> Quat {
        (self.container.rotation * self.model.rotation).normalize()
    }

    pub fn world_bounds(&self) -> BoundingBox {
        self.bounds.transform(&self.world_matrix())
    }

    /// Yaw-only rotation around the pivot.
    pub fn rotate_yaw(&mut self, delta: Quat) {
        self.model.rotation = (delta * self.model.rotation).normalize();
    }

    pub fn translate(&mut self, delta: Vec3) {
        self.container.translation += delta;
    }

    /// Reset both the container and the local transform to identity.
    pub fn reset_transform(&mut self) {
        self.container = Transform::IDENTITY;
        let scale = self.model.scale;
        self.model = Transform::IDENTITY;
        self.model.scale = scale;
    }
}

/// Named container nodes the model can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SceneSlot {
    Staging,
    Ar,
}

/// The two scene graphs and the model they share.
#[derive(Debug, Default)]
pub struct Scenes {
    staging: Option<TrackedObject>,
    ar: Option<TrackedObject>,
}

impl Scenes {
    /// Create with the model inside the staging scene.
    pub fn with_staged(object: TrackedObject) -> Self {
        Self {
            staging: Some(object),
            ar: None,
        }
    }

    fn slot(&self, slot: SceneSlot) -> &Option<TrackedObject> {
        match slot {
            SceneSlot::Staging => &self.staging,
            SceneSlot::Ar => &self.ar,
        }
    }

    fn slot_mut(&mut self, slot: SceneSlot) -> &mut Option<TrackedObject> {
        match slot {
            SceneSlot::Staging => &mut self.staging,
            SceneSlot::Ar => &mut self.ar,
        }
    }

    /// Slot currently holding the model.
    pub fn holder(&self) -> Option<SceneSlot> {
        match (&self.staging, &self.ar) {
            (Some(_), _) => Some(SceneSlot::Staging),
            (None, Some(_)) => Some(SceneSlot::Ar),
            (None, None) => None,
        }
    }

    pub fn object(&self) -> Option<&TrackedObject> {
        self.staging.as_ref().or(self.ar.as_ref())
    }

    pub fn object_mut(&mut self) -> Option<&mut TrackedObject> {
        match (&mut self.staging, &mut self.ar) {
            (Some(object), _) => Some(object),
            (None, Some(object)) => Some(object),
            (None, None) => None,
        }
    }

    /// Move the model from `from` into `to`.
    pub fn transfer(&mut self, from: SceneSlot, to: SceneSlot) -> Result<(), SceneError> {
        if from == to {
            return Ok(());
        }
        if self.slot(to).is_some() {
            return Err(SceneError::AlreadyHeld(to));
        }
        let object = self.slot_mut(from).take().ok_or(SceneError::NotHeld(from))?;
        *self.slot_mut(to) = Some(object);
        tracing::debug!(?from, ?to, "Model transferred between scenes");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object() -> TrackedObject {
        TrackedObject::new(BoundingBox::new(
            Vec3::new(-0.5, 0.0, -0.5),
            Vec3::new(0.5, 1.0, 0.5),
        ))
    }

    #[test]
    fn test_transfer_moves_single_owner() {
        let mut scenes = Scenes::with_staged(object());
        assert_eq!(scenes.holder(), Some(SceneSlot::Staging));

        scenes.transfer(SceneSlot::Staging, SceneSlot::Ar).unwrap();
        assert_eq!(scenes.holder(), Some(SceneSlot::Ar));
        assert!(scenes.slot(SceneSlot::Staging).is_none());
    }

    #[test]
    fn test_transfer_from_empty_slot_fails() {
        let mut scenes = Scenes::with_staged(object());
        assert_eq!(
            scenes.transfer(SceneSlot::Ar, SceneSlot::Staging),
            Err(SceneError::AlreadyHeld(SceneSlot::Staging))
        );

        let mut empty = Scenes::default();
        assert_eq!(
            empty.transfer(SceneSlot::Ar, SceneSlot::Staging),
            Err(SceneError::NotHeld(SceneSlot::Ar))
        );
    }

    #[test]
    fn test_world_bounds_follow_container() {
        let mut obj = object();
        obj.translate(Vec3::new(2.0, 0.0, 0.0));
        let bounds = obj.world_bounds();
        assert!(bounds.contains_point(Vec3::new(2.0, 0.5, 0.0)));
        assert!(!bounds.contains_point(Vec3::new(0.0, 0.5, 0.0)));
        assert_eq!(obj.local_bounds().center(), Vec3::new(0.0, 0.5, 0.0));
    }

    #[test]
    fn test_reset_transform_keeps_scale() {
        let mut obj = object();
        obj.translate(Vec3::ONE);
        obj.rotate_yaw(Quat::from_rotation_y(1.0));
        obj.model.scale = Vec3::splat(0.5);
        obj.reset_transform();
        assert_eq!(obj.container, Transform::IDENTITY);
        assert_eq!(obj.model.rotation, Quat::IDENTITY);
        assert_eq!(obj.model.scale, Vec3::splat(0.5));
    }
}
