//! Proximity guard
//!
//! Warns when the device is inside the (slightly expanded) bounds of the
//! placed object. The warning fires as soon as the device enters; the
//! all-clear only fires after the device has stayed outside for a settle
//! window, so jitter across the boundary does not repeat the warning.

use arv_core::BoundingBox;
use glam::Vec3;

/// Proximity state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProximityEvent {
    /// The device entered the expanded bounds.
    Warning,
    /// The device has settled outside the expanded bounds.
    Normal,
}

/// Debounced containment test of the device against the object bounds.
#[derive(Debug, Clone)]
pub struct ProximityGuard {
    margin: f32,
    settle_frames: u32,
    inside: bool,
    outside_frames: u32,
}

impl ProximityGuard {
    /// Create a guard with the given bounds margin and settle window.
    pub fn new(margin: f32, settle_frames: u32) -> Self {
        Self {
            margin,
            settle_frames: settle_frames.max(1),
            inside: false,
            outside_frames: 0,
        }
    }

    /// Whether a warning is currently active.
    pub fn is_warning(&self) -> bool {
        self.inside
    }

    /// Forget the current state without emitting anything.
    pub fn reset(&mut self) {
        self.inside = false;
        self.outside_frames = 0;
    }

    /// Evaluate one frame.
    pub fn evaluate(&mut self, device: Vec3, world_bounds: &BoundingBox) -> Option<ProximityEvent> {
        let contained = world_bounds
            .expand_by_scalar(self.margin)
            .contains_point(device);

        if contained {
            self.outside_frames = 0;
            if !self.inside {
                self.inside = true;
                return Some(ProximityEvent::Warning);
            }
            return None;
        }

        if self.inside {
            self.outside_frames += 1;
            if self.outside_frames >= self.settle_frames {
                self.inside = false;
                self.outside_frames = 0;
                return Some(ProximityEvent::Normal);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> BoundingBox {
        BoundingBox::new(Vec3::new(-0.5, 0.0, -0.5), Vec3::new(0.5, 1.0, 0.5))
    }

    #[test]
    fn test_margin_extends_containment() {
        let mut guard = ProximityGuard::new(0.075, 3);
        assert_eq!(
            guard.evaluate(Vec3::new(0.55, 0.5, 0.0), &bounds()),
            Some(ProximityEvent::Warning)
        );

        let mut guard = ProximityGuard::new(0.075, 3);
        assert_eq!(guard.evaluate(Vec3::new(0.6, 0.5, 0.0), &bounds()), None);
    }

    #[test]
    fn test_boundary_jitter_warns_once() {
        let mut guard = ProximityGuard::new(0.075, 3);
        let inside = Vec3::new(0.0, 0.5, 0.0);
        let outside = Vec3::new(2.0, 0.5, 0.0);

        let mut events = Vec::new();
        for device in [inside, outside, inside, outside, outside, inside, outside] {
            events.extend(guard.evaluate(device, &bounds()));
        }
        assert_eq!(events, vec![ProximityEvent::Warning]);

        for _ in 0..3 {
            events.extend(guard.evaluate(outside, &bounds()));
        }
        assert_eq!(events, vec![ProximityEvent::Warning, ProximityEvent::Normal]);
    }

    #[test]
    fn test_no_repeat_while_state_unchanged() {
        let mut guard = ProximityGuard::new(0.075, 1);
        let inside = Vec3::new(0.0, 0.5, 0.0);
        let events: Vec<_> = (0..10)
            .filter_map(|_| guard.evaluate(inside, &bounds()))
            .collect();
        assert_eq!(events, vec![ProximityEvent::Warning]);
    }
}
