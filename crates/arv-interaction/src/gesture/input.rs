//! Raw pointer and touch input

use glam::Vec2;

/// Mouse button that started a pointer gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerButton {
    /// Left button or pen contact.
    #[default]
    Primary,
    /// Right button; starts a rotate gesture.
    Secondary,
    /// Middle button.
    Auxiliary,
}

/// Input events in surface pixel coordinates (top-left origin).
///
/// Touch events carry every touch that is active after the change, so a
/// `TouchEnd` with one remaining touch means "two fingers became one".
#[derive(Debug, Clone, PartialEq)]
pub enum PointerInput {
    /// Pointer pressed.
    Down {
        /// Pointer position.
        position: Vec2,
        /// Button pressed.
        button: PointerButton,
    },
    /// Pointer moved.
    Move {
        /// Pointer position.
        position: Vec2,
    },
    /// Pointer released.
    Up {
        /// Pointer position.
        position: Vec2,
    },
    /// A finger touched the surface.
    TouchStart {
        /// All active touches.
        touches: Vec<Vec2>,
    },
    /// Touches moved.
    TouchMove {
        /// All active touches.
        touches: Vec<Vec2>,
    },
    /// A finger left the surface.
    TouchEnd {
        /// Touches still active.
        touches: Vec<Vec2>,
    },
}

impl PointerInput {
    /// True for events that end an interaction (pointer up, last touch lifted).
    pub fn is_release(&self) -> bool {
        match self {
            PointerInput::Up { .. } => true,
            PointerInput::TouchEnd { touches } => touches.is_empty(),
            _ => false,
        }
    }
}

/// Average position of the active touches.
pub fn centroid(touches: &[Vec2]) -> Option<Vec2> {
    if touches.is_empty() {
        return None;
    }
    let sum: Vec2 = touches.iter().copied().sum();
    Some(sum / touches.len() as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centroid_of_two_touches() {
        let c = centroid(&[Vec2::new(0.0, 0.0), Vec2::new(10.0, 20.0)]).unwrap();
        assert_eq!(c, Vec2::new(5.0, 10.0));
        assert!(centroid(&[]).is_none());
    }

    #[test]
    fn test_release_detection() {
        assert!(PointerInput::Up { position: Vec2::ZERO }.is_release());
        assert!(PointerInput::TouchEnd { touches: vec![] }.is_release());
        assert!(
            !PointerInput::TouchEnd {
                touches: vec![Vec2::ZERO]
            }
            .is_release()
        );
    }
}
