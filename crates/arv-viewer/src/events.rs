//! Viewer-level notifications consumed by the presentation layer

use serde::{Deserialize, Serialize};

/// Mode transitions and interaction milestones, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewerEvent {
    EnterFullscreen,
    ExitFullscreen,
    EnterAr,
    ExitAr,
    /// The model was tapped onto a surface.
    ModelPlaced,
    /// First translation of a gesture session.
    ModelDragged,
    /// First rotation of a gesture session.
    ModelRotated,
    /// Reticle found a surface (or was found tracking on AR entry).
    FoundSurface,
    /// Reticle is searching for a surface.
    FindingSurface,
    ProximityWarning,
    ProximityNormal,
}

impl ViewerEvent {
    /// True for the four mode transitions.
    pub fn is_transition(&self) -> bool {
        matches!(
            self,
            ViewerEvent::EnterFullscreen
                | ViewerEvent::ExitFullscreen
                | ViewerEvent::EnterAr
                | ViewerEvent::ExitAr
        )
    }
}
