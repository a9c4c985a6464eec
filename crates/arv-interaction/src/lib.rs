//! AR Viewer Interaction
//!
//! Per-frame interaction components driven by the viewer's mode machine.
//!
//! # Module Structure
//!
//! ```text
//! arv-interaction/
//! ├── gesture/     # PAN/ROTATE gestures, input model, proximity guard
//! ├── reticle.rs   # Surface-tracking placement reticle
//! └── effects.rs   # Ground highlight under the grabbed object
//! ```
//!
//! None of these components own the tracked object. They receive it by
//! reference each frame and report what happened as closed event enums.

pub mod effects;
pub mod gesture;
pub mod reticle;

pub use effects::{EffectsCoordinator, HighlightInstance};
pub use gesture::{
    FrameContext, GestureController, GestureEvent, GestureMode, GestureStateKind, HitSource,
    PointerButton, PointerInput,
};
pub use reticle::{ReticleEvent, TrackingReticle};
