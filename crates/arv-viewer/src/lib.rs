//! AR Viewer
//!
//! Top-level viewer: the staging / fullscreen / AR mode state machine and
//! the presentation-side subscribers it feeds.
//!
//! # Module Structure
//!
//! ```text
//! arv-viewer/
//! ├── app.rs      # ViewerApp: mode transitions, placement, frame loop
//! ├── events.rs   # ViewerEvent notifications
//! ├── hud.rs      # Prompts, toasts and spacing driven by events
//! ├── page.rs     # Render surface placement in the host page
//! └── replay.rs   # Scripted sessions over a simulated AR runtime
//! ```

pub mod app;
pub mod events;
pub mod hud;
pub mod page;
pub mod replay;

pub use app::{ModeState, Presentation, ViewerApp};
pub use events::ViewerEvent;
pub use hud::{Hud, Prompt, Toast};
pub use page::{PageLayout, SurfaceHost};
pub use replay::{ReplayError, ReplayScript, ReplayStep, ReplayTranscript};
