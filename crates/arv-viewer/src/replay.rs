//! Scripted session replay
//!
//! A replay script describes a page, a model and a sequence of user and
//! device actions. Running it drives a [`ViewerApp`] over a
//! [`SimulatedSurface`] and records every emitted [`ViewerEvent`].
//!
//! ```ron
//! (
//!     model: (min: (-0.2, 0.0, -0.2), max: (0.2, 0.4, 0.2)),
//!     steps: [
//!         DevicePose(position: (0.0, 1.5, 1.5), target: (0.0, 0.0, 0.0)),
//!         EnterAr,
//!         Frames(60),
//!         PointerUp((500.0, 500.0)),
//!         Frames(30),
//!     ],
//! )
//! ```

use std::path::Path;

use arv_core::{BoundingBox, Camera, Pose, SimulatedSurface, Viewport, ViewerConfig};
use arv_interaction::{PointerButton, PointerInput};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::app::{ModeState, ViewerApp};
use crate::events::ViewerEvent;
use crate::page::PageLayout;

/// Replay errors
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("Invalid script: {0}")]
    Invalid(String),
}

fn default_embedded() -> [f32; 2] {
    [800.0, 600.0]
}

fn default_screen() -> [f32; 2] {
    [1080.0, 1920.0]
}

fn default_surface_height() -> Option<f32> {
    Some(0.0)
}

fn default_true() -> bool {
    true
}

fn default_frame_time() -> f32 {
    1.0 / 60.0
}

/// One scripted action. Positions are surface pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReplayStep {
    /// Advance this many frames.
    Frames(u32),
    EnterFullscreen,
    ExitFullscreen,
    EnterAr,
    ExitAr,
    Close,
    /// Scroll the host page.
    Scroll(f32),
    /// Staging zoom.
    Zoom(f32),
    PointerDown(Vec2),
    /// Secondary-button press (rotate).
    PointerDownSecondary(Vec2),
    PointerMove(Vec2),
    PointerUp(Vec2),
    TouchStart(Vec<Vec2>),
    TouchMove(Vec<Vec2>),
    TouchEnd(Vec<Vec2>),
    /// Move the device and aim it at `target`.
    DevicePose { position: Vec3, target: Vec3 },
    /// Force surface misses for the next frames.
    SurfaceDropout(usize),
    /// Change the detected surface height, `None` for no surface.
    SurfaceHeight(Option<f32>),
}

/// Scripted session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayScript {
    /// Surface size inside the page.
    #[serde(default = "default_embedded")]
    pub embedded: [f32; 2],
    /// Screen size used while fullscreen.
    #[serde(default = "default_screen")]
    pub screen: [f32; 2],
    /// Model-space bounds of the model.
    pub model: BoundingBox,
    #[serde(default = "default_surface_height")]
    pub surface_height: Option<f32>,
    /// Whether the device has an AR runtime.
    #[serde(default = "default_true")]
    pub ar_capable: bool,
    /// Seconds per frame.
    #[serde(default = "default_frame_time")]
    pub frame_time: f32,
    pub steps: Vec<ReplayStep>,
}

/// Outcome of a replay.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayTranscript {
    pub events: Vec<ViewerEvent>,
    pub frames: u32,
    pub mode: ModeState,
    pub model_position: Option<Vec3>,
}

impl ReplayScript {
    pub fn from_ron(content: &str) -> Result<Self, ReplayError> {
        let script: Self = ron::from_str(content)?;
        script.validate()?;
        Ok(script)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let script = Self::from_ron(&content)?;
        tracing::info!(
            "Loaded replay script from {:?} ({} steps)",
            path,
            script.steps.len()
        );
        Ok(script)
    }

    fn validate(&self) -> Result<(), ReplayError> {
        let mut sizes = self.embedded.iter().chain(&self.screen);
        if sizes.any(|v| !v.is_finite() || *v < 1.0) {
            return Err(ReplayError::Invalid(
                "surface sizes must be at least one pixel".into(),
            ));
        }
        if !self.model.is_valid() {
            return Err(ReplayError::Invalid("model bounds are empty".into()));
        }
        if self.frame_time.is_nan() || self.frame_time <= 0.0 {
            return Err(ReplayError::Invalid("frame_time must be positive".into()));
        }
        Ok(())
    }

    /// Run the script against a fresh viewer.
    pub fn run(&self, config: ViewerConfig) -> ReplayTranscript {
        let page = PageLayout::new(
            Viewport::new(self.embedded[0], self.embedded[1]),
            Viewport::new(self.screen[0], self.screen[1]),
        );
        let fov = Camera::new(1.0).fov;
        let surface = self.ar_capable.then(|| {
            SimulatedSurface::new(self.surface_height, fov, page.viewport().aspect())
        });

        let mut app = ViewerApp::new(config, page, surface);
        app.on_model_loaded(self.model);

        let mut frames = 0;
        for step in &self.steps {
            tracing::trace!(?step, "Replay step");
            match step {
                ReplayStep::Frames(n) => {
                    for _ in 0..*n {
                        let aspect = app.camera().aspect;
                        if let Some(surface) = app.provider_mut() {
                            surface.set_aspect(aspect);
                            surface.begin_frame();
                        }
                        app.tick(self.frame_time);
                        frames += 1;
                    }
                }
                ReplayStep::EnterFullscreen => app.enter_fullscreen(),
                ReplayStep::ExitFullscreen => app.exit_fullscreen(),
                ReplayStep::EnterAr => app.enter_ar(),
                ReplayStep::ExitAr => app.exit_ar(),
                ReplayStep::Close => app.close(),
                ReplayStep::Scroll(offset) => app.page_mut().scroll_to(*offset),
                ReplayStep::Zoom(delta) => app.zoom(*delta),
                ReplayStep::PointerDown(position) => app.handle_input(&PointerInput::Down {
                    position: *position,
                    button: PointerButton::Primary,
                }),
                ReplayStep::PointerDownSecondary(position) => {
                    app.handle_input(&PointerInput::Down {
                        position: *position,
                        button: PointerButton::Secondary,
                    })
                }
                ReplayStep::PointerMove(position) => app.handle_input(&PointerInput::Move {
                    position: *position,
                }),
                ReplayStep::PointerUp(position) => app.handle_input(&PointerInput::Up {
                    position: *position,
                }),
                ReplayStep::TouchStart(touches) => app.handle_input(&PointerInput::TouchStart {
                    touches: touches.clone(),
                }),
                ReplayStep::TouchMove(touches) => app.handle_input(&PointerInput::TouchMove {
                    touches: touches.clone(),
                }),
                ReplayStep::TouchEnd(touches) => app.handle_input(&PointerInput::TouchEnd {
                    touches: touches.clone(),
                }),
                ReplayStep::DevicePose { position, target } => {
                    if let Some(surface) = app.provider_mut() {
                        surface.set_pose(look_pose(*position, *target));
                    }
                }
                ReplayStep::SurfaceDropout(n) => {
                    if let Some(surface) = app.provider_mut() {
                        surface.drop_out(*n);
                    }
                }
                ReplayStep::SurfaceHeight(height) => {
                    if let Some(surface) = app.provider_mut() {
                        surface.set_surface_height(*height);
                    }
                }
            }
        }

        ReplayTranscript {
            model_position: app.object().map(|object| object.world_position()),
            mode: app.mode(),
            frames,
            events: app.drain_events(),
        }
    }
}

/// Pose at `position` looking towards `target`.
fn look_pose(position: Vec3, target: Vec3) -> Pose {
    let mut camera = Camera::new(1.0);
    camera.position = position;
    if (target - position).length_squared() > 1e-12 {
        camera.look_at(target);
    }
    Pose::new(camera.position, camera.rotation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PLACE_AND_DRAG: &str = r#"(
        screen: (1000.0, 1000.0),
        model: (min: (-0.2, 0.0, -0.2), max: (0.2, 0.4, 0.2)),
        frame_time: 0.05,
        steps: [
            DevicePose(position: (0.0, 1.5, 1.5), target: (0.0, 0.0, 0.0)),
            EnterAr,
            Frames(30),
            PointerUp((500.0, 500.0)),
            Frames(20),
            Close,
            Frames(30),
        ],
    )"#;

    #[test]
    fn test_place_and_close_transcript() {
        let script = ReplayScript::from_ron(PLACE_AND_DRAG).unwrap();
        let transcript = script.run(ViewerConfig::default());

        assert_eq!(
            transcript.events,
            vec![
                ViewerEvent::EnterFullscreen,
                ViewerEvent::EnterAr,
                ViewerEvent::FoundSurface,
                ViewerEvent::ModelPlaced,
                ViewerEvent::ExitAr,
                ViewerEvent::ExitFullscreen,
            ]
        );
        assert_eq!(transcript.frames, 80);
        assert!(transcript.mode.is_staging());
        assert_eq!(transcript.model_position, Some(Vec3::ZERO));
    }

    #[test]
    fn test_bundled_script_places_and_drags() {
        let script =
            ReplayScript::from_ron(include_str!("../scripts/place_and_drag.ron")).unwrap();
        let transcript = script.run(ViewerConfig::default());

        assert!(transcript.events.contains(&ViewerEvent::ModelPlaced));
        assert!(transcript.events.contains(&ViewerEvent::ModelDragged));
        assert_eq!(transcript.events.last(), Some(&ViewerEvent::ExitFullscreen));
        assert!(transcript.mode.is_staging());
    }

    #[test]
    fn test_without_capability_stays_in_staging() {
        let mut script = ReplayScript::from_ron(PLACE_AND_DRAG).unwrap();
        script.ar_capable = false;
        let transcript = script.run(ViewerConfig::default());
        assert!(transcript.events.is_empty());
        assert_eq!(transcript.mode, ModeState::default());
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let script = ReplayScript::from_ron(
            "(model: (min: (0.0, 0.0, 0.0), max: (1.0, 1.0, 1.0)), steps: [Frames(1)])",
        )
        .unwrap();
        assert_eq!(script.embedded, [800.0, 600.0]);
        assert_eq!(script.surface_height, Some(0.0));
        assert!(script.ar_capable);
    }

    #[test]
    fn test_rejects_invalid_scripts() {
        assert!(matches!(
            ReplayScript::from_ron("(model: (min: (0.0, 0.0, 0.0)), steps: [])"),
            Err(ReplayError::Parse(_))
        ));
        assert!(matches!(
            ReplayScript::from_ron(
                "(screen: (0.0, 10.0), model: (min: (0.0, 0.0, 0.0), max: (1.0, 1.0, 1.0)), \
                 steps: [])"
            ),
            Err(ReplayError::Invalid(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(PLACE_AND_DRAG.as_bytes()).unwrap();

        let script = ReplayScript::load(file.path()).unwrap();
        assert_eq!(script.steps.len(), 7);
        assert!(matches!(
            ReplayScript::load(file.path().with_extension("missing")),
            Err(ReplayError::Io(_))
        ));
    }
}
