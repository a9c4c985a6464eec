//! Viewer application and mode state machine
//!
//! [`ViewerApp`] owns the scenes, camera, page layout and interaction
//! components, and sequences the staging → fullscreen → AR transitions.
//! Everything is frame-driven: the host calls [`ViewerApp::handle_input`] for
//! each input event and [`ViewerApp::tick`] once per display refresh.
//!
//! Transitions that wait on a fade are started with a typed `Continuation`
//! attached to the fade. The animator hands continuations back from `tick`
//! and they run right after the fade values are applied, so reparenting the
//! model never happens before the cross-fade finishes. Starting a new fade on
//! the same property drops the old continuation.

use std::f32::consts::{FRAC_PI_2, PI};

use arv_core::constants::PLACEMENT_YAW_OFFSET;
use arv_core::{
    Animator, BoundingBox, Camera, Easing, OrbitControls, PoseProvider, SceneSlot, Scenes,
    TrackedObject, ViewerConfig,
};
use arv_interaction::{
    EffectsCoordinator, FrameContext, GestureController, GestureEvent, HighlightInstance,
    PointerInput, ReticleEvent, TrackingReticle,
};
use glam::{Quat, Vec2, Vec3};
use serde::Serialize;

use crate::events::ViewerEvent;
use crate::hud::Hud;
use crate::page::PageLayout;

/// Animated presentation properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Fade {
    ModelScale,
    Reticle,
    ContactShadow,
    StagingShadow,
    Grid,
    /// Staging background; fading it out reveals the camera passthrough.
    Background,
}

/// Work deferred until a fade completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Continuation {
    EnterArFaded,
    ExitArFaded,
    ReticleHidden,
}

/// Mode flags.
///
/// `ar` implies `fullscreen`. `ar_requested` is the target mode and flips at
/// the start of a transition; `ar` only flips once the cross-fade is done.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ModeState {
    pub fullscreen: bool,
    pub ar_requested: bool,
    pub ar: bool,
    /// Fullscreen was entered only because AR was requested.
    pub fullscreen_for_ar: bool,
    pub placed: bool,
}

impl ModeState {
    pub fn is_staging(&self) -> bool {
        !self.fullscreen
    }
}

/// Opacity of the layers the renderer composites.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Presentation {
    pub background: f32,
    pub grid: f32,
    pub staging_shadow: f32,
    pub contact_shadow: f32,
    pub reticle: f32,
}

/// Which "first time" notifications the current gesture session has sent.
#[derive(Debug, Clone, Copy, Default)]
struct SessionReport {
    dragged: bool,
    rotated: bool,
}

fn provider_ref<P: PoseProvider>(provider: &Option<P>) -> Option<&dyn PoseProvider> {
    provider.as_ref().map(|p| p as &dyn PoseProvider)
}

/// AR product viewer
pub struct ViewerApp<P> {
    config: ViewerConfig,
    provider: Option<P>,
    scenes: Scenes,
    /// Set once the model has loaded and dependents are wired.
    ready: bool,
    mode: ModeState,
    camera: Camera,
    orbit: OrbitControls,
    orbit_drag: Option<Vec2>,
    page: PageLayout,
    hud: Hud,
    animator: Animator<Fade, Continuation>,
    gestures: GestureController,
    reticle: TrackingReticle,
    effects: EffectsCoordinator,
    report: SessionReport,
    events: Vec<ViewerEvent>,
}

impl<P: PoseProvider> ViewerApp<P> {
    /// Create the viewer. `provider` is `None` on devices without AR.
    pub fn new(config: ViewerConfig, page: PageLayout, provider: Option<P>) -> Self {
        let camera = Camera::new(page.viewport().aspect());
        Self {
            gestures: GestureController::new(config.gesture.clone()),
            reticle: TrackingReticle::new(config.reticle.clone()),
            effects: EffectsCoordinator::new(config.transition.fade),
            hud: Hud::new(&config.hud),
            config,
            provider,
            scenes: Scenes::default(),
            ready: false,
            mode: ModeState::default(),
            camera,
            orbit: OrbitControls::new(Vec3::ZERO, 5.0),
            orbit_drag: None,
            page,
            animator: Animator::new(),
            report: SessionReport::default(),
            events: Vec::new(),
        }
    }

    /// Wire everything that depends on the model, then apply launch options.
    pub fn on_model_loaded(&mut self, bounds: BoundingBox) {
        if self.ready {
            tracing::warn!("Model already loaded, ignoring");
            return;
        }

        self.orbit
            .fit(bounds.center(), bounds.radius(), self.camera.fov);
        self.orbit.apply(&mut self.camera);
        self.scenes = Scenes::with_staged(TrackedObject::new(bounds));

        for (fade, value) in [
            (Fade::ModelScale, 1.0),
            (Fade::Reticle, 0.0),
            (Fade::ContactShadow, 0.0),
            (Fade::StagingShadow, 1.0),
            (Fade::Grid, 1.0),
            (Fade::Background, 1.0),
        ] {
            self.animator.set(fade, value);
        }

        self.ready = true;
        tracing::info!(
            "Model loaded, bounds {:?}..{:?}, AR {}",
            bounds.min,
            bounds.max,
            if self.provider.is_some() {
                "available"
            } else {
                "unavailable"
            }
        );

        let launch = self.config.launch.clone();
        if launch.fullscreen {
            self.enter_fullscreen();
        }
        if launch.ar {
            self.enter_ar();
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn mode(&self) -> ModeState {
        self.mode
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn orbit(&self) -> &OrbitControls {
        &self.orbit
    }

    pub fn page(&self) -> &PageLayout {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut PageLayout {
        &mut self.page
    }

    pub fn hud(&self) -> &Hud {
        &self.hud
    }

    pub fn reticle(&self) -> &TrackingReticle {
        &self.reticle
    }

    pub fn gestures(&self) -> &GestureController {
        &self.gestures
    }

    pub fn object(&self) -> Option<&TrackedObject> {
        self.scenes.object()
    }

    /// Scene slot currently holding the model.
    pub fn scene_holder(&self) -> Option<SceneSlot> {
        self.scenes.holder()
    }

    pub fn provider(&self) -> Option<&P> {
        self.provider.as_ref()
    }

    pub fn provider_mut(&mut self) -> Option<&mut P> {
        self.provider.as_mut()
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn presentation(&self) -> Presentation {
        Presentation {
            background: self.animator.value_or(Fade::Background, 1.0),
            grid: self.animator.value_or(Fade::Grid, 1.0),
            staging_shadow: self.animator.value_or(Fade::StagingShadow, 1.0),
            contact_shadow: self.animator.value_or(Fade::ContactShadow, 0.0),
            reticle: self.reticle.opacity(),
        }
    }

    /// Whether a staging/AR cross-fade is running.
    pub fn is_transitioning(&self) -> bool {
        self.animator.is_animating(Fade::Background)
    }

    /// Ground highlight to draw this frame.
    pub fn highlight(&self) -> Option<HighlightInstance> {
        self.effects.instance()
    }

    /// Events emitted so far.
    pub fn events(&self) -> &[ViewerEvent] {
        &self.events
    }

    /// Take the emitted events.
    pub fn drain_events(&mut self) -> Vec<ViewerEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: ViewerEvent) {
        tracing::debug!(?event, "Viewer event");
        self.hud.handle(event);
        self.events.push(event);
    }

    fn resize(&mut self) {
        let viewport = self.page.resize();
        self.camera.update_aspect(viewport.aspect());
        tracing::debug!(
            width = viewport.width,
            height = viewport.height,
            "Render surface resized"
        );
    }

    pub fn enter_fullscreen(&mut self) {
        if !self.ready || self.mode.fullscreen {
            return;
        }
        self.mode.fullscreen = true;
        self.emit(ViewerEvent::EnterFullscreen);
        self.page.enter_fullscreen();
        self.resize();
    }

    pub fn exit_fullscreen(&mut self) {
        if !self.mode.fullscreen {
            return;
        }
        if self.mode.ar_requested {
            tracing::debug!("Ignoring fullscreen exit while in AR");
            return;
        }
        self.mode.fullscreen = false;
        self.mode.fullscreen_for_ar = false;
        self.emit(ViewerEvent::ExitFullscreen);
        self.page.exit_fullscreen();
        self.orbit.reset();
        self.orbit.apply(&mut self.camera);
        self.resize();
    }

    pub fn enter_ar(&mut self) {
        if !self.ready || self.mode.ar_requested {
            return;
        }
        if self.provider.is_none() {
            tracing::debug!("AR requested but unavailable");
            return;
        }
        if self.scenes.holder() == Some(SceneSlot::Ar) {
            // Re-entered before the exit cross-fade finished
            self.return_to_staging();
        }

        if !self.mode.fullscreen {
            self.enter_fullscreen();
            self.mode.fullscreen_for_ar = true;
        }
        self.mode.ar_requested = true;
        self.emit(ViewerEvent::EnterAr);

        let transition = self.config.transition.clone();
        self.animator.animate(
            Fade::ModelScale,
            0.0,
            transition.model_tween,
            Easing::QuadOut,
        );
        self.animator
            .animate(Fade::ContactShadow, 1.0, transition.fade, Easing::Linear);
        self.animator
            .animate(Fade::StagingShadow, 0.0, transition.fade, Easing::Linear);
        self.animator
            .animate(Fade::Grid, 0.0, transition.fade, Easing::Linear);
        self.orbit.enabled = false;
        self.orbit_drag = None;
        self.animator.animate_then(
            Fade::Background,
            0.0,
            transition.cross_fade,
            Easing::CubicInOut,
            Continuation::EnterArFaded,
        );
    }

    pub fn exit_ar(&mut self) {
        if !self.mode.ar_requested {
            return;
        }
        self.emit(ViewerEvent::ExitAr);

        let transition = self.config.transition.clone();
        self.animator.animate(
            Fade::ModelScale,
            0.0,
            transition.model_tween,
            Easing::QuadOut,
        );
        self.mode.placed = false;
        self.mode.ar = false;
        self.mode.ar_requested = false;
        self.gestures.disable();
        self.effects.hide();
        self.orbit.enabled = true;
        self.animator.animate_then(
            Fade::Reticle,
            0.0,
            transition.fade,
            Easing::Linear,
            Continuation::ReticleHidden,
        );
        self.animator.animate_then(
            Fade::Background,
            1.0,
            transition.cross_fade,
            Easing::CubicInOut,
            Continuation::ExitArFaded,
        );
    }

    /// Leave the innermost mode.
    pub fn close(&mut self) {
        if self.mode.ar_requested {
            self.exit_ar();
        } else if self.mode.fullscreen {
            self.exit_fullscreen();
        }
    }

    /// Staging zoom (mouse wheel / pinch).
    pub fn zoom(&mut self, delta: f32) {
        if self.ready && !self.mode.ar_requested {
            self.orbit.zoom(delta);
        }
    }

    pub fn handle_input(&mut self, input: &PointerInput) {
        if !self.ready {
            tracing::trace!("Input before setup, ignoring");
            return;
        }
        if self.mode.ar_requested {
            self.handle_ar_input(input);
        } else {
            self.handle_staging_input(input);
        }
    }

    fn handle_staging_input(&mut self, input: &PointerInput) {
        let point = match input {
            PointerInput::Down { position, .. } => {
                self.orbit_drag = Some(*position);
                return;
            }
            PointerInput::TouchStart { touches } => {
                self.orbit_drag = match touches.as_slice() {
                    [only] => Some(*only),
                    _ => None,
                };
                return;
            }
            PointerInput::Move { position } => *position,
            PointerInput::TouchMove { touches } => match touches.as_slice() {
                [only] => *only,
                _ => return,
            },
            PointerInput::Up { .. } | PointerInput::TouchEnd { .. } => {
                self.orbit_drag = None;
                return;
            }
        };

        let Some(last) = self.orbit_drag else {
            return;
        };
        self.orbit_drag = Some(point);
        let delta = point - last;
        let viewport = self.page.viewport();
        self.orbit.orbit(
            -delta.x / viewport.width * PI,
            delta.y / viewport.height * FRAC_PI_2,
        );
    }

    fn handle_ar_input(&mut self, input: &PointerInput) {
        if !self.mode.ar {
            return;
        }
        if !self.mode.placed {
            if input.is_release() {
                self.place_model();
            }
            return;
        }

        let Some(object) = self.scenes.object_mut() else {
            return;
        };
        let ctx = FrameContext {
            camera: &self.camera,
            viewport: self.page.viewport(),
            provider: provider_ref(&self.provider),
        };
        let events = self.gestures.handle_input(input, &ctx, object);
        self.relay_gestures(&events);
    }

    /// Tap-to-place onto the tracked surface.
    fn place_model(&mut self) {
        if !self.mode.ar || self.mode.placed || !self.reticle.is_tracking() {
            return;
        }
        let Some(object) = self.scenes.object_mut() else {
            return;
        };

        let position = self.reticle.position();
        let to_camera = self.camera.position - position;
        let yaw = to_camera.x.atan2(to_camera.z) + PLACEMENT_YAW_OFFSET;
        object.container.translation = position;
        object.container.rotation = Quat::from_rotation_y(yaw);

        self.mode.placed = true;
        self.animator.animate_then(
            Fade::Reticle,
            0.0,
            self.config.transition.fade,
            Easing::Linear,
            Continuation::ReticleHidden,
        );
        self.gestures.enable();
        tracing::info!("Model placed at {:?}", position);
        self.emit(ViewerEvent::ModelPlaced);
        self.animator.animate(
            Fade::ModelScale,
            1.0,
            self.config.transition.model_tween,
            Easing::BackOut,
        );
    }

    fn relay_gestures(&mut self, events: &[GestureEvent]) {
        for &event in events {
            self.effects.handle(event);
            match event {
                GestureEvent::Down | GestureEvent::DownPan | GestureEvent::DownRotate => {
                    self.report = SessionReport::default();
                }
                GestureEvent::DragPan if !self.report.dragged => {
                    self.report.dragged = true;
                    self.emit(ViewerEvent::ModelDragged);
                }
                GestureEvent::DragRotate if !self.report.rotated => {
                    self.report.rotated = true;
                    self.emit(ViewerEvent::ModelRotated);
                }
                GestureEvent::ProximityWarning => self.emit(ViewerEvent::ProximityWarning),
                GestureEvent::ProximityNormal => self.emit(ViewerEvent::ProximityNormal),
                _ => {}
            }
        }
    }

    /// Advance one frame.
    pub fn tick(&mut self, dt: f32) {
        if !self.ready {
            return;
        }

        let was_ar = self.mode.ar;
        let completed = self.animator.tick(dt);
        self.apply_fades();
        for continuation in completed {
            self.complete(continuation);
        }

        if self.mode.ar {
            if let Some(provider) = &self.provider {
                self.camera.set_pose(&provider.device_pose());
            }
        } else {
            self.orbit.apply(&mut self.camera);
        }

        // The frame AR starts already updated the reticle for its first prompt
        if was_ar && self.mode.ar && !self.mode.placed {
            let event = self.reticle.update(provider_ref(&self.provider));
            match event {
                Some(ReticleEvent::FoundSurface) => self.emit(ViewerEvent::FoundSurface),
                Some(ReticleEvent::FindingSurface) => self.emit(ViewerEvent::FindingSurface),
                None => {}
            }
        }

        let Some(object) = self.scenes.object_mut() else {
            return;
        };
        let ctx = FrameContext {
            camera: &self.camera,
            viewport: self.page.viewport(),
            provider: provider_ref(&self.provider),
        };
        let events = if self.mode.placed {
            self.gestures.update(&ctx, object)
        } else {
            Vec::new()
        };
        self.effects.update(dt, object);
        self.relay_gestures(&events);
    }

    fn apply_fades(&mut self) {
        let scale = self.animator.value_or(Fade::ModelScale, 1.0);
        if let Some(object) = self.scenes.object_mut() {
            object.model.scale = Vec3::splat(scale);
        }
        self.reticle
            .set_opacity(self.animator.value_or(Fade::Reticle, 0.0));
    }

    fn complete(&mut self, continuation: Continuation) {
        tracing::trace!(?continuation, "Fade completed");
        match continuation {
            Continuation::EnterArFaded => self.finish_enter_ar(),
            Continuation::ExitArFaded => self.finish_exit_ar(),
            Continuation::ReticleHidden => self.reticle.hide(),
        }
    }

    fn finish_enter_ar(&mut self) {
        if !self.mode.ar_requested {
            return;
        }
        if let Err(e) = self.scenes.transfer(SceneSlot::Staging, SceneSlot::Ar) {
            tracing::warn!("Failed to move model into the AR scene: {}", e);
        }
        self.mode.ar = true;
        self.reticle.show();
        self.animator.animate(
            Fade::Reticle,
            1.0,
            self.config.transition.fade,
            Easing::Linear,
        );

        // Evaluate tracking now so the first prompt is the right one
        self.reticle.update(provider_ref(&self.provider));
        let prompt = if self.reticle.is_tracking() {
            ViewerEvent::FoundSurface
        } else {
            ViewerEvent::FindingSurface
        };
        self.emit(prompt);
        tracing::info!("AR session started");
    }

    fn finish_exit_ar(&mut self) {
        if self.mode.ar_requested {
            return;
        }
        self.return_to_staging();

        if self.mode.fullscreen_for_ar {
            self.exit_fullscreen();
        }

        let transition = self.config.transition.clone();
        self.animator.animate(
            Fade::ModelScale,
            1.0,
            transition.model_tween,
            Easing::BackOut,
        );
        self.animator
            .animate(Fade::Grid, 1.0, transition.fade, Easing::Linear);
        self.animator
            .animate(Fade::StagingShadow, 1.0, transition.fade, Easing::Linear);
        self.animator
            .animate(Fade::ContactShadow, 0.0, transition.fade, Easing::Linear);
        tracing::info!("AR session ended");
    }

    /// Put the model back in the staging scene with its transform reset.
    fn return_to_staging(&mut self) {
        if let Some(object) = self.scenes.object_mut() {
            object.reset_transform();
        }
        if self.scenes.holder() == Some(SceneSlot::Ar) {
            if let Err(e) = self.scenes.transfer(SceneSlot::Ar, SceneSlot::Staging) {
                tracing::warn!("Failed to move model back into staging: {}", e);
            }
        }
        self.gestures.disable();
        self.effects.hide();
        self.report = SessionReport::default();
    }
}
