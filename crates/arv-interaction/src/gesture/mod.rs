//! Gesture controller
//!
//! Turns pointer and touch input into placement gestures on the tracked
//! object. A gesture starts as a pending down, becomes a PAN or ROTATE drag
//! session if the pointer ray hits the object's proxy cylinder, and ends on
//! release. Hit resolution runs once per frame in [`GestureController::update`].
//!
//! PAN keeps the grabbed point under the finger: the screen-space offset
//! between the pointer and the object's projected anchor is captured at down
//! time and subtracted from every surface query. ROTATE yaws the object by the
//! horizontal angle swept by the hit point around the object's pivot.

mod input;
mod proximity;

pub use input::{PointerButton, PointerInput, centroid};
pub use proximity::{ProximityEvent, ProximityGuard};

use arv_core::ray::{ProxyCylinder, ray_cylinder_intersection, ray_plane_intersection};
use arv_core::{Camera, GestureConfig, PoseProvider, TrackedObject, Viewport};
use glam::{Quat, Vec2, Vec3};

/// Per-frame inputs shared by the interaction components.
#[derive(Clone, Copy)]
pub struct FrameContext<'a> {
    /// Camera the user is looking through.
    pub camera: &'a Camera,
    /// Render surface size.
    pub viewport: Viewport,
    /// AR capability, absent on devices without one.
    pub provider: Option<&'a dyn PoseProvider>,
}

/// Events emitted by the gesture controller.
///
/// Events carry no payload; consumers read the current object transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureEvent {
    /// A gesture started on the object.
    Down,
    /// The gesture ended.
    Up,
    /// The object moved or rotated this frame.
    Drag,
    /// The gesture was classified as PAN.
    DownPan,
    /// The gesture was classified as ROTATE.
    DownRotate,
    /// The object was translated this frame.
    DragPan,
    /// The object was rotated this frame.
    DragRotate,
    /// The device entered the object's bounds.
    ProximityWarning,
    /// The device left the object's bounds.
    ProximityNormal,
}

/// Gesture classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureMode {
    /// Move the object across the surface.
    Pan,
    /// Yaw the object around its pivot.
    Rotate,
}

impl GestureMode {
    fn from_button(button: PointerButton) -> Self {
        match button {
            PointerButton::Secondary => GestureMode::Rotate,
            PointerButton::Primary | PointerButton::Auxiliary => GestureMode::Pan,
        }
    }

    fn from_touch_count(count: usize) -> Self {
        if count >= 2 {
            GestureMode::Rotate
        } else {
            GestureMode::Pan
        }
    }
}

/// Where a drag hit point came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitSource {
    /// The AR runtime found a surface.
    Surface,
    /// Fallback ray cast against the ground plane under the object.
    GroundPlane,
}

/// Observable controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureStateKind {
    /// No gesture.
    Idle,
    /// Pointer is down; the object hit test has not been resolved yet.
    DownPending,
    /// Panning the object.
    DraggingPan,
    /// Rotating the object.
    DraggingRotate,
}

/// One continuous down-to-up interaction on the object.
#[derive(Debug, Clone)]
struct GestureSession {
    mode: GestureMode,
    /// Current pointer, normalized screen coordinates.
    pointer: Vec2,
    /// Pointer minus projected anchor at down time (PAN only).
    screen_offset: Vec2,
    initial_hit: Vec3,
    previous_hit: Vec3,
    /// `None` until the first drag hit seeds `previous_hit`.
    previous_source: Option<HitSource>,
    last_source: Option<HitSource>,
    consecutive_misses: u32,
}

#[derive(Debug, Clone)]
enum GestureState {
    Idle,
    DownPending {
        mode: GestureMode,
        pointer: Vec2,
        /// Touch-count change restart: no `Down` is emitted on resolution.
        restarted: bool,
    },
    Dragging(GestureSession),
}

/// Converts pointer/touch input into PAN and ROTATE transforms.
pub struct GestureController {
    config: GestureConfig,
    enabled: bool,
    state: GestureState,
    proximity: ProximityGuard,
    last_rotation: Quat,
}

impl GestureController {
    /// Create a disabled controller.
    pub fn new(config: GestureConfig) -> Self {
        let proximity =
            ProximityGuard::new(config.proximity_margin, config.proximity_settle_frames);
        Self {
            config,
            enabled: false,
            state: GestureState::Idle,
            proximity,
            last_rotation: Quat::IDENTITY,
        }
    }

    /// Whether input is being handled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Start handling input and evaluating proximity.
    pub fn enable(&mut self) {
        if !self.enabled {
            tracing::debug!("Gesture controller enabled");
        }
        self.enabled = true;
    }

    /// Stop handling input, dropping any gesture in progress.
    pub fn disable(&mut self) {
        if self.enabled {
            tracing::debug!("Gesture controller disabled");
        }
        self.enabled = false;
        self.state = GestureState::Idle;
        self.last_rotation = Quat::IDENTITY;
        self.proximity.reset();
    }

    /// Current state.
    pub fn state(&self) -> GestureStateKind {
        match &self.state {
            GestureState::Idle => GestureStateKind::Idle,
            GestureState::DownPending { .. } => GestureStateKind::DownPending,
            GestureState::Dragging(session) => match session.mode {
                GestureMode::Pan => GestureStateKind::DraggingPan,
                GestureMode::Rotate => GestureStateKind::DraggingRotate,
            },
        }
    }

    /// Consecutive frames without a surface hit in the current session.
    pub fn consecutive_misses(&self) -> u32 {
        match &self.state {
            GestureState::Dragging(session) => session.consecutive_misses,
            _ => 0,
        }
    }

    /// Source of the most recent resolved drag hit in the current session.
    pub fn last_hit_source(&self) -> Option<HitSource> {
        match &self.state {
            GestureState::Dragging(session) => session.last_source,
            _ => None,
        }
    }

    /// Object hit point at the start of the current session.
    pub fn initial_hit(&self) -> Option<Vec3> {
        match &self.state {
            GestureState::Dragging(session) => Some(session.initial_hit),
            _ => None,
        }
    }

    /// Rotation applied by the most recent ROTATE frame.
    pub fn last_rotation(&self) -> Quat {
        self.last_rotation
    }

    /// Whether the proximity warning is active.
    pub fn proximity_warning(&self) -> bool {
        self.proximity.is_warning()
    }

    /// Handle one input event.
    pub fn handle_input(
        &mut self,
        input: &PointerInput,
        ctx: &FrameContext<'_>,
        object: &mut TrackedObject,
    ) -> Vec<GestureEvent> {
        let mut events = Vec::new();
        if !self.enabled {
            return events;
        }

        let viewport = ctx.viewport;
        match input {
            PointerInput::Down { position, button } => {
                self.begin(
                    GestureMode::from_button(*button),
                    viewport.to_normalized(*position),
                    false,
                );
            }
            PointerInput::Move { position } => {
                self.move_pointer(viewport.to_normalized(*position));
            }
            PointerInput::Up { .. } => {
                self.release(ctx, object, &mut events);
            }
            PointerInput::TouchStart { touches } | PointerInput::TouchEnd { touches } => {
                match centroid(touches) {
                    Some(center) => {
                        self.touches_changed(touches.len(), viewport.to_normalized(center))
                    }
                    None => self.release(ctx, object, &mut events),
                }
            }
            PointerInput::TouchMove { touches } => {
                if let Some(center) = centroid(touches) {
                    self.move_pointer(viewport.to_normalized(center));
                }
            }
        }

        events
    }

    /// Resolve pending downs, advance drags and evaluate proximity.
    pub fn update(
        &mut self,
        ctx: &FrameContext<'_>,
        object: &mut TrackedObject,
    ) -> Vec<GestureEvent> {
        let mut events = Vec::new();
        if !self.enabled {
            return events;
        }

        match self.state {
            GestureState::DownPending { .. } => self.resolve_down(ctx, object, &mut events),
            GestureState::Dragging(_) => self.drag(ctx, object, &mut events),
            GestureState::Idle => {}
        }

        if let Some(provider) = ctx.provider {
            let device = provider.device_pose().position;
            match self.proximity.evaluate(device, &object.world_bounds()) {
                Some(ProximityEvent::Warning) => {
                    tracing::debug!("Device inside object bounds");
                    events.push(GestureEvent::ProximityWarning);
                }
                Some(ProximityEvent::Normal) => {
                    tracing::debug!("Device clear of object bounds");
                    events.push(GestureEvent::ProximityNormal);
                }
                None => {}
            }
        }

        events
    }

    fn begin(&mut self, mode: GestureMode, pointer: Vec2, restarted: bool) {
        self.state = GestureState::DownPending {
            mode,
            pointer,
            restarted,
        };
    }

    fn move_pointer(&mut self, normalized: Vec2) {
        match &mut self.state {
            GestureState::DownPending { pointer, .. } => *pointer = normalized,
            GestureState::Dragging(session) => session.pointer = normalized,
            GestureState::Idle => {}
        }
    }

    /// Touch count changed while at least one finger remains.
    ///
    /// Crossing between one and two fingers abandons the running session and
    /// restarts hit testing from the new centroid in the new mode. Neither
    /// `Up` for the old session nor `Down` for the new one is emitted.
    fn touches_changed(&mut self, count: usize, center: Vec2) {
        let mode = GestureMode::from_touch_count(count);
        let restart = match &mut self.state {
            GestureState::Idle => Some(false),
            GestureState::DownPending {
                mode: pending_mode,
                pointer,
                ..
            } => {
                *pending_mode = mode;
                *pointer = center;
                None
            }
            GestureState::Dragging(session) if session.mode != mode => {
                tracing::debug!(
                    from = ?session.mode,
                    to = ?mode,
                    "Touch count changed, restarting gesture"
                );
                Some(true)
            }
            GestureState::Dragging(session) => {
                session.pointer = center;
                None
            }
        };
        if let Some(restarted) = restart {
            self.begin(mode, center, restarted);
        }
    }

    fn release(
        &mut self,
        ctx: &FrameContext<'_>,
        object: &mut TrackedObject,
        events: &mut Vec<GestureEvent>,
    ) {
        if matches!(self.state, GestureState::DownPending { .. }) {
            self.resolve_down(ctx, object, events);
        }
        let previous = std::mem::replace(&mut self.state, GestureState::Idle);
        if let GestureState::Dragging(session) = previous {
            tracing::debug!(mode = ?session.mode, "Gesture ended");
            events.push(GestureEvent::Up);
        }
    }

    /// Upright cylinder around the object's world bounds.
    fn proxy_cylinder(&self, object: &TrackedObject) -> ProxyCylinder {
        let bounds = object.world_bounds();
        let center = bounds.center();
        ProxyCylinder {
            base: Vec3::new(center.x, bounds.min.y, center.z),
            height: bounds.size().y.max(self.config.min_proxy_radius),
            radius: bounds.footprint_radius().max(self.config.min_proxy_radius),
        }
    }

    fn resolve_down(
        &mut self,
        ctx: &FrameContext<'_>,
        object: &mut TrackedObject,
        events: &mut Vec<GestureEvent>,
    ) {
        let GestureState::DownPending {
            mode,
            pointer,
            restarted,
        } = self.state
        else {
            return;
        };

        let ray = ctx.camera.ray_from_normalized(pointer);
        let Some(t) = ray_cylinder_intersection(&ray, &self.proxy_cylinder(object)) else {
            tracing::trace!(?mode, "Gesture missed the object");
            self.state = GestureState::Idle;
            return;
        };
        let hit = ray.at(t);

        // ROTATE is seeded by the first drag hit, not the raised cylinder hit
        let (screen_offset, previous_hit, previous_source) = match mode {
            GestureMode::Pan => {
                let anchor = ctx.camera.project(object.world_position()).unwrap_or(pointer);
                (pointer - anchor, object.world_position(), Some(HitSource::Surface))
            }
            GestureMode::Rotate => (Vec2::ZERO, hit, None),
        };

        tracing::debug!(?mode, ?hit, ?screen_offset, "Gesture started on object");
        self.state = GestureState::Dragging(GestureSession {
            mode,
            pointer,
            screen_offset,
            initial_hit: hit,
            previous_hit,
            previous_source,
            last_source: None,
            consecutive_misses: 0,
        });

        if !restarted {
            events.push(GestureEvent::Down);
        }
        events.push(match mode {
            GestureMode::Pan => GestureEvent::DownPan,
            GestureMode::Rotate => GestureEvent::DownRotate,
        });
    }

    fn drag(
        &mut self,
        ctx: &FrameContext<'_>,
        object: &mut TrackedObject,
        events: &mut Vec<GestureEvent>,
    ) {
        let threshold = self.config.fallback_miss_threshold;
        let GestureState::Dragging(session) = &mut self.state else {
            return;
        };
        let Some((hit, source)) = resolve_hit(session, ctx, object, threshold) else {
            return;
        };
        session.last_source = Some(source);

        if session.previous_source != Some(source) {
            // Switching between surface and ground plane hits would otherwise
            // snap the object by the difference.
            tracing::trace!(?source, "Seeding drag reference");
            session.previous_source = Some(source);
            session.previous_hit = hit;
            return;
        }

        match session.mode {
            GestureMode::Pan => {
                let delta = hit - session.previous_hit;
                session.previous_hit = hit;
                if delta.length_squared() > 1e-12 {
                    object.translate(delta);
                    events.push(GestureEvent::Drag);
                    events.push(GestureEvent::DragPan);
                }
            }
            GestureMode::Rotate => {
                let pivot = object.world_position();
                let previous = session.previous_hit;
                session.previous_hit = hit;
                if let Some(delta) = yaw_between(pivot, previous, hit) {
                    object.rotate_yaw(delta);
                    self.last_rotation = delta;
                    events.push(GestureEvent::Drag);
                    events.push(GestureEvent::DragRotate);
                }
            }
        }
    }
}

/// Find this frame's drag hit point.
///
/// Surface hits are queried at the pointer minus the session offset. After
/// `threshold` consecutive misses the unadjusted pointer ray is cast against
/// a horizontal plane through the object's last known position.
fn resolve_hit(
    session: &mut GestureSession,
    ctx: &FrameContext<'_>,
    object: &TrackedObject,
    threshold: u32,
) -> Option<(Vec3, HitSource)> {
    let provider = ctx.provider?;
    let query = session.pointer - session.screen_offset;

    if let Some(hit) = provider.first_hit(query) {
        session.consecutive_misses = 0;
        return Some((hit.position(), HitSource::Surface));
    }

    session.consecutive_misses += 1;
    tracing::trace!(misses = session.consecutive_misses, "No surface hit");
    if session.consecutive_misses < threshold {
        return None;
    }

    let ray = ctx.camera.ray_from_normalized(query + session.screen_offset);
    ray_plane_intersection(&ray, object.world_position(), Vec3::Y)
        .map(|point| (point, HitSource::GroundPlane))
}

/// Yaw-only rotation carrying the horizontal direction pivot→`from` onto
/// pivot→`to`. `None` when either point is on the pivot axis or the angle
/// is negligible.
pub fn yaw_between(pivot: Vec3, from: Vec3, to: Vec3) -> Option<Quat> {
    let a = (from - pivot).with_y(0.0).try_normalize()?;
    let b = (to - pivot).with_y(0.0).try_normalize()?;
    let angle = a.cross(b).y.atan2(a.dot(b));
    if angle.abs() < 1e-6 {
        return None;
    }
    Some(Quat::from_rotation_y(angle))
}
