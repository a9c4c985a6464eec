//! Global constants for arv-core

/// Margin added to the object's world bounds for the proximity check (world units)
pub const PROXIMITY_MARGIN: f32 = 0.075;

/// Consecutive frames without a surface hit before drags fall back to the ground plane
pub const FALLBACK_MISS_THRESHOLD: u32 = 3;

/// Consecutive frames outside the expanded bounds before proximity is reported normal
pub const PROXIMITY_SETTLE_FRAMES: u32 = 5;

/// Reticle position/orientation easing factor per frame
pub const RETICLE_EASE: f32 = 0.5;

/// Per-frame step of the reticle tracking blend
pub const TRACKING_BLEND_STEP: f32 = 0.1;

/// Distance in front of the device where the reticle floats while no surface is found
pub const RETICLE_FALLBACK_DISTANCE: f32 = 1.5;

/// Reticle scale when fully transparent (shrinks to 1.0 as it fades in)
pub const RETICLE_START_SCALE: f32 = 1.5;

/// Yaw offset applied when the model is placed facing the camera (45 degrees)
pub const PLACEMENT_YAW_OFFSET: f32 = std::f32::consts::FRAC_PI_4;

/// Default HUD spacing in staging mode (pixels)
pub const HUD_SPACING: f32 = 16.0;

/// Minimum radius of the gesture proxy cylinder
pub const MIN_PROXY_RADIUS: f32 = 0.05;
