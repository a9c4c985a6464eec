//! AR Viewer Core
//!
//! Scene, camera and pose primitives shared by the interaction layer and the
//! viewer: bounds and ray casting, the viewer camera, the pose/hit-test
//! capability, scene membership of the tracked model, the animation clock,
//! and configuration.

pub mod animation;
pub mod bounds;
pub mod camera;
pub mod config;
pub mod constants;
pub mod error;
pub mod pose;
pub mod ray;
pub mod scene;

pub use animation::{Animator, Easing, Tween};
pub use bounds::BoundingBox;
pub use camera::{Camera, OrbitControls, Viewport};
pub use config::{
    GestureConfig, HudConfig, LaunchOptions, ReticleConfig, TransitionConfig, ViewerConfig,
};
pub use error::{ConfigError, SceneError};
pub use pose::{HitResult, Pose, PoseProvider, SimulatedSurface};
pub use ray::{ProxyCylinder, Ray};
pub use scene::{SceneSlot, Scenes, TrackedObject, Transform};
