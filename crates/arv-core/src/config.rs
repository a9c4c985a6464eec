//! Viewer configuration structures
//!
//! Every section falls back to its defaults when missing, so a config file
//! only needs to mention what it overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::ConfigError;

/// Gesture controller settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GestureConfig {
    /// Margin added around the object bounds for the proximity check
    pub proximity_margin: f32,
    /// Frames the device must stay outside before proximity is normal again
    pub proximity_settle_frames: u32,
    /// Consecutive missed surface hits before falling back to the ground plane
    pub fallback_miss_threshold: u32,
    /// Lower bound for the hit-test proxy cylinder radius
    pub min_proxy_radius: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            proximity_margin: constants::PROXIMITY_MARGIN,
            proximity_settle_frames: constants::PROXIMITY_SETTLE_FRAMES,
            fallback_miss_threshold: constants::FALLBACK_MISS_THRESHOLD,
            min_proxy_radius: constants::MIN_PROXY_RADIUS,
        }
    }
}

/// Tracking reticle settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReticleConfig {
    /// Normalized screen point that is hit-tested each frame
    pub screen_point: [f32; 2],
    /// Position easing factor per frame (0 = frozen, 1 = snap)
    pub ease: f32,
    /// Per-frame step of the tracking blend
    pub blend_step: f32,
    /// Distance in front of the device while no surface is found
    pub fallback_distance: f32,
    /// Scale while fully transparent
    pub start_scale: f32,
}

impl Default for ReticleConfig {
    fn default() -> Self {
        Self {
            screen_point: [0.5, 0.5],
            ease: constants::RETICLE_EASE,
            blend_step: constants::TRACKING_BLEND_STEP,
            fallback_distance: constants::RETICLE_FALLBACK_DISTANCE,
            start_scale: constants::RETICLE_START_SCALE,
        }
    }
}

/// Mode transition timings (seconds)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TransitionConfig {
    /// Background cross-fade that gates scene reparenting
    pub cross_fade: f32,
    /// Model scale tween in/out
    pub model_tween: f32,
    /// Shadow, grid, reticle and highlight fades
    pub fade: f32,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            cross_fade: 0.6,
            model_tween: 0.4,
            fade: 0.3,
        }
    }
}

/// HUD settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HudConfig {
    /// Spacing in staging mode; doubled while fullscreen
    pub spacing: f32,
}

impl Default for HudConfig {
    fn default() -> Self {
        Self {
            spacing: constants::HUD_SPACING,
        }
    }
}

/// Startup behaviour, consumed once after the model has loaded
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct LaunchOptions {
    /// Enter fullscreen right after setup
    pub fullscreen: bool,
    /// Enter AR right after setup (if the device supports it)
    pub ar: bool,
}

/// Complete viewer configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ViewerConfig {
    #[serde(default)]
    pub gesture: GestureConfig,
    #[serde(default)]
    pub reticle: ReticleConfig,
    #[serde(default)]
    pub transition: TransitionConfig,
    #[serde(default)]
    pub hud: HudConfig,
    #[serde(default)]
    pub launch: LaunchOptions,
}

impl ViewerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a RON document.
    pub fn from_ron(content: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(content)?)
    }

    pub fn to_ron(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    /// Load configuration from a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_ron(&content)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Save configuration to a RON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = ViewerConfig::from_ron("(gesture: (fallback_miss_threshold: 5))").unwrap();
        assert_eq!(config.gesture.fallback_miss_threshold, 5);
        assert_eq!(config.gesture.proximity_margin, constants::PROXIMITY_MARGIN);
        assert_eq!(config.reticle, ReticleConfig::default());
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewer.ron");

        let mut config = ViewerConfig::new();
        config.launch.ar = true;
        config.transition.cross_fade = 1.25;
        config.save(&path).unwrap();

        assert_eq!(ViewerConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_config_is_parse_error() {
        assert!(matches!(
            ViewerConfig::from_ron("(gesture: 3)"),
            Err(ConfigError::Parse(_))
        ));
    }
}
