//! HUD state driven by viewer events
//!
//! The HUD only subscribes: it never calls back into the viewer.

use arv_core::HudConfig;

use crate::events::ViewerEvent;

/// Persistent instruction shown while in AR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    /// Move the device around to find a surface.
    FindSurface,
    /// A surface is tracked; tap to place.
    TapToPlace,
}

/// Transient notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toast {
    /// The device is inside the model.
    TooClose,
}

#[derive(Debug, Clone)]
pub struct Hud {
    spacing: f32,
    prompt: Option<Prompt>,
    toast: Option<Toast>,
}

impl Hud {
    pub fn new(config: &HudConfig) -> Self {
        Self {
            spacing: config.spacing,
            prompt: None,
            toast: None,
        }
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    pub fn prompt(&self) -> Option<Prompt> {
        self.prompt
    }

    pub fn toast(&self) -> Option<Toast> {
        self.toast
    }

    pub fn handle(&mut self, event: ViewerEvent) {
        match event {
            ViewerEvent::EnterFullscreen => self.spacing *= 2.0,
            ViewerEvent::ExitFullscreen => self.spacing /= 2.0,
            ViewerEvent::EnterAr | ViewerEvent::ModelPlaced => self.prompt = None,
            ViewerEvent::ExitAr => {
                self.prompt = None;
                self.toast = None;
            }
            ViewerEvent::FindingSurface => self.prompt = Some(Prompt::FindSurface),
            ViewerEvent::FoundSurface => self.prompt = Some(Prompt::TapToPlace),
            ViewerEvent::ProximityWarning => self.toast = Some(Toast::TooClose),
            ViewerEvent::ProximityNormal => self.toast = None,
            ViewerEvent::ModelDragged | ViewerEvent::ModelRotated => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spacing_doubles_in_fullscreen() {
        let mut hud = Hud::new(&HudConfig { spacing: 16.0 });
        hud.handle(ViewerEvent::EnterFullscreen);
        assert_eq!(hud.spacing(), 32.0);
        hud.handle(ViewerEvent::ExitFullscreen);
        assert_eq!(hud.spacing(), 16.0);
    }

    #[test]
    fn test_prompt_follows_tracking_until_placed() {
        let mut hud = Hud::new(&HudConfig::default());
        hud.handle(ViewerEvent::EnterAr);
        assert_eq!(hud.prompt(), None);
        hud.handle(ViewerEvent::FindingSurface);
        assert_eq!(hud.prompt(), Some(Prompt::FindSurface));
        hud.handle(ViewerEvent::FoundSurface);
        assert_eq!(hud.prompt(), Some(Prompt::TapToPlace));
        hud.handle(ViewerEvent::ModelPlaced);
        assert_eq!(hud.prompt(), None);
    }

    #[test]
    fn test_exit_ar_clears_toast() {
        let mut hud = Hud::new(&HudConfig::default());
        hud.handle(ViewerEvent::ProximityWarning);
        assert_eq!(hud.toast(), Some(Toast::TooClose));
        hud.handle(ViewerEvent::ExitAr);
        assert_eq!(hud.toast(), None);
    }
}
