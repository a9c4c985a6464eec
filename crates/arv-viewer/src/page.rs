//! Placement of the render surface inside the host page
//!
//! Embedded, the surface sits inside the page content and scrolls with it.
//! Fullscreen detaches the content and hosts the surface directly under the
//! root so nothing overlays it; leaving fullscreen puts everything back,
//! including the scroll offset.

use arv_core::Viewport;

/// Parent of the render surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceHost {
    /// Inside the page content.
    Embedded,
    /// Directly under the document root.
    Root,
}

#[derive(Debug, Clone)]
pub struct PageLayout {
    embedded: Viewport,
    screen: Viewport,
    host: SurfaceHost,
    content_attached: bool,
    scroll: f32,
    saved_scroll: Option<f32>,
    resizes: u32,
}

impl PageLayout {
    /// `embedded` is the surface size inside the page, `screen` the full
    /// screen size.
    pub fn new(embedded: Viewport, screen: Viewport) -> Self {
        Self {
            embedded,
            screen,
            host: SurfaceHost::Embedded,
            content_attached: true,
            scroll: 0.0,
            saved_scroll: None,
            resizes: 0,
        }
    }

    pub fn host(&self) -> SurfaceHost {
        self.host
    }

    pub fn content_attached(&self) -> bool {
        self.content_attached
    }

    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    /// Scroll the page. Ignored while the content is detached.
    pub fn scroll_to(&mut self, offset: f32) {
        if self.content_attached {
            self.scroll = offset.max(0.0);
        }
    }

    /// Current surface size.
    pub fn viewport(&self) -> Viewport {
        match self.host {
            SurfaceHost::Embedded => self.embedded,
            SurfaceHost::Root => self.screen,
        }
    }

    /// Number of resize recomputes so far.
    pub fn resize_count(&self) -> u32 {
        self.resizes
    }

    /// Recompute the surface size.
    pub fn resize(&mut self) -> Viewport {
        self.resizes += 1;
        self.viewport()
    }

    pub fn enter_fullscreen(&mut self) {
        if self.host == SurfaceHost::Root {
            return;
        }
        self.saved_scroll = Some(self.scroll);
        self.content_attached = false;
        self.host = SurfaceHost::Root;
        self.scroll = 0.0;
    }

    pub fn exit_fullscreen(&mut self) {
        if self.host == SurfaceHost::Embedded {
            return;
        }
        self.host = SurfaceHost::Embedded;
        self.content_attached = true;
        if let Some(scroll) = self.saved_scroll.take() {
            self.scroll = scroll;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> PageLayout {
        PageLayout::new(Viewport::new(640.0, 480.0), Viewport::new(1080.0, 1920.0))
    }

    #[test]
    fn test_fullscreen_round_trip_restores_scroll() {
        let mut page = layout();
        page.scroll_to(350.0);

        page.enter_fullscreen();
        assert_eq!(page.host(), SurfaceHost::Root);
        assert!(!page.content_attached());
        assert_eq!(page.viewport(), Viewport::new(1080.0, 1920.0));

        page.scroll_to(10.0);
        page.exit_fullscreen();
        assert_eq!(page.host(), SurfaceHost::Embedded);
        assert!(page.content_attached());
        assert_eq!(page.scroll(), 350.0);
        assert_eq!(page.viewport(), Viewport::new(640.0, 480.0));
    }

    #[test]
    fn test_repeated_enter_keeps_first_scroll() {
        let mut page = layout();
        page.scroll_to(120.0);
        page.enter_fullscreen();
        page.enter_fullscreen();
        page.exit_fullscreen();
        assert_eq!(page.scroll(), 120.0);
    }
}
