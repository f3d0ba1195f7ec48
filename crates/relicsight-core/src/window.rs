use serde::{Deserialize, Serialize};

/// Native window handle (`HWND` on Windows), stored as an integer so it can
/// cross thread boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowHandle(pub isize);

/// Client-area rectangle in physical screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// UI scale of the game relative to a 1920×1080 layout.
///
/// Wider-than-16:9 windows pillarbox the UI, so height drives the scale;
/// otherwise width does.
pub fn screen_scaling(rect: Rect) -> f64 {
    if rect.is_empty() {
        return 1.0;
    }
    let (w, h) = (rect.width as f64, rect.height as f64);
    if w * 9.0 > h * 16.0 {
        h / 1080.0
    } else {
        w / 1920.0
    }
}

/// Window/process geometry collaborator.
pub trait WindowGeometry: Send + Sync {
    fn handle(&self) -> Option<WindowHandle>;

    fn client_rect(&self) -> Rect;

    /// Per-monitor DPI scale (1.0 = 96 DPI).
    fn dpi_scale(&self) -> f64;

    fn is_alive(&self) -> bool {
        self.handle().is_some()
    }

    fn screen_scaling(&self) -> f64 {
        screen_scaling(self.client_rect())
    }
}

/// Static geometry, used for file-based captures and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedWindow {
    pub rect: Rect,
    pub dpi_scale: f64,
}

impl FixedWindow {
    pub fn new(width: u32, height: u32) -> Self {
        Self { rect: Rect::new(0, 0, width, height), dpi_scale: 1.0 }
    }
}

impl WindowGeometry for FixedWindow {
    fn handle(&self) -> Option<WindowHandle> {
        None
    }

    fn client_rect(&self) -> Rect {
        self.rect
    }

    fn dpi_scale(&self) -> f64 {
        self.dpi_scale
    }

    fn is_alive(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaling_tracks_the_limiting_axis() {
        assert_eq!(screen_scaling(Rect::new(0, 0, 1920, 1080)), 1.0);
        assert_eq!(screen_scaling(Rect::new(0, 0, 3840, 2160)), 2.0);
        // 21:9, height-bound
        assert_eq!(screen_scaling(Rect::new(0, 0, 3440, 1440)), 1440.0 / 1080.0);
        // 16:10, width-bound
        assert_eq!(screen_scaling(Rect::new(0, 0, 1280, 800)), 1280.0 / 1920.0);
        assert_eq!(screen_scaling(Rect::default()), 1.0);
    }

    #[test]
    fn fixed_window_reports_static_geometry() {
        let w = FixedWindow::new(2560, 1440);
        assert!(w.is_alive());
        assert_eq!(w.handle(), None);
        assert_eq!(w.screen_scaling(), 2560.0 / 1920.0);
    }
}
