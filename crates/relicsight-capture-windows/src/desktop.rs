//! Desktop copy source using the `xcap` crate.
//!
//! Grabs the monitor under the game window (or the primary monitor) and crops
//! to the window's client rectangle. Works for any dynamic-range mode because
//! the compositor already tone-mapped the desktop, at the cost of capturing
//! whatever overlaps the window.

use std::sync::Arc;

use anyhow::anyhow;
use image::DynamicImage;
use relicsight_core::{CaptureError, DecodedBitmap, Rect, ScreenshotSource, WindowGeometry};
use xcap::Monitor;

pub struct DesktopSource {
    window: Option<Arc<dyn WindowGeometry>>,
}

impl DesktopSource {
    /// Whole primary monitor.
    pub fn primary() -> Self {
        Self { window: None }
    }

    /// Only the area covered by `window`.
    pub fn for_window(window: Arc<dyn WindowGeometry>) -> Self {
        Self { window: Some(window) }
    }

    fn monitor_for(&self, target: Option<Rect>) -> Result<Monitor, CaptureError> {
        if let Some(rect) = target {
            let cx = rect.x + (rect.width / 2) as i32;
            let cy = rect.y + (rect.height / 2) as i32;
            if let Ok(m) = Monitor::from_point(cx, cy) {
                return Ok(m);
            }
        }

        let monitors = Monitor::all().map_err(|e| backend("enumerate monitors", e))?;
        let mut fallback = None;
        for m in monitors {
            if m.is_primary().unwrap_or(false) {
                return Ok(m);
            }
            fallback.get_or_insert(m);
        }
        fallback.ok_or_else(|| CaptureError::session_unavailable("no monitor found"))
    }
}

fn backend(what: &str, e: xcap::XCapError) -> CaptureError {
    CaptureError::Backend(anyhow!("{what}: {e}"))
}

/// `window` relative to `monitor`, clipped. `None` if they do not overlap.
pub(crate) fn crop_within(monitor: Rect, window: Rect) -> Option<Rect> {
    let left = window.x.max(monitor.x);
    let top = window.y.max(monitor.y);
    let right = (window.x + window.width as i32).min(monitor.x + monitor.width as i32);
    let bottom = (window.y + window.height as i32).min(monitor.y + monitor.height as i32);
    if right <= left || bottom <= top {
        return None;
    }
    Some(Rect::new(
        left - monitor.x,
        top - monitor.y,
        (right - left) as u32,
        (bottom - top) as u32,
    ))
}

impl ScreenshotSource for DesktopSource {
    fn name(&self) -> &'static str {
        "desktop"
    }

    fn capture_screenshot(&mut self) -> Result<DecodedBitmap, CaptureError> {
        let target = match &self.window {
            Some(w) if !w.is_alive() => {
                return Err(CaptureError::session_unavailable("target window is gone"));
            }
            Some(w) => Some(w.client_rect()),
            None => None,
        };

        let monitor = self.monitor_for(target)?;
        let bounds = Rect::new(
            monitor.x().map_err(|e| backend("monitor x", e))?,
            monitor.y().map_err(|e| backend("monitor y", e))?,
            monitor.width().map_err(|e| backend("monitor width", e))?,
            monitor.height().map_err(|e| backend("monitor height", e))?,
        );
        let shot = monitor.capture_image().map_err(|e| backend("capture monitor", e))?;
        let rgb = DynamicImage::ImageRgba8(shot).to_rgb8();

        let bitmap = match target {
            None => rgb,
            Some(rect) => {
                let crop = crop_within(bounds, rect)
                    .ok_or_else(|| CaptureError::session_unavailable("window is off-screen"))?;
                image::imageops::crop_imm(&rgb, crop.x as u32, crop.y as u32, crop.width, crop.height)
                    .to_image()
            }
        };
        tracing::debug!("Desktop capture {}x{}", bitmap.width(), bitmap.height());
        Ok(bitmap.into())
    }
}
