//! Non-Windows stub for WindowCapturer (CI + cross-compilation).

use relicsight_core::{CaptureError, DecodedBitmap, DynamicRange, ScreenshotSource, WindowHandle};

use super::CaptureConfig;

pub struct WindowCapturer {
    config: CaptureConfig,
}

impl WindowCapturer {
    pub fn open(config: CaptureConfig) -> Result<Self, CaptureError> {
        tracing::info!(
            "WindowCapturer::open stub (non-Windows) window={:#x} mode={}",
            config.window.0, config.mode
        );
        Ok(Self { config })
    }

    pub fn start(config: CaptureConfig) -> Result<Self, CaptureError> {
        Self::open(config)
    }

    pub fn rebind(&mut self, window: WindowHandle) -> Result<(), CaptureError> {
        tracing::info!("WindowCapturer::rebind stub {:#x} → {:#x}", self.config.window.0, window.0);
        self.config.window = window;
        Ok(())
    }

    pub fn mode(&self) -> DynamicRange {
        self.config.mode
    }

    pub fn window(&self) -> WindowHandle {
        self.config.window
    }

    pub fn frames_received(&self) -> u64 {
        0
    }
}

impl ScreenshotSource for WindowCapturer {
    fn name(&self) -> &'static str {
        "wgc-stub"
    }

    fn capture_screenshot(&mut self) -> Result<DecodedBitmap, CaptureError> {
        Err(CaptureError::session_unavailable("window capture requires Windows"))
    }
}

pub fn display_supports_hdr(_window: WindowHandle) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_reports_session_unavailable() {
        let mut cap = WindowCapturer::open(CaptureConfig {
            window: WindowHandle(0x1234),
            mode: DynamicRange::Extended,
        })
        .unwrap();
        let err = cap.capture_screenshot().unwrap_err();
        assert!(err.is_transient());

        cap.rebind(WindowHandle(0x5678)).unwrap();
        assert_eq!(cap.window(), WindowHandle(0x5678));
        assert_eq!(cap.mode(), DynamicRange::Extended);
    }
}
