//! Capture → classify loop.
//!
//! Each tick moves the source onto the blocking pool, grabs one screenshot,
//! classifies it and hands the source back. Window changes from the watcher
//! rebind the live capture between ticks.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use relicsight_capture_windows::{display_supports_hdr, CaptureConfig, DesktopSource, FileSource, WindowCapturer};
use relicsight_core::{
    screen_scaling, CaptureError, DecodedBitmap, HdrPreference, Rect, ScreenshotSource, WindowHandle,
};
use relicsight_theme::{Classification, ThemeDetector};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::watcher::WindowRx;

/// Consecutive transient failures tolerated in `once` mode.
const ONCE_ATTEMPTS: u64 = 30;

// ── Public types ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct LoopConfig {
    pub interval: Duration,
    pub once: bool,
    /// Fixed UI scale instead of the live one.
    pub scale: Option<f64>,
    pub json: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LoopStats {
    pub classified: u64,
    pub failures: u64,
    pub last: Option<Classification>,
}

pub enum Source {
    File(FileSource),
    Desktop(DesktopSource),
    Window(WindowSource),
}

impl Source {
    pub fn on_window_change(&mut self, window: Option<WindowHandle>) {
        if let Self::Window(source) = self {
            source.rebind(window);
        }
    }

    fn inner(&mut self) -> &mut dyn ScreenshotSource {
        match self {
            Self::File(s) => s,
            Self::Desktop(s) => s,
            Self::Window(s) => s,
        }
    }
}

impl ScreenshotSource for Source {
    fn name(&self) -> &'static str {
        match self {
            Self::File(s) => s.name(),
            Self::Desktop(s) => s.name(),
            Self::Window(s) => s.name(),
        }
    }

    fn capture_screenshot(&mut self) -> Result<DecodedBitmap, CaptureError> {
        self.inner().capture_screenshot()
    }
}

// ── WindowSource ──────────────────────────────────────────────────────────────

/// WGC capture that follows the game window across restarts and monitor
/// moves. The dynamic-range mode is re-resolved on every rebind.
pub struct WindowSource {
    preference: HdrPreference,
    capturer: Option<WindowCapturer>,
}

impl WindowSource {
    pub fn new(preference: HdrPreference, window: Option<WindowHandle>) -> Self {
        let mut source = Self { preference, capturer: None };
        source.rebind(window);
        source
    }

    pub fn rebind(&mut self, window: Option<WindowHandle>) {
        let Some(window) = window else {
            if self.capturer.take().is_some() {
                info!("Game window closed, capture stopped");
            }
            return;
        };

        let mode = self.preference.resolve(display_supports_hdr(window));
        match &mut self.capturer {
            Some(capturer) if capturer.mode() == mode => {
                debug!("Window {:#x} delivered {} frames", capturer.window().0, capturer.frames_received());
                if let Err(e) = capturer.rebind(window) {
                    warn!("Rebind to {:#x} failed: {e}", window.0);
                }
            }
            slot => match WindowCapturer::start(CaptureConfig { window, mode }) {
                Ok(capturer) => {
                    info!("Capturing window {:#x} ({mode})", window.0);
                    *slot = Some(capturer);
                }
                Err(e) => {
                    warn!("Capture start for {:#x} failed: {e}", window.0);
                    *slot = None;
                }
            },
        }
    }
}

impl ScreenshotSource for WindowSource {
    fn name(&self) -> &'static str {
        "wgc"
    }

    fn capture_screenshot(&mut self) -> Result<DecodedBitmap, CaptureError> {
        match self.capturer.as_mut() {
            Some(capturer) => capturer.capture_screenshot(),
            None => Err(CaptureError::session_unavailable("game window not found")),
        }
    }
}

// ── Loop ──────────────────────────────────────────────────────────────────────

struct Frame {
    width: u32,
    height: u32,
    classification: Classification,
}

/// Runs until Ctrl-C, or until the first classified frame in `once` mode.
pub async fn run(
    mut source: Source,
    detector: Arc<ThemeDetector>,
    cfg: LoopConfig,
    mut windows: Option<WindowRx>,
) -> Result<LoopStats> {
    let mut stats = LoopStats::default();
    let mut streak = 0u64;
    let mut ticker = interval(cfg.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!("Capture loop started: {} source every {:?}", source.name(), cfg.interval);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested");
                break;
            }

            change = window_change(&mut windows) => match change {
                Some(window) => source.on_window_change(window),
                None => {
                    debug!("Window watcher ended");
                    windows = None;
                }
            },

            _ = ticker.tick() => {
                let (returned, outcome) = tick(source, Arc::clone(&detector), cfg.scale).await?;
                source = returned;

                match outcome {
                    Ok(frame) => {
                        streak = 0;
                        stats.classified += 1;
                        stats.last = Some(frame.classification);
                        report(&frame, cfg.json);
                        if cfg.once {
                            break;
                        }
                    }
                    Err(e) if e.is_transient() => {
                        streak += 1;
                        stats.failures += 1;
                        debug!("No frame yet: {e}");
                        if cfg.once && streak >= ONCE_ATTEMPTS {
                            bail!("no frame after {streak} attempts: {e}");
                        }
                    }
                    Err(e) if cfg.once => return Err(e).context("capture failed"),
                    Err(e) => {
                        stats.failures += 1;
                        warn!("Capture failed: {e}");
                    }
                }
            }
        }
    }

    info!("Capture loop stopped after {} frames", stats.classified);
    Ok(stats)
}

/// Next window change, or `None` once the watcher is gone. Never resolves
/// without a watcher.
async fn window_change(windows: &mut Option<WindowRx>) -> Option<Option<WindowHandle>> {
    match windows {
        Some(rx) => match rx.changed().await {
            Ok(()) => Some(*rx.borrow_and_update()),
            Err(_) => None,
        },
        None => std::future::pending().await,
    }
}

async fn tick(
    mut source: Source,
    detector: Arc<ThemeDetector>,
    scale: Option<f64>,
) -> Result<(Source, Result<Frame, CaptureError>)> {
    tokio::task::spawn_blocking(move || {
        let outcome = source.capture_screenshot().map(|bmp| classify(&detector, &bmp, scale));
        (source, outcome)
    })
    .await
    .context("capture task panicked")
}

fn classify(detector: &ThemeDetector, bitmap: &DecodedBitmap, scale: Option<f64>) -> Frame {
    let classification = match scale {
        Some(scale) => detector.classify(bitmap, scale),
        None if detector.has_window() => detector.classify_live(bitmap),
        None => detector.classify(bitmap, screen_scaling(Rect::new(0, 0, bitmap.width(), bitmap.height()))),
    };
    Frame { width: bitmap.width(), height: bitmap.height(), classification }
}

fn report(frame: &Frame, json: bool) {
    let c = &frame.classification;
    info!("{}x{} → {c}", frame.width, frame.height);
    if json {
        println!(
            "{}",
            serde_json::json!({
                "theme": c.theme,
                "detected": c.detected,
                "confidence": c.confidence,
                "width": frame.width,
                "height": frame.height,
            })
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relicsight_core::{Rgb, Settings, Theme};

    fn config() -> LoopConfig {
        LoopConfig { interval: Duration::from_millis(1), once: true, scale: None, json: false }
    }

    fn detector() -> Arc<ThemeDetector> {
        Arc::new(ThemeDetector::new(Settings::default().into_shared()))
    }

    #[tokio::test]
    async fn classifies_a_screenshot_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        DecodedBitmap::filled(1920, 1080, Rgb::new(9, 78, 106)).into_rgb_image().save(&path).unwrap();

        let stats = run(Source::File(FileSource::new(&path)), detector(), config(), None).await.unwrap();
        assert_eq!(stats.classified, 1);
        assert_eq!(stats.failures, 0);
        let last = stats.last.unwrap();
        assert_eq!(last.theme, Theme::Tenno);
        assert!(last.confidence > 0.0);
    }

    #[tokio::test]
    async fn once_mode_fails_on_hard_errors() {
        let source = Source::File(FileSource::new("/definitely/not/here.png"));
        assert!(run(source, detector(), config(), None).await.is_err());
    }

    #[tokio::test]
    async fn once_mode_gives_up_without_a_window() {
        let source = Source::Window(WindowSource::new(HdrPreference::Off, None));
        let err = run(source, detector(), config(), None).await.unwrap_err();
        assert!(err.to_string().contains("attempts"), "{err:#}");
    }

    #[test]
    fn window_source_without_window_is_transient() {
        let mut source = WindowSource::new(HdrPreference::Auto, None);
        let err = source.capture_screenshot().unwrap_err();
        assert!(err.is_transient());
        source.rebind(None);
        assert_eq!(source.name(), "wgc");
    }

    #[test]
    fn fixed_scale_overrides_bitmap_scaling() {
        let det = ThemeDetector::new(Settings::default().into_shared());
        let bmp = DecodedBitmap::filled(3840, 2160, Rgb::new(9, 78, 106));
        let auto = classify(&det, &bmp, None);
        let fixed = classify(&det, &bmp, Some(1.0));
        assert_eq!(auto.classification, det.classify(&bmp, 2.0));
        assert!(fixed.classification.confidence < auto.classification.confidence);
    }
}
