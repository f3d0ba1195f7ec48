//! relicsight-capture-windows: frame sources for RelicSight.
//!
//! The primary source captures the game window with the Windows.Graphics.Capture
//! (WGC) API, available on Windows 10 1903+. On non-Windows targets a stub is
//! compiled for CI compatibility. [`DesktopSource`] and [`FileSource`] implement
//! the same [`ScreenshotSource`](relicsight_core::ScreenshotSource) contract.
//!
//! # Windows pipeline
//!
//! ```text
//! HWND (game window)
//!   │  session_thread: STA thread, IGraphicsCaptureItemInterop::CreateForWindow
//!   ▼
//! GraphicsCaptureItem
//!   │  Direct3D11CaptureFramePool::CreateFreeThreaded (BGRA8 | RGBA16F, 2 buffers)
//!   ▼
//! GraphicsCaptureSession::StartCapture()
//!   │  FrameArrived callback → FrameSlot::replace (previous frame closed)
//!   ▼
//! capture_screenshot(): slot lock → CopyResource → staging texture → Map
//!   │
//!   ▼
//! convert: BGRA reorder (SDR) | Reinhard tone-map (HDR) → DecodedBitmap (RGB24)
//! ```

pub mod convert;
pub mod desktop;
pub mod file;
mod half;
pub mod session_thread;
pub mod slot;

use relicsight_core::{DynamicRange, WindowHandle};

pub use desktop::DesktopSource;
pub use file::FileSource;

/// Configuration for a single window capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureConfig {
    pub window: WindowHandle,
    pub mode: DynamicRange,
}

// ── Platform split ─────────────────────────────────────────────────────────────

#[cfg(target_os = "windows")]
mod wgc;
#[cfg(target_os = "windows")]
mod window;
#[cfg(target_os = "windows")]
pub use wgc::{display_supports_hdr, WindowCapturer};
#[cfg(target_os = "windows")]
pub use window::Win32Window;

#[cfg(not(target_os = "windows"))]
mod stub;
#[cfg(not(target_os = "windows"))]
pub use stub::{display_supports_hdr, WindowCapturer};
