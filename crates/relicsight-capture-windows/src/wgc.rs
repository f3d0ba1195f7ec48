//! Windows.Graphics.Capture (WGC) window capture implementation.
//!
//! Requires Windows 10 1903+ for window capture and the `windows` crate with
//! WGC features.
//!
//! # Threading model
//!
//! The frame pool is free-threaded: `FrameArrived` fires on a system thread
//! pool thread and only swaps the frame into the shared [`FrameSlot`]. The
//! reader copies the slot's frame into a staging texture under the same lock.
//! Sessions are built on a dedicated thread (see [`crate::session_thread`]).

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use parking_lot::Mutex;
use relicsight_core::{CaptureError, DecodedBitmap, DynamicRange, ScreenshotSource, WindowHandle};
use windows::{
    core::{IInspectable, Interface},
    Foundation::TypedEventHandler,
    Graphics::{
        Capture::{
            Direct3D11CaptureFrame, Direct3D11CaptureFramePool, GraphicsCaptureItem,
            GraphicsCaptureSession,
        },
        DirectX::{Direct3D11::IDirect3DDevice, DirectXPixelFormat},
    },
    Win32::{
        Foundation::HWND,
        Graphics::{
            Direct3D::D3D_DRIVER_TYPE_HARDWARE,
            Direct3D11::{
                D3D11CreateDevice, ID3D11Device, ID3D11DeviceContext, ID3D11Texture2D,
                D3D11_CPU_ACCESS_READ, D3D11_CREATE_DEVICE_BGRA_SUPPORT, D3D11_MAPPED_SUBRESOURCE,
                D3D11_MAP_READ, D3D11_SDK_VERSION, D3D11_TEXTURE2D_DESC, D3D11_USAGE_STAGING,
            },
            Dxgi::{
                Common::{
                    DXGI_COLOR_SPACE_RGB_FULL_G2084_NONE_P2020, DXGI_FORMAT,
                    DXGI_FORMAT_B8G8R8A8_UNORM, DXGI_FORMAT_R16G16B16A16_FLOAT,
                },
                CreateDXGIFactory1, IDXGIDevice, IDXGIFactory1, IDXGIOutput6,
            },
            Gdi::{MonitorFromWindow, MONITOR_DEFAULTTONEAREST},
        },
        System::WinRT::{
            Direct3D11::{CreateDirect3D11DeviceFromDXGIDevice, IDirect3DDxgiInterfaceAccess},
            Graphics::Capture::IGraphicsCaptureItemInterop,
        },
    },
};

use crate::convert;
use crate::session_thread::SessionSupervisor;
use crate::slot::FrameSlot;
use crate::CaptureConfig;

const FRAME_BUFFERS: i32 = 2;

fn hwnd(window: WindowHandle) -> HWND {
    HWND(window.0 as *mut core::ffi::c_void)
}

fn pixel_format(mode: DynamicRange) -> DirectXPixelFormat {
    match mode {
        DynamicRange::Standard => DirectXPixelFormat::B8G8R8A8UIntNormalized,
        DynamicRange::Extended => DirectXPixelFormat::R16G16B16A16Float,
    }
}

fn dxgi_format(mode: DynamicRange) -> DXGI_FORMAT {
    match mode {
        DynamicRange::Standard => DXGI_FORMAT_B8G8R8A8_UNORM,
        DynamicRange::Extended => DXGI_FORMAT_R16G16B16A16_FLOAT,
    }
}

// ── CaptureSession ────────────────────────────────────────────────────────────

/// One WGC session bound to one window. Torn down on drop.
struct CaptureSession {
    mode: DynamicRange,
    device: ID3D11Device,
    context: ID3D11DeviceContext,
    slot: Arc<FrameSlot<Direct3D11CaptureFrame>>,
    pool: Direct3D11CaptureFramePool,
    session: GraphicsCaptureSession,
    item: GraphicsCaptureItem,
    frame_token: i64,
    closed_token: i64,
}

// SAFETY: the WinRT objects are agile and the D3D11 device is free-threaded.
// The immediate context is only touched from `read_current`, which requires
// `&mut` access to the owning `WindowCapturer`.
unsafe impl Send for CaptureSession {}

impl CaptureSession {
    fn create(config: CaptureConfig) -> Result<Self> {
        let CaptureConfig { window, mode } = config;

        // ── 1. Create D3D11 device ─────────────────────────────────────────
        let mut device: Option<ID3D11Device> = None;
        let mut context: Option<ID3D11DeviceContext> = None;
        unsafe {
            D3D11CreateDevice(
                None,
                D3D_DRIVER_TYPE_HARDWARE,
                None,
                D3D11_CREATE_DEVICE_BGRA_SUPPORT,
                None,
                D3D11_SDK_VERSION,
                Some(&mut device),
                None,
                Some(&mut context),
            )
            .context("D3D11CreateDevice")?;
        }
        let device = device.context("D3D11CreateDevice returned no device")?;
        let context = context.context("D3D11CreateDevice returned no context")?;

        // ── 2. Wrap D3D11 device as WinRT IDirect3DDevice ─────────────────
        let dxgi_device: IDXGIDevice = device.cast().context("cast IDXGIDevice")?;
        let inspectable = unsafe {
            CreateDirect3D11DeviceFromDXGIDevice(&dxgi_device)
                .context("CreateDirect3D11DeviceFromDXGIDevice")?
        };
        let winrt_device: IDirect3DDevice = inspectable.cast().context("cast IDirect3DDevice")?;

        // ── 3. Create GraphicsCaptureItem from HWND ───────────────────────
        let interop =
            windows::core::factory::<GraphicsCaptureItem, IGraphicsCaptureItemInterop>()
                .context("IGraphicsCaptureItemInterop factory")?;
        let item: GraphicsCaptureItem =
            unsafe { interop.CreateForWindow(hwnd(window)).context("CreateForWindow")? };
        let item_size = item.Size().context("GraphicsCaptureItem::Size")?;
        tracing::info!(
            "Window {:#x} WGC item size {}x{} ({mode})",
            window.0, item_size.Width, item_size.Height
        );

        // ── 4. Create frame pool ──────────────────────────────────────────
        let format = pixel_format(mode);
        let pool = Direct3D11CaptureFramePool::CreateFreeThreaded(
            &winrt_device,
            format,
            FRAME_BUFFERS,
            item_size,
        )
        .context("CreateFreeThreaded frame pool")?;

        // ── 5. Create capture session ─────────────────────────────────────
        let session = pool.CreateCaptureSession(&item).context("CreateCaptureSession")?;
        // Border / cursor toggles need newer builds; failures are harmless.
        let _ = session.SetIsBorderRequired(false);
        let _ = session.SetIsCursorCaptureEnabled(false);

        // ── 6. Register FrameArrived + Closed ─────────────────────────────
        let slot = Arc::new(FrameSlot::new());
        let last_size = Arc::new(Mutex::new(item_size));

        let frame_token = {
            let slot = Arc::clone(&slot);
            let winrt_device = winrt_device.clone();
            pool.FrameArrived(&TypedEventHandler::<Direct3D11CaptureFramePool, IInspectable>::new(
                move |pool_ref, _| {
                    let Some(pool_ref) = pool_ref.as_ref() else {
                        return Ok(());
                    };
                    let frame = match pool_ref.TryGetNextFrame() {
                        Ok(f) => f,
                        Err(e) => {
                            tracing::warn!("FrameArrived: capture source disposed ({e})");
                            if let Some(old) = slot.clear() {
                                let _ = old.Close();
                            }
                            return Ok(());
                        }
                    };

                    let size = frame.ContentSize()?;
                    {
                        let mut last = last_size.lock();
                        if size.Width != last.Width || size.Height != last.Height {
                            tracing::debug!("Window resized to {}x{}, recreating frame pool", size.Width, size.Height);
                            pool_ref.Recreate(&winrt_device, format, FRAME_BUFFERS, size)?;
                            *last = size;
                        }
                    }

                    if let Some(old) = slot.replace(frame) {
                        let _ = old.Close();
                    }
                    Ok(())
                },
            ))
            .context("FrameArrived handler")?
        };

        let closed_token = {
            let slot = Arc::clone(&slot);
            item.Closed(&TypedEventHandler::<GraphicsCaptureItem, IInspectable>::new(move |_, _| {
                tracing::warn!("Window {:#x} closed, capture item released", window.0);
                if let Some(old) = slot.clear() {
                    let _ = old.Close();
                }
                Ok(())
            }))
            .context("Closed handler")?
        };

        // ── 7. Start capture ──────────────────────────────────────────────
        session.StartCapture().context("StartCapture")?;
        tracing::info!("Window {:#x} WGC capture started", window.0);

        Ok(Self {
            mode,
            device,
            context,
            slot,
            pool,
            session,
            item,
            frame_token,
            closed_token,
        })
    }

    /// Copies the current frame to CPU memory. Holds the slot lock for the
    /// whole copy + map.
    fn read_current(&mut self) -> Result<Option<RawFrame>> {
        let (device, context, mode) = (&self.device, &self.context, self.mode);
        self.slot
            .with_current(|current| -> Result<RawFrame> {
                let frame = &current.value;
                let access: IDirect3DDxgiInterfaceAccess =
                    frame.Surface()?.cast().context("cast IDirect3DDxgiInterfaceAccess")?;
                let texture: ID3D11Texture2D = unsafe { access.GetInterface()? };

                let mut desc = D3D11_TEXTURE2D_DESC::default();
                unsafe { texture.GetDesc(&mut desc) };
                if desc.Format != dxgi_format(mode) {
                    bail!("frame format {:?} does not match {mode} session", desc.Format);
                }

                let content = frame.ContentSize()?;
                let width = (content.Width.max(0) as u32).min(desc.Width);
                let height = (content.Height.max(0) as u32).min(desc.Height);

                desc.Usage = D3D11_USAGE_STAGING;
                desc.BindFlags = 0;
                desc.CPUAccessFlags = D3D11_CPU_ACCESS_READ.0 as u32;
                desc.MiscFlags = 0;
                let mut staging: Option<ID3D11Texture2D> = None;
                unsafe { device.CreateTexture2D(&desc, None, Some(&mut staging))? };
                let staging = staging.context("CreateTexture2D staging")?;

                unsafe { context.CopyResource(&staging, &texture) };

                let mapped = MappedStaging::map(context, &staging)?;
                let data = mapped.copy_rows(width, height, mode.bytes_per_pixel());
                Ok(RawFrame { seq: current.seq, width, height, data })
            })
            .transpose()
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        let _ = self.pool.RemoveFrameArrived(self.frame_token);
        let _ = self.item.RemoveClosed(self.closed_token);
        if let Some(frame) = self.slot.clear() {
            let _ = frame.Close();
        }
        let _ = self.session.Close();
        let _ = self.pool.Close();
        tracing::debug!("WGC session closed");
    }
}

/// Mapped staging texture; unmapped on drop.
struct MappedStaging<'a> {
    context: &'a ID3D11DeviceContext,
    texture: &'a ID3D11Texture2D,
    mapped: D3D11_MAPPED_SUBRESOURCE,
}

impl<'a> MappedStaging<'a> {
    fn map(context: &'a ID3D11DeviceContext, texture: &'a ID3D11Texture2D) -> Result<Self> {
        let mut mapped = D3D11_MAPPED_SUBRESOURCE::default();
        unsafe { context.Map(texture, 0, D3D11_MAP_READ, 0, Some(&mut mapped)).context("Map staging")? };
        Ok(Self { context, texture, mapped })
    }

    /// Tightly packed rows, `width * bpp` bytes each.
    fn copy_rows(&self, width: u32, height: u32, bpp: usize) -> Vec<u8> {
        let row_pitch = self.mapped.RowPitch as usize;
        let row_bytes = width as usize * bpp;
        let mut data = Vec::with_capacity(row_bytes * height as usize);
        for row in 0..height as usize {
            let src = unsafe {
                std::slice::from_raw_parts(
                    (self.mapped.pData as *const u8).add(row * row_pitch),
                    row_bytes,
                )
            };
            data.extend_from_slice(src);
        }
        data
    }
}

impl Drop for MappedStaging<'_> {
    fn drop(&mut self) {
        unsafe { self.context.Unmap(self.texture, 0) };
    }
}

struct RawFrame {
    seq: u64,
    width: u32,
    height: u32,
    data: Vec<u8>,
}

// ── WindowCapturer ────────────────────────────────────────────────────────────

/// Live capture of one game window.
pub struct WindowCapturer {
    config: CaptureConfig,
    sessions: SessionSupervisor<CaptureSession>,
}

impl WindowCapturer {
    /// Start building a session for the configured window and return at once.
    /// Captures report `SessionUnavailable` until it is ready; failed builds
    /// are retried every [`SESSION_RETRY`].
    pub fn start(config: CaptureConfig) -> Result<Self, CaptureError> {
        Ok(Self { config, sessions: supervise(config)? })
    }

    /// Open a WGC capture session for the configured window. Blocks until the
    /// session thread reports back.
    pub fn open(config: CaptureConfig) -> Result<Self, CaptureError> {
        let mut capturer = Self::start(config)?;
        capturer.sessions.wait()?;
        Ok(capturer)
    }

    /// Tear down the current session and start building one for `window`.
    ///
    /// Returns immediately; captures report `SessionUnavailable` until the new
    /// session is ready.
    pub fn rebind(&mut self, window: WindowHandle) -> Result<(), CaptureError> {
        tracing::info!("Rebinding capture {:#x} → {:#x}", self.config.window.0, window.0);
        self.config.window = window;
        self.sessions.reset();
        self.sessions = supervise(self.config)?;
        Ok(())
    }

    pub fn mode(&self) -> DynamicRange {
        self.config.mode
    }

    pub fn window(&self) -> WindowHandle {
        self.config.window
    }

    /// Frames delivered to the current session so far.
    pub fn frames_received(&self) -> u64 {
        self.sessions.session().map_or(0, |s| s.slot.arrivals())
    }
}

/// Delay between failed session builds for the same window.
pub const SESSION_RETRY: Duration = Duration::from_secs(2);

fn supervise(config: CaptureConfig) -> Result<SessionSupervisor<CaptureSession>, CaptureError> {
    let sessions = SessionSupervisor::start("relicsight-wgc", SESSION_RETRY, move || CaptureSession::create(config))?;
    Ok(sessions)
}

impl ScreenshotSource for WindowCapturer {
    fn name(&self) -> &'static str {
        "wgc"
    }

    fn capture_screenshot(&mut self) -> Result<DecodedBitmap, CaptureError> {
        let mode = self.config.mode;
        let session = match self.sessions.poll() {
            Some(session) => session,
            None => {
                return Err(CaptureError::session_unavailable(if self.sessions.is_pending() {
                    "session is being built"
                } else {
                    "session build failed, retry pending"
                }))
            }
        };

        let raw = session.read_current()?.ok_or(CaptureError::FrameUnavailable)?;
        tracing::debug!("Captured frame #{} {}x{} ({mode})", raw.seq, raw.width, raw.height);
        convert::to_bitmap(mode, &raw.data, raw.width, raw.height, raw.width as usize * mode.bytes_per_pixel())
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Whether the monitor hosting `window` is in an HDR10 colour space.
pub fn display_supports_hdr(window: WindowHandle) -> bool {
    match query_display_hdr(window) {
        Ok(hdr) => hdr,
        Err(e) => {
            tracing::debug!("HDR detection failed, assuming SDR: {e:#}");
            false
        }
    }
}

fn query_display_hdr(window: WindowHandle) -> Result<bool> {
    let monitor = unsafe { MonitorFromWindow(hwnd(window), MONITOR_DEFAULTTONEAREST) };
    let factory: IDXGIFactory1 = unsafe { CreateDXGIFactory1().context("CreateDXGIFactory1")? };

    let mut adapter_index = 0;
    while let Ok(adapter) = unsafe { factory.EnumAdapters1(adapter_index) } {
        let mut output_index = 0;
        while let Ok(output) = unsafe { adapter.EnumOutputs(output_index) } {
            let desc = unsafe { output.GetDesc()? };
            if desc.Monitor == monitor {
                let output6: IDXGIOutput6 = output.cast().context("cast IDXGIOutput6")?;
                let desc1 = unsafe { output6.GetDesc1()? };
                return Ok(desc1.ColorSpace == DXGI_COLOR_SPACE_RGB_FULL_G2084_NONE_P2020);
            }
            output_index += 1;
        }
        adapter_index += 1;
    }
    Ok(false)
}
