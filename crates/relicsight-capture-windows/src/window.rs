//! Live Win32 window geometry.

use relicsight_core::{Rect, WindowGeometry, WindowHandle};
use windows::{
    core::{HSTRING, PCWSTR},
    Win32::{
        Foundation::{HWND, POINT, RECT},
        Graphics::Gdi::ClientToScreen,
        UI::{
            HiDpi::GetDpiForWindow,
            WindowsAndMessaging::{FindWindowW, GetClientRect, IsWindow},
        },
    },
};

#[derive(Debug, Clone, Copy)]
pub struct Win32Window {
    handle: WindowHandle,
}

impl Win32Window {
    pub fn new(handle: WindowHandle) -> Self {
        Self { handle }
    }

    /// Top-level window with exactly this title, if any.
    pub fn find_by_title(title: &str) -> Option<Self> {
        let hwnd = unsafe { FindWindowW(PCWSTR::null(), &HSTRING::from(title)) }.ok()?;
        (!hwnd.0.is_null()).then(|| Self::new(WindowHandle(hwnd.0 as isize)))
    }

    fn hwnd(&self) -> HWND {
        HWND(self.handle.0 as *mut core::ffi::c_void)
    }
}

impl WindowGeometry for Win32Window {
    fn handle(&self) -> Option<WindowHandle> {
        self.is_alive().then_some(self.handle)
    }

    fn client_rect(&self) -> Rect {
        let mut rect = RECT::default();
        if unsafe { GetClientRect(self.hwnd(), &mut rect) }.is_err() {
            return Rect::default();
        }
        let mut origin = POINT { x: rect.left, y: rect.top };
        let _ = unsafe { ClientToScreen(self.hwnd(), &mut origin) };
        Rect::new(
            origin.x,
            origin.y,
            (rect.right - rect.left).max(0) as u32,
            (rect.bottom - rect.top).max(0) as u32,
        )
    }

    fn dpi_scale(&self) -> f64 {
        match unsafe { GetDpiForWindow(self.hwnd()) } {
            0 => 1.0,
            dpi => dpi as f64 / 96.0,
        }
    }

    fn is_alive(&self) -> bool {
        unsafe { IsWindow(self.hwnd()) }.as_bool()
    }
}
