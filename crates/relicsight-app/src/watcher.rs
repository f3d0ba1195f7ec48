//! Game window discovery.
//!
//! [`WindowWatcher`] polls for the window by title and publishes the current
//! handle on a `watch` channel; `None` while the game is not running.

use std::time::Duration;

use relicsight_core::{Rect, WindowGeometry, WindowHandle};
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

pub type WindowRx = watch::Receiver<Option<WindowHandle>>;

/// Whether this platform can look windows up by title.
pub const DISCOVERY_SUPPORTED: bool = cfg!(target_os = "windows");

pub struct WindowWatcher<F> {
    title: String,
    poll: Duration,
    discover: F,
}

impl WindowWatcher<fn(&str) -> Option<WindowHandle>> {
    pub fn by_title(title: impl Into<String>, poll: Duration) -> Self {
        Self::with_discovery(title, poll, find_window)
    }
}

impl<F> WindowWatcher<F>
where
    F: Fn(&str) -> Option<WindowHandle> + Send + 'static,
{
    pub fn with_discovery(title: impl Into<String>, poll: Duration, discover: F) -> Self {
        Self { title: title.into(), poll, discover }
    }

    /// Looks the window up once, then keeps polling on a task until every
    /// receiver is dropped.
    pub fn spawn(self) -> WindowRx {
        let initial = (self.discover)(&self.title);
        match initial {
            Some(h) => info!("Window '{}' found: {:#x}", self.title, h.0),
            None => info!("Window '{}' not found yet", self.title),
        }
        let (tx, rx) = watch::channel(initial);
        tokio::spawn(self.run(tx));
        rx
    }

    async fn run(self, tx: watch::Sender<Option<WindowHandle>>) {
        let mut ticker = interval(self.poll);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // first tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = tx.closed() => break,
                _ = ticker.tick() => {}
            }

            let found = (self.discover)(&self.title);
            let changed = tx.send_if_modified(|current| {
                if *current == found {
                    return false;
                }
                *current = found;
                true
            });
            if changed {
                match found {
                    Some(h) => info!("Window '{}' now {:#x}", self.title, h.0),
                    None => warn!("Window '{}' lost", self.title),
                }
            }
        }
        debug!("Window watcher for '{}' stopped", self.title);
    }
}

#[cfg(target_os = "windows")]
fn find_window(title: &str) -> Option<WindowHandle> {
    relicsight_capture_windows::Win32Window::find_by_title(title).and_then(|w| w.handle())
}

#[cfg(not(target_os = "windows"))]
fn find_window(_title: &str) -> Option<WindowHandle> {
    None
}

// ── WatchedWindow ─────────────────────────────────────────────────────────────

/// Geometry of whichever window the watcher currently reports.
pub struct WatchedWindow {
    rx: WindowRx,
}

impl WatchedWindow {
    pub fn new(rx: WindowRx) -> Self {
        Self { rx }
    }
}

#[cfg(target_os = "windows")]
impl WatchedWindow {
    fn live(&self) -> Option<relicsight_capture_windows::Win32Window> {
        (*self.rx.borrow()).map(relicsight_capture_windows::Win32Window::new)
    }
}

#[cfg(target_os = "windows")]
impl WindowGeometry for WatchedWindow {
    fn handle(&self) -> Option<WindowHandle> {
        self.live().and_then(|w| w.handle())
    }

    fn client_rect(&self) -> Rect {
        self.live().map_or_else(Rect::default, |w| w.client_rect())
    }

    fn dpi_scale(&self) -> f64 {
        self.live().map_or(1.0, |w| w.dpi_scale())
    }
}

#[cfg(not(target_os = "windows"))]
impl WindowGeometry for WatchedWindow {
    fn handle(&self) -> Option<WindowHandle> {
        *self.rx.borrow()
    }

    fn client_rect(&self) -> Rect {
        Rect::default()
    }

    fn dpi_scale(&self) -> f64 {
        1.0
    }
}
