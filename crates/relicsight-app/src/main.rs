//! RelicSight: reports which UI theme a running game window shows.
//!
//! # Architecture
//!
//! ```text
//! WindowWatcher (title poll) ──watch──► capture loop ◄── interval tick
//!                                          │
//!                                          ▼  spawn_blocking
//!                              Source: WGC window | desktop copy | file
//!                                          │  DecodedBitmap
//!                                          ▼
//!                              ThemeDetector::classify → log / JSON line
//! ```

mod cli;
mod pipeline;
mod watcher;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use relicsight_capture_windows::{DesktopSource, FileSource};
use relicsight_core::WindowGeometry;
use relicsight_theme::ThemeDetector;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cli::{Cli, SourceKind};
use pipeline::{Source, WindowSource};
use watcher::{WatchedWindow, WindowWatcher, DISCOVERY_SUPPORTED};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("RelicSight v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let settings = cli.settings()?;
    let preference = settings.dynamic_range;
    info!(
        "Theme override: {}, dynamic range: {:?}, reference width: {}",
        settings.theme_override, preference, settings.reference_width
    );
    let detector = ThemeDetector::new(settings.into_shared());

    let (source, detector, windows) = match cli.source_kind() {
        SourceKind::File(path) => {
            info!("Classifying {}", path.display());
            (Source::File(FileSource::new(path)), detector, None)
        }
        SourceKind::Desktop if !DISCOVERY_SUPPORTED => {
            warn!("Window lookup unavailable on this platform, copying the primary monitor");
            (Source::Desktop(DesktopSource::primary()), detector, None)
        }
        SourceKind::Desktop => {
            let windows = WindowWatcher::by_title(&cli.window_title, cli.window_poll()).spawn();
            let window: Arc<dyn WindowGeometry> = Arc::new(WatchedWindow::new(windows.clone()));
            let source = Source::Desktop(DesktopSource::for_window(Arc::clone(&window)));
            (source, detector.with_window(window), Some(windows))
        }
        SourceKind::Window => {
            let windows = WindowWatcher::by_title(&cli.window_title, cli.window_poll()).spawn();
            let initial = *windows.borrow();
            let window: Arc<dyn WindowGeometry> = Arc::new(WatchedWindow::new(windows.clone()));
            let source = Source::Window(WindowSource::new(preference, initial));
            (source, detector.with_window(window), Some(windows))
        }
    };

    let stats = pipeline::run(source, Arc::new(detector), cli.loop_config(), windows).await?;
    info!("Classified {} frames, {} failed captures", stats.classified, stats.failures);
    if let Some(last) = stats.last {
        info!("Last result: {last}");
    }

    Ok(())
}
