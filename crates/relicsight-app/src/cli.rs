use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use relicsight_core::{HdrPreference, Settings, Theme};

use crate::pipeline::LoopConfig;

#[derive(Debug, Parser)]
#[command(name = "relicsight", version, about = "Report the UI theme of a running game window")]
pub struct Cli {
    /// Settings JSON file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Classify a screenshot file instead of the live window.
    #[arg(long, conflicts_with = "desktop")]
    pub image: Option<PathBuf>,

    /// Copy the window area from the desktop instead of using WGC.
    #[arg(long)]
    pub desktop: bool,

    /// Title of the game window.
    #[arg(long, default_value = "Warframe")]
    pub window_title: String,

    #[arg(long, default_value_t = 1000)]
    pub interval_ms: u64,

    /// How often to look for the game window.
    #[arg(long, default_value_t = 2000)]
    pub window_poll_ms: u64,

    /// Stop after the first classified frame.
    #[arg(long)]
    pub once: bool,

    /// Force a theme instead of the detected one (overrides the settings file).
    #[arg(long)]
    pub theme: Option<Theme>,

    #[arg(long, value_enum)]
    pub hdr: Option<HdrArg>,

    /// UI scale; defaults to the window's (or the bitmap's) screen scaling.
    #[arg(long)]
    pub scale: Option<f64>,

    /// Print one JSON object per classified frame on stdout.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HdrArg {
    Auto,
    On,
    Off,
}

impl From<HdrArg> for HdrPreference {
    fn from(arg: HdrArg) -> Self {
        match arg {
            HdrArg::Auto => Self::Auto,
            HdrArg::On => Self::On,
            HdrArg::Off => Self::Off,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    File(PathBuf),
    Desktop,
    Window,
}

impl Cli {
    pub fn source_kind(&self) -> SourceKind {
        match (&self.image, self.desktop) {
            (Some(path), _) => SourceKind::File(path.clone()),
            (None, true) => SourceKind::Desktop,
            (None, false) => SourceKind::Window,
        }
    }

    /// Settings file (or defaults) with command-line overrides applied.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::load(path)
                .with_context(|| format!("loading settings from {}", path.display()))?,
            None => Settings::default(),
        };
        if let Some(theme) = self.theme {
            settings.theme_override = theme;
        }
        if let Some(hdr) = self.hdr {
            settings.dynamic_range = hdr.into();
        }
        settings.validate()?;
        Ok(settings)
    }

    pub fn window_poll(&self) -> Duration {
        Duration::from_millis(self.window_poll_ms.max(1))
    }

    pub fn loop_config(&self) -> LoopConfig {
        LoopConfig {
            interval: Duration::from_millis(self.interval_ms.max(1)),
            // a file never changes between ticks
            once: self.once || self.image.is_some(),
            scale: self.scale,
            json: self.json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("relicsight").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults_to_live_window() {
        let cli = parse(&[]);
        assert_eq!(cli.source_kind(), SourceKind::Window);
        assert_eq!(cli.window_title, "Warframe");
        let cfg = cli.loop_config();
        assert_eq!(cfg.interval, Duration::from_secs(1));
        assert!(!cfg.once);
        assert_eq!(cli.settings().unwrap(), Settings::default());
    }

    #[test]
    fn image_implies_once() {
        let cli = parse(&["--image", "shot.png"]);
        assert_eq!(cli.source_kind(), SourceKind::File("shot.png".into()));
        assert!(cli.loop_config().once);
    }

    #[test]
    fn image_and_desktop_conflict() {
        assert!(Cli::try_parse_from(["relicsight", "--image", "a.png", "--desktop"]).is_err());
    }

    #[test]
    fn flags_override_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"theme_override": "LOTUS", "HdrSupport": "on", "reference_width": 900}"#)
            .unwrap();

        let from_file = parse(&["-c", path.to_str().unwrap()]).settings().unwrap();
        assert_eq!(from_file.theme_override, Theme::Lotus);
        assert_eq!(from_file.dynamic_range, HdrPreference::On);

        let cli = parse(&["-c", path.to_str().unwrap(), "--theme", "high-contrast", "--hdr", "off"]);
        let settings = cli.settings().unwrap();
        assert_eq!(settings.theme_override, Theme::HighContrast);
        assert_eq!(settings.dynamic_range, HdrPreference::Off);
        assert_eq!(settings.reference_width, 900);
    }

    #[test]
    fn rejects_bad_theme_and_unknown_override() {
        assert!(Cli::try_parse_from(["relicsight", "--theme", "purple"]).is_err());
        assert!(parse(&["--theme", "unknown"]).settings().is_err());
    }

    #[test]
    fn missing_settings_file_is_an_error() {
        assert!(parse(&["--config", "/definitely/not/here.json"]).settings().is_err());
    }
}
