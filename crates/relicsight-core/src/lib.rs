pub mod bitmap;
pub mod color;
pub mod config;
pub mod errors;
pub mod source;
pub mod types;
pub mod window;

pub use bitmap::DecodedBitmap;
pub use color::Rgb;
pub use config::{CustomFilter, HslBand, RgbBand, Settings, SharedSettings};
pub use errors::{CaptureError, SettingsError};
pub use source::ScreenshotSource;
pub use types::*;
pub use window::{screen_scaling, FixedWindow, Rect, WindowGeometry, WindowHandle};
