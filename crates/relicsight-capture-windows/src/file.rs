//! Load-from-file source, used for offline screenshots and testing.

use std::path::PathBuf;

use relicsight_core::{CaptureError, DecodedBitmap, ScreenshotSource};

pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ScreenshotSource for FileSource {
    fn name(&self) -> &'static str {
        "file"
    }

    fn capture_screenshot(&mut self) -> Result<DecodedBitmap, CaptureError> {
        let img = image::open(&self.path)?.to_rgb8();
        tracing::debug!("Loaded {} ({}x{})", self.path.display(), img.width(), img.height());
        Ok(img.into())
    }
}
