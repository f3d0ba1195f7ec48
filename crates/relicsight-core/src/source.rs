use crate::bitmap::DecodedBitmap;
use crate::errors::CaptureError;

/// Anything that can produce one screenshot on demand.
///
/// Live window capture, desktop copy and file loading all implement this so
/// callers can swap them freely.
pub trait ScreenshotSource: Send {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Returns a fresh bitmap owned by the caller.
    fn capture_screenshot(&mut self) -> Result<DecodedBitmap, CaptureError>;
}

impl<S: ScreenshotSource + ?Sized> ScreenshotSource for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn capture_screenshot(&mut self) -> Result<DecodedBitmap, CaptureError> {
        (**self).capture_screenshot()
    }
}
