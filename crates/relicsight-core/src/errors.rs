use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Capture session unavailable: {reason}")]
    SessionUnavailable { reason: String },

    #[error("No frame available")]
    FrameUnavailable,

    #[error("Unsupported staging format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Bitmap buffer is {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Capture backend: {0:#}")]
    Backend(#[from] anyhow::Error),
}

impl CaptureError {
    pub fn session_unavailable(reason: impl Into<String>) -> Self {
        Self::SessionUnavailable { reason: reason.into() }
    }

    /// Whether the caller should simply retry on a later tick.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::SessionUnavailable { .. } | Self::FrameUnavailable)
    }
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Configuration invalid: {reason}")]
    Invalid { reason: String },
}
