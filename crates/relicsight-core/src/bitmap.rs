use crate::color::Rgb;
use crate::errors::CaptureError;

/// CPU-side 24-bit RGB image, row-major, `3 * width` bytes per row.
#[derive(Clone, PartialEq, Eq)]
pub struct DecodedBitmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl DecodedBitmap {
    pub const BYTES_PER_PIXEL: usize = 3;

    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, CaptureError> {
        let expected = width as usize * height as usize * Self::BYTES_PER_PIXEL;
        if data.len() != expected {
            return Err(CaptureError::BufferSize { expected, actual: data.len() });
        }
        Ok(Self { width, height, data })
    }

    /// A bitmap where every pixel is `color`.
    pub fn filled(width: u32, height: u32, color: Rgb) -> Self {
        let pixels = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixels * Self::BYTES_PER_PIXEL);
        for _ in 0..pixels {
            data.extend_from_slice(&[color.r, color.g, color.b]);
        }
        Self { width, height, data }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * Self::BYTES_PER_PIXEL
    }

    /// # Panics
    /// If `(x, y)` is outside the bitmap.
    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        let i = self.offset(x, y);
        Rgb::new(self.data[i], self.data[i + 1], self.data[i + 2])
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        (x < self.width && y < self.height).then(|| self.pixel(x, y))
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgb) {
        let i = self.offset(x, y);
        self.data[i..i + 3].copy_from_slice(&[color.r, color.g, color.b]);
    }

    pub fn into_rgb_image(self) -> image::RgbImage {
        // Length was checked on construction.
        image::RgbImage::from_raw(self.width, self.height, self.data)
            .unwrap_or_else(|| image::RgbImage::new(0, 0))
    }
}

impl From<image::RgbImage> for DecodedBitmap {
    fn from(img: image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self { width, height, data: img.into_raw() }
    }
}

impl std::fmt::Debug for DecodedBitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedBitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}
