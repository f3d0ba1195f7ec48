//! Sampling zone under the profile bar.
//!
//! Starts half a text line below the top of the bitmap and widens linearly
//! from a quarter of the reference width to half of it at the bottom row,
//! centred horizontally.

/// Height of one profile-bar text line at scale 1.0.
pub const LINE_HEIGHT: f64 = 48.0;

/// One sampled row: pixels `x..x + width` of row `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub y: u32,
    pub x: u32,
    pub width: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanRegion {
    width: u32,
    height: u32,
    top: u32,
    min_width: u32,
}

impl ScanRegion {
    /// Non-finite or non-positive scales are treated as 1.0.
    pub fn new(width: u32, height: u32, reference_width: u32, scale: f64) -> Self {
        let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
        let top = ((LINE_HEIGHT / 2.0) * scale) as u32;
        let most_width = (reference_width as f64 * scale) as u32;
        Self { width, height, top: top.min(height), min_width: most_width / 4 }
    }

    pub fn top(&self) -> u32 {
        self.top
    }

    pub fn span(&self, y: u32) -> Option<Span> {
        if y < self.top || y >= self.height {
            return None;
        }
        let perc = (y - self.top) as f64 / (self.height - self.top) as f64;
        let min = self.min_width as f64;
        let row_width = ((min * perc + min) as u32).min(self.width);
        Some(Span { y, x: (self.width - row_width) / 2, width: row_width })
    }

    pub fn spans(&self) -> impl Iterator<Item = Span> + '_ {
        (self.top..self.height).filter_map(|y| self.span(y))
    }

    pub fn pixel_count(&self) -> u64 {
        self.spans().map(|s| s.width as u64).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_hd_geometry() {
        let region = ScanRegion::new(1920, 1080, 968, 1.0);
        assert_eq!(region.top(), 24);
        assert_eq!(region.span(23), None);
        assert_eq!(region.span(24), Some(Span { y: 24, x: 839, width: 242 }));
        let last = region.span(1079).unwrap();
        assert!(last.width < 484 && last.width > 480);
        assert_eq!(region.span(1080), None);
    }

    #[test]
    fn width_grows_monotonically_and_stays_centred() {
        let region = ScanRegion::new(1920, 1080, 968, 1.0);
        let mut prev = 0;
        for span in region.spans() {
            assert!(span.width >= prev);
            assert!(span.x + span.width <= 1920);
            assert!((span.x as i64 * 2 + span.width as i64 - 1920).abs() <= 1);
            prev = span.width;
        }
    }

    #[test]
    fn scale_moves_top_and_widens() {
        let region = ScanRegion::new(3840, 2160, 968, 2.0);
        assert_eq!(region.top(), 48);
        assert_eq!(region.span(48).unwrap().width, 484);
    }

    #[test]
    fn narrow_bitmaps_are_clamped() {
        let region = ScanRegion::new(100, 200, 968, 1.0);
        for span in region.spans() {
            assert_eq!(span, Span { y: span.y, x: 0, width: 100 });
        }
        assert_eq!(region.pixel_count(), 100 * (200 - 24));
    }

    #[test]
    fn tiny_bitmaps_have_empty_regions() {
        assert_eq!(ScanRegion::new(10, 10, 968, 1.0).pixel_count(), 0);
        assert_eq!(ScanRegion::new(0, 0, 968, 1.0).pixel_count(), 0);
    }

    #[test]
    fn invalid_scale_falls_back_to_one() {
        assert_eq!(ScanRegion::new(1920, 1080, 968, f64::NAN), ScanRegion::new(1920, 1080, 968, 1.0));
        assert_eq!(ScanRegion::new(1920, 1080, 968, -2.0).top(), 24);
    }
}
