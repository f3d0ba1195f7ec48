use serde::{Deserialize, Serialize};

// MARK: - Rgb

/// 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Packs the colour into the low 24 bits of a `u32` (`0xRRGGBB`).
    pub const fn packed(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    pub const fn from_packed(value: u32) -> Self {
        Self::new((value >> 16) as u8, (value >> 8) as u8, value as u8)
    }

    /// `|ΔR| + |ΔG| + |ΔB|`.
    pub fn manhattan(self, other: Self) -> u32 {
        self.r.abs_diff(other.r) as u32
            + self.g.abs_diff(other.g) as u32
            + self.b.abs_diff(other.b) as u32
    }

    fn unit_channels(self) -> (f32, f32, f32) {
        (
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        )
    }

    /// Hue in degrees, `[0, 360)`. Greys report 0.
    pub fn hue(self) -> f32 {
        if self.r == self.g && self.g == self.b {
            return 0.0;
        }
        let (r, g, b) = self.unit_channels();
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        let sector = if r == max {
            (g - b) / delta
        } else if g == max {
            2.0 + (b - r) / delta
        } else {
            4.0 + (r - g) / delta
        };

        let hue = sector * 60.0;
        if hue < 0.0 {
            hue + 360.0
        } else {
            hue
        }
    }

    /// HSL saturation, `[0, 1]`.
    pub fn saturation(self) -> f32 {
        let (r, g, b) = self.unit_channels();
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        if max == min {
            return 0.0;
        }
        let lightness = (max + min) / 2.0;
        if lightness <= 0.5 {
            (max - min) / (max + min)
        } else {
            (max - min) / (2.0 - max - min)
        }
    }

    /// HSL lightness, `[0, 1]`.
    pub fn brightness(self) -> f32 {
        let (r, g, b) = self.unit_channels();
        (r.max(g).max(b) + r.min(g).min(b)) / 2.0
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::Rgb;

    #[test]
    fn packs_into_24_bits() {
        let c = Rgb::new(9, 78, 106);
        assert_eq!(c.packed(), 0x09_4E_6A);
        assert_eq!(Rgb::from_packed(c.packed()), c);
    }

    #[test]
    fn manhattan_is_symmetric() {
        let a = Rgb::new(10, 20, 30);
        let b = Rgb::new(13, 15, 30);
        assert_eq!(a.manhattan(b), 8);
        assert_eq!(b.manhattan(a), 8);
    }

    #[test]
    fn primaries_have_expected_hsl() {
        let red = Rgb::new(255, 0, 0);
        assert_eq!(red.hue(), 0.0);
        assert_eq!(red.saturation(), 1.0);
        assert_eq!(red.brightness(), 0.5);

        let blue = Rgb::new(0, 0, 255);
        assert_eq!(blue.hue(), 240.0);

        let magenta_ish = Rgb::new(255, 0, 1);
        assert!(magenta_ish.hue() > 359.0);
    }

    #[test]
    fn greys_have_no_hue_or_saturation() {
        let g = Rgb::new(128, 128, 128);
        assert_eq!(g.hue(), 0.0);
        assert_eq!(g.saturation(), 0.0);
        assert!((g.brightness() - 128.0 / 255.0).abs() < 1e-6);
    }
}
