use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use relicsight_core::{DecodedBitmap, Rgb, SharedSettings, Theme, WindowGeometry};
use tracing::debug;

use crate::palette;
use crate::region::ScanRegion;
use crate::rules;

// Distinct colours in a typical capture stay well under this.
const CACHE_CAPACITY: usize = 1 << 14;

/// Nearest known theme for one colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeMatch {
    pub theme: Theme,
    pub distance: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    /// `detected`, or the settings override when one is set.
    pub theme: Theme,
    pub detected: Theme,
    /// Weight mass of the winning theme.
    pub confidence: f64,
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.theme == self.detected {
            write!(f, "{} ({:.1})", self.theme, self.confidence)
        } else {
            write!(f, "{} (detected {} {:.1})", self.theme, self.detected, self.confidence)
        }
    }
}

/// Vote weight of a pixel at Manhattan distance `distance` from its
/// nearest primary.
pub fn weight(distance: u32) -> f64 {
    1.0 / (distance as f64 + 1.0).powi(4)
}

/// Accumulated weight per known theme, indexed by theme id.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WeightVector([f64; 15]);

impl WeightVector {
    pub fn add(&mut self, m: ThemeMatch) {
        if let Some(i) = m.theme.index() {
            self.0[i] += weight(m.distance);
        }
    }

    pub fn get(&self, theme: Theme) -> f64 {
        theme.index().map_or(0.0, |i| self.0[i])
    }

    /// Strict argmax; equal weights keep the lower id. `None` when nothing
    /// was added.
    pub fn argmax(&self) -> Option<(Theme, f64)> {
        let mut best = 0;
        for i in 1..self.0.len() {
            if self.0[i] > self.0[best] {
                best = i;
            }
        }
        (self.0[best] > 0.0).then(|| (Theme::KNOWN[best], self.0[best]))
    }
}

pub struct ThemeDetector {
    settings: SharedSettings,
    window: Option<Arc<dyn WindowGeometry>>,
    cache: RwLock<HashMap<u32, ThemeMatch>>,
}

impl ThemeDetector {
    pub fn new(settings: SharedSettings) -> Self {
        Self { settings, window: None, cache: RwLock::new(HashMap::with_capacity(CACHE_CAPACITY)) }
    }

    pub fn with_window(mut self, window: Arc<dyn WindowGeometry>) -> Self {
        self.window = Some(window);
        self
    }

    pub fn has_window(&self) -> bool {
        self.window.is_some()
    }

    pub fn settings(&self) -> &SharedSettings {
        &self.settings
    }

    /// Memoised [`palette::nearest`]. Safe to call from many threads; two
    /// threads missing on the same colour compute the same value.
    pub fn closest_theme(&self, color: Rgb) -> ThemeMatch {
        let key = color.packed();
        if let Some(m) = self.cache.read().get(&key) {
            return *m;
        }
        let (theme, distance) = palette::nearest(color);
        *self.cache.write().entry(key).or_insert(ThemeMatch { theme, distance })
    }

    pub fn cached_colors(&self) -> usize {
        self.cache.read().len()
    }

    /// Weight vector over the scan region.
    pub fn weights(&self, bitmap: &DecodedBitmap, scale: f64) -> WeightVector {
        let reference_width = self.settings.read().reference_width;
        let region = ScanRegion::new(bitmap.width(), bitmap.height(), reference_width, scale);

        let mut weights = WeightVector::default();
        let mut last: Option<(Rgb, ThemeMatch)> = None;
        for span in region.spans() {
            for x in span.x..span.x + span.width {
                let c = bitmap.pixel(x, span.y);
                let m = match last {
                    Some((prev, m)) if prev == c => m,
                    _ => {
                        let m = self.closest_theme(c);
                        last = Some((c, m));
                        m
                    }
                };
                weights.add(m);
            }
        }
        weights
    }

    pub fn classify(&self, bitmap: &DecodedBitmap, scale: f64) -> Classification {
        let weights = self.weights(bitmap, scale);
        let (detected, confidence) = weights.argmax().unwrap_or((Theme::Unknown, 0.0));

        let theme = match self.settings.read().theme_override {
            Theme::Auto => detected,
            forced => forced,
        };
        debug!(
            "Classified {}x{} at scale {scale:.3}: {theme} (detected {detected}, confidence {confidence:.2})",
            bitmap.width(),
            bitmap.height(),
        );
        Classification { theme, detected, confidence }
    }

    /// [`classify`](Self::classify) at the window's current screen scaling.
    pub fn classify_live(&self, bitmap: &DecodedBitmap) -> Classification {
        let scale = self.window.as_ref().map_or(1.0, |w| w.screen_scaling());
        self.classify(bitmap, scale)
    }

    /// Whether `color` belongs to `theme`'s text or highlight colours.
    /// `CUSTOM`, `UNKNOWN` and `AUTO` use the user's custom filter.
    pub fn is_member(&self, color: Rgb, theme: Theme) -> bool {
        match rules::matches_known(color, theme) {
            Some(member) => member,
            None => self.settings.read().custom_filter.matches(color),
        }
    }
}
