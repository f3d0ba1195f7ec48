use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::errors::SettingsError;
use crate::types::{HdrPreference, Theme};

/// Settings shared between the app and the classifier. Written rarely.
pub type SharedSettings = Arc<RwLock<Settings>>;

// MARK: - Bands

/// Inclusive hue/saturation/brightness bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HslBand {
    pub hue_min: f32,
    pub hue_max: f32,
    pub sat_min: f32,
    pub sat_max: f32,
    pub brightness_min: f32,
    pub brightness_max: f32,
}

impl Default for HslBand {
    fn default() -> Self {
        Self {
            hue_min: 0.0,
            hue_max: 360.0,
            sat_min: 0.0,
            sat_max: 1.0,
            brightness_min: 0.0,
            brightness_max: 1.0,
        }
    }
}

impl HslBand {
    pub fn contains(&self, c: Rgb) -> bool {
        let (h, s, b) = (c.hue(), c.saturation(), c.brightness());
        (self.hue_min..=self.hue_max).contains(&h)
            && (self.sat_min..=self.sat_max).contains(&s)
            && (self.brightness_min..=self.brightness_max).contains(&b)
    }
}

/// Inclusive per-channel RGB bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RgbBand {
    pub r_min: u8,
    pub r_max: u8,
    pub g_min: u8,
    pub g_max: u8,
    pub b_min: u8,
    pub b_max: u8,
}

impl Default for RgbBand {
    fn default() -> Self {
        Self { r_min: 0, r_max: 255, g_min: 0, g_max: 255, b_min: 0, b_max: 255 }
    }
}

impl RgbBand {
    pub fn contains(&self, c: Rgb) -> bool {
        (self.r_min..=self.r_max).contains(&c.r)
            && (self.g_min..=self.g_max).contains(&c.g)
            && (self.b_min..=self.b_max).contains(&c.b)
    }
}

// MARK: - CustomFilter

/// User-tuned filter used for the `CUSTOM` theme. Enabled bands are OR-ed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomFilter {
    #[serde(alias = "CF_usePrimaryHSL")]
    pub use_primary_hsl: bool,
    #[serde(alias = "CF_usePrimaryRGB")]
    pub use_primary_rgb: bool,
    #[serde(alias = "CF_useSecondaryHSL")]
    pub use_secondary_hsl: bool,
    #[serde(alias = "CF_useSecondaryRGB")]
    pub use_secondary_rgb: bool,
    pub primary_hsl: HslBand,
    pub primary_rgb: RgbBand,
    pub secondary_hsl: HslBand,
    pub secondary_rgb: RgbBand,
}

impl CustomFilter {
    pub fn matches(&self, c: Rgb) -> bool {
        (self.use_primary_hsl && self.primary_hsl.contains(c))
            || (self.use_primary_rgb && self.primary_rgb.contains(c))
            || (self.use_secondary_hsl && self.secondary_hsl.contains(c))
            || (self.use_secondary_rgb && self.secondary_rgb.contains(c))
    }

    pub fn any_enabled(&self) -> bool {
        self.use_primary_hsl || self.use_primary_rgb || self.use_secondary_hsl || self.use_secondary_rgb
    }
}

// MARK: - Settings

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(alias = "HdrSupport")]
    pub dynamic_range: HdrPreference,
    /// `AUTO` means the detected theme is used.
    #[serde(alias = "ThemeSelection")]
    pub theme_override: Theme,
    pub custom_filter: CustomFilter,
    /// Width of the profile bar at a scale of 1.0, in pixels.
    pub reference_width: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dynamic_range: HdrPreference::Auto,
            theme_override: Theme::Auto,
            custom_filter: CustomFilter::default(),
            reference_width: 968,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        tracing::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.reference_width == 0 {
            return Err(SettingsError::Invalid { reason: "reference_width must be > 0".into() });
        }
        if self.theme_override == Theme::Unknown {
            return Err(SettingsError::Invalid {
                reason: "theme_override cannot be UNKNOWN".into(),
            });
        }
        Ok(())
    }

    pub fn into_shared(self) -> SharedSettings {
        Arc::new(RwLock::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_snake_case_fields() {
        let json = r#"{
            "dynamic_range": "on",
            "theme_override": "GRINEER",
            "custom_filter": {
                "use_primary_rgb": true,
                "primary_rgb": {"r_min": 200, "r_max": 255, "g_min": 150, "g_max": 200, "b_min": 0, "b_max": 50}
            }
        }"#;

        let cfg = Settings::from_json(json).expect("valid snake_case settings");
        assert_eq!(cfg.dynamic_range, HdrPreference::On);
        assert_eq!(cfg.theme_override, Theme::Grineer);
        assert!(cfg.custom_filter.use_primary_rgb);
        assert_eq!(cfg.custom_filter.primary_rgb.g_max, 200);
        assert_eq!(cfg.reference_width, 968);
    }

    #[test]
    fn deserializes_legacy_keys() {
        let json = r#"{
            "HdrSupport": "off",
            "ThemeSelection": "AUTO",
            "custom_filter": {"CF_usePrimaryHSL": true, "CF_useSecondaryRGB": true}
        }"#;

        let cfg = Settings::from_json(json).expect("valid legacy settings");
        assert_eq!(cfg.dynamic_range, HdrPreference::Off);
        assert!(cfg.custom_filter.use_primary_hsl);
        assert!(cfg.custom_filter.use_secondary_rgb);
        assert!(!cfg.custom_filter.use_primary_rgb);
    }

    #[test]
    fn rejects_invalid_settings() {
        assert!(Settings::from_json(r#"{"reference_width": 0}"#).is_err());
        assert!(Settings::from_json(r#"{"theme_override": "UNKNOWN"}"#).is_err());
        assert!(Settings::from_json("not json").is_err());
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"reference_width": 1000}"#).unwrap();
        let cfg = Settings::load(&path).unwrap();
        assert_eq!(cfg.reference_width, 1000);
        assert!(Settings::load(dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn custom_filter_ors_enabled_bands() {
        let mut filter = CustomFilter {
            use_primary_rgb: true,
            primary_rgb: RgbBand { r_min: 200, r_max: 255, g_min: 150, g_max: 200, b_min: 0, b_max: 50 },
            ..Default::default()
        };
        let c = Rgb::new(220, 170, 10);
        assert!(filter.matches(c));

        filter.use_primary_rgb = false;
        assert!(!filter.any_enabled());
        assert!(!filter.matches(c));
    }
}
