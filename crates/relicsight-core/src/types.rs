use serde::{Deserialize, Serialize};

// MARK: - DynamicRange

/// Pixel format of a capture session. Fixed for the session's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DynamicRange {
    /// B8G8R8A8, normalized 8-bit.
    Standard,
    /// R16G16B16A16, linear half-float.
    Extended,
}

impl DynamicRange {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Standard => 4,
            Self::Extended => 8,
        }
    }
}

impl std::fmt::Display for DynamicRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Standard => write!(f, "SDR"),
            Self::Extended => write!(f, "HDR"),
        }
    }
}

// MARK: - HdrPreference

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HdrPreference {
    #[default]
    Auto,
    On,
    Off,
}

impl HdrPreference {
    /// `display_hdr` is only consulted for `Auto`.
    pub fn resolve(self, display_hdr: bool) -> DynamicRange {
        match self {
            Self::On => DynamicRange::Extended,
            Self::Off => DynamicRange::Standard,
            Self::Auto if display_hdr => DynamicRange::Extended,
            Self::Auto => DynamicRange::Standard,
        }
    }
}

// MARK: - Theme

/// In-game UI skin. Declaration order of the known themes is the theme id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Theme {
    Vitruvian,
    Stalker,
    Baruuk,
    Corpus,
    Fortuna,
    Grineer,
    Lotus,
    Nidus,
    Orokin,
    Tenno,
    HighContrast,
    Legacy,
    Equinox,
    DarkLotus,
    Zephyr,
    Custom,
    Unknown,
    Auto,
}

impl Theme {
    /// Every theme with compiled-in reference colours, in id order.
    pub const KNOWN: [Theme; 15] = [
        Self::Vitruvian,
        Self::Stalker,
        Self::Baruuk,
        Self::Corpus,
        Self::Fortuna,
        Self::Grineer,
        Self::Lotus,
        Self::Nidus,
        Self::Orokin,
        Self::Tenno,
        Self::HighContrast,
        Self::Legacy,
        Self::Equinox,
        Self::DarkLotus,
        Self::Zephyr,
    ];

    /// Index into [`Theme::KNOWN`], `None` for sentinels.
    pub fn index(self) -> Option<usize> {
        Self::KNOWN.iter().position(|&t| t == self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vitruvian => "VITRUVIAN",
            Self::Stalker => "STALKER",
            Self::Baruuk => "BARUUK",
            Self::Corpus => "CORPUS",
            Self::Fortuna => "FORTUNA",
            Self::Grineer => "GRINEER",
            Self::Lotus => "LOTUS",
            Self::Nidus => "NIDUS",
            Self::Orokin => "OROKIN",
            Self::Tenno => "TENNO",
            Self::HighContrast => "HIGH_CONTRAST",
            Self::Legacy => "LEGACY",
            Self::Equinox => "EQUINOX",
            Self::DarkLotus => "DARK_LOTUS",
            Self::Zephyr => "ZEPHYR",
            Self::Custom => "CUSTOM",
            Self::Unknown => "UNKNOWN",
            Self::Auto => "AUTO",
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace(['-', ' '], "_").to_ascii_uppercase();
        Self::KNOWN
            .iter()
            .chain(&[Self::Custom, Self::Unknown, Self::Auto])
            .copied()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| format!("unknown theme '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_ids_follow_declaration_order() {
        assert_eq!(Theme::Vitruvian.index(), Some(0));
        assert_eq!(Theme::Tenno.index(), Some(9));
        assert_eq!(Theme::Zephyr.index(), Some(14));
        assert_eq!(Theme::Auto.index(), None);
        assert_eq!(Theme::Custom.index(), None);
    }

    #[test]
    fn theme_round_trips_through_strings() {
        assert_eq!("dark-lotus".parse::<Theme>(), Ok(Theme::DarkLotus));
        assert_eq!("HIGH_CONTRAST".parse::<Theme>(), Ok(Theme::HighContrast));
        assert!("ostron".parse::<Theme>().is_err());

        let json = serde_json::to_string(&Theme::DarkLotus).unwrap();
        assert_eq!(json, "\"DARK_LOTUS\"");
    }

    #[test]
    fn hdr_preference_resolution() {
        assert_eq!(HdrPreference::On.resolve(false), DynamicRange::Extended);
        assert_eq!(HdrPreference::Off.resolve(true), DynamicRange::Standard);
        assert_eq!(HdrPreference::Auto.resolve(true), DynamicRange::Extended);
        assert_eq!(HdrPreference::Auto.resolve(false), DynamicRange::Standard);
    }
}
