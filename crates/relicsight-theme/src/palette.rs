//! Compiled-in reference colours, indexed by theme id.

use relicsight_core::{Rgb, Theme};

/// Profile-bar colour of each known theme.
pub const PRIMARY: [Rgb; 15] = [
    Rgb::new(190, 169, 102), // VITRUVIAN
    Rgb::new(153, 31, 35),   // STALKER
    Rgb::new(238, 193, 105), // BARUUK
    Rgb::new(35, 201, 245),  // CORPUS
    Rgb::new(57, 105, 112),  // FORTUNA
    Rgb::new(255, 189, 102), // GRINEER
    Rgb::new(36, 184, 242),  // LOTUS
    Rgb::new(140, 38, 92),   // NIDUS
    Rgb::new(20, 41, 29),    // OROKIN
    Rgb::new(9, 78, 106),    // TENNO
    Rgb::new(2, 127, 217),   // HIGH_CONTRAST
    Rgb::new(255, 255, 255), // LEGACY
    Rgb::new(158, 159, 167), // EQUINOX
    Rgb::new(140, 119, 147), // DARK_LOTUS
    Rgb::new(253, 132, 2),   // ZEPHYR
];

/// Highlight colour of each known theme.
pub const SECONDARY: [Rgb; 15] = [
    Rgb::new(245, 227, 173), // VITRUVIAN
    Rgb::new(255, 61, 51),   // STALKER
    Rgb::new(236, 211, 162), // BARUUK
    Rgb::new(111, 229, 253), // CORPUS
    Rgb::new(255, 115, 230), // FORTUNA
    Rgb::new(255, 224, 153), // GRINEER
    Rgb::new(255, 241, 191), // LOTUS
    Rgb::new(245, 73, 93),   // NIDUS
    Rgb::new(178, 125, 5),   // OROKIN
    Rgb::new(6, 106, 74),    // TENNO
    Rgb::new(255, 255, 0),   // HIGH_CONTRAST
    Rgb::new(232, 213, 93),  // LEGACY
    Rgb::new(232, 227, 227), // EQUINOX
    Rgb::new(189, 169, 237), // DARK_LOTUS
    Rgb::new(255, 53, 0),    // ZEPHYR
];

pub fn primary(theme: Theme) -> Option<Rgb> {
    theme.index().map(|i| PRIMARY[i])
}

pub fn secondary(theme: Theme) -> Option<Rgb> {
    theme.index().map(|i| SECONDARY[i])
}

/// Nearest known theme by Manhattan distance to its primary. Ties keep the
/// lower theme id.
pub fn nearest(color: Rgb) -> (Theme, u32) {
    let mut best = (Theme::KNOWN[0], color.manhattan(PRIMARY[0]));
    for (&theme, &reference) in Theme::KNOWN.iter().zip(PRIMARY.iter()).skip(1) {
        let d = color.manhattan(reference);
        if d < best.1 {
            best = (theme, d);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_primary_is_its_own_nearest() {
        for theme in Theme::KNOWN {
            let p = primary(theme).unwrap();
            assert_eq!(nearest(p), (theme, 0), "{theme}");
        }
    }

    #[test]
    fn sentinels_have_no_reference_colours() {
        for theme in [Theme::Custom, Theme::Unknown, Theme::Auto] {
            assert_eq!(primary(theme), None);
            assert_eq!(secondary(theme), None);
        }
    }

    #[test]
    fn equidistant_colours_pick_the_lower_id() {
        // 12 from both BARUUK (id 2) and GRINEER (id 5)
        let c = Rgb::new(247, 191, 104);
        assert_eq!(c.manhattan(primary(Theme::Baruuk).unwrap()), 12);
        assert_eq!(c.manhattan(primary(Theme::Grineer).unwrap()), 12);
        assert_eq!(nearest(c), (Theme::Baruuk, 12));
    }
}
