//! Per-theme membership rules as data.
//!
//! Each known theme maps to a small tree of hue / saturation / brightness
//! tests over HSL. Hue distances are plain `|a - b|` on `[0, 360)` with no
//! wraparound; the thresholds below were tuned against that.

use relicsight_core::{Rgb, Theme};

use crate::palette;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    AtLeast(f32),
    Above(f32),
    AtMost(f32),
}

impl Bound {
    fn holds(self, v: f32) -> bool {
        match self {
            Self::AtLeast(t) => v >= t,
            Self::Above(t) => v > t,
            Self::AtMost(t) => v <= t,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rule {
    /// `|hue − (anchor hue + offset)| < tolerance`
    Hue(Anchor, f32, f32),
    Saturation(Bound),
    Brightness(Bound),
    All(&'static [Rule]),
    Any(&'static [Rule]),
}

/// HSL of the colour under test.
#[derive(Debug, Clone, Copy)]
pub struct Sample {
    pub hue: f32,
    pub saturation: f32,
    pub brightness: f32,
}

impl From<Rgb> for Sample {
    fn from(c: Rgb) -> Self {
        Self { hue: c.hue(), saturation: c.saturation(), brightness: c.brightness() }
    }
}

/// Reference hues a rule is evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct Anchors {
    pub primary: f32,
    pub secondary: f32,
}

impl Anchors {
    pub fn of(theme: Theme) -> Option<Self> {
        Some(Self {
            primary: palette::primary(theme)?.hue(),
            secondary: palette::secondary(theme)?.hue(),
        })
    }

    fn hue(&self, anchor: Anchor) -> f32 {
        match anchor {
            Anchor::Primary => self.primary,
            Anchor::Secondary => self.secondary,
        }
    }
}

impl Rule {
    pub fn eval(&self, s: &Sample, a: &Anchors) -> bool {
        match *self {
            Self::Hue(anchor, offset, tolerance) => (s.hue - (a.hue(anchor) + offset)).abs() < tolerance,
            Self::Saturation(b) => b.holds(s.saturation),
            Self::Brightness(b) => b.holds(s.brightness),
            Self::All(rules) => rules.iter().all(|r| r.eval(s, a)),
            Self::Any(rules) => rules.iter().any(|r| r.eval(s, a)),
        }
    }
}

mod table {
    use super::Anchor::{Primary as P, Secondary as S};
    use super::Bound::{Above, AtLeast, AtMost};
    use super::Rule::{self, All, Any, Brightness as B, Hue, Saturation as Sat};
    use relicsight_core::Theme;

    /// Themes without an entry use [`FALLBACK`].
    pub(super) static RULES: &[(Theme, Rule)] = &[
        (Theme::Equinox, All(&[Sat(AtMost(0.2)), B(AtLeast(0.55))])),
        (
            Theme::Orokin,
            Any(&[
                All(&[Hue(P, 0.0, 5.0), B(AtMost(0.42)), B(AtLeast(0.1)), Sat(AtLeast(0.1))]),
                All(&[Hue(S, 0.0, 15.0), B(AtMost(0.5)), B(AtLeast(0.25)), Sat(AtLeast(0.25))]),
            ]),
        ),
        (
            Theme::Stalker,
            All(&[
                Any(&[
                    All(&[Hue(P, 0.0, 4.0), Sat(AtLeast(0.55))]),
                    All(&[Hue(S, 0.0, 4.0), Sat(AtLeast(0.66))]),
                ]),
                B(AtLeast(0.25)),
            ]),
        ),
        (Theme::Corpus, All(&[Hue(P, 0.0, 3.0), B(AtLeast(0.42)), Sat(AtLeast(0.35))])),
        (Theme::Vitruvian, All(&[Hue(P, 0.0, 2.5), B(AtLeast(0.42)), Sat(AtLeast(0.2))])),
        (Theme::Lotus, All(&[Hue(P, 0.0, 8.0), B(AtLeast(0.35)), Sat(AtLeast(0.2))])),
        (
            Theme::Fortuna,
            All(&[
                Any(&[
                    All(&[Hue(P, 0.0, 3.0), B(AtLeast(0.25))]),
                    All(&[Hue(S, 0.0, 3.0), B(AtLeast(0.3))]),
                ]),
                Sat(AtLeast(0.2)),
            ]),
        ),
        (
            Theme::HighContrast,
            All(&[
                Any(&[Hue(P, 0.0, 3.0), Hue(S, 0.0, 2.0)]),
                Sat(AtLeast(0.75)),
                B(AtLeast(0.35)),
            ]),
        ),
        (
            Theme::Legacy,
            Any(&[
                B(AtLeast(0.65)),
                All(&[Hue(S, 0.0, 6.0), B(AtLeast(0.5)), Sat(AtLeast(0.5))]),
            ]),
        ),
        (
            Theme::Nidus,
            Any(&[
                All(&[Hue(P, 6.0, 8.0), Sat(AtLeast(0.3))]),
                All(&[Hue(S, 0.0, 15.0), Sat(AtLeast(0.55))]),
            ]),
        ),
        (
            Theme::Tenno,
            All(&[
                Any(&[Hue(P, 0.0, 3.0), Hue(S, 0.0, 2.0)]),
                Sat(AtLeast(0.38)),
                B(AtMost(0.55)),
            ]),
        ),
        (Theme::Baruuk, All(&[Hue(P, 0.0, 2.0), Sat(Above(0.25)), B(Above(0.5))])),
        (
            Theme::DarkLotus,
            All(&[
                Hue(S, 0.0, 20.0),
                B(AtLeast(0.35)),
                B(AtMost(0.55)),
                Sat(AtMost(0.25)),
                Sat(AtLeast(0.05)),
            ]),
        ),
        (
            Theme::Zephyr,
            All(&[
                Any(&[
                    All(&[Hue(P, 0.0, 4.0), Sat(AtLeast(0.55))]),
                    All(&[Hue(S, 0.0, 4.0), Sat(AtLeast(0.66))]),
                ]),
                B(AtLeast(0.25)),
            ]),
        ),
    ];

    pub(super) static FALLBACK: Rule = Any(&[Hue(P, 0.0, 2.0), Hue(S, 0.0, 2.0)]);
}

/// The rule for `theme`, or the generic hue-tolerance rule when the table
/// has no entry.
pub fn rule_for(theme: Theme) -> &'static Rule {
    table::RULES
        .iter()
        .find(|(t, _)| *t == theme)
        .map_or(&table::FALLBACK, |(_, rule)| rule)
}

pub fn has_dedicated_rule(theme: Theme) -> bool {
    table::RULES.iter().any(|(t, _)| *t == theme)
}

/// Membership of `color` in a known theme. `None` for sentinels.
pub fn matches_known(color: Rgb, theme: Theme) -> Option<bool> {
    let anchors = Anchors::of(theme)?;
    Some(rule_for(theme).eval(&Sample::from(color), &anchors))
}
