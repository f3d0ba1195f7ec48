//! relicsight-theme: which UI skin is the game showing?
//!
//! [`ThemeDetector::classify`] votes over a trapezoid below the profile bar,
//! weighting each pixel by its distance to the nearest reference primary.
//! [`ThemeDetector::is_member`] is the per-pixel predicate used by region
//! segmentation.

pub mod detector;
pub mod palette;
pub mod region;
pub mod rules;

pub use detector::{weight, Classification, ThemeDetector, ThemeMatch, WeightVector};
pub use region::{ScanRegion, Span};
