use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use relicsight_core::{screen_scaling, DecodedBitmap, Rect, Rgb, Settings, Theme};
use relicsight_theme::{palette, ScanRegion, ThemeDetector};

const TENNO: Rgb = Rgb::new(9, 78, 106);

fn detector() -> ThemeDetector {
    ThemeDetector::new(Settings::default().into_shared())
}

/// Uniform frame with ±2 per-channel jitter, as after lossy compression.
fn noisy(width: u32, height: u32, base: Rgb) -> DecodedBitmap {
    let mut bmp = DecodedBitmap::filled(width, height, base);
    let mut rng = StdRng::seed_from_u64(0x2545_f491);
    let mut jitter = |c: u8| (c as i32 + rng.gen_range(-2..=2)).clamp(0, 255) as u8;
    for y in 0..height {
        for x in 0..width {
            let Rgb { r, g, b } = bmp.pixel(x, y);
            bmp.set_pixel(x, y, Rgb::new(jitter(r), jitter(g), jitter(b)));
        }
    }
    bmp
}

#[test]
fn uniform_tenno_frame_scores_every_pixel() {
    let bmp = DecodedBitmap::filled(1920, 1080, TENNO);
    let det = detector();
    let result = det.classify(&bmp, 1.0);

    let pixels = ScanRegion::new(1920, 1080, 968, 1.0).pixel_count();
    assert!(pixels > 0);
    assert_eq!(result.theme, Theme::Tenno);
    assert_eq!(result.detected, Theme::Tenno);
    assert_eq!(result.confidence, pixels as f64);
    assert_eq!(det.cached_colors(), 1);
}

#[test]
fn white_frame_trends_to_legacy() {
    let det = detector();
    let tenno = det.weights(&DecodedBitmap::filled(1920, 1080, TENNO), 1.0);
    let white = det.weights(&DecodedBitmap::filled(1920, 1080, Rgb::WHITE), 1.0);

    assert_eq!(white.argmax().map(|(t, _)| t), Some(Theme::Legacy));
    assert!(tenno.get(Theme::Tenno) > white.get(Theme::Tenno));
    assert_eq!(white.get(Theme::Tenno), 0.0);
}

#[test]
fn compression_noise_lowers_confidence_but_not_the_verdict() {
    let det = detector();
    let clean = det.classify(&DecodedBitmap::filled(1920, 1080, TENNO), 1.0);
    let noisy = det.classify(&noisy(1920, 1080, TENNO), 1.0);

    assert_eq!(noisy.theme, Theme::Tenno);
    assert!(noisy.confidence > 0.0);
    assert!(noisy.confidence < clean.confidence);
    assert!(det.cached_colors() > 1);
}

#[test]
fn scaled_window_samples_a_larger_region() {
    let scale = screen_scaling(Rect::new(0, 0, 2560, 1440));
    assert!((scale - 2560.0 / 1920.0).abs() < 1e-12);

    let grineer = palette::primary(Theme::Grineer).unwrap();
    let bmp = DecodedBitmap::filled(2560, 1440, grineer);
    let result = detector().classify(&bmp, scale);

    assert_eq!(result.theme, Theme::Grineer);
    assert_eq!(result.confidence, ScanRegion::new(2560, 1440, 968, scale).pixel_count() as f64);
    assert!(result.confidence > ScanRegion::new(1920, 1080, 968, 1.0).pixel_count() as f64);
}

#[test]
fn override_applies_after_the_scan() {
    let settings = Settings { theme_override: Theme::Grineer, ..Default::default() }.into_shared();
    let det = ThemeDetector::new(settings.clone());
    let bmp = DecodedBitmap::filled(1920, 1080, TENNO);

    let forced = det.classify(&bmp, 1.0);
    assert_eq!((forced.theme, forced.detected), (Theme::Grineer, Theme::Tenno));

    settings.write().theme_override = Theme::Auto;
    assert_eq!(det.classify(&bmp, 1.0).theme, Theme::Tenno);
}

#[test]
fn every_reference_primary_classifies_as_itself() {
    let det = detector();
    for theme in Theme::KNOWN {
        let bmp = DecodedBitmap::filled(640, 360, palette::primary(theme).unwrap());
        assert_eq!(det.classify(&bmp, 1.0).theme, theme, "{theme}");
    }
}
