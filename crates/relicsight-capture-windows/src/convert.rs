//! CPU-side conversion of mapped staging surfaces into [`DecodedBitmap`]s.
//!
//! * SDR: B8G8R8A8 → RGB by channel reorder, alpha dropped.
//! * HDR: linear R16G16B16A16F → RGB via extended Reinhard on luminance,
//!   white point = frame maximum luminance.
//!
//! Both HDR passes are row-parallel on the rayon pool.

use rayon::prelude::*;
use relicsight_core::{CaptureError, DecodedBitmap, DynamicRange};

use crate::half::read_channel;

const RGBA16F_BPP: usize = 8;
const BGRA8_BPP: usize = 4;

/// Converts a mapped surface of the given mode.
pub fn to_bitmap(
    mode: DynamicRange,
    src: &[u8],
    width: u32,
    height: u32,
    row_pitch: usize,
) -> Result<DecodedBitmap, CaptureError> {
    match mode {
        DynamicRange::Standard => bgra_to_rgb(src, width, height, row_pitch),
        DynamicRange::Extended => tone_map_rgba16f(src, width, height, row_pitch),
    }
}

fn check_layout(
    src: &[u8],
    width: u32,
    height: u32,
    row_pitch: usize,
    bpp: usize,
) -> Result<(), CaptureError> {
    let row_bytes = width as usize * bpp;
    if row_pitch < row_bytes {
        return Err(CaptureError::UnsupportedFormat {
            format: format!("row pitch {row_pitch} < {row_bytes} bytes for width {width}"),
        });
    }
    let expected = match height {
        0 => 0,
        h => row_pitch * (h as usize - 1) + row_bytes,
    };
    if src.len() < expected {
        return Err(CaptureError::BufferSize { expected, actual: src.len() });
    }
    Ok(())
}

// MARK: - SDR

pub fn bgra_to_rgb(
    src: &[u8],
    width: u32,
    height: u32,
    row_pitch: usize,
) -> Result<DecodedBitmap, CaptureError> {
    check_layout(src, width, height, row_pitch, BGRA8_BPP)?;
    let w = width as usize;
    let mut out = Vec::with_capacity(w * height as usize * 3);
    for y in 0..height as usize {
        let row = &src[y * row_pitch..y * row_pitch + w * BGRA8_BPP];
        for px in row.chunks_exact(BGRA8_BPP) {
            out.extend_from_slice(&[px[2], px[1], px[0]]);
        }
    }
    DecodedBitmap::new(width, height, out)
}

// MARK: - HDR

/// Rec. 709 relative luminance.
#[inline]
pub fn luminance([r, g, b]: [f32; 3]) -> f32 {
    0.2126 * r + 0.7152 * g + 0.0722 * b
}

/// `Lnew / L` for `Lnew = L(1 + L/Lsq) / (1 + L)`. Non-positive luminance maps to 0.
#[inline]
pub fn tone_map_ratio(l: f32, lsq: f32) -> f32 {
    if l <= 0.0 {
        0.0
    } else {
        (1.0 + l / lsq) / (1.0 + l)
    }
}

/// Tone-mapped channels in `[0, 1]`.
#[inline]
pub fn tone_map_linear(rgb: [f32; 3], lmax: f32) -> [f32; 3] {
    let ratio = tone_map_ratio(luminance(rgb), lmax * lmax);
    rgb.map(|c| (c * ratio).clamp(0.0, 1.0))
}

#[inline]
pub fn tone_map_pixel(rgb: [f32; 3], lmax: f32) -> [u8; 3] {
    tone_map_linear(rgb, lmax).map(|c| (c * 255.0) as u8)
}

#[inline]
fn decode_pixel(px: &[u8]) -> [f32; 3] {
    [
        read_channel([px[0], px[1]]),
        read_channel([px[2], px[3]]),
        read_channel([px[4], px[5]]),
    ]
}

/// Maximum luminance of one row.
fn row_max(src: &[u8], y: usize, w: usize, row_pitch: usize) -> f32 {
    src[y * row_pitch..y * row_pitch + w * RGBA16F_BPP]
        .chunks_exact(RGBA16F_BPP)
        .map(|px| luminance(decode_pixel(px)))
        .fold(0.0, f32::max)
}

/// First pass: maximum luminance over the frame.
pub fn max_luminance(src: &[u8], width: u32, height: u32, row_pitch: usize) -> f32 {
    let w = width as usize;
    (0..height as usize)
        .into_par_iter()
        .map(|y| row_max(src, y, w, row_pitch))
        .reduce(|| 0.0, f32::max)
}

pub fn tone_map_rgba16f(
    src: &[u8],
    width: u32,
    height: u32,
    row_pitch: usize,
) -> Result<DecodedBitmap, CaptureError> {
    check_layout(src, width, height, row_pitch, RGBA16F_BPP)?;
    let (w, h) = (width as usize, height as usize);
    let mut out = vec![0u8; w * h * 3];
    if w == 0 || h == 0 {
        return DecodedBitmap::new(width, height, out);
    }

    let lmax = max_luminance(src, width, height, row_pitch);
    tracing::trace!(lmax, "tone mapping {width}x{height}");

    out.par_chunks_mut(w * 3).enumerate().for_each(|(y, dst)| {
        let row = &src[y * row_pitch..y * row_pitch + w * RGBA16F_BPP];
        for (px, rgb) in row.chunks_exact(RGBA16F_BPP).zip(dst.chunks_exact_mut(3)) {
            rgb.copy_from_slice(&tone_map_pixel(decode_pixel(px), lmax));
        }
    });

    DecodedBitmap::new(width, height, out)
}
