// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Error-level analysis — JPEG compression-history inconsistencies.
//
// Re-encoding a page at a known quality and differencing against the
// original makes regions with a different compression history stand out:
// content pasted from another source re-compresses with a visibly different
// error level than its surroundings.

use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;

use pruefwerk_core::error::{PruefwerkError, Result};

/// Compute the error-level map of an RGB page.
///
/// The page is encoded to JPEG at `quality`, decoded again, and the absolute
/// per-channel difference is amplified by `gain` and clipped to byte range.
pub fn error_level_map(page: &RgbImage, quality: u8, gain: f32) -> Result<RgbImage> {
    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    page.write_with_encoder(encoder)
        .map_err(|err| PruefwerkError::ImageEncode(format!("ELA re-encode failed: {err}")))?;

    let recompressed = image::load_from_memory(&buffer)
        .map_err(|err| PruefwerkError::ImageDecode(format!("ELA re-decode failed: {err}")))?
        .to_rgb8();

    if recompressed.dimensions() != page.dimensions() {
        return Err(PruefwerkError::Analysis(
            "ELA round-trip changed image dimensions".to_owned(),
        ));
    }

    let (width, height) = page.dimensions();
    let mut ela = RgbImage::new(width, height);
    for (out, (orig, comp)) in ela
        .pixels_mut()
        .zip(page.pixels().zip(recompressed.pixels()))
    {
        for c in 0..3 {
            let diff = (f32::from(orig.0[c]) - f32::from(comp.0[c])).abs() * gain;
            out.0[c] = diff.min(255.0) as u8;
        }
    }

    Ok(ela)
}

/// Fraction of ELA channel samples strictly above `threshold`, in [0, 1].
pub fn hot_pixel_ratio(ela: &RgbImage, threshold: u8) -> f64 {
    let total = (ela.width() as usize) * (ela.height() as usize) * 3;
    if total == 0 {
        return 0.0;
    }
    let hot: usize = ela
        .pixels()
        .map(|p| p.0.iter().filter(|&&c| c > threshold).count())
        .sum();
    hot as f64 / total as f64
}

// -- Tests --------------------------------------------------------------------
