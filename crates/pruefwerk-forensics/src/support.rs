// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Supporting texture signals — cross-channel variance and structural
// similarity against a blurred copy. Diagnostic controls only: recorded in
// the metrics and emitted as artifacts, never load-bearing for the score.

use image::{GrayImage, Luma, RgbImage};
use imageproc::filter::gaussian_blur_f32;

/// SSIM stabilization constants for 8-bit dynamic range.
const SSIM_C1: f64 = 6.5025; // (0.01 * 255)^2
const SSIM_C2: f64 = 58.5225; // (0.03 * 255)^2

/// Per-pixel standard deviation across the three colour channels.
///
/// Returns the map (clipped to byte range for artifact emission) and its
/// mean. Flattened colour (screenshots, filled rectangles) pushes the mean
/// down; overlays from a different source push it up.
pub fn channel_std_map(page: &RgbImage) -> (GrayImage, f64) {
    let (width, height) = page.dimensions();
    let total = (width as usize) * (height as usize);
    if total == 0 {
        return (GrayImage::new(0, 0), 0.0);
    }

    let mut sum = 0.0f64;
    let map = GrayImage::from_fn(width, height, |x, y| {
        let p = page.get_pixel(x, y).0;
        let r = f64::from(p[0]);
        let g = f64::from(p[1]);
        let b = f64::from(p[2]);
        let mean = (r + g + b) / 3.0;
        let var = ((r - mean).powi(2) + (g - mean).powi(2) + (b - mean).powi(2)) / 3.0;
        let std = var.sqrt();
        sum += std;
        Luma([std.min(255.0) as u8])
    });

    (map, sum / total as f64)
}

/// Global structural similarity between a page and a Gaussian-blurred copy
/// of itself.
///
/// Values near 1.0 mean the page barely changes under blur — a low-texture
/// surface consistent with synthetic fills; natural scans sit lower.
pub fn ssim_against_blur(gray: &GrayImage) -> f64 {
    let blurred = gaussian_blur_f32(gray, 1.4);
    ssim(gray, &blurred)
}

/// Global SSIM between two equally sized grayscale images.
fn ssim(a: &GrayImage, b: &GrayImage) -> f64 {
    let n = (a.width() as usize) * (a.height() as usize);
    if n == 0 || a.dimensions() != b.dimensions() {
        return 0.0;
    }

    let mut sum_a = 0.0f64;
    let mut sum_b = 0.0f64;
    for (pa, pb) in a.pixels().zip(b.pixels()) {
        sum_a += f64::from(pa.0[0]);
        sum_b += f64::from(pb.0[0]);
    }
    let mu_a = sum_a / n as f64;
    let mu_b = sum_b / n as f64;

    let mut var_a = 0.0f64;
    let mut var_b = 0.0f64;
    let mut cov = 0.0f64;
    for (pa, pb) in a.pixels().zip(b.pixels()) {
        let da = f64::from(pa.0[0]) - mu_a;
        let db = f64::from(pb.0[0]) - mu_b;
        var_a += da * da;
        var_b += db * db;
        cov += da * db;
    }
    var_a /= n as f64;
    var_b /= n as f64;
    cov /= n as f64;

    ((2.0 * mu_a * mu_b + SSIM_C1) * (2.0 * cov + SSIM_C2))
        / ((mu_a * mu_a + mu_b * mu_b + SSIM_C1) * (var_a + var_b + SSIM_C2))
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn grayscale_content_has_zero_channel_std() {
        let page = RgbImage::from_pixel(32, 32, Rgb([120u8, 120, 120]));
        let (map, mean) = channel_std_map(&page);
        assert!(mean.abs() < 1e-9);
        assert!(map.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn saturated_colour_raises_channel_std() {
        let page = RgbImage::from_pixel(32, 32, Rgb([255u8, 0, 0]));
        let (_, mean) = channel_std_map(&page);
        // std of {255, 0, 0} around mean 85 is ~120.2.
        assert!((mean - 120.2).abs() < 0.5, "got {mean}");
    }

    #[test]
    fn ssim_of_identical_images_is_one() {
        let img = GrayImage::from_fn(40, 40, |x, y| Luma([((x * 7 + y * 13) % 256) as u8]));
        let score = ssim(&img, &img);
        assert!((score - 1.0).abs() < 1e-9, "got {score}");
    }

    /// Blur barely changes a flat image, so the SSIM control sits near 1.
    #[test]
    fn flat_image_is_blur_invariant() {
        let gray = GrayImage::from_pixel(64, 64, Luma([200u8]));
        let score = ssim_against_blur(&gray);
        assert!(score > 0.98, "got {score}");
    }

    /// A checkerboard loses most of its structure under blur.
    #[test]
    fn checkerboard_drops_under_blur() {
        let gray = GrayImage::from_fn(64, 64, |x, y| {
            Luma([if (x + y) % 2 == 0 { 0u8 } else { 255u8 }])
        });
        let score = ssim_against_blur(&gray);
        assert!(score < 0.9, "got {score}");
    }
}
