// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Noise-inconsistency mapping — the primary discriminant for pasted content.
//
// Natural camera/scanner noise has a locally uniform second-derivative
// response. Splicing, inpainting, and text overlay disturb that floor, so the
// local variance of the Laplacian lights up over tampered areas. The map is
// min-max normalized so that downstream thresholds work in byte range
// regardless of the absolute noise energy of the page.

use image::{GrayImage, Luma};
use imageproc::filter::laplacian_filter;

/// Window radius for the local mean/variance pass (5x5 box).
const BOX_RADIUS: u32 = 2;

/// Laplacian response of a grayscale image as a flat row-major f64 buffer.
pub(crate) fn laplacian_response(gray: &GrayImage) -> Vec<f64> {
    laplacian_filter(gray)
        .pixels()
        .map(|p| f64::from(p.0[0]))
        .collect()
}

/// Compute the noise-inconsistency map of a grayscale page.
///
/// Pipeline: Laplacian response, local mean and mean-of-squares over a 5x5
/// box window (summed-area tables), variance magnitude, min-max
/// normalization into `[0, 255]`.
pub fn noise_inconsistency_map(gray: &GrayImage) -> GrayImage {
    let (width, height) = gray.dimensions();
    let lap = laplacian_response(gray);
    let lap_sq: Vec<f64> = lap.iter().map(|v| v * v).collect();

    let sum_table = integral_table(&lap, width, height);
    let sq_table = integral_table(&lap_sq, width, height);

    let mut variance = vec![0.0f64; (width * height) as usize];
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for y in 0..height {
        for x in 0..width {
            let mean = window_mean(&sum_table, width, height, x, y, BOX_RADIUS);
            let mean_sq = window_mean(&sq_table, width, height, x, y, BOX_RADIUS);
            let var = (mean_sq - mean * mean).abs();
            variance[(y * width + x) as usize] = var;
            min = min.min(var);
            max = max.max(var);
        }
    }

    let range = max - min + 1e-8;
    GrayImage::from_fn(width, height, |x, y| {
        let var = variance[(y * width + x) as usize];
        Luma([(((var - min) / range) * 255.0) as u8])
    })
}

/// Mean and standard deviation of a flat f64 buffer.
pub(crate) fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}

// -- Summed-area tables -------------------------------------------------------

/// Compute the summed-area table of a flat row-major f64 buffer.
///
/// `table[y * (width+1) + x]` contains the sum of all values in the rectangle
/// [0, 0) to (x, y) (exclusive on both axes). The table has dimensions
/// `(width+1) x (height+1)` with a zero-padded border.
fn integral_table(values: &[f64], width: u32, height: u32) -> Vec<f64> {
    let stride = (width + 1) as usize;
    let mut table = vec![0.0f64; stride * (height + 1) as usize];

    for y in 0..height as usize {
        let mut row_sum = 0.0f64;
        for x in 0..width as usize {
            row_sum += values[y * width as usize + x];
            let idx = (y + 1) * stride + (x + 1);
            let above = y * stride + (x + 1);
            table[idx] = row_sum + table[above];
        }
    }

    table
}

/// Mean value within a square window centred on (cx, cy) with the given
/// radius, clamped to image bounds.
fn window_mean(
    table: &[f64],
    img_width: u32,
    img_height: u32,
    cx: u32,
    cy: u32,
    radius: u32,
) -> f64 {
    let stride = (img_width + 1) as usize;

    let x1 = cx.saturating_sub(radius) as usize;
    let y1 = cy.saturating_sub(radius) as usize;
    let x2 = ((cx + radius + 1) as usize).min(img_width as usize);
    let y2 = ((cy + radius + 1) as usize).min(img_height as usize);

    let area = ((x2 - x1) * (y2 - y1)) as f64;
    if area == 0.0 {
        return 0.0;
    }

    let sum = table[y2 * stride + x2] - table[y1 * stride + x2] - table[y2 * stride + x1]
        + table[y1 * stride + x1];

    sum / area
}

// -- Tests --------------------------------------------------------------------
