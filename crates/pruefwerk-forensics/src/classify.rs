// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan/photocopy classification.
//
// Three cheap checks vote on whether a page came off a scanner: a bounded
// global noise floor, straight-line document structure, and a paper-like
// bright background. The flag tunes downstream expectations but is advisory
// only — no verdict branches on it directly.

use image::GrayImage;
use imageproc::contrast::otsu_level;
use imageproc::edges::canny;
use imageproc::hough::{detect_lines, LineDetectionOptions};
use tracing::debug;

use pruefwerk_core::types::ScanClassification;

use crate::noise::{laplacian_response, mean_std};

/// Canny hysteresis thresholds.
const CANNY_LOW: f32 = 50.0;
const CANNY_HIGH: f32 = 150.0;
/// Hough accumulator votes required for a line.
const HOUGH_VOTES: u32 = 100;
/// Minimum detected lines to count as document structure.
const MIN_LINES: usize = 10;
/// Bright-pixel fraction above which the background reads as paper.
const PAPER_RATIO: f64 = 0.3;

/// Classify whether a grayscale page is a scanned/photocopied document.
pub fn classify_scan(gray: &GrayImage) -> ScanClassification {
    let mut score = 0u32;
    let mut reasons = Vec::new();

    // Check 1: scanner sensors leave a moderate, uniform noise floor.
    let (_, noise_std) = mean_std(&laplacian_response(gray));
    if noise_std > 5.0 && noise_std < 30.0 {
        score += 1;
        reasons.push("Uniform noise pattern consistent with scanning".to_owned());
    }

    // Check 2: documents are full of straight edges (rules, table borders,
    // text baselines).
    let edges = canny(gray, CANNY_LOW, CANNY_HIGH);
    let lines = detect_lines(
        &edges,
        LineDetectionOptions {
            vote_threshold: HOUGH_VOTES,
            suppression_radius: 8,
        },
    );
    if lines.len() >= MIN_LINES {
        score += 1;
        reasons.push("Document structure detected".to_owned());
    }

    // Check 3: paper background dominates a typical scan.
    let level = otsu_level(gray);
    let total = (gray.width() as usize) * (gray.height() as usize);
    let bright = gray.pixels().filter(|p| p.0[0] > level).count();
    let bright_ratio = if total == 0 {
        0.0
    } else {
        bright as f64 / total as f64
    };
    if bright_ratio > PAPER_RATIO {
        score += 1;
        reasons.push("Paper-like background detected".to_owned());
    }

    debug!(score, noise_std, lines = lines.len(), bright_ratio, "scan classification");

    ScanClassification {
        is_scanned: score >= 2,
        confidence: (f64::from(score) / 3.0).min(1.0),
        reasons,
    }
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    /// A synthetic "document": bright paper background, dark ruled lines,
    /// mild speckle noise. All three checks should fire.
    #[test]
    fn ruled_noisy_page_classifies_as_scanned() {
        let mut gray = GrayImage::from_fn(400, 400, |x, y| {
            // Mild deterministic speckle on a bright background.
            let n = ((x.wrapping_mul(31) ^ y.wrapping_mul(17)) % 7) as u8;
            Luma([240 - n])
        });
        // Horizontal rules every 30 px.
        for row in (40..360).step_by(30) {
            for x in 20..380 {
                for dy in 0..2 {
                    gray.put_pixel(x, row + dy, Luma([20u8]));
                }
            }
        }

        let result = classify_scan(&gray);
        assert!(result.is_scanned, "reasons: {:?}", result.reasons);
        assert!(result.confidence >= 2.0 / 3.0 - 1e-9);
    }

    /// A flat black image: no noise, no lines, no paper — not a scan.
    #[test]
    fn flat_dark_image_is_not_scanned() {
        let gray = GrayImage::from_pixel(200, 200, Luma([10u8]));
        let result = classify_scan(&gray);
        assert!(!result.is_scanned);
        assert!(result.confidence < 2.0 / 3.0);
    }

    #[test]
    fn confidence_is_score_over_three() {
        let gray = GrayImage::from_pixel(100, 100, Luma([0u8]));
        let result = classify_scan(&gray);
        let expected = result.reasons.len() as f64 / 3.0;
        assert!((result.confidence - expected).abs() < 1e-9);
    }
}
