// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Copy-move forgery detection via binary feature self-matching.
//
// Duplicated content carries duplicated local texture: FAST keypoints are
// described with 256-bit BRIEF descriptors and matched against each other.
// A Lowe ratio test rejects ambiguous matches and a minimum spatial
// separation rejects the natural self-similarity of neighbouring pixels.
// The BRIEF sampling pattern is fixed by a constant seed so that repeated
// runs over the same raster yield identical matches.

use image::GrayImage;
use imageproc::binary_descriptors::brief::{brief, TestPair};
use imageproc::binary_descriptors::BinaryDescriptor;
use imageproc::corners::corners_fast9;
use imageproc::point::Point;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use pruefwerk_core::config::AnalyzerConfig;

/// FAST-9 corner threshold.
const FAST_THRESHOLD: u8 = 20;
/// Keypoints closer than this to a border are dropped so the BRIEF patch
/// (31x31 plus smoothing) never leaves the image.
const KEYPOINT_MARGIN: u32 = 24;
/// Descriptor length in bits.
const DESCRIPTOR_BITS: usize = 256;
/// Side length of the BRIEF sampling patch.
const BRIEF_PATCH_SIZE: u32 = 31;
/// Fixed seed for the BRIEF test-pair pattern (determinism requirement).
const TEST_PAIR_SEED: u64 = 0x7072_7565_6677_6b21;

/// One surviving copy-move candidate pair.
#[derive(Debug, Clone, PartialEq)]
pub struct CopyMoveMatch {
    pub source: (f32, f32),
    pub target: (f32, f32),
    /// `1 - hamming/256`; identical descriptors score 1.0.
    pub confidence: f64,
}

/// Generate the fixed BRIEF test-pair sampling pattern.
fn test_pairs() -> Vec<TestPair> {
    let mut rng = StdRng::seed_from_u64(TEST_PAIR_SEED);
    (0..DESCRIPTOR_BITS)
        .map(|_| TestPair {
            p0: Point::new(
                rng.gen_range(0..BRIEF_PATCH_SIZE),
                rng.gen_range(0..BRIEF_PATCH_SIZE),
            ),
            p1: Point::new(
                rng.gen_range(0..BRIEF_PATCH_SIZE),
                rng.gen_range(0..BRIEF_PATCH_SIZE),
            ),
        })
        .collect()
}

/// Detect copy-move candidate pairs in a grayscale page.
///
/// Returns every directed pair that passes the ratio and separation tests;
/// the caller treats the count as the signal and the pairs themselves as
/// diagnostic material.
pub fn detect_copy_move(gray: &GrayImage, config: &AnalyzerConfig) -> Vec<CopyMoveMatch> {
    let (width, height) = gray.dimensions();
    if width <= 2 * KEYPOINT_MARGIN || height <= 2 * KEYPOINT_MARGIN {
        return Vec::new();
    }

    let mut corners = corners_fast9(gray, FAST_THRESHOLD);
    corners.retain(|c| {
        c.x >= KEYPOINT_MARGIN
            && c.y >= KEYPOINT_MARGIN
            && c.x < width - KEYPOINT_MARGIN
            && c.y < height - KEYPOINT_MARGIN
    });
    if corners.len() < 2 {
        return Vec::new();
    }

    // Keep the strongest corners up to the configured feature budget.
    corners.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    corners.truncate(config.copy_move_features);

    let keypoints: Vec<Point<u32>> = corners.iter().map(|c| Point::new(c.x, c.y)).collect();
    let pairs = test_pairs();
    let descriptors = match brief(gray, &keypoints, DESCRIPTOR_BITS, Some(&pairs)) {
        Ok((descriptors, _)) => descriptors,
        Err(err) => {
            warn!(error = %err, "BRIEF descriptor extraction failed");
            return Vec::new();
        }
    };
    if descriptors.len() < 2 {
        return Vec::new();
    }

    let mut matches = Vec::new();
    for (i, descriptor) in descriptors.iter().enumerate() {
        // Exhaustive k=2 nearest-neighbour search in Hamming space. The
        // feature budget keeps this quadratic pass cheap.
        let mut best_idx = usize::MAX;
        let mut best = u32::MAX;
        let mut second = u32::MAX;
        for (j, other) in descriptors.iter().enumerate() {
            if i == j {
                continue;
            }
            let dist = descriptor.hamming_distance(other);
            if dist < best {
                second = best;
                best = dist;
                best_idx = j;
            } else if dist < second {
                second = dist;
            }
        }
        if best_idx == usize::MAX || second == u32::MAX {
            continue;
        }

        // Lowe ratio test against the second-nearest neighbour.
        if (best as f32) >= config.copy_move_ratio * (second as f32) {
            continue;
        }

        let from = descriptor.position();
        let to = descriptors[best_idx].position();
        let dx = from.x as f32 - to.x as f32;
        let dy = from.y as f32 - to.y as f32;
        if (dx * dx + dy * dy).sqrt() <= config.copy_move_min_separation {
            continue;
        }

        matches.push(CopyMoveMatch {
            source: (from.x as f32, from.y as f32),
            target: (to.x as f32, to.y as f32),
            confidence: 1.0 - f64::from(best) / 256.0,
        });
    }

    debug!(
        keypoints = keypoints.len(),
        matches = matches.len(),
        "copy-move detection complete"
    );
    matches
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    /// Deterministic speckle used to build distinctive local texture.
    fn speckle(seed: u32, x: u32, y: u32) -> u8 {
        let mut v = seed
            .wrapping_mul(0x9E37_79B9)
            .wrapping_add(x.wrapping_mul(374_761_393))
            .wrapping_add(y.wrapping_mul(668_265_263));
        v ^= v >> 13;
        v = v.wrapping_mul(1_274_126_177);
        (v >> 24) as u8
    }

    /// Paste the same textured patch at two distant locations and expect at
    /// least one surviving match between them.
    #[test]
    fn duplicated_patch_produces_matches() {
        let mut gray = GrayImage::from_pixel(300, 300, Luma([200u8]));
        for py in 0..40 {
            for px in 0..40 {
                let v = speckle(7, px, py);
                gray.put_pixel(40 + px, 40 + py, Luma([v]));
                gray.put_pixel(200 + px, 200 + py, Luma([v]));
            }
        }

        let matches = detect_copy_move(&gray, &AnalyzerConfig::default());
        assert!(
            !matches.is_empty(),
            "identical distant patches should match"
        );
        for m in &matches {
            let dx = m.source.0 - m.target.0;
            let dy = m.source.1 - m.target.1;
            assert!((dx * dx + dy * dy).sqrt() > 50.0);
            assert!((0.0..=1.0).contains(&m.confidence));
        }
    }

    /// A blank page has no corners, hence no matches.
    #[test]
    fn blank_page_has_no_matches() {
        let gray = GrayImage::from_pixel(200, 200, Luma([255u8]));
        assert!(detect_copy_move(&gray, &AnalyzerConfig::default()).is_empty());
    }

    /// Images too small for the keypoint margin short-circuit to empty.
    #[test]
    fn tiny_image_short_circuits() {
        let gray = GrayImage::from_pixel(40, 40, Luma([0u8]));
        assert!(detect_copy_move(&gray, &AnalyzerConfig::default()).is_empty());
    }

    /// The sampling pattern is seeded, so two runs agree exactly.
    #[test]
    fn detection_is_deterministic() {
        let gray = GrayImage::from_fn(200, 200, |x, y| Luma([speckle(3, x, y)]));
        let cfg = AnalyzerConfig::default();
        let first = detect_copy_move(&gray, &cfg);
        let second = detect_copy_move(&gray, &cfg);
        assert_eq!(first, second);
    }
}
