// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tampered-region extraction from the noise-inconsistency map.
//
// Binarizes the map with an adaptive threshold, closes small gaps, labels
// connected components, and keeps only components whose intensity stands far
// enough above the page's own statistics. The intensity-ratio test against
// the global mean travels across scanners and compression levels better than
// any fixed absolute threshold would.

use std::collections::BTreeMap;

use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::morphology::close;
use imageproc::region_labelling::{connected_components, Connectivity};
use tracing::debug;

use pruefwerk_core::config::AnalyzerConfig;
use pruefwerk_core::types::TamperedRegion;

use crate::noise::mean_std;

/// Base binarization threshold before the adaptive adjustment.
const BASE_THRESHOLD: i32 = 120;
/// Upper bound for the adaptive threshold.
const MAX_THRESHOLD: i32 = 160;
/// Radius of the L-infinity structuring element used for morphological
/// closing (an 11x11 square).
const CLOSE_RADIUS: u8 = 5;

/// Global statistics of one noise map, reported alongside the regions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseStats {
    pub global_mean: f64,
    pub global_std: f64,
    /// The adaptive threshold that was applied.
    pub threshold: u8,
    /// Number of connected components before filtering.
    pub components: u32,
}

/// Per-component accumulator built during the labelling scan.
#[derive(Debug, Clone, Copy)]
struct Component {
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
    area: u32,
    intensity_sum: f64,
}

/// Extract tampered regions from a noise-inconsistency map.
///
/// Returns the accepted regions sorted by descending mean intensity, the
/// closed binary mask (diagnostic artifact), and the global noise
/// statistics.
pub fn extract_tampered_regions(
    noise_map: &GrayImage,
    config: &AnalyzerConfig,
) -> (Vec<TamperedRegion>, GrayImage, NoiseStats) {
    let (width, height) = noise_map.dimensions();

    let values: Vec<f64> = noise_map.pixels().map(|p| f64::from(p.0[0])).collect();
    let (global_mean, global_std) = mean_std(&values);

    // Adaptive threshold: noisy pages push the cut-off up, capped at 160 so
    // genuinely hot regions always remain detectable.
    let mut threshold = BASE_THRESHOLD;
    if global_mean > 5.0 {
        threshold += ((global_mean - 5.0) * 5.0) as i32;
    }
    let threshold = threshold.min(MAX_THRESHOLD) as u8;

    let mask = GrayImage::from_fn(width, height, |x, y| {
        if noise_map.get_pixel(x, y).0[0] > threshold {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    });

    // Close gaps so fragmented responses over one pasted area merge into a
    // single component.
    let closed = close(&mask, Norm::LInf, CLOSE_RADIUS);

    let labels = connected_components(&closed, Connectivity::Eight, Luma([0u8]));

    // BTreeMap keeps component iteration deterministic across runs.
    let mut components: BTreeMap<u32, Component> = BTreeMap::new();
    for (x, y, label) in labels.enumerate_pixels() {
        let id = label.0[0];
        if id == 0 {
            continue;
        }
        let intensity = f64::from(noise_map.get_pixel(x, y).0[0]);
        components
            .entry(id)
            .and_modify(|c| {
                c.min_x = c.min_x.min(x);
                c.min_y = c.min_y.min(y);
                c.max_x = c.max_x.max(x);
                c.max_y = c.max_y.max(y);
                c.area += 1;
                c.intensity_sum += intensity;
            })
            .or_insert(Component {
                min_x: x,
                min_y: y,
                max_x: x,
                max_y: y,
                area: 1,
                intensity_sum: intensity,
            });
    }

    let stats = NoiseStats {
        global_mean,
        global_std,
        threshold,
        components: components.len() as u32,
    };

    let mut regions: Vec<TamperedRegion> = components
        .values()
        .filter_map(|c| {
            let bbox = (
                c.min_x,
                c.min_y,
                c.max_x - c.min_x + 1,
                c.max_y - c.min_y + 1,
            );
            let mean = c.intensity_sum / f64::from(c.area);
            filter_component(bbox, c.area, mean, global_mean, width, height, config)
        })
        .collect();

    regions.sort_by(|a, b| {
        b.mean_intensity
            .partial_cmp(&a.mean_intensity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    debug!(
        components = stats.components,
        accepted = regions.len(),
        threshold,
        global_mean,
        "tampered-region extraction complete"
    );

    (regions, closed, stats)
}

/// Apply the acceptance rules to one connected component.
///
/// Rejects components that are too small, too close to a border, or too
/// large relative to the page; accepts the rest only when the intensity
/// ratio clears the high bar, or the medium bar for large components.
fn filter_component(
    bbox: (u32, u32, u32, u32),
    area: u32,
    mean_intensity: f64,
    global_mean: f64,
    img_width: u32,
    img_height: u32,
    config: &AnalyzerConfig,
) -> Option<TamperedRegion> {
    let (x, y, width, height) = bbox;

    if area < config.min_region_area {
        return None;
    }

    // Border proximity: scanner edges and page curl produce strong noise
    // responses that are not tampering.
    let margin = i64::from(config.border_margin);
    if i64::from(x) < margin
        || i64::from(y) < margin
        || i64::from(x + width) > i64::from(img_width) - margin
        || i64::from(y + height) > i64::from(img_height) - margin
    {
        return None;
    }

    let page_area = f64::from(img_width) * f64::from(img_height);
    if f64::from(area) > page_area * config.max_region_fraction {
        return None;
    }

    let intensity_ratio = mean_intensity / (global_mean + 1e-8);

    let high_ratio = intensity_ratio >= config.intensity_ratio_high;
    let medium_ratio_large = intensity_ratio >= config.intensity_ratio_medium
        && area >= config.medium_ratio_min_area;
    if !(high_ratio || medium_ratio_large) {
        return None;
    }

    let confidence = ((mean_intensity - global_mean) / (255.0 - global_mean + 1e-8))
        .min(1.0)
        .max(0.7);

    Some(TamperedRegion {
        x,
        y,
        width,
        height,
        area,
        center: (x + width / 2, y + height / 2),
        mean_intensity,
        intensity_ratio,
        confidence,
        reasons: vec!["High noise variance (tampering indicator)".to_owned()],
    })
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn default_config() -> AnalyzerConfig {
        AnalyzerConfig::default()
    }

    /// Helper: run the filter on a synthetic component with a hot mean
    /// against a near-zero background.
    fn filter_hot(
        bbox: (u32, u32, u32, u32),
        area: u32,
    ) -> Option<TamperedRegion> {
        filter_component(bbox, area, 250.0, 1.0, 200, 200, &default_config())
    }

    #[test]
    fn area_at_minimum_is_accepted() {
        let region = filter_hot((50, 50, 8, 10), 80).expect("80 px region accepted");
        assert_eq!(region.area, 80);
        assert!(region.confidence >= 0.7);
    }

    #[test]
    fn area_below_minimum_is_rejected() {
        assert!(filter_hot((50, 50, 8, 10), 79).is_none());
    }

    #[test]
    fn border_margin_boundaries() {
        // Bounding box 4 px from the left border: rejected.
        assert!(filter_hot((4, 50, 8, 10), 80).is_none());
        // 6 px from the border: eligible.
        assert!(filter_hot((6, 50, 8, 10), 80).is_some());
        // Touching the far edge within the margin: rejected.
        assert!(filter_hot((188, 50, 10, 10), 80).is_none());
    }

    #[test]
    fn oversized_component_is_rejected() {
        // 200x200 page -> 15% cap is 6000 px.
        assert!(filter_hot((20, 20, 100, 100), 6001).is_none());
        assert!(filter_hot((20, 20, 100, 100), 6000).is_some());
    }

    #[test]
    fn intensity_ratio_acceptance_rules() {
        let cfg = default_config();
        // Ratio 16.9 with a small area: below the high bar, rejected.
        assert!(
            filter_component((50, 50, 10, 10), 100, 16.9, 1.0, 200, 200, &cfg).is_none()
        );
        // Ratio 17: accepted.
        assert!(
            filter_component((50, 50, 10, 10), 100, 17.0, 1.0, 200, 200, &cfg).is_some()
        );
        // Ratio 12 needs at least 500 px.
        assert!(
            filter_component((50, 50, 25, 25), 499, 12.0, 1.0, 200, 200, &cfg).is_none()
        );
        assert!(
            filter_component((50, 50, 25, 25), 500, 12.0, 1.0, 200, 200, &cfg).is_some()
        );
    }

    #[test]
    fn confidence_is_bounded() {
        let cfg = default_config();
        // Barely above the global mean: lower bound 0.7 applies.
        let low = filter_component((50, 50, 10, 10), 100, 100.0, 5.0, 200, 200, &cfg)
            .expect("accepted");
        assert!((low.confidence - 0.7).abs() < 1e-9 || low.confidence > 0.7);
        assert!(low.confidence <= 1.0);
    }

    /// End-to-end: a bright rectangle on a dark map becomes one region with
    /// the expected geometry.
    #[test]
    fn extract_finds_hot_rectangle() {
        let mut map = GrayImage::from_pixel(200, 200, Luma([0u8]));
        for y in 60..80 {
            for x in 50..90 {
                map.put_pixel(x, y, Luma([230u8]));
            }
        }

        let (regions, mask, stats) = extract_tampered_regions(&map, &default_config());

        assert_eq!(stats.threshold, 120);
        assert_eq!(regions.len(), 1, "expected exactly one region");
        let r = &regions[0];
        assert_eq!((r.x, r.y), (50, 60));
        assert_eq!((r.width, r.height), (40, 20));
        assert_eq!(r.area, 800);
        assert!(r.intensity_ratio >= 17.0);
        // The mask marks the rectangle as foreground.
        assert_eq!(mask.get_pixel(60, 70).0[0], 255);
        assert_eq!(mask.get_pixel(10, 10).0[0], 0);
    }

    /// A uniformly noisy map has no component standing out against the
    /// global mean, so nothing is extracted.
    #[test]
    fn extract_rejects_uniform_map() {
        // Mid-intensity everywhere: above any threshold is false (values all
        // below 120 adjusted), no components at all.
        let map = GrayImage::from_pixel(200, 200, Luma([90u8]));
        let (regions, _, stats) = extract_tampered_regions(&map, &default_config());
        assert!(regions.is_empty());
        assert_eq!(stats.components, 0);
    }

    #[test]
    fn adaptive_threshold_is_capped() {
        // A very hot map pushes the adaptive threshold to the cap.
        let map = GrayImage::from_pixel(64, 64, Luma([200u8]));
        let (_, _, stats) = extract_tampered_regions(&map, &default_config());
        assert_eq!(stats.threshold, 160);
    }

    #[test]
    fn regions_sorted_by_descending_intensity() {
        let mut map = GrayImage::from_pixel(300, 300, Luma([0u8]));
        // Dimmer region first in scan order.
        for y in 20..40 {
            for x in 20..60 {
                map.put_pixel(x, y, Luma([180u8]));
            }
        }
        for y in 200..220 {
            for x in 200..240 {
                map.put_pixel(x, y, Luma([250u8]));
            }
        }

        let (regions, _, _) = extract_tampered_regions(&map, &default_config());
        assert_eq!(regions.len(), 2);
        assert!(regions[0].mean_intensity >= regions[1].mean_intensity);
        assert_eq!((regions[0].x, regions[0].y), (200, 200));
    }
}
