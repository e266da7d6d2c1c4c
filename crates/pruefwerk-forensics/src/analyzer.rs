// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-page forensic analyzer — composes the individual signals into
// ForensicMetrics and reduces them to a scored verdict.
//
// The region extractor is the primary detector; copy-move and ELA act as
// corroborating signals with capped score contributions. The whole pass is
// a pure function of the raster (plus configuration): no randomness, no
// external calls, so repeated runs yield identical metrics.

use image::{DynamicImage, GrayImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};
use tracing::{debug, info, instrument, warn};

use pruefwerk_core::config::AnalyzerConfig;
use pruefwerk_core::error::Result;
use pruefwerk_core::types::{ForensicLabel, ForensicMetrics, ForensicVerdict};

use crate::artifacts::ArtifactSink;
use crate::classify::classify_scan;
use crate::copymove::{detect_copy_move, CopyMoveMatch};
use crate::ela::{error_level_map, hot_pixel_ratio};
use crate::noise::noise_inconsistency_map;
use crate::regions::extract_tampered_regions;
use crate::support::{channel_std_map, ssim_against_blur};

/// Maximum copy-move pairs drawn onto the diagnostic overlay.
const OVERLAY_MATCH_LIMIT: usize = 20;
/// Regions quoted individually in the verdict reasons.
const REASON_REGION_LIMIT: usize = 3;

/// Forensic analyzer for decoded RGB page rasters.
///
/// Holds only configuration — cheap to clone and share across page tasks.
#[derive(Debug, Clone, Default)]
pub struct ForensicAnalyzer {
    config: AnalyzerConfig,
}

impl ForensicAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Run the full forensic pass over one page.
    ///
    /// Emits diagnostic artifacts through `sink` as a side effect; sink
    /// failures are logged and ignored.
    #[instrument(skip(self, page, sink), fields(page_index, width = page.width(), height = page.height()))]
    pub fn analyze_page(
        &self,
        page_index: usize,
        page: &RgbImage,
        sink: &dyn ArtifactSink,
    ) -> Result<(ForensicMetrics, ForensicVerdict)> {
        let gray: GrayImage = image::imageops::grayscale(page);

        let scan = classify_scan(&gray);
        if scan.is_scanned {
            debug!(confidence = scan.confidence, "page classified as scanned document");
        }

        // Primary detector: noise-inconsistency map and region extraction.
        let noise_map = noise_inconsistency_map(&gray);
        emit(sink, page_index, "noise_map", &noise_map.clone().into());
        let (tampered_regions, region_mask, noise_stats) =
            extract_tampered_regions(&noise_map, &self.config);
        emit(sink, page_index, "noise_regions", &region_mask.into());

        // Compression-artifact analysis.
        let ela = error_level_map(page, self.config.ela_quality, self.config.ela_gain)?;
        let ela_hot_pixel_ratio = hot_pixel_ratio(&ela, self.config.ela_hot_threshold);
        emit(sink, page_index, "ela", &ela.into());

        // Duplication analysis.
        let matches = detect_copy_move(&gray, &self.config);
        if !matches.is_empty() {
            let overlay = copy_move_overlay(page, &matches);
            emit(sink, page_index, "copy_move", &overlay.into());
        }

        // Supporting texture controls.
        let (channel_map, mean_channel_std) = channel_std_map(page);
        emit(sink, page_index, "channel_variance", &channel_map.into());
        let ssim_score = ssim_against_blur(&gray);

        let metrics = ForensicMetrics {
            ela_hot_pixel_ratio,
            tampered_regions,
            copy_move_matches: matches.len(),
            noise_threshold: noise_stats.threshold,
            noise_global_mean: noise_stats.global_mean,
            noise_global_std: noise_stats.global_std,
            ssim_score,
            mean_channel_std,
            scan,
        };
        let verdict = self.score(&metrics);

        info!(
            page_index,
            score = verdict.score,
            label = %verdict.label,
            regions = metrics.tampered_regions.len(),
            copy_move = metrics.copy_move_matches,
            "forensic pass complete"
        );

        Ok((metrics, verdict))
    }

    /// Reduce the metrics to the page's forensic score and label.
    fn score(&self, metrics: &ForensicMetrics) -> ForensicVerdict {
        let mut score = 0.0f64;
        let mut reasons = Vec::new();

        let region_count = metrics.tampered_regions.len();
        if region_count > 0 {
            score += (region_count as f64 * 0.3).min(0.6);
            reasons.push(format!(
                "Detected {region_count} tampered regions via noise analysis"
            ));
            for region in metrics.tampered_regions.iter().take(REASON_REGION_LIMIT) {
                reasons.push(format!(
                    "  Region at ({},{}) - intensity ratio: {:.1}",
                    region.x, region.y, region.intensity_ratio
                ));
            }
        }

        if metrics.copy_move_matches > 10 {
            score += 0.2;
            reasons.push(format!(
                "Copy-move indicators: {} suspicious matches",
                metrics.copy_move_matches
            ));
        }

        if metrics.ela_hot_pixel_ratio > 0.02 {
            score += 0.15;
            reasons.push(format!(
                "ELA hot pixels: {:.2}%",
                metrics.ela_hot_pixel_ratio * 100.0
            ));
        }

        let score = score.min(1.0);
        let label = if score > self.config.tampered_threshold {
            ForensicLabel::LikelyTampered
        } else {
            ForensicLabel::LikelyOriginal
        };

        ForensicVerdict {
            score,
            label,
            reasons,
        }
    }

    /// Stand-in verdict for a page whose forensic pass failed.
    ///
    /// Score 0 with an explicit reason; the page continues to verdict fusion
    /// in degraded mode instead of aborting its siblings.
    pub fn unavailable_verdict(detail: &str) -> ForensicVerdict {
        ForensicVerdict {
            score: 0.0,
            label: ForensicLabel::LikelyOriginal,
            reasons: vec![format!("Forensic analysis unavailable: {detail}")],
        }
    }
}

/// Draw the strongest copy-move pairs onto a copy of the page.
fn copy_move_overlay(page: &RgbImage, matches: &[CopyMoveMatch]) -> RgbImage {
    let mut overlay = page.clone();
    for m in matches.iter().take(OVERLAY_MATCH_LIMIT) {
        draw_filled_circle_mut(
            &mut overlay,
            (m.source.0 as i32, m.source.1 as i32),
            5,
            Rgb([255u8, 0, 0]),
        );
        draw_filled_circle_mut(
            &mut overlay,
            (m.target.0 as i32, m.target.1 as i32),
            5,
            Rgb([0u8, 255, 0]),
        );
        draw_line_segment_mut(&mut overlay, m.source, m.target, Rgb([0u8, 0, 255]));
    }
    overlay
}

/// Best-effort artifact emission — failures must not affect the verdict.
fn emit(sink: &dyn ArtifactSink, page_index: usize, name: &str, image: &DynamicImage) {
    if let Err(err) = sink.save(page_index, name, image) {
        warn!(page_index, name, error = %err, "diagnostic artifact not written");
    }
}

// -- Tests --------------------------------------------------------------------
