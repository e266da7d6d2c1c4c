// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Forensic analyzer configuration.

use serde::{Deserialize, Serialize};

/// Tuning knobs for the forensic analyzer.
///
/// The defaults are calibrated for scanned/photographed document pages at
/// roughly 2x native rendering resolution and should rarely need adjustment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// JPEG quality used for the error-level re-encode pass.
    pub ela_quality: u8,
    /// Gain applied to the per-pixel re-encode difference.
    pub ela_gain: f32,
    /// Intensity above which an ELA sample counts as a "hot pixel".
    pub ela_hot_threshold: u8,
    /// Minimum pixel area for a candidate tampered region.
    pub min_region_area: u32,
    /// Regions whose bounding box comes this close to any image border
    /// are discarded (scanner edge artifacts).
    pub border_margin: u32,
    /// Regions covering more than this fraction of the page are discarded.
    pub max_region_fraction: f64,
    /// Intensity ratio at which a region is accepted outright.
    pub intensity_ratio_high: f64,
    /// Intensity ratio accepted only for large regions.
    pub intensity_ratio_medium: f64,
    /// Minimum area for the medium-ratio acceptance path.
    pub medium_ratio_min_area: u32,
    /// Maximum number of keypoint descriptors for copy-move matching.
    pub copy_move_features: usize,
    /// Lowe ratio for the k=2 nearest-neighbour descriptor test.
    pub copy_move_ratio: f32,
    /// Minimum spatial separation (pixels) between a copy-move pair;
    /// closer pairs are natural self-similarity, not duplication.
    pub copy_move_min_separation: f32,
    /// Forensic score above which a page is labelled likely tampered.
    pub tampered_threshold: f64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            ela_quality: 90,
            ela_gain: 15.0,
            ela_hot_threshold: 30,
            min_region_area: 80,
            border_margin: 5,
            max_region_fraction: 0.15,
            intensity_ratio_high: 17.0,
            intensity_ratio_medium: 12.0,
            medium_ratio_min_area: 500,
            copy_move_features: 1000,
            copy_move_ratio: 0.75,
            copy_move_min_separation: 50.0,
            tampered_threshold: 0.45,
        }
    }
}
