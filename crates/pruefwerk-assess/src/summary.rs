// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Advisory forensic summary sent alongside the page image.
//
// Plain text on purpose: the assessor reads it as context, not as a
// command, and forms its own judgment from the pixels.

use std::fmt::Write as _;

use pruefwerk_core::types::{ForensicMetrics, ForensicVerdict};

/// Regions described individually in the summary.
const SUMMARY_REGION_LIMIT: usize = 5;

/// Render the quantitative findings for one page as assessor context.
pub fn forensic_summary(metrics: &ForensicMetrics, verdict: &ForensicVerdict) -> String {
    let mut text = String::new();

    let document_type = if metrics.scan.is_scanned {
        "SCANNED DOCUMENT"
    } else {
        "Digital Image"
    };

    let _ = writeln!(text, "ADVANCED FORENSIC ANALYSIS RESULTS:");
    let _ = writeln!(text, "- Document Type: {document_type}");
    let _ = writeln!(
        text,
        "- Forensic Score: {:.3} (0=clean, 1=tampered)",
        verdict.score
    );
    let _ = writeln!(text, "- Verdict: {}", verdict.label);
    let _ = writeln!(
        text,
        "- Tampered Regions Found: {}",
        metrics.tampered_regions.len()
    );
    let _ = writeln!(
        text,
        "- ELA Hot Pixels: {:.2}%",
        metrics.ela_hot_pixel_ratio * 100.0
    );
    let _ = writeln!(text, "- Copy-Move Matches: {}", metrics.copy_move_matches);
    let _ = writeln!(
        text,
        "- Noise Analysis Threshold: {} (global mean {:.2})",
        metrics.noise_threshold, metrics.noise_global_mean
    );

    let _ = writeln!(text, "\nForensic Indicators:");
    if verdict.reasons.is_empty() {
        let _ = writeln!(text, "- No strong forensic signals detected");
    } else {
        for reason in &verdict.reasons {
            let _ = writeln!(text, "- {reason}");
        }
    }

    if !metrics.tampered_regions.is_empty() {
        let _ = writeln!(text, "\nDETECTED TAMPERING REGIONS (from noise analysis):");
        for (i, region) in metrics
            .tampered_regions
            .iter()
            .take(SUMMARY_REGION_LIMIT)
            .enumerate()
        {
            let _ = writeln!(
                text,
                "\nRegion {} at ({}, {}), size {}x{}:",
                i + 1,
                region.x,
                region.y,
                region.width,
                region.height
            );
            let _ = writeln!(text, "  - Confidence: {:.0}%", region.confidence * 100.0);
            let _ = writeln!(
                text,
                "  - Intensity Ratio: {:.1}x (threshold: 17x)",
                region.intensity_ratio
            );
            let _ = writeln!(text, "  - Area: {} pixels", region.area);
            let _ = writeln!(text, "  - Evidence: {}", region.reasons.join(", "));
        }
    }

    text
}

// -- Tests --------------------------------------------------------------------
