// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable report rendering.
//
// The report is built entirely from the DocumentReport — no recomputation —
// so the caller can re-render at any time from the serialized JSON.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tracing::info;

use pruefwerk_core::error::Result;
use pruefwerk_core::types::DocumentReport;

const RULE: &str = "=====================================================================================";

/// Assessed regions listed per page before truncation.
const REGION_DISPLAY_LIMIT: usize = 5;

/// Render the full text report for one analyzed document.
pub fn render_text_report(report: &DocumentReport) -> String {
    let mut out = String::new();
    let summary = &report.summary;

    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "DOCUMENT TAMPERING DETECTION REPORT");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Document: {}", report.document_name);
    let _ = writeln!(
        out,
        "Date: {} | Pages: {} | Analysis: {}",
        report.analyzed_at.format("%Y-%m-%d %H:%M"),
        report.total_pages,
        report.id
    );
    let _ = writeln!(out);
    let _ = writeln!(out, ">>> VERDICT");
    let _ = writeln!(
        out,
        "Status: {} | Risk: {}",
        summary.status_text, summary.highest_risk
    );
    let _ = writeln!(
        out,
        "Confidence: Forensic {:.0}% + Assessor {:.0}% | Anomalies: {}",
        summary.avg_forensic_score * 100.0,
        summary.avg_assessment_confidence,
        summary.total_anomalies
    );

    for page in &report.pages {
        let verdict = &page.verdict;
        let _ = writeln!(out, "\n{RULE}");
        let _ = writeln!(
            out,
            "PAGE {} | {} ({})",
            page.page_index + 1,
            verdict.label,
            verdict.risk_level
        );
        let _ = writeln!(
            out,
            "Score: {:.2} | Agreement: {}",
            verdict.combined_score, verdict.agreement
        );
        let _ = writeln!(out);

        match &page.metrics {
            Some(metrics) => {
                let _ = writeln!(
                    out,
                    "FORENSIC [{:.2}]: ELA {:.1}% | Tampered Regions: {} | Copy-Move: {} | Noise Threshold: {}",
                    page.forensic.score,
                    metrics.ela_hot_pixel_ratio * 100.0,
                    metrics.tampered_regions.len(),
                    metrics.copy_move_matches,
                    metrics.noise_threshold
                );
            }
            None => {
                let _ = writeln!(out, "FORENSIC [unavailable]");
            }
        }
        if !page.forensic.reasons.is_empty() {
            let _ = writeln!(
                out,
                "Red Flags: {}",
                page.forensic
                    .reasons
                    .iter()
                    .take(2)
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(" | ")
            );
        }

        match &page.assessment {
            Some(assessment) => {
                let _ = writeln!(out);
                let _ = writeln!(
                    out,
                    "VISUAL ASSESSMENT [{}%]:",
                    assessment.confidence_score
                );
                if !assessment.overall_assessment.is_empty() {
                    let _ = writeln!(out, "{}", truncated(&assessment.overall_assessment, 400));
                }

                if !assessment.tampering_regions.is_empty() {
                    let _ = writeln!(
                        out,
                        "\nREPORTED REGIONS ({} found):",
                        assessment.tampering_regions.len()
                    );
                    for (i, region) in assessment
                        .tampering_regions
                        .iter()
                        .take(REGION_DISPLAY_LIMIT)
                        .enumerate()
                    {
                        let _ = writeln!(
                            out,
                            "\n#{}. {} [{}%]",
                            i + 1,
                            region.location,
                            region.confidence
                        );
                        if !region.suspected_method.is_empty() {
                            let _ = writeln!(out, "    Method: {}", region.suspected_method);
                        }
                        if !region.description.is_empty() {
                            let _ =
                                writeln!(out, "    Evidence: {}", truncated(&region.description, 150));
                        }
                        if !region.anomalies.is_empty() {
                            let _ = writeln!(
                                out,
                                "    Issues: {}",
                                region.anomalies[..region.anomalies.len().min(3)].join(", ")
                            );
                        }
                    }
                }
            }
            None => {
                let _ = writeln!(out);
                let _ = writeln!(out, "VISUAL ASSESSMENT [unavailable]");
            }
        }
    }

    let _ = writeln!(out, "\n{RULE}");
    let _ = writeln!(
        out,
        "Report combines pixel forensics (noise, ELA, copy-move) + independent visual assessment"
    );
    let _ = writeln!(out, "{RULE}");

    out
}

/// Write the text and JSON renditions of a report into `dir`.
///
/// Returns the two file paths. Filenames carry the analysis id, so
/// concurrent runs never collide.
pub fn write_reports(report: &DocumentReport, dir: &Path) -> Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(dir)?;
    let stem = format!("tampering_report_{}", report.id);
    let text_path = dir.join(format!("{stem}.txt"));
    let json_path = dir.join(format!("{stem}.json"));

    std::fs::write(&text_path, render_text_report(report))?;
    std::fs::write(&json_path, serde_json::to_vec_pretty(report)?)?;

    info!(text = %text_path.display(), json = %json_path.display(), "reports written");
    Ok((text_path, json_path))
}

/// Truncate long collaborator text for display.
fn truncated(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_owned()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}...")
    }
}

// -- Tests --------------------------------------------------------------------
