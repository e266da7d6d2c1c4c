// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document-level aggregation of per-page integrated verdicts.
//
// The roll-up surfaces the worst case across pages: risk is the maximum,
// never an average, and a single inconclusive page marks the whole document
// for manual review.

use tracing::debug;

use pruefwerk_core::error::{PruefwerkError, Result};
use pruefwerk_core::types::{DocumentSummary, IntegratedLabel, PageAnalysis, RiskLevel};

/// Combined score above which a page counts as having issues.
const ISSUE_SCORE_THRESHOLD: f64 = 0.5;
/// Assessor confidence at which its independent positive call counts,
/// regardless of the fused score.
const ASSESSOR_ISSUE_CONFIDENCE: u32 = 60;

/// Roll all per-page verdicts up into one [`DocumentSummary`].
///
/// Fails with [`PruefwerkError::EmptyDocument`] when there are no pages to
/// aggregate — a document with zero analyzed pages has no meaningful
/// summary and must not silently read as clean.
pub fn summarize_document(pages: &[PageAnalysis]) -> Result<DocumentSummary> {
    if pages.is_empty() {
        return Err(PruefwerkError::EmptyDocument);
    }

    let tampering_detected = pages.iter().any(page_has_issues);
    let any_inconclusive = pages
        .iter()
        .any(|p| p.verdict.label == IntegratedLabel::InconclusiveManualReview);

    let status_text = if any_inconclusive {
        "INCONCLUSIVE - MANUAL REVIEW REQUIRED"
    } else if tampering_detected {
        "TAMPERING DETECTED"
    } else {
        "NO TAMPERING DETECTED"
    }
    .to_owned();

    let highest_risk = pages
        .iter()
        .map(|p| p.verdict.risk_level)
        .max()
        .unwrap_or(RiskLevel::Low);

    let total_anomalies = pages
        .iter()
        .filter_map(|p| p.assessment.as_ref())
        .map(|a| a.detected_anomalies.len())
        .sum();

    let page_count = pages.len() as f64;
    let avg_forensic_score = pages.iter().map(|p| p.forensic.score).sum::<f64>() / page_count;
    let avg_assessment_confidence = pages
        .iter()
        .map(|p| {
            p.assessment
                .as_ref()
                .map(|a| f64::from(a.confidence_score))
                .unwrap_or(0.0)
        })
        .sum::<f64>()
        / page_count;

    let summary = DocumentSummary {
        tampering_detected,
        status_text,
        highest_risk,
        pages_analyzed: pages.len(),
        total_anomalies,
        avg_forensic_score,
        avg_assessment_confidence,
    };
    debug!(
        pages = pages.len(),
        tampering = summary.tampering_detected,
        risk = %summary.highest_risk,
        "document summary built"
    );
    Ok(summary)
}

/// A page "has issues" when the fused score is high, the page is
/// inconclusive, or the assessor independently reported tampering with
/// solid confidence.
fn page_has_issues(page: &PageAnalysis) -> bool {
    if page.verdict.combined_score > ISSUE_SCORE_THRESHOLD {
        return true;
    }
    if page.verdict.label == IntegratedLabel::InconclusiveManualReview {
        return true;
    }
    page.assessment
        .as_ref()
        .is_some_and(|a| {
            a.tampering_detected == Some(true)
                && a.confidence_score >= ASSESSOR_ISSUE_CONFIDENCE
        })
}

// -- Tests --------------------------------------------------------------------
