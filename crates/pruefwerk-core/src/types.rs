// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Prüfwerk tampering engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnalysisId(pub Uuid);

impl AnalysisId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AnalysisId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AnalysisId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Risk attached to a page or document verdict.
///
/// The derived `Ord` follows declaration order, so the document-level
/// roll-up can take `max()` across pages.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        };
        write!(f, "{s}")
    }
}

/// Whether the forensic math and the visual assessor reached the same call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Agreement {
    Agree,
    Disagree,
}

impl std::fmt::Display for Agreement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Agree => write!(f, "AGREE"),
            Self::Disagree => write!(f, "DISAGREE"),
        }
    }
}

/// Verdict label produced by the forensic score alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForensicLabel {
    LikelyOriginal,
    LikelyTampered,
}

impl std::fmt::Display for ForensicLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LikelyOriginal => write!(f, "LIKELY ORIGINAL"),
            Self::LikelyTampered => write!(f, "LIKELY TAMPERED"),
        }
    }
}

/// Page-level label after fusing the forensic and visual verdicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntegratedLabel {
    TamperingDetectedHighConfidence,
    LikelyTampered,
    PossibleTamperingReview,
    InconclusiveManualReview,
    NoSignificantTampering,
}

impl std::fmt::Display for IntegratedLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::TamperingDetectedHighConfidence => "TAMPERING DETECTED - HIGH CONFIDENCE",
            Self::LikelyTampered => "LIKELY TAMPERED",
            Self::PossibleTamperingReview => "POSSIBLE TAMPERING - REQUIRES REVIEW",
            Self::InconclusiveManualReview => "INCONCLUSIVE - REQUIRES MANUAL REVIEW",
            Self::NoSignificantTampering => "NO SIGNIFICANT TAMPERING DETECTED",
        };
        write!(f, "{s}")
    }
}

/// Result of the scan/photocopy classifier.
///
/// Informational: downstream thresholds may be tuned by this flag but the
/// verdict logic never branches on it directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanClassification {
    pub is_scanned: bool,
    /// Fraction of classifier checks that fired, in [0, 1].
    pub confidence: f64,
    pub reasons: Vec<String>,
}

/// One statistically anomalous region extracted from the noise map.
///
/// Invariants enforced at extraction time: `area` is at least the configured
/// minimum, the bounding box keeps the configured margin from every border,
/// and `area` never exceeds the configured fraction of the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TamperedRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Number of foreground pixels in the connected component (not the
    /// bounding-box area).
    pub area: u32,
    pub center: (u32, u32),
    /// Mean noise-map intensity over the component pixels.
    pub mean_intensity: f64,
    /// Component mean divided by the page's global noise-map mean.
    pub intensity_ratio: f64,
    /// Detection confidence, bounded to [0.7, 1.0].
    pub confidence: f64,
    pub reasons: Vec<String>,
}

/// Quantitative signals computed once per page by the forensic analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForensicMetrics {
    /// Fraction of ELA samples above the hot-pixel threshold, in [0, 1].
    pub ela_hot_pixel_ratio: f64,
    /// Anomalous regions, sorted by descending mean intensity.
    pub tampered_regions: Vec<TamperedRegion>,
    /// Number of copy-move descriptor pairs that survived filtering.
    pub copy_move_matches: usize,
    /// Adaptive binarization threshold applied to the noise map.
    pub noise_threshold: u8,
    /// Global mean of the normalized noise map.
    pub noise_global_mean: f64,
    /// Global standard deviation of the normalized noise map.
    pub noise_global_std: f64,
    /// Structural similarity against a blurred copy (texture-uniformity
    /// control signal, not load-bearing for the score).
    pub ssim_score: f64,
    /// Mean cross-channel standard deviation (flattened-color control
    /// signal, not load-bearing for the score).
    pub mean_channel_std: f64,
    pub scan: ScanClassification,
}

/// Page verdict derived from [`ForensicMetrics`] alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForensicVerdict {
    /// Aggregated forensic score in [0, 1].
    pub score: f64,
    pub label: ForensicLabel,
    pub reasons: Vec<String>,
}

/// One suspicious region reported by the visual assessor.
///
/// All fields are free text from the collaborator; absent fields default to
/// empty rather than failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssessedRegion {
    #[serde(default)]
    pub location: String,
    /// Assessor confidence for this region, 0-100.
    #[serde(default)]
    pub confidence: u32,
    #[serde(default)]
    pub suspected_method: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub anomalies: Vec<String>,
}

/// Structured judgment returned by the external visual assessor.
///
/// Opaque input to the fusion step: produced at the deserialization boundary
/// with safe defaults and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisualAssessment {
    /// `None` when the assessor declined to commit either way.
    pub tampering_detected: Option<bool>,
    /// Assessor confidence, clamped to 0-100.
    pub confidence_score: u32,
    /// Collaborator-reported risk wording, kept verbatim for the report.
    pub risk_level: String,
    pub detected_anomalies: Vec<serde_json::Value>,
    pub overall_assessment: String,
    pub tampering_regions: Vec<AssessedRegion>,
}

/// Fused page-level verdict combining forensic math and visual assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegratedVerdict {
    /// Combined score in [0, 1]; capped at 0.6 under disagreement.
    pub combined_score: f64,
    pub label: IntegratedLabel,
    pub risk_level: RiskLevel,
    pub agreement: Agreement,
    /// The forensic score that entered the fusion.
    pub forensic_contribution: f64,
    /// The assessor confidence (0-1) that entered the fusion.
    pub assessor_contribution: f64,
}

/// Everything known about a single analyzed page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageAnalysis {
    /// Zero-based page index within the document.
    pub page_index: usize,
    /// SHA-256 of the raw pixel payload, for report provenance.
    pub payload_sha256: String,
    /// `None` when the forensic pass failed for this page (degraded mode).
    pub metrics: Option<ForensicMetrics>,
    pub forensic: ForensicVerdict,
    /// `None` when the assessor call failed or was not configured.
    pub assessment: Option<VisualAssessment>,
    pub verdict: IntegratedVerdict,
}

/// Document-level roll-up of all per-page integrated verdicts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub tampering_detected: bool,
    pub status_text: String,
    pub highest_risk: RiskLevel,
    pub pages_analyzed: usize,
    /// Sum of assessor-reported anomaly counts across pages.
    pub total_anomalies: usize,
    pub avg_forensic_score: f64,
    /// Mean assessor confidence (0-100) across pages; absent assessments
    /// count as 0.
    pub avg_assessment_confidence: f64,
}

/// Final analysis report for one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentReport {
    pub id: AnalysisId,
    pub document_name: String,
    pub analyzed_at: DateTime<Utc>,
    pub total_pages: usize,
    /// Per-page results in page order.
    pub pages: Vec<PageAnalysis>,
    pub summary: DocumentSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_level_ordering() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
        assert!(RiskLevel::High < RiskLevel::Critical);

        let max = [RiskLevel::Low, RiskLevel::Critical, RiskLevel::Medium]
            .into_iter()
            .max()
            .expect("non-empty");
        assert_eq!(max, RiskLevel::Critical);
    }

    #[test]
    fn integrated_label_display_strings() {
        assert_eq!(
            IntegratedLabel::InconclusiveManualReview.to_string(),
            "INCONCLUSIVE - REQUIRES MANUAL REVIEW"
        );
        assert_eq!(
            IntegratedLabel::TamperingDetectedHighConfidence.to_string(),
            "TAMPERING DETECTED - HIGH CONFIDENCE"
        );
    }

    #[test]
    fn visual_assessment_defaults_are_safe() {
        let a = VisualAssessment::default();
        assert_eq!(a.tampering_detected, None);
        assert_eq!(a.confidence_score, 0);
        assert!(a.detected_anomalies.is_empty());
        assert!(a.tampering_regions.is_empty());
    }
}
