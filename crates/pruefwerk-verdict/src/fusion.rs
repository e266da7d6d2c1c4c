// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Agreement-aware fusion of the forensic verdict and the visual assessment.
//
// Neither signal is trusted alone: the forensic math false-positives on
// heavily recompressed scans, and the visual assessor can hallucinate or
// miss subtle edits. Concordance is rewarded; disagreement is capped at a
// medium score and surfaced for human review rather than silently resolved.

use tracing::debug;

use pruefwerk_core::types::{
    Agreement, ForensicVerdict, IntegratedLabel, IntegratedVerdict, RiskLevel, VisualAssessment,
};

/// Forensic score above which the quantitative side calls tampering.
const FORENSIC_TAMPERED_THRESHOLD: f64 = 0.45;
/// Assessor confidence (0-1) above which its positive call counts.
const ASSESSOR_CONFIDENCE_THRESHOLD: f64 = 0.5;
/// Cap on the combined score under disagreement.
const DISAGREEMENT_CAP: f64 = 0.6;
/// Combined score above which an agreed positive becomes high confidence.
const HIGH_CONFIDENCE_THRESHOLD: f64 = 0.7;
/// Combined score above which a page needs review even without agreement
/// on tampering.
const REVIEW_THRESHOLD: f64 = 0.35;

/// Fuse one page's forensic verdict with its visual assessment.
///
/// `assessment` is `None` when the assessor call failed or was never made;
/// the absent collaborator is treated as a low-confidence "clean" call,
/// which forces the disagreement path whenever the forensic score alone
/// says tampered — the page surfaces for review instead of defaulting to a
/// false clean.
pub fn fuse(forensic: &ForensicVerdict, assessment: Option<&VisualAssessment>) -> IntegratedVerdict {
    let forensic_score = forensic.score;
    let assessor_confidence = assessment
        .map(|a| f64::from(a.confidence_score) / 100.0)
        .unwrap_or(0.0);

    let forensic_says_tampered = forensic_score > FORENSIC_TAMPERED_THRESHOLD;
    let assessor_says_tampered = assessment
        .map(|a| {
            a.tampering_detected == Some(true)
                && assessor_confidence > ASSESSOR_CONFIDENCE_THRESHOLD
        })
        .unwrap_or(false);

    let (agreement, combined_score) = if forensic_says_tampered == assessor_says_tampered {
        let combined = if assessor_says_tampered {
            forensic_score * 0.5 + assessor_confidence * 0.5
        } else {
            // Both say clean: halve the average so compounded confidence in
            // "clean" reads as a genuinely low score.
            (forensic_score * 0.5 + (1.0 - assessor_confidence) * 0.5) * 0.5
        };
        (Agreement::Agree, combined)
    } else {
        let combined = ((forensic_score + assessor_confidence) / 2.0).min(DISAGREEMENT_CAP);
        (Agreement::Disagree, combined)
    };

    let both_tampered =
        agreement == Agreement::Agree && forensic_says_tampered && assessor_says_tampered;

    // Priority order matters: an agreed positive outranks everything, then
    // disagreement always goes to manual review.
    let (label, risk_level) = if both_tampered && combined_score > HIGH_CONFIDENCE_THRESHOLD {
        (
            IntegratedLabel::TamperingDetectedHighConfidence,
            RiskLevel::Critical,
        )
    } else if both_tampered {
        (IntegratedLabel::LikelyTampered, RiskLevel::High)
    } else if agreement == Agreement::Disagree {
        (IntegratedLabel::InconclusiveManualReview, RiskLevel::Medium)
    } else if combined_score > REVIEW_THRESHOLD {
        (IntegratedLabel::PossibleTamperingReview, RiskLevel::Medium)
    } else {
        (IntegratedLabel::NoSignificantTampering, RiskLevel::Low)
    };

    debug!(
        forensic_score,
        assessor_confidence,
        ?agreement,
        combined_score,
        %label,
        "verdicts fused"
    );

    IntegratedVerdict {
        combined_score,
        label,
        risk_level,
        agreement,
        forensic_contribution: forensic_score,
        assessor_contribution: assessor_confidence,
    }
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pruefwerk_core::types::ForensicLabel;

    fn forensic(score: f64) -> ForensicVerdict {
        ForensicVerdict {
            score,
            label: if score > 0.45 {
                ForensicLabel::LikelyTampered
            } else {
                ForensicLabel::LikelyOriginal
            },
            reasons: Vec::new(),
        }
    }

    fn assessment(tampering: Option<bool>, confidence: u32) -> VisualAssessment {
        VisualAssessment {
            tampering_detected: tampering,
            confidence_score: confidence,
            ..VisualAssessment::default()
        }
    }

    #[test]
    fn agreed_positive_with_high_score_is_critical() {
        let a = assessment(Some(true), 90);
        let verdict = fuse(&forensic(0.8), Some(&a));

        assert_eq!(verdict.agreement, Agreement::Agree);
        assert_eq!(
            verdict.label,
            IntegratedLabel::TamperingDetectedHighConfidence
        );
        assert_eq!(verdict.risk_level, RiskLevel::Critical);
        assert!((verdict.combined_score - 0.85).abs() < 1e-9);
    }

    #[test]
    fn agreed_positive_with_moderate_score_is_high_risk() {
        let a = assessment(Some(true), 60);
        let verdict = fuse(&forensic(0.5), Some(&a));

        // Combined 0.55 <= 0.7: likely tampered, not high confidence.
        assert_eq!(verdict.agreement, Agreement::Agree);
        assert_eq!(verdict.label, IntegratedLabel::LikelyTampered);
        assert_eq!(verdict.risk_level, RiskLevel::High);
    }

    #[test]
    fn disagreement_caps_score_and_forces_review() {
        let a = assessment(Some(false), 80);
        let verdict = fuse(&forensic(0.8), Some(&a));

        assert_eq!(verdict.agreement, Agreement::Disagree);
        assert!(verdict.combined_score <= 0.6);
        assert_eq!(verdict.label, IntegratedLabel::InconclusiveManualReview);
        assert_eq!(verdict.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn confident_assessor_against_quiet_forensics_also_disagrees() {
        let a = assessment(Some(true), 95);
        let verdict = fuse(&forensic(0.1), Some(&a));

        assert_eq!(verdict.agreement, Agreement::Disagree);
        assert_eq!(verdict.label, IntegratedLabel::InconclusiveManualReview);
        // (0.1 + 0.95)/2 = 0.525, under the cap.
        assert!((verdict.combined_score - 0.525).abs() < 1e-9);
    }

    #[test]
    fn agreed_clean_is_low_risk_with_halved_score() {
        let a = assessment(Some(false), 90);
        let verdict = fuse(&forensic(0.1), Some(&a));

        assert_eq!(verdict.agreement, Agreement::Agree);
        // (0.1*0.5 + 0.1*0.5) * 0.5 = 0.075.
        assert!((verdict.combined_score - 0.075).abs() < 1e-9);
        assert_eq!(verdict.label, IntegratedLabel::NoSignificantTampering);
        assert_eq!(verdict.risk_level, RiskLevel::Low);
    }

    #[test]
    fn unconfident_positive_assessor_counts_as_clean() {
        // tampering_detected=true but confidence 50 (not > 0.5): the
        // assessor call does not count as a positive.
        let a = assessment(Some(true), 50);
        let verdict = fuse(&forensic(0.2), Some(&a));
        assert_eq!(verdict.agreement, Agreement::Agree);
        assert_eq!(verdict.label, IntegratedLabel::NoSignificantTampering);
    }

    #[test]
    fn missing_assessment_forces_disagree_when_forensics_fire() {
        let verdict = fuse(&forensic(0.5), None);

        assert_eq!(verdict.agreement, Agreement::Disagree);
        assert_ne!(verdict.label, IntegratedLabel::NoSignificantTampering);
        assert_eq!(verdict.label, IntegratedLabel::InconclusiveManualReview);
        assert_eq!(verdict.assessor_contribution, 0.0);
    }

    #[test]
    fn missing_assessment_with_quiet_forensics_is_clean() {
        let verdict = fuse(&forensic(0.1), None);

        // Both sides read as clean; (0.05 + 0.5) * 0.5 = 0.275 < 0.35.
        assert_eq!(verdict.agreement, Agreement::Agree);
        assert_eq!(verdict.label, IntegratedLabel::NoSignificantTampering);
    }

    #[test]
    fn agreed_clean_with_middling_score_requests_review() {
        // Forensics just under the threshold, assessor unsure: combined
        // (0.44*0.5 + 0.6*0.5)*0.5 = 0.26 stays clean; push the forensic
        // score up via a weak assessor to cross 0.35.
        let a = assessment(Some(false), 10);
        let verdict = fuse(&forensic(0.44), Some(&a));
        // (0.22 + 0.45) * 0.5 = 0.335 -> still clean.
        assert_eq!(verdict.label, IntegratedLabel::NoSignificantTampering);

        let a = assessment(None, 0);
        let verdict = fuse(&forensic(0.45), Some(&a));
        // (0.225 + 0.5) * 0.5 = 0.3625 > 0.35 -> review.
        assert_eq!(verdict.label, IntegratedLabel::PossibleTamperingReview);
        assert_eq!(verdict.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn null_tampering_flag_never_counts_as_positive() {
        let a = assessment(None, 99);
        let verdict = fuse(&forensic(0.9), Some(&a));
        // Assessor did not commit; forensics say tampered -> disagreement.
        assert_eq!(verdict.agreement, Agreement::Disagree);
    }
}
