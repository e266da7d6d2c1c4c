// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Request payload and response contract for the visual assessor.
//
// The reply is collaborator-controlled JSON: every field is extracted
// defensively with a safe default, never trusting presence or type. A reply
// that is not a JSON object at all — or that carries an error field — is a
// collaborator failure and surfaces as an error so the caller can fall back
// to the degraded fusion path.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::codecs::png::PngEncoder;
use image::RgbImage;
use serde_json::Value;
use tracing::debug;

use pruefwerk_core::error::{PruefwerkError, Result};
use pruefwerk_core::types::{AssessedRegion, VisualAssessment};

/// One page's worth of input for the visual assessor.
///
/// The forensic summary is advisory context: the assessor forms its own
/// judgment from the image and may contradict the quantitative findings.
#[derive(Debug, Clone)]
pub struct AssessmentRequest {
    pub page_index: usize,
    /// PNG-encoded page raster, base64.
    pub image_base64: String,
    pub media_type: &'static str,
    pub forensic_summary: String,
}

impl AssessmentRequest {
    /// Build a request from a decoded page raster.
    pub fn new(page_index: usize, page: &RgbImage, forensic_summary: String) -> Result<Self> {
        let mut png = Vec::new();
        let encoder = PngEncoder::new(&mut png);
        page.write_with_encoder(encoder).map_err(|err| {
            PruefwerkError::ImageEncode(format!("assessor payload encode failed: {err}"))
        })?;

        Ok(Self {
            page_index,
            image_base64: BASE64.encode(&png),
            media_type: "image/png",
            forensic_summary,
        })
    }
}

/// External visual-reasoning collaborator.
///
/// Implementations own transport, credentials, retries, and timeouts. The
/// engine holds exactly one assessor, injected at construction — analysis
/// code never reaches for a global client.
#[async_trait]
pub trait VisualAssessor: Send + Sync {
    /// Assess one page. Implementations should parse the raw reply with
    /// [`parse_assessment`] so field defaults stay consistent.
    async fn assess(&self, request: AssessmentRequest) -> Result<VisualAssessment>;
}

/// Assessor stub for runs without a configured collaborator.
///
/// Always fails, which routes every page through the degraded fusion path
/// ("requires review" rather than a false clean).
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableAssessor;

#[async_trait]
impl VisualAssessor for UnavailableAssessor {
    async fn assess(&self, _request: AssessmentRequest) -> Result<VisualAssessment> {
        Err(PruefwerkError::Assessor(
            "no visual assessor configured".to_owned(),
        ))
    }
}

/// Parse a raw assessor reply into a [`VisualAssessment`].
///
/// Absent or mistyped fields default to `None`/`0`/empty. Only two shapes
/// are hard failures: a reply that is not a JSON object, and a reply whose
/// `error` field is set.
pub fn parse_assessment(raw: &str) -> Result<VisualAssessment> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|err| PruefwerkError::AssessorPayload(format!("not valid JSON: {err}")))?;
    let object = value
        .as_object()
        .ok_or_else(|| PruefwerkError::AssessorPayload("reply is not a JSON object".to_owned()))?;

    if let Some(err) = object.get("error") {
        return Err(PruefwerkError::AssessorPayload(format!(
            "assessor reported an error: {err}"
        )));
    }

    let tampering_detected = match object.get("tampering_detected") {
        Some(Value::Bool(b)) => Some(*b),
        _ => None,
    };

    let confidence_score = object
        .get("confidence_score")
        .and_then(Value::as_f64)
        .map(|v| v.clamp(0.0, 100.0) as u32)
        .unwrap_or(0);

    let risk_level = object
        .get("risk_level")
        .and_then(Value::as_str)
        .unwrap_or("UNKNOWN")
        .to_owned();

    let detected_anomalies = object
        .get("detected_anomalies")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let overall_assessment = object
        .get("overall_assessment")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned();

    let tampering_regions = object
        .get("tampering_regions")
        .and_then(Value::as_array)
        .map(|regions| regions.iter().map(assessed_region).collect())
        .unwrap_or_default();

    let assessment = VisualAssessment {
        tampering_detected,
        confidence_score,
        risk_level,
        detected_anomalies,
        overall_assessment,
        tampering_regions,
    };
    debug!(
        tampering_detected = ?assessment.tampering_detected,
        confidence = assessment.confidence_score,
        regions = assessment.tampering_regions.len(),
        "assessor reply parsed"
    );
    Ok(assessment)
}

/// Extract one region entry with per-field defaults.
fn assessed_region(value: &Value) -> AssessedRegion {
    let str_field = |key: &str| -> String {
        value
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned()
    };

    AssessedRegion {
        location: str_field("exact_location"),
        confidence: value
            .get("confidence_this_region")
            .and_then(Value::as_f64)
            .map(|v| v.clamp(0.0, 100.0) as u32)
            .unwrap_or(0),
        suspected_method: str_field("suspected_tampering_method"),
        description: str_field("visual_description"),
        anomalies: value
            .get("specific_anomalies")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default(),
    }
}

// -- Tests --------------------------------------------------------------------
