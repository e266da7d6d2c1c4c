// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-document analysis pipeline.
//
// Each page is an independent task: the CPU-bound forensic pass runs on the
// blocking pool behind a semaphore sized to the available cores, then the
// page's assessor call is issued with the forensic summary as context (a
// soft ordering within the page; pages never wait on each other). The
// document summary is the single barrier at the end. Dropping the returned
// future aborts in-flight page tasks; forensic work is idempotent, so
// nothing needs rolling back.

use std::sync::Arc;

use chrono::Utc;
use image::RgbImage;
use sha2::{Digest, Sha256};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, instrument, warn};

use pruefwerk_assess::{forensic_summary, AssessmentRequest, VisualAssessor};
use pruefwerk_core::config::AnalyzerConfig;
use pruefwerk_core::error::{PruefwerkError, Result};
use pruefwerk_core::types::{AnalysisId, DocumentReport, PageAnalysis};
use pruefwerk_forensics::{ArtifactSink, ForensicAnalyzer, NullSink};
use pruefwerk_verdict::{fuse, summarize_document};

use crate::progress::{NullProgress, ProgressObserver};

/// Orchestrates forensic analysis, visual assessment, verdict fusion, and
/// aggregation for one document at a time.
///
/// Holds the only reference to the visual assessor — analysis code receives
/// data, never service handles.
pub struct DocumentPipeline {
    analyzer: Arc<ForensicAnalyzer>,
    assessor: Arc<dyn VisualAssessor>,
    sink: Arc<dyn ArtifactSink>,
    progress: Arc<dyn ProgressObserver>,
    max_parallel: usize,
}

impl DocumentPipeline {
    /// Create a pipeline with default configuration, no artifact emission,
    /// and no progress reporting.
    pub fn new(assessor: Arc<dyn VisualAssessor>) -> Self {
        let max_parallel = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        Self {
            analyzer: Arc::new(ForensicAnalyzer::default()),
            assessor,
            sink: Arc::new(NullSink),
            progress: Arc::new(NullProgress),
            max_parallel,
        }
    }

    /// Replace the analyzer configuration.
    pub fn with_config(mut self, config: AnalyzerConfig) -> Self {
        self.analyzer = Arc::new(ForensicAnalyzer::new(config));
        self
    }

    /// Emit diagnostic artifacts through the given sink.
    pub fn with_sink(mut self, sink: Arc<dyn ArtifactSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Report page completions to the given observer.
    pub fn with_progress(mut self, progress: Arc<dyn ProgressObserver>) -> Self {
        self.progress = progress;
        self
    }

    /// Bound the number of concurrently running forensic passes.
    pub fn with_max_parallel(mut self, max_parallel: usize) -> Self {
        self.max_parallel = max_parallel.max(1);
        self
    }

    /// Analyze all pages of one document and aggregate the verdicts.
    ///
    /// Pages are decoded rasters in page order; results come back in the
    /// same order regardless of completion order.
    #[instrument(skip(self, pages), fields(document_name, page_count = pages.len()))]
    pub async fn analyze_document(
        &self,
        document_name: &str,
        pages: Vec<RgbImage>,
    ) -> Result<DocumentReport> {
        if pages.is_empty() {
            return Err(PruefwerkError::EmptyDocument);
        }
        let total = pages.len();
        info!(total, "document analysis started");

        let semaphore = Arc::new(Semaphore::new(self.max_parallel));
        let mut tasks: JoinSet<Result<(usize, PageAnalysis)>> = JoinSet::new();

        for (index, page) in pages.into_iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let analyzer = Arc::clone(&self.analyzer);
            let assessor = Arc::clone(&self.assessor);
            let sink = Arc::clone(&self.sink);
            let page = Arc::new(page);

            tasks.spawn(async move {
                let permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|err| PruefwerkError::Task(format!("semaphore closed: {err}")))?;

                let payload_sha256 = sha256_hex(page.as_raw());

                // CPU-bound forensic pass on the blocking pool.
                let blocking_page = Arc::clone(&page);
                let blocking_sink = Arc::clone(&sink);
                let forensic_result = tokio::task::spawn_blocking(move || {
                    analyzer.analyze_page(index, &blocking_page, blocking_sink.as_ref())
                })
                .await
                .map_err(|err| PruefwerkError::Task(format!("forensic task: {err}")))?;

                // Forensic work is done; free the CPU slot before the
                // latency-dominated assessor call.
                drop(permit);

                let (metrics, forensic) = match forensic_result {
                    Ok((metrics, verdict)) => (Some(metrics), verdict),
                    Err(err) => {
                        warn!(page = index, error = %err, "forensic pass failed; continuing degraded");
                        (None, ForensicAnalyzer::unavailable_verdict(&err.to_string()))
                    }
                };

                let summary_text = match &metrics {
                    Some(metrics) => forensic_summary(metrics, &forensic),
                    None => "Forensic analysis unavailable for this page.".to_owned(),
                };

                let assessment = match AssessmentRequest::new(index, &page, summary_text) {
                    Ok(request) => match assessor.assess(request).await {
                        Ok(assessment) => Some(assessment),
                        Err(err) => {
                            warn!(page = index, error = %err, "visual assessment unavailable");
                            None
                        }
                    },
                    Err(err) => {
                        warn!(page = index, error = %err, "assessor request not built");
                        None
                    }
                };

                let verdict = fuse(&forensic, assessment.as_ref());

                Ok((
                    index,
                    PageAnalysis {
                        page_index: index,
                        payload_sha256,
                        metrics,
                        forensic,
                        assessment,
                        verdict,
                    },
                ))
            });
        }

        let mut analyzed: Vec<PageAnalysis> = Vec::with_capacity(total);
        let mut completed = 0usize;
        while let Some(joined) = tasks.join_next().await {
            let (_, page) =
                joined.map_err(|err| PruefwerkError::Task(format!("page task: {err}")))??;
            completed += 1;
            self.progress.on_page_complete(completed, total);
            analyzed.push(page);
        }
        analyzed.sort_by_key(|p| p.page_index);

        // A run where every forensic pass failed has nothing trustworthy to
        // aggregate.
        if analyzed.iter().all(|p| p.metrics.is_none() && p.assessment.is_none()) {
            return Err(PruefwerkError::EmptyDocument);
        }

        let summary = summarize_document(&analyzed)?;
        info!(
            status = %summary.status_text,
            risk = %summary.highest_risk,
            "document analysis complete"
        );

        Ok(DocumentReport {
            id: AnalysisId::new(),
            document_name: document_name.to_owned(),
            analyzed_at: Utc::now(),
            total_pages: total,
            pages: analyzed,
            summary,
        })
    }
}

/// SHA-256 of a byte slice as lowercase hex — page payload fingerprint for
/// report provenance.
fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use image::Rgb;
    use pruefwerk_assess::parse_assessment;
    use pruefwerk_core::types::{Agreement, IntegratedLabel, RiskLevel, VisualAssessment};

    /// Assessor stub replaying a canned JSON reply.
    struct StubAssessor {
        reply: &'static str,
    }

    #[async_trait]
    impl VisualAssessor for StubAssessor {
        async fn assess(&self, _request: AssessmentRequest) -> Result<VisualAssessment> {
            parse_assessment(self.reply)
        }
    }

    fn clean_page() -> RgbImage {
        RgbImage::from_pixel(120, 120, Rgb([230u8, 230, 230]))
    }

    #[tokio::test]
    async fn clean_pages_with_agreeing_assessor_read_clean() {
        let assessor = Arc::new(StubAssessor {
            reply: r#"{"tampering_detected": false, "confidence_score": 85,
                       "risk_level": "LOW", "overall_assessment": "No issues."}"#,
        });
        let pipeline = DocumentPipeline::new(assessor);

        let report = pipeline
            .analyze_document("invoice.pdf", vec![clean_page(), clean_page()])
            .await
            .expect("report");

        assert_eq!(report.total_pages, 2);
        assert_eq!(report.pages.len(), 2);
        assert_eq!(report.pages[0].page_index, 0);
        assert_eq!(report.pages[1].page_index, 1);
        assert!(!report.summary.tampering_detected);
        assert_eq!(report.summary.status_text, "NO TAMPERING DETECTED");
        for page in &report.pages {
            assert_eq!(page.verdict.agreement, Agreement::Agree);
            assert_eq!(page.verdict.label, IntegratedLabel::NoSignificantTampering);
            assert!(page.metrics.is_some());
            assert!(!page.payload_sha256.is_empty());
        }
    }

    #[tokio::test]
    async fn assessor_positive_on_clean_page_forces_review() {
        let assessor = Arc::new(StubAssessor {
            reply: r#"{"tampering_detected": true, "confidence_score": 90,
                       "detected_anomalies": ["suspicious totals"],
                       "risk_level": "HIGH"}"#,
        });
        let pipeline = DocumentPipeline::new(assessor);

        let report = pipeline
            .analyze_document("receipt.png", vec![clean_page()])
            .await
            .expect("report");

        let page = &report.pages[0];
        // Forensics say clean, assessor says tampered: disagreement.
        assert_eq!(page.verdict.agreement, Agreement::Disagree);
        assert_eq!(page.verdict.label, IntegratedLabel::InconclusiveManualReview);
        assert_eq!(
            report.summary.status_text,
            "INCONCLUSIVE - MANUAL REVIEW REQUIRED"
        );
        assert_eq!(report.summary.highest_risk, RiskLevel::Medium);
        assert_eq!(report.summary.total_anomalies, 1);
    }

    #[tokio::test]
    async fn unavailable_assessor_degrades_without_false_clean() {
        let pipeline =
            DocumentPipeline::new(Arc::new(pruefwerk_assess::UnavailableAssessor));

        let report = pipeline
            .analyze_document("scan.jpg", vec![clean_page()])
            .await
            .expect("report");

        let page = &report.pages[0];
        assert!(page.assessment.is_none());
        // Clean page + absent assessor: agreed clean is acceptable; the
        // degraded path only forces review when forensics fire.
        assert!(page.metrics.is_some());
        assert_eq!(report.summary.avg_assessment_confidence, 0.0);
    }

    #[tokio::test]
    async fn empty_document_is_rejected() {
        let pipeline =
            DocumentPipeline::new(Arc::new(pruefwerk_assess::UnavailableAssessor));
        let result = pipeline.analyze_document("empty.pdf", Vec::new()).await;
        assert!(matches!(result, Err(PruefwerkError::EmptyDocument)));
    }

    #[tokio::test]
    async fn pages_return_in_input_order_under_parallelism() {
        let assessor = Arc::new(StubAssessor {
            reply: r#"{"tampering_detected": false, "confidence_score": 70}"#,
        });
        let pipeline = DocumentPipeline::new(assessor).with_max_parallel(4);

        let pages: Vec<RgbImage> = (0..6)
            .map(|i| RgbImage::from_pixel(60 + i * 10, 80, Rgb([200u8, 200, 200])))
            .collect();
        let report = pipeline
            .analyze_document("bundle.pdf", pages)
            .await
            .expect("report");

        let indices: Vec<usize> = report.pages.iter().map(|p| p.page_index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn sha256_hex_matches_known_vector() {
        assert_eq!(
            sha256_hex(b"hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }
}
