// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pruefwerk-engine — Orchestrates the per-document analysis pipeline.
//
// Pages run as independent tasks (forensics on the blocking pool, the
// assessor call on the async runtime), join per page into an integrated
// verdict, and meet at the document-aggregation barrier. Also renders the
// final human-readable report.

pub mod pipeline;
pub mod progress;
pub mod report;

pub use pipeline::DocumentPipeline;
pub use progress::{LogProgress, NullProgress, ProgressObserver};
pub use report::{render_text_report, write_reports};
