// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pruefwerk-forensics — Quantitative tampering signals computed from pixel
// data alone.
//
// Provides the per-page forensic analyzer (noise-inconsistency mapping,
// tampered-region extraction, error-level analysis, copy-move detection,
// scan/photocopy classification) and the diagnostic artifact sink used to
// emit intermediate maps for human review.

pub mod analyzer;
pub mod artifacts;
pub mod classify;
pub mod copymove;
pub mod ela;
pub mod noise;
pub mod regions;
pub mod support;

// Re-export the primary entry points so callers can use
// `pruefwerk_forensics::ForensicAnalyzer` etc.
pub use analyzer::ForensicAnalyzer;
pub use artifacts::{ArtifactSink, DirectorySink, NullSink};
