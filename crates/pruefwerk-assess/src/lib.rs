// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pruefwerk-assess — Interface boundary to the external visual assessor.
//
// The assessor itself (an LLM-based vision service) lives outside this
// workspace. This crate owns the data contract only: the request payload
// (encoded raster plus an advisory forensic summary) and the defensive
// deserialization of the structured reply.

pub mod contract;
pub mod summary;

pub use contract::{parse_assessment, AssessmentRequest, UnavailableAssessor, VisualAssessor};
pub use summary::forensic_summary;
