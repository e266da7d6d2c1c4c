// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Prüfwerk.

use thiserror::Error;

/// Top-level error type for all Prüfwerk operations.
#[derive(Debug, Error)]
pub enum PruefwerkError {
    // -- Raster / input errors --
    #[error("image decode failed: {0}")]
    ImageDecode(String),

    #[error("image encoding failed: {0}")]
    ImageEncode(String),

    // -- Forensic analysis errors --
    #[error("forensic analysis failed: {0}")]
    Analysis(String),

    // -- Visual assessor (collaborator) errors --
    #[error("visual assessor call failed: {0}")]
    Assessor(String),

    #[error("visual assessor returned a malformed payload: {0}")]
    AssessorPayload(String),

    // -- Aggregation errors --
    #[error("document produced no analyzable pages")]
    EmptyDocument,

    // -- Diagnostic side channel --
    #[error("artifact sink error: {0}")]
    ArtifactSink(String),

    // -- Infrastructure --
    #[error("pipeline task failed: {0}")]
    Task(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PruefwerkError>;
