// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pruefwerk-verdict — Pure verdict logic: fuses the forensic score with the
// visual assessment into one page-level verdict, and rolls page verdicts up
// into a document summary. No I/O, no suspension, no shared state.

pub mod aggregate;
pub mod fusion;

pub use aggregate::summarize_document;
pub use fusion::fuse;
