// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Progress observation for long-running document analyses.
//
// Pages complete out of order under parallel execution; observers receive a
// monotonically increasing completion count, not a page index.

use tracing::info;

/// Callback interface for pipeline progress.
pub trait ProgressObserver: Send + Sync {
    /// Called once per completed page with the running completion count.
    fn on_page_complete(&self, completed: usize, total: usize);
}

/// Observer that ignores progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgress;

impl ProgressObserver for NullProgress {
    fn on_page_complete(&self, _completed: usize, _total: usize) {}
}

/// Observer that logs progress through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_page_complete(&self, completed: usize, total: usize) {
        info!(completed, total, "page analysis complete");
    }
}
