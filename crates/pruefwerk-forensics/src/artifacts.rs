// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Diagnostic artifact emission.
//
// The analyzer can emit its intermediate maps (noise map, region mask, ELA
// map, copy-move overlay) for human review. This is observability tooling:
// a sink failure is logged and never affects verdicts, and the no-op sink
// keeps tests and headless runs free of filesystem side effects.

use std::path::{Path, PathBuf};

use image::DynamicImage;
use tracing::{debug, instrument};

use pruefwerk_core::error::{PruefwerkError, Result};

/// Destination for per-page diagnostic images.
///
/// Implementations must be safe to call from concurrently running page
/// tasks; filenames are derived from the page index, so pages never collide.
pub trait ArtifactSink: Send + Sync {
    /// Persist one named artifact for one page.
    fn save(&self, page_index: usize, name: &str, image: &DynamicImage) -> Result<()>;
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ArtifactSink for NullSink {
    fn save(&self, _page_index: usize, _name: &str, _image: &DynamicImage) -> Result<()> {
        Ok(())
    }
}

/// Sink that writes PNG files into a caller-supplied directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    /// Create the sink, creating the directory if needed.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        std::fs::create_dir_all(root.as_ref())?;
        Ok(Self {
            root: root.as_ref().to_path_buf(),
        })
    }

    /// Directory this sink writes into.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ArtifactSink for DirectorySink {
    #[instrument(skip(self, image), fields(page_index, name))]
    fn save(&self, page_index: usize, name: &str, image: &DynamicImage) -> Result<()> {
        let path = self.root.join(format!("page_{page_index:03}_{name}.png"));
        image
            .save(&path)
            .map_err(|err| PruefwerkError::ArtifactSink(format!("{}: {err}", path.display())))?;
        debug!(path = %path.display(), "diagnostic artifact written");
        Ok(())
    }
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    #[test]
    fn null_sink_accepts_everything() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(4, 4, Luma([0u8])));
        NullSink.save(0, "noise_map", &img).expect("no-op save");
    }

    #[test]
    fn directory_sink_writes_page_unique_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sink = DirectorySink::new(dir.path()).expect("sink");
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(4, 4, Luma([128u8])));

        sink.save(0, "noise_map", &img).expect("save page 0");
        sink.save(1, "noise_map", &img).expect("save page 1");

        assert!(dir.path().join("page_000_noise_map.png").exists());
        assert!(dir.path().join("page_001_noise_map.png").exists());
    }

    #[test]
    fn directory_sink_creates_missing_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("out").join("artifacts");
        let sink = DirectorySink::new(&nested).expect("sink");
        assert!(nested.exists());
        assert_eq!(sink.root(), nested.as_path());
    }
}
