// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Prüfwerk — document tampering analysis CLI.
//
// Entry point. Initialises logging, loads pre-rendered page rasters, runs
// the analysis pipeline, and prints/writes the report. Page rendering (PDF
// to raster) is an upstream concern: this binary consumes page images.
//
// No visual assessor is wired in this build, so every page takes the
// degraded fusion path — forensic findings surface as "requires review"
// rather than a standalone verdict.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use pruefwerk_assess::UnavailableAssessor;
use pruefwerk_core::error::{PruefwerkError, Result};
use pruefwerk_engine::{render_text_report, write_reports, DocumentPipeline, LogProgress};
use pruefwerk_forensics::DirectorySink;

/// Analyze document page images for digital tampering.
#[derive(Debug, Parser)]
#[command(name = "pruefwerk", version, about)]
struct Cli {
    /// Page images in page order (PNG, JPEG, TIFF, ...).
    #[arg(required = true)]
    pages: Vec<PathBuf>,

    /// Directory for reports and diagnostic artifacts.
    #[arg(long, short, default_value = "pruefwerk-out")]
    output: PathBuf,

    /// Write per-page diagnostic images (noise map, ELA, region mask, ...).
    #[arg(long)]
    artifacts: bool,

    /// Write the report files in addition to printing the text report.
    #[arg(long)]
    write: bool,

    /// Display name for the analyzed document (defaults to the first page's
    /// file name).
    #[arg(long)]
    name: Option<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "analysis failed");
            ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn run(cli: Cli) -> Result<()> {
    let document_name = cli.name.clone().unwrap_or_else(|| {
        cli.pages[0]
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_owned())
    });

    info!(document = %document_name, pages = cli.pages.len(), "loading page rasters");
    let mut pages = Vec::with_capacity(cli.pages.len());
    for path in &cli.pages {
        let page = image::open(path)
            .map_err(|err| {
                PruefwerkError::ImageDecode(format!("{}: {err}", path.display()))
            })?
            .to_rgb8();
        pages.push(page);
    }

    let mut pipeline = DocumentPipeline::new(Arc::new(UnavailableAssessor))
        .with_progress(Arc::new(LogProgress));
    if cli.artifacts {
        let sink = DirectorySink::new(cli.output.join("artifacts"))?;
        pipeline = pipeline.with_sink(Arc::new(sink));
    }

    let report = pipeline.analyze_document(&document_name, pages).await?;

    println!("{}", render_text_report(&report));

    if cli.write {
        let (text_path, json_path) = write_reports(&report, &cli.output)?;
        info!(text = %text_path.display(), json = %json_path.display(), "reports saved");
    }

    Ok(())
}
