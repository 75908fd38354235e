//! Batch command for running detection over a directory of dates.
//!
//! Every `*.jsonl` file in the directory is one independent series, labelled
//! by its file stem. Files are prepared sequentially and detected in
//! parallel.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use eoos_core::{Series, detect_many};
use serde::Serialize;

use super::report::{FileReport, write_json};
use super::util::{file_label, load_series};
use crate::Config;

/// Outcome for one file of a batch.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum BatchEntry {
    Report(FileReport),
    Failed { label: String, error: String },
}

impl BatchEntry {
    pub fn label(&self) -> &str {
        match self {
            Self::Report(report) => &report.label,
            Self::Failed { label, .. } => label,
        }
    }
}

/// Totals across the successful files of a batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchTotals {
    pub dates: usize,
    pub failed: usize,
    pub events: usize,
    pub outliers: usize,
    pub feces: f64,
    pub urine: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub entries: Vec<BatchEntry>,
    pub totals: BatchTotals,
}

impl BatchReport {
    pub fn new(mut entries: Vec<BatchEntry>) -> Self {
        entries.sort_by(|a, b| a.label().cmp(b.label()));

        let mut totals = BatchTotals::default();
        for entry in &entries {
            match entry {
                BatchEntry::Report(report) => {
                    totals.dates += 1;
                    totals.events += report.events.len();
                    totals.outliers += report.outliers;
                    totals.feces += report.feces_total();
                    totals.urine += report.urine_total();
                }
                BatchEntry::Failed { .. } => totals.failed += 1,
            }
        }

        Self { entries, totals }
    }
}

/// Lists readings files in `dir`, sorted by name.
fn readings_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "jsonl") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Load, detect and measure every readings file in `dir`.
pub fn collect(dir: &Path, config: &Config) -> Result<BatchReport> {
    let mut entries = Vec::new();
    let mut runs: Vec<(String, Series)> = Vec::new();

    for path in readings_files(dir)? {
        let label = file_label(&path);
        match load_series(&path, config.derivative_periods) {
            Ok(series) => runs.push((label, series)),
            Err(err) => {
                let error = format!("{err:#}");
                tracing::warn!(path = %path.display(), %error, "skipping readings file");
                entries.push(BatchEntry::Failed { label, error });
            }
        }
    }

    let results = detect_many(&runs, &config.detection);
    for ((label, result), (_, series)) in results.into_iter().zip(&runs) {
        let entry = match result {
            Ok(detection) => BatchEntry::Report(FileReport::build(
                label.clone(),
                series,
                &detection,
                config,
                false,
            )),
            Err(err) => BatchEntry::Failed {
                label: label.clone(),
                error: err.to_string(),
            },
        };
        entries.push(entry);
    }

    Ok(BatchReport::new(entries))
}

/// Writes one summary line per date plus totals.
pub fn write_summary<W: Write>(writer: &mut W, report: &BatchReport) -> Result<()> {
    if report.entries.is_empty() {
        writeln!(writer, "No readings files found.")?;
        return Ok(());
    }

    writeln!(
        writer,
        "{:<12}  {:>6}  {:>6}  {:>8}  {:>8}",
        "DATE", "EVENTS", "HIDDEN", "FECES", "URINE"
    )?;
    for entry in &report.entries {
        match entry {
            BatchEntry::Report(r) => writeln!(
                writer,
                "{:<12}  {:>6}  {:>6}  {:>8.3}  {:>8.3}",
                r.label,
                r.events.len(),
                r.outliers,
                r.feces_total(),
                r.urine_total()
            )?,
            BatchEntry::Failed { label, error } => {
                writeln!(writer, "{label:<12}  error: {error}")?;
            }
        }
    }

    let totals = &report.totals;
    writeln!(
        writer,
        "{:<12}  {:>6}  {:>6}  {:>8.3}  {:>8.3}",
        "TOTAL", totals.events, totals.outliers, totals.feces, totals.urine
    )?;
    if totals.failed > 0 {
        writeln!(
            writer,
            "{} of {} dates failed",
            totals.failed,
            totals.failed + totals.dates
        )?;
    }

    Ok(())
}

pub fn run<W: Write>(writer: &mut W, dir: &Path, config: &Config, json: bool) -> Result<()> {
    let report = collect(dir, config)?;
    tracing::debug!(
        dates = report.totals.dates,
        failed = report.totals.failed,
        events = report.totals.events,
        "batch complete"
    );

    if json {
        write_json(writer, &report)
    } else {
        write_summary(writer, &report)
    }
}
