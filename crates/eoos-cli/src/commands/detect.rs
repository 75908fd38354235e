//! Detect command for reporting the events in one readings file.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use eoos_core::detect_events;

use super::report::{FileReport, write_events, write_json};
use super::util::{file_label, load_series};
use crate::Config;

pub fn run<W: Write>(
    writer: &mut W,
    path: &Path,
    config: &Config,
    json: bool,
    all: bool,
) -> Result<()> {
    let series = load_series(path, config.derivative_periods)?;
    let detection = detect_events(&series, &config.detection)
        .with_context(|| format!("detection failed for {}", path.display()))?;

    let report = FileReport::build(file_label(path), &series, &detection, config, all);
    tracing::debug!(
        label = %report.label,
        events = report.events.len(),
        outliers = report.outliers,
        "built report"
    );

    if json {
        write_json(writer, &report)
    } else {
        write_events(writer, &report)
    }
}
