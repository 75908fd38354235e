//! Rendering of detection results.
//!
//! A [`FileReport`] is everything reported for one readings file; `detect`
//! prints one as a table, `batch` prints one summary line per file.

use std::io::Write;

use anyhow::Result;
use eoos_core::{Detection, EventMetrics, Series, event_metrics};
use serde::Serialize;

use crate::Config;

/// Report for one readings file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub label: String,
    pub valid_start: usize,
    pub rejected: usize,
    pub merged: usize,
    pub refined: usize,
    /// Events hidden by the outlier filter.
    pub outliers: usize,
    pub events: Vec<EventMetrics>,
}

impl FileReport {
    /// Measure every detected event and drop outliers unless
    /// `include_outliers` is set.
    pub fn build(
        label: String,
        series: &Series,
        detection: &Detection,
        config: &Config,
        include_outliers: bool,
    ) -> Self {
        let metrics = event_metrics(series, &detection.events, &config.peaks);
        let total = metrics.len();
        let events: Vec<EventMetrics> = if include_outliers {
            metrics
        } else {
            metrics
                .into_iter()
                .filter(|m| !config.outliers.is_outlier(m))
                .collect()
        };

        Self {
            label,
            valid_start: detection.valid_start,
            rejected: detection.rejected,
            merged: detection.merged,
            refined: detection.refined,
            outliers: total - events.len(),
            events,
        }
    }

    pub fn feces_total(&self) -> f64 {
        self.events.iter().map(|m| m.feces_delta).sum()
    }

    pub fn urine_total(&self) -> f64 {
        self.events.iter().map(|m| m.urine_delta).sum()
    }
}

// ========== Text Output ==========

fn or_dash<T>(value: Option<T>, render: impl FnOnce(T) -> String) -> String {
    value.map_or_else(|| "-".to_string(), render)
}

/// Writes the per-event table for one file.
pub fn write_events<W: Write>(writer: &mut W, report: &FileReport) -> Result<()> {
    writeln!(writer, "EOOS EVENTS: {}", report.label)?;
    writeln!(
        writer,
        "valid from tick {}, {} rejected, {} merged, {} refined",
        report.valid_start, report.rejected, report.merged, report.refined
    )?;
    writeln!(writer)?;

    if report.events.is_empty() {
        writeln!(writer, "No events detected.")?;
    } else {
        writeln!(
            writer,
            "{:>3}  {:>8}  {:>6}  {:>6}  {:>5}  {:>6}  {:>7}  {:>7}  {:>7}  {:>6}  {:>5}  {:>5}",
            "#", "TIME", "START", "END", "TICKS", "SECS", "FECES", "URINE", "TOTAL", "FLOW", "FIRST",
            "PEAKS"
        )?;
        for m in &report.events {
            let time = or_dash(m.start_time, |t| t.format("%H:%M:%S").to_string());
            let secs = or_dash(m.duration_secs, |s| format!("{s:.1}"));
            let flow = or_dash(m.flow_total, |f| format!("{f:.2}"));
            let first = if m.urine_first { "urine" } else { "feces" };
            let peaks = format!("{}/{}", m.feces_peaks, m.urine_peaks);
            writeln!(
                writer,
                "{:>3}  {time:>8}  {:>6}  {:>6}  {:>5}  {secs:>6}  {:>7.3}  {:>7.3}  {:>7.3}  {flow:>6}  {first:>5}  {peaks:>5}",
                m.ordinal,
                m.start,
                m.end,
                m.duration_ticks,
                m.feces_delta,
                m.urine_delta,
                m.total_delta,
            )?;
        }
        writeln!(writer)?;
        writeln!(
            writer,
            "{} events, feces {:.3}, urine {:.3}",
            report.events.len(),
            report.feces_total(),
            report.urine_total()
        )?;
    }

    if report.outliers > 0 {
        writeln!(
            writer,
            "{} hidden as outliers (use --all to show)",
            report.outliers
        )?;
    }

    Ok(())
}

/// Writes the report as pretty JSON.
pub fn write_json<W: Write, T: Serialize>(writer: &mut W, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    writeln!(writer, "{json}")?;
    Ok(())
}
