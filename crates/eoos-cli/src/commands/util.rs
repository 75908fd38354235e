//! Shared utilities for CLI commands.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use eoos_core::{Series, parse_readings};

/// Read a JSONL readings file and prepare its derivative columns.
pub fn load_series(path: &Path, derivative_periods: usize) -> Result<Series> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let readings = parse_readings(BufReader::new(file))
        .with_context(|| format!("failed to parse {}", path.display()))?;
    tracing::debug!(path = %path.display(), readings = readings.len(), "loaded readings");

    Series::from_readings(&readings, derivative_periods)
        .with_context(|| format!("failed to prepare series from {}", path.display()))
}

/// Label for a readings file: its stem, or the whole name when it has none.
pub fn file_label(path: &Path) -> String {
    path.file_stem()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_series_reads_jsonl() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("20201224.jsonl");
        std::fs::write(
            &path,
            concat!(
                r#"{"date_time":"2020-12-24T10:00:00","feces":1.0,"urine":2.0}"#,
                "\n",
                r#"{"date_time":"2020-12-24T10:00:01","feces":1.1,"urine":2.0,"flow":0.3}"#,
                "\n\n",
            ),
        )
        .unwrap();

        let series = load_series(&path, 1).unwrap();
        assert_eq!(series.len(), 2);
        assert!(series.has_flow());
        assert_eq!(file_label(&path), "20201224");
    }

    #[test]
    fn load_series_reports_bad_line() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("bad.jsonl");
        std::fs::write(&path, "{\"date_time\":\"2020-12-24T10:00:00\"}\nnot json\n").unwrap();

        let err = load_series(&path, 1).unwrap_err();
        assert!(format!("{err:#}").contains("line 2"), "{err:#}");
    }
}
