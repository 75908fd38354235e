//! Prepared per-tick readings as produced by the upstream cleaning stage.

use std::io::BufRead;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One resampled tick of both scales and the optional flow sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Wall-clock time of the tick (scale-local, no timezone).
    pub date_time: NaiveDateTime,
    /// Solids tank weight. `None` while the scale warms up.
    #[serde(default)]
    pub feces: Option<f64>,
    /// Liquids tank weight.
    #[serde(default)]
    pub urine: Option<f64>,
    /// Flow-sensor reading, when a flow sensor is installed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<f64>,
}

#[derive(Debug, Error)]
pub enum ReadingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Parse newline-delimited JSON readings. Blank lines are skipped; a
/// malformed line is an error, since every line is one tick.
pub fn parse_readings<R: BufRead>(reader: R) -> Result<Vec<Reading>, ReadingError> {
    let mut readings = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let reading: Reading = serde_json::from_str(trimmed).map_err(|source| ReadingError::Json {
            line: idx + 1,
            source,
        })?;
        readings.push(reading);
    }

    tracing::trace!(count = readings.len(), "parsed readings");
    Ok(readings)
}
