//! Detection runs: valid range → scan → merge → refine.

use rayon::prelude::*;

use crate::config::DetectionConfig;
use crate::error::DetectError;
use crate::event::{Detection, is_strictly_ordered};
use crate::postprocess::{adjust_start, merge_close};
use crate::scanner::scan;
use crate::series::Series;

/// Detect elimination events in a complete series.
///
/// # Algorithm
///
/// 1. Restrict to the range where both tanks have reported
/// 2. Scan once for raw (start, end) candidates and drop noise
/// 3. Merge close events with the configured strategy
/// 4. If the series has a flow channel and refinement is enabled, pull
///    starts back to the earliest flow reading
///
/// The run is a pure function of `series` and `config`.
pub fn detect_events(series: &Series, config: &DetectionConfig) -> Result<Detection, DetectError> {
    config.validate()?;
    let valid_start = series.valid_start()?;

    let raw = scan(series, valid_start, config);
    let merged = merge_close(&raw.events, &config.merge, series.flow());
    let merged_away = raw.events.len() - merged.len();

    let (events, refined) = match series.flow() {
        Some(flow) if config.refine_start => {
            let adjusted = adjust_start(&merged, flow, valid_start, config.flow_lookback);
            let refined = adjusted
                .iter()
                .zip(&merged)
                .filter(|(a, m)| a.start != m.start)
                .count();
            (adjusted, refined)
        }
        _ => (merged, 0),
    };

    debug_assert!(is_strictly_ordered(&events), "events must be ordered and disjoint");

    tracing::debug!(
        valid_start,
        raw = raw.events.len(),
        rejected = raw.rejected,
        merged = merged_away,
        refined,
        events = events.len(),
        merge_strategy = config.merge.name(),
        "detection complete"
    );

    Ok(Detection {
        events,
        valid_start,
        rejected: raw.rejected,
        merged: merged_away,
        refined,
    })
}

/// Run detection over independent series (typically one per date) in
/// parallel. Results are returned in input order, each paired with its
/// label; a failing run does not affect the others.
pub fn detect_many<'a, L>(
    runs: &'a [(L, Series)],
    config: &DetectionConfig,
) -> Vec<(&'a L, Result<Detection, DetectError>)>
where
    L: Sync,
{
    runs.par_iter()
        .map(|(label, series)| {
            let result = detect_events(series, config);
            if let Err(err) = &result {
                tracing::warn!(error = %err, "detection run failed");
            }
            (label, result)
        })
        .collect()
}
