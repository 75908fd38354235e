//! Single-pass event scanner.
//!
//! # Algorithm Summary
//!
//! 1. While scanning, test each tick with [`is_start`]
//! 2. On a start, walk forward to the first tick satisfying [`is_end`]
//! 3. Keep the interval if it clears the noise floor, otherwise drop it
//! 4. Resume scanning at `end + 1` either way
//!
//! A rejected candidate still consumes its span; rescanning inside it could
//! pick up a sub-window of the same noise again.

use crate::config::DetectionConfig;
use crate::event::Event;
use crate::predicates::{EndCriteria, detect_end, is_real_event, is_start};
use crate::series::Series;

/// Raw scanner output, before merging and refinement.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScanResult {
    pub events: Vec<Event>,
    /// Candidates that failed the noise filter.
    pub rejected: usize,
}

/// Current scanner state.
#[derive(Debug, Clone, Copy)]
enum ScanState {
    /// Looking for a start at `curr`.
    Scanning,
    /// A start was found; the end is pending.
    DetectingEnd { start: usize },
}

/// Scan `series` from tick `from` to the end.
///
/// `from` is normally [`Series::valid_start`]. The pass stops once the
/// cursor reaches the last index.
pub fn scan(series: &Series, from: usize, config: &DetectionConfig) -> ScanResult {
    let last = series.last_index();
    let end_criteria = EndCriteria::from(config);
    let mut result = ScanResult::default();
    let mut state = ScanState::Scanning;
    let mut curr = from;

    while curr < last {
        state = match state {
            ScanState::Scanning => {
                if is_start(series, curr, config.start_lookahead) {
                    ScanState::DetectingEnd { start: curr }
                } else {
                    curr += 1;
                    ScanState::Scanning
                }
            }
            ScanState::DetectingEnd { start } => {
                let end = detect_end(series, start, &end_criteria);
                if is_real_event(series, start, end, &config.noise_floor) {
                    tracing::trace!(start, end, "accepted candidate");
                    result.events.push(Event::new(start, end));
                } else {
                    tracing::trace!(start, end, "rejected candidate as noise");
                    result.rejected += 1;
                }
                curr = end + 1;
                ScanState::Scanning
            }
        };
    }

    result
}
