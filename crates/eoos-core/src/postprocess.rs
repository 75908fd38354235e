//! Event post-processing: merging close events and flow-assisted start
//! refinement.

use std::ops::Range;

use crate::config::MergeStrategy;
use crate::event::Event;

/// A flow sample counts when it is present, finite and positive.
pub fn is_valid_flow(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn flow_samples_in(flow: Option<&[f64]>, range: Range<usize>) -> usize {
    flow.and_then(|f| f.get(range))
        .map_or(0, |window| window.iter().filter(|v| is_valid_flow(**v)).count())
}

fn should_merge(strategy: &MergeStrategy, gap: usize, gap_flow: usize) -> bool {
    match *strategy {
        MergeStrategy::Gap { max_gap_ticks } => gap < max_gap_ticks,
        MergeStrategy::FlowGated {
            max_gap_ticks,
            always_merge_below,
            max_flow_samples,
        } => gap < always_merge_below || (gap < max_gap_ticks && gap_flow < max_flow_samples),
    }
}

/// Merge adjacent events whose gap (`next.start - prev.end`) is short
/// enough under `strategy`. A merged event keeps the earlier start and the
/// later end.
///
/// Gaps and gap flow counts are taken from the raw list, and pairs are
/// folded from the highest index down so that removing an entry never
/// shifts a pair that is still pending.
pub fn merge_close(events: &[Event], strategy: &MergeStrategy, flow: Option<&[f64]>) -> Vec<Event> {
    let mut merged = events.to_vec();

    let decisions: Vec<bool> = events
        .windows(2)
        .map(|pair| {
            let (prev, next) = (pair[0], pair[1]);
            let gap = next.start.saturating_sub(prev.end);
            let gap_flow = flow_samples_in(flow, prev.end + 1..next.start);
            should_merge(strategy, gap, gap_flow)
        })
        .collect();

    for (i, merge) in decisions.iter().enumerate().rev() {
        if *merge {
            merged[i].end = merged[i + 1].end;
            merged.remove(i + 1);
        }
    }

    merged
}

/// Move each event's start back to the earliest valid flow sample in
/// `max(previous end + 1, lower_bound, start - lookback) ..= start`.
///
/// Events with no valid flow in that range keep their start. The window
/// never reaches into the previous event, so ordering is preserved.
pub fn adjust_start(events: &[Event], flow: &[f64], lower_bound: usize, lookback: usize) -> Vec<Event> {
    let mut floor = lower_bound;
    let mut adjusted = Vec::with_capacity(events.len());

    for event in events {
        let first = floor.max(event.start.saturating_sub(lookback));
        let start = (first..=event.start)
            .find(|&t| flow.get(t).copied().is_some_and(is_valid_flow))
            .unwrap_or(event.start);

        if start != event.start {
            tracing::trace!(from = event.start, to = start, "refined event start from flow");
        }
        adjusted.push(Event::new(start, event.end));
        floor = event.end + 1;
    }

    adjusted
}
