//! Detected event intervals and run results.

use serde::{Deserialize, Serialize};

/// A closed tick interval during which at least one tank gained mass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    /// First tick of the event (index into the full input series).
    pub start: usize,
    /// Last tick of the event.
    pub end: usize,
}

impl Event {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length in ticks (`end - start`).
    pub const fn duration_ticks(&self) -> usize {
        self.end - self.start
    }
}

/// Build events from parallel start/end index lists.
///
/// Extra entries in the longer list are ignored.
pub fn events_from_indexes(starts: &[usize], ends: &[usize]) -> Vec<Event> {
    starts
        .iter()
        .zip(ends)
        .map(|(&start, &end)| Event::new(start, end))
        .collect()
}

/// True if every event is non-empty and strictly precedes the next one.
pub fn is_strictly_ordered(events: &[Event]) -> bool {
    events.iter().all(|e| e.start < e.end) && events.windows(2).all(|w| w[0].end < w[1].start)
}

/// Outcome of one detection run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Detection {
    /// Final events, ordered and non-overlapping.
    pub events: Vec<Event>,
    /// First tick the scanner was allowed to look at.
    pub valid_start: usize,
    /// Candidates dropped by the noise filter.
    pub rejected: usize,
    /// Raw events absorbed into a neighbour by merging.
    pub merged: usize,
    /// Events whose start was moved back by flow refinement.
    pub refined: usize,
}

impl Detection {
    pub fn start_indexes(&self) -> Vec<usize> {
        self.events.iter().map(|e| e.start).collect()
    }

    pub fn end_indexes(&self) -> Vec<usize> {
        self.events.iter().map(|e| e.end).collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
