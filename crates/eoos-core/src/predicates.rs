//! Boundary predicates: pure tests over a window of the series.

use crate::config::{DetectionConfig, NoiseFloor};
use crate::series::Series;

/// Deceleration test parameters for closing an event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EndCriteria {
    /// Ticks after the candidate index that must all be decelerating.
    pub lookahead: usize,
    pub feces_deceleration: f64,
    pub urine_deceleration: f64,
}

impl EndCriteria {
    /// Plateau test (`deriv_2 <= 0` on both tanks) over `lookahead` ticks.
    pub const fn new(lookahead: usize) -> Self {
        Self {
            lookahead,
            feces_deceleration: 0.0,
            urine_deceleration: 0.0,
        }
    }
}

impl From<&DetectionConfig> for EndCriteria {
    fn from(config: &DetectionConfig) -> Self {
        Self {
            lookahead: config.end_lookahead,
            feces_deceleration: config.feces_deceleration,
            urine_deceleration: config.urine_deceleration,
        }
    }
}

/// True if either tank rises strictly on every step from `index` over the
/// next `lookahead` steps.
///
/// The window is truncated at the end of the series. At the last index it is
/// empty and the test passes vacuously, so callers must not treat the last
/// index as a candidate.
pub fn is_start(series: &Series, index: usize, lookahead: usize) -> bool {
    let last = series.last_index();
    if index >= last {
        return true;
    }
    let stop = index.saturating_add(lookahead).min(last);
    let window = index..=stop;

    strictly_rising(&series.feces()[window.clone()]) || strictly_rising(&series.urine()[window])
}

fn strictly_rising(window: &[f64]) -> bool {
    window.windows(2).all(|pair| pair[1] - pair[0] > 0.0)
}

/// True if both tanks decelerate on every tick of `index+1 ..= index+lookahead`
/// (clipped to the series), or if `index` is the last tick.
pub fn is_end(series: &Series, index: usize, criteria: &EndCriteria) -> bool {
    let last = series.last_index();
    if index >= last {
        return true;
    }
    let stop = index.saturating_add(criteria.lookahead).min(last);
    let window = index + 1..=stop;

    series.feces_deriv_2()[window.clone()]
        .iter()
        .all(|v| *v <= criteria.feces_deceleration)
        && series.urine_deriv_2()[window]
            .iter()
            .all(|v| *v <= criteria.urine_deceleration)
}

/// First index after `start` at which [`is_end`] holds.
///
/// Always terminates: the last index forces an end.
pub fn detect_end(series: &Series, start: usize, criteria: &EndCriteria) -> usize {
    let mut index = start + 1;
    while !is_end(series, index, criteria) {
        index += 1;
    }
    index
}

/// True if either tank gained strictly more than its noise floor between
/// `start` and `end`.
pub fn is_real_event(series: &Series, start: usize, end: usize, floor: &NoiseFloor) -> bool {
    let feces = series.feces();
    let urine = series.urine();

    feces[end] - feces[start] > floor.feces || urine[end] - urine[start] > floor.urine
}
