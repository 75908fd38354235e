//! Local extrema of derivative curves inside an event.
//!
//! Used for reporting only; detection never looks at peaks.

use serde::{Deserialize, Serialize};

/// Peak search parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeakConfig {
    /// Neighbourhood half-width, in ticks, a peak must dominate. Default: 15.
    pub order: usize,
    /// Minimum rise into a feces derivative peak. Default: 0.01.
    pub feces_threshold: f64,
    /// Minimum rise into a urine derivative peak. Default: 0.002.
    pub urine_threshold: f64,
}

impl Default for PeakConfig {
    fn default() -> Self {
        Self {
            order: 15,
            feces_threshold: 0.01,
            urine_threshold: 0.002,
        }
    }
}

/// A derivative peak and the trough that precedes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeakPair {
    pub trough: usize,
    pub peak: usize,
}

/// Candidate extrema positions, relative to the input slice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extrema {
    pub maxima: Vec<usize>,
    pub minima: Vec<usize>,
}

/// Neighbour at `offset` from `i`, clipped to the slice.
fn clipped(values: &[f64], i: usize, offset: isize) -> f64 {
    let last = values.len() - 1;
    let j = i.saturating_add_signed(offset).min(last);
    values[j]
}

fn dominates(
    values: &[f64],
    i: usize,
    order: usize,
    ahead: fn(f64, f64) -> bool,
    behind: fn(f64, f64) -> bool,
) -> bool {
    let v = values[i];
    (1..=order).all(|shift| {
        #[expect(clippy::cast_possible_wrap, reason = "peak orders are tiny")]
        let shift = shift as isize;
        ahead(v, clipped(values, i, shift)) && behind(v, clipped(values, i, -shift))
    })
}

/// Find extrema that dominate `order` neighbours on each side.
///
/// A maximum is strictly above every later neighbour and at least every
/// earlier one, and must have risen by more than `threshold` over the
/// preceding `order` ticks. A minimum mirrors this and must be followed by a
/// rise of more than `threshold` within `order` ticks. An `order` of zero is
/// treated as one.
pub fn local_extrema(values: &[f64], order: usize, threshold: f64) -> Extrema {
    if values.is_empty() {
        return Extrema::default();
    }
    let order = order.max(1);
    let last = values.len() - 1;

    let maxima = (0..values.len())
        .filter(|&i| dominates(values, i, order, |a, b| a > b, |a, b| a >= b))
        .filter(|&i| values[i] - values[i.saturating_sub(order)] > threshold)
        .collect();
    let minima = (0..values.len())
        .filter(|&i| dominates(values, i, order, |a, b| a < b, |a, b| a <= b))
        .filter(|&i| values[(i + order).min(last)] - values[i] > threshold)
        .collect();

    Extrema { maxima, minima }
}

/// Pair each maximum with the nearest unused minimum before it. Maxima with
/// no earlier minimum are dropped.
pub fn paired_peaks(values: &[f64], order: usize, threshold: f64) -> Vec<PeakPair> {
    let Extrema { maxima, mut minima } = local_extrema(values, order, threshold);
    let mut pairs = Vec::new();

    for peak in maxima {
        let nearest = minima
            .iter()
            .enumerate()
            .filter(|(_, m)| **m < peak)
            .max_by_key(|(_, m)| **m)
            .map(|(pos, _)| pos);

        if let Some(pos) = nearest {
            let trough = minima.remove(pos);
            pairs.push(PeakPair { trough, peak });
        }
    }

    pairs
}

/// A feces peak matched to the urine peak nearest to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelPair {
    pub feces: PeakPair,
    pub urine: PeakPair,
}

/// Match peaks across channels.
///
/// Walks the channel with fewer peaks (urine on a tie) and gives each of its
/// peaks the other channel's peak closest in position, the earlier one on
/// equal distance. A peak on the longer side may be matched more than once
/// or not at all.
pub fn pair_channels(feces: &[PeakPair], urine: &[PeakPair]) -> Vec<ChannelPair> {
    let nearest = |target: usize, candidates: &[PeakPair]| {
        candidates
            .iter()
            .copied()
            .min_by_key(|c| c.peak.abs_diff(target))
    };

    if feces.len() < urine.len() {
        feces
            .iter()
            .filter_map(|&f| nearest(f.peak, urine).map(|u| ChannelPair { feces: f, urine: u }))
            .collect()
    } else {
        urine
            .iter()
            .filter_map(|&u| nearest(u.peak, feces).map(|f| ChannelPair { feces: f, urine: u }))
            .collect()
    }
}

/// Average per-tick change of `values` from the pair's trough to its peak.
pub fn slope(values: &[f64], pair: PeakPair) -> f64 {
    let run = pair.peak - pair.trough;
    #[expect(clippy::cast_precision_loss, reason = "event spans are short")]
    let run = run as f64;
    (values[pair.peak] - values[pair.trough]) / run
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two bumps: troughs at 2 and 12, peaks at 6 and 16.
    fn two_bumps() -> Vec<f64> {
        vec![
            0.5, 0.2, 0.0, 0.3, 0.6, 0.9, 1.2, 0.9, 0.6, 0.3, 0.2, 0.1, 0.0, 0.4, 0.8, 1.0, 1.4,
            1.0, 0.5, 0.2, 0.1,
        ]
    }

    #[test]
    fn finds_dominant_extrema() {
        let extrema = local_extrema(&two_bumps(), 3, 0.1);

        assert_eq!(extrema.maxima, vec![6, 16]);
        assert_eq!(extrema.minima, vec![2, 12]);
    }

    #[test]
    fn pairs_peaks_with_preceding_troughs() {
        let pairs = paired_peaks(&two_bumps(), 3, 0.1);

        assert_eq!(
            pairs,
            vec![
                PeakPair { trough: 2, peak: 6 },
                PeakPair {
                    trough: 12,
                    peak: 16
                }
            ]
        );
    }

    #[test]
    fn threshold_drops_shallow_peaks() {
        let pairs = paired_peaks(&two_bumps(), 3, 1.0);
        assert!(pairs.is_empty());
    }

    #[test]
    fn peak_without_trough_is_dropped() {
        // flat lead-in, spike, then decay: a peak but no trough anywhere
        let values = [0.5, 0.5, 0.5, 0.9, 0.5, 0.3, 0.1, 0.1];
        let extrema = local_extrema(&values, 2, 0.1);
        assert_eq!(extrema.maxima, vec![3]);
        assert!(extrema.minima.is_empty());

        assert!(paired_peaks(&values, 2, 0.1).is_empty());
    }

    fn pair(trough: usize, peak: usize) -> PeakPair {
        PeakPair { trough, peak }
    }

    #[test]
    fn fewer_urine_peaks_pick_nearest_feces_peak() {
        let feces = [pair(2, 6), pair(12, 16)];
        let urine = [pair(3, 8)];

        assert_eq!(
            pair_channels(&feces, &urine),
            vec![ChannelPair {
                feces: pair(2, 6),
                urine: pair(3, 8)
            }]
        );
    }

    #[test]
    fn fewer_feces_peaks_pick_nearest_urine_peak() {
        let feces = [pair(10, 14)];
        let urine = [pair(0, 4), pair(9, 12), pair(15, 20)];

        let pairs = pair_channels(&feces, &urine);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].urine, pair(9, 12));
    }

    #[test]
    fn equal_distance_prefers_earlier_peak() {
        let feces = [pair(0, 4), pair(6, 12)];
        let urine = [pair(5, 8)];

        assert_eq!(pair_channels(&feces, &urine)[0].feces, pair(0, 4));
    }

    #[test]
    fn no_channel_pairs_without_peaks_on_both_sides() {
        assert!(pair_channels(&[], &[pair(0, 4)]).is_empty());
        assert!(pair_channels(&[pair(0, 4)], &[]).is_empty());
    }

    #[test]
    fn slope_is_rise_over_run() {
        let values = [1.0, 1.0, 1.5, 2.0, 2.5];
        assert!((slope(&values, pair(1, 4)) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn flat_and_nan_inputs_have_no_extrema() {
        assert_eq!(local_extrema(&[1.0; 10], 3, 0.0), Extrema::default());
        assert_eq!(local_extrema(&[f64::NAN; 10], 3, 0.0), Extrema::default());
        assert_eq!(local_extrema(&[], 3, 0.0), Extrema::default());
    }
}
