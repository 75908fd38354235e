//! Per-event quantities consumed by reporting.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::event::Event;
use crate::peaks::{PeakConfig, PeakPair, pair_channels, paired_peaks, slope};
use crate::postprocess::is_valid_flow;
use crate::series::Series;

/// Derived figures for one detected event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMetrics {
    /// 1-based position in the run's event list.
    pub ordinal: usize,
    pub start: usize,
    pub end: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<NaiveDateTime>,
    pub duration_ticks: usize,
    /// Wall-clock duration, when timestamps are known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
    pub feces_delta: f64,
    pub urine_delta: f64,
    pub total_delta: f64,
    /// Sum of valid per-tick flow readings over the event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_total: Option<f64>,
    /// The urine tank moved before the feces tank did.
    pub urine_first: bool,
    pub feces_peaks: usize,
    pub urine_peaks: usize,
    /// Feces over urine trough-to-peak mass slope, one per matched peak pair.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub slope_ratios: Vec<f64>,
    /// Feces derivative over urine derivative at each channel's first peak.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_slope_ratio: Option<f64>,
    /// Ticks from the first urine trough to the first feces trough.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_lag: Option<i64>,
}

/// Bounds outside which a detected event is not reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlierFilter {
    /// Minimum combined mass change. Default: 0.2.
    pub min_total_delta: f64,
    /// Default: 15 ticks.
    pub min_duration_ticks: usize,
    /// Default: 450 ticks.
    pub max_duration_ticks: usize,
}

impl Default for OutlierFilter {
    fn default() -> Self {
        Self {
            min_total_delta: 0.2,
            min_duration_ticks: 15,
            max_duration_ticks: 450,
        }
    }
}

impl OutlierFilter {
    /// A `NaN` total counts as an outlier.
    pub fn is_outlier(&self, metrics: &EventMetrics) -> bool {
        !(metrics.total_delta >= self.min_total_delta)
            || metrics.duration_ticks < self.min_duration_ticks
            || metrics.duration_ticks > self.max_duration_ticks
    }
}

/// Compute metrics for each event, in order.
pub fn event_metrics(series: &Series, events: &[Event], peaks: &PeakConfig) -> Vec<EventMetrics> {
    events
        .iter()
        .enumerate()
        .map(|(i, event)| measure(series, i + 1, *event, peaks))
        .collect()
}

fn measure(series: &Series, ordinal: usize, event: Event, peaks: &PeakConfig) -> EventMetrics {
    let Event { start, end } = event;
    let span = start..=end;
    let feces = &series.feces()[span.clone()];
    let urine = &series.urine()[span.clone()];

    let feces_delta = series.feces()[end] - series.feces()[start];
    let urine_delta = series.urine()[end] - series.urine()[start];

    let flow_total = series.flow().map(|flow| {
        flow[span.clone()]
            .iter()
            .copied()
            .filter(|v| is_valid_flow(*v))
            .sum()
    });

    let feces_deriv = &series.feces_deriv()[span.clone()];
    let urine_deriv = &series.urine_deriv()[span];
    let feces_pairs = paired_peaks(feces_deriv, peaks.order, peaks.feces_threshold);
    let urine_pairs = paired_peaks(urine_deriv, peaks.order, peaks.urine_threshold);

    let slope_ratios = pair_channels(&feces_pairs, &urine_pairs)
        .into_iter()
        .map(|p| slope(feces, p.feces) / slope(urine, p.urine))
        .collect();
    let firsts = feces_pairs.first().zip(urine_pairs.first());
    let first_slope_ratio = firsts.map(|(f, u)| feces_deriv[f.peak] / urine_deriv[u.peak]);
    let time_lag = firsts.map(|(f, u)| trough_lag(*f, *u));

    EventMetrics {
        ordinal,
        start,
        end,
        start_time: series.date_time(start),
        end_time: series.date_time(end),
        duration_ticks: event.duration_ticks(),
        duration_secs: series.elapsed_seconds(start, end),
        feces_delta,
        urine_delta,
        total_delta: feces_delta + urine_delta,
        flow_total,
        urine_first: first_change(urine) < first_change(feces),
        feces_peaks: feces_pairs.len(),
        urine_peaks: urine_pairs.len(),
        slope_ratios,
        first_slope_ratio,
        time_lag,
    }
}

/// Signed tick offset of the feces trough from the urine trough.
fn trough_lag(feces: PeakPair, urine: PeakPair) -> i64 {
    let magnitude = i64::try_from(feces.trough.abs_diff(urine.trough)).unwrap_or(i64::MAX);
    if feces.trough < urine.trough {
        -magnitude
    } else {
        magnitude
    }
}

/// Offset of the first sample that differs from the first valid sample;
/// the last offset if the channel never moves.
fn first_change(values: &[f64]) -> usize {
    let last = values.len().saturating_sub(1);
    let base = values.iter().copied().find(|v| !v.is_nan()).unwrap_or(f64::NAN);
    values.iter().position(|v| v - base != 0.0).unwrap_or(last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn times(len: usize) -> Vec<NaiveDateTime> {
        let origin = NaiveDate::from_ymd_opt(2020, 12, 24)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        (0..len)
            .map(|s| origin + chrono::Duration::seconds(i64::try_from(s).unwrap()))
            .collect()
    }

    fn sample_series() -> Series {
        // urine rises from tick 2, feces from tick 5
        let feces = vec![1.0, 1.0, 1.0, 1.0, 1.0, 1.2, 1.4, 1.6, 1.6, 1.6];
        let urine = vec![0.5, 0.5, 0.6, 0.7, 0.8, 0.8, 0.8, 0.8, 0.8, 0.8];
        let mut flow = vec![f64::NAN; 10];
        flow[3] = 0.25;
        flow[4] = 0.5;
        Series::builder()
            .feces(feces)
            .urine(urine)
            .flow(flow)
            .date_time(times(10))
            .build()
            .unwrap()
    }

    #[test]
    fn measures_mass_and_duration() {
        let series = sample_series();
        let metrics = event_metrics(&series, &[Event::new(1, 8)], &PeakConfig::default());

        assert_eq!(metrics.len(), 1);
        let m = &metrics[0];
        assert_eq!(m.ordinal, 1);
        assert_eq!(m.duration_ticks, 7);
        assert_eq!(m.duration_secs, Some(7.0));
        assert!((m.feces_delta - 0.6).abs() < 1e-9);
        assert!((m.urine_delta - 0.3).abs() < 1e-9);
        assert!((m.total_delta - 0.9).abs() < 1e-9);
        assert_eq!(m.flow_total, Some(0.75));
        assert!(m.urine_first);
        assert_eq!(m.start_time, series.date_time(1));
    }

    #[test]
    fn feces_first_when_solids_move_earlier() {
        let series = Series::builder()
            .feces([0.0, 0.1, 0.2, 0.3, 0.3])
            .urine([0.0, 0.0, 0.0, 0.1, 0.2])
            .build()
            .unwrap();
        let metrics = event_metrics(&series, &[Event::new(0, 4)], &PeakConfig::default());

        assert!(!metrics[0].urine_first);
        assert_eq!(metrics[0].flow_total, None);
        assert_eq!(metrics[0].duration_secs, None);
    }

    /// Feces derivative with two bumps, urine with one; masses rise linearly.
    fn two_channel_series() -> Series {
        let feces_deriv = vec![
            0.5, 0.2, 0.0, 0.3, 0.6, 0.9, 1.2, 0.9, 0.6, 0.3, 0.2, 0.1, 0.0, 0.4, 0.8, 1.0, 1.4,
            1.0, 0.5, 0.2, 0.1,
        ];
        let mut urine_deriv = vec![0.5, 0.3, 0.1, 0.0, 0.3, 0.6, 0.9, 1.2, 1.5, 1.0, 0.6, 0.3];
        urine_deriv.resize(21, 0.2);
        Series::builder()
            .feces((0..21_u32).map(|i| 0.1 * f64::from(i)).collect::<Vec<_>>())
            .urine((0..21_u32).map(|i| 0.05 * f64::from(i)).collect::<Vec<_>>())
            .feces_deriv(feces_deriv)
            .urine_deriv(urine_deriv)
            .build()
            .unwrap()
    }

    #[test]
    fn slope_ratio_uses_nearest_cross_channel_peak() {
        let series = two_channel_series();
        let peaks = PeakConfig {
            order: 3,
            feces_threshold: 0.1,
            urine_threshold: 0.1,
        };
        let m = event_metrics(&series, &[Event::new(0, 20)], &peaks).remove(0);

        assert_eq!((m.feces_peaks, m.urine_peaks), (2, 1));
        // the single urine peak (8) pairs with the feces peak at 6, not 16
        assert_eq!(m.slope_ratios.len(), 1);
        assert!((m.slope_ratios[0] - 2.0).abs() < 1e-9);
        assert!((m.first_slope_ratio.unwrap() - 0.8).abs() < 1e-9);
        // feces trough at 2, urine trough at 3
        assert_eq!(m.time_lag, Some(-1));
    }

    #[test]
    fn no_peaks_means_no_ratios() {
        let series = sample_series();
        let m = event_metrics(&series, &[Event::new(1, 8)], &PeakConfig::default()).remove(0);

        assert!(m.slope_ratios.is_empty());
        assert_eq!(m.first_slope_ratio, None);
        assert_eq!(m.time_lag, None);
    }

    #[test]
    fn outlier_bounds() {
        let series = sample_series();
        let mut m = event_metrics(&series, &[Event::new(1, 8)], &PeakConfig::default()).remove(0);
        let filter = OutlierFilter::default();

        // too short by default
        assert!(filter.is_outlier(&m));

        m.duration_ticks = 60;
        assert!(!filter.is_outlier(&m));

        m.total_delta = 0.1;
        assert!(filter.is_outlier(&m));

        m.total_delta = f64::NAN;
        assert!(filter.is_outlier(&m));

        m.total_delta = 1.0;
        m.duration_ticks = 451;
        assert!(filter.is_outlier(&m));
    }

    #[test]
    fn ordinals_follow_event_order() {
        let series = sample_series();
        let metrics = event_metrics(
            &series,
            &[Event::new(0, 3), Event::new(5, 9)],
            &PeakConfig::default(),
        );

        let ordinals: Vec<_> = metrics.iter().map(|m| m.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2]);
    }
}
