//! Structure-of-arrays view of a prepared scale series.
//!
//! Every column is indexed by tick position. Missing samples are `NaN`, so
//! any comparison against them is false and a gap never satisfies a
//! threshold.

use std::fmt;
use std::ops::Range;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::DataError;
use crate::reading::Reading;

/// Default lag (in ticks) for the discrete derivatives.
pub const DEFAULT_DERIVATIVE_PERIODS: usize = 5;

/// One of the two weighed tanks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Feces,
    Urine,
}

impl Channel {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Feces => "feces",
            Self::Urine => "urine",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A complete, uniformly sampled series. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    feces: Vec<f64>,
    urine: Vec<f64>,
    feces_deriv: Vec<f64>,
    urine_deriv: Vec<f64>,
    feces_deriv_2: Vec<f64>,
    urine_deriv_2: Vec<f64>,
    flow: Option<Vec<f64>>,
    date_time: Option<Vec<NaiveDateTime>>,
}

impl Series {
    pub fn builder() -> SeriesBuilder {
        SeriesBuilder::default()
    }

    /// Build a series from prepared readings, deriving both derivative
    /// orders with a lag of `periods` ticks.
    ///
    /// The flow channel is present only if at least one reading carries a
    /// flow value.
    pub fn from_readings(readings: &[Reading], periods: usize) -> Result<Self, DataError> {
        if readings.is_empty() {
            return Err(DataError::EmptySeries);
        }
        if periods == 0 {
            return Err(DataError::ZeroDerivativeLag);
        }

        let times: Vec<NaiveDateTime> = readings.iter().map(|r| r.date_time).collect();
        if let Some(pos) = times.windows(2).position(|w| w[0] >= w[1]) {
            return Err(DataError::UnorderedTime { index: pos + 1 });
        }

        let feces: Vec<f64> = readings.iter().map(|r| r.feces.unwrap_or(f64::NAN)).collect();
        let urine: Vec<f64> = readings.iter().map(|r| r.urine.unwrap_or(f64::NAN)).collect();
        let flow = readings
            .iter()
            .any(|r| r.flow.is_some())
            .then(|| readings.iter().map(|r| r.flow.unwrap_or(f64::NAN)).collect());

        let feces_deriv = lagged_derivative(&feces, &times, periods);
        let urine_deriv = lagged_derivative(&urine, &times, periods);
        let feces_deriv_2 = lagged_derivative(&feces_deriv, &times, periods);
        let urine_deriv_2 = lagged_derivative(&urine_deriv, &times, periods);

        Ok(Self {
            feces,
            urine,
            feces_deriv,
            urine_deriv,
            feces_deriv_2,
            urine_deriv_2,
            flow,
            date_time: Some(times),
        })
    }

    pub fn len(&self) -> usize {
        self.feces.len()
    }

    /// True if the series has no ticks (never, once built).
    pub fn is_empty(&self) -> bool {
        self.feces.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.len() - 1
    }

    pub fn feces(&self) -> &[f64] {
        &self.feces
    }

    pub fn urine(&self) -> &[f64] {
        &self.urine
    }

    pub fn feces_deriv(&self) -> &[f64] {
        &self.feces_deriv
    }

    pub fn urine_deriv(&self) -> &[f64] {
        &self.urine_deriv
    }

    pub fn feces_deriv_2(&self) -> &[f64] {
        &self.feces_deriv_2
    }

    pub fn urine_deriv_2(&self) -> &[f64] {
        &self.urine_deriv_2
    }

    pub fn flow(&self) -> Option<&[f64]> {
        self.flow.as_deref()
    }

    pub fn has_flow(&self) -> bool {
        self.flow.is_some()
    }

    pub fn date_time(&self, index: usize) -> Option<NaiveDateTime> {
        self.date_time.as_ref().and_then(|t| t.get(index).copied())
    }

    /// Wall-clock seconds between two ticks, if timestamps are known.
    #[expect(
        clippy::cast_precision_loss,
        reason = "event spans are far below 2^52 milliseconds"
    )]
    pub fn elapsed_seconds(&self, from: usize, to: usize) -> Option<f64> {
        let start = self.date_time(from)?;
        let end = self.date_time(to)?;
        Some((end - start).num_milliseconds() as f64 / 1000.0)
    }

    /// First tick at which both tanks have reported at least once.
    pub fn valid_start(&self) -> Result<usize, DataError> {
        let feces = first_valid(&self.feces).ok_or(DataError::ChannelNeverValid {
            channel: Channel::Feces,
        })?;
        let urine = first_valid(&self.urine).ok_or(DataError::ChannelNeverValid {
            channel: Channel::Urine,
        })?;
        Ok(feces.max(urine))
    }

    /// The suffix of the series the detector is allowed to scan.
    pub fn valid_range(&self) -> Result<Range<usize>, DataError> {
        Ok(self.valid_start()?..self.len())
    }
}

fn first_valid(values: &[f64]) -> Option<usize> {
    values.iter().position(|v| !v.is_nan())
}

#[expect(
    clippy::cast_precision_loss,
    reason = "lag spans are far below 2^52 milliseconds"
)]
fn lagged_derivative(values: &[f64], times: &[NaiveDateTime], periods: usize) -> Vec<f64> {
    (0..values.len())
        .map(|t| {
            if t < periods {
                return f64::NAN;
            }
            let elapsed = (times[t] - times[t - periods]).num_milliseconds() as f64 / 1000.0;
            if elapsed > 0.0 {
                (values[t] - values[t - periods]) / elapsed
            } else {
                f64::NAN
            }
        })
        .collect()
}

/// Column-by-column constructor. Columns that are never set are filled
/// with `NaN`; every set column must have the same length.
#[derive(Debug, Default, Clone)]
pub struct SeriesBuilder {
    feces: Option<Vec<f64>>,
    urine: Option<Vec<f64>>,
    feces_deriv: Option<Vec<f64>>,
    urine_deriv: Option<Vec<f64>>,
    feces_deriv_2: Option<Vec<f64>>,
    urine_deriv_2: Option<Vec<f64>>,
    flow: Option<Vec<f64>>,
    date_time: Option<Vec<NaiveDateTime>>,
}

impl SeriesBuilder {
    #[must_use]
    pub fn feces(mut self, values: impl Into<Vec<f64>>) -> Self {
        self.feces = Some(values.into());
        self
    }

    #[must_use]
    pub fn urine(mut self, values: impl Into<Vec<f64>>) -> Self {
        self.urine = Some(values.into());
        self
    }

    #[must_use]
    pub fn feces_deriv(mut self, values: impl Into<Vec<f64>>) -> Self {
        self.feces_deriv = Some(values.into());
        self
    }

    #[must_use]
    pub fn urine_deriv(mut self, values: impl Into<Vec<f64>>) -> Self {
        self.urine_deriv = Some(values.into());
        self
    }

    #[must_use]
    pub fn feces_deriv_2(mut self, values: impl Into<Vec<f64>>) -> Self {
        self.feces_deriv_2 = Some(values.into());
        self
    }

    #[must_use]
    pub fn urine_deriv_2(mut self, values: impl Into<Vec<f64>>) -> Self {
        self.urine_deriv_2 = Some(values.into());
        self
    }

    #[must_use]
    pub fn flow(mut self, values: impl Into<Vec<f64>>) -> Self {
        self.flow = Some(values.into());
        self
    }

    #[must_use]
    pub fn date_time(mut self, values: impl Into<Vec<NaiveDateTime>>) -> Self {
        self.date_time = Some(values.into());
        self
    }

    pub fn build(self) -> Result<Series, DataError> {
        let len = [
            &self.feces,
            &self.urine,
            &self.feces_deriv,
            &self.urine_deriv,
            &self.feces_deriv_2,
            &self.urine_deriv_2,
            &self.flow,
        ]
        .into_iter()
        .flatten()
        .map(Vec::len)
        .chain(self.date_time.as_ref().map(Vec::len))
        .next()
        .unwrap_or(0);

        if len == 0 {
            return Err(DataError::EmptySeries);
        }

        let column = |name: &'static str, values: Option<Vec<f64>>| match values {
            Some(v) if v.len() != len => Err(DataError::LengthMismatch {
                column: name,
                expected: len,
                actual: v.len(),
            }),
            Some(v) => Ok(v),
            None => Ok(vec![f64::NAN; len]),
        };

        if let Some(times) = &self.date_time {
            if times.len() != len {
                return Err(DataError::LengthMismatch {
                    column: "date_time",
                    expected: len,
                    actual: times.len(),
                });
            }
        }

        let flow = match self.flow {
            Some(v) => Some(column("flow", Some(v))?),
            None => None,
        };

        Ok(Series {
            feces: column("feces", self.feces)?,
            urine: column("urine", self.urine)?,
            feces_deriv: column("feces_deriv", self.feces_deriv)?,
            urine_deriv: column("urine_deriv", self.urine_deriv)?,
            feces_deriv_2: column("feces_deriv_2", self.feces_deriv_2)?,
            urine_deriv_2: column("urine_deriv_2", self.urine_deriv_2)?,
            flow,
            date_time: self.date_time,
        })
    }
}
