//! Detection thresholds, passed explicitly to every stage of a run.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Minimum net mass change a candidate needs on at least one tank.
///
/// Units are the scale's mass units and are calibrated per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseFloor {
    pub feces: f64,
    pub urine: f64,
}

impl NoiseFloor {
    /// Symmetric 0.05 floor on both tanks.
    pub const STANDARD: Self = Self {
        feces: 0.05,
        urine: 0.05,
    };

    /// Coarse solids floor with a sensitive liquids floor (0.5 / 0.01).
    pub const COARSE_SOLIDS: Self = Self {
        feces: 0.5,
        urine: 0.01,
    };

    /// Moderate solids floor (0.1 / 0.05).
    pub const MODERATE_SOLIDS: Self = Self {
        feces: 0.1,
        urine: 0.05,
    };
}

impl Default for NoiseFloor {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// How adjacent raw events are combined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum MergeStrategy {
    /// Merge when the gap between two events is shorter than `max_gap_ticks`.
    Gap { max_gap_ticks: usize },

    /// Always merge gaps shorter than `always_merge_below`; merge gaps
    /// shorter than `max_gap_ticks` only when the flow sensor saw fewer
    /// than `max_flow_samples` valid samples inside the gap.
    FlowGated {
        #[serde(default = "default_max_gap_ticks")]
        max_gap_ticks: usize,
        #[serde(default = "default_always_merge_below")]
        always_merge_below: usize,
        #[serde(default = "default_max_flow_samples")]
        max_flow_samples: usize,
    },
}

const fn default_max_gap_ticks() -> usize {
    MergeStrategy::DEFAULT_MAX_GAP_TICKS
}

const fn default_always_merge_below() -> usize {
    15
}

const fn default_max_flow_samples() -> usize {
    2
}

impl MergeStrategy {
    pub const DEFAULT_MAX_GAP_TICKS: usize = 60;

    /// The flow-gated variant with its historical constants.
    pub const fn flow_gated() -> Self {
        Self::FlowGated {
            max_gap_ticks: default_max_gap_ticks(),
            always_merge_below: default_always_merge_below(),
            max_flow_samples: default_max_flow_samples(),
        }
    }

    pub const fn max_gap_ticks(&self) -> usize {
        match self {
            Self::Gap { max_gap_ticks } | Self::FlowGated { max_gap_ticks, .. } => *max_gap_ticks,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Gap { .. } => "gap",
            Self::FlowGated { .. } => "flow_gated",
        }
    }
}

impl Default for MergeStrategy {
    fn default() -> Self {
        Self::Gap {
            max_gap_ticks: Self::DEFAULT_MAX_GAP_TICKS,
        }
    }
}

/// Configuration for one detection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Consecutive rising steps required to open a candidate. Default: 10.
    pub start_lookahead: usize,

    /// Ticks of non-positive second derivative required to close an event.
    /// Default: 5.
    pub end_lookahead: usize,

    /// Upper bound on `feces_deriv_2` counted as decelerating. Default: 0.
    pub feces_deceleration: f64,

    /// Upper bound on `urine_deriv_2` counted as decelerating. Default: 0.
    pub urine_deceleration: f64,

    pub noise_floor: NoiseFloor,

    pub merge: MergeStrategy,

    /// Pull event starts back to the earliest flow reading before them.
    /// Only applies when the series has a flow channel. Default: true.
    pub refine_start: bool,

    /// How far back (in ticks) start refinement may look. Default: 300.
    pub flow_lookback: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            start_lookahead: 10,
            end_lookahead: 5,
            feces_deceleration: 0.0,
            urine_deceleration: 0.0,
            noise_floor: NoiseFloor::default(),
            merge: MergeStrategy::default(),
            refine_start: true,
            flow_lookback: 300,
        }
    }
}

impl DetectionConfig {
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.start_lookahead == 0 {
            return Err(ConfigError::ZeroLookahead {
                field: "start_lookahead",
            });
        }
        if self.end_lookahead == 0 {
            return Err(ConfigError::ZeroLookahead {
                field: "end_lookahead",
            });
        }
        Ok(())
    }
}
