//! Elimination-event detection for two-tank weight scales.
//!
//! This crate contains:
//! - Series: per-tick tank weights, their derivatives and optional flow
//! - Detection: the start/end scanner, event merging and flow refinement
//! - Metrics: per-event mass deltas, timing and derivative peak analytics

pub mod config;
mod detector;
pub mod error;
pub mod event;
pub mod metrics;
pub mod peaks;
pub mod postprocess;
pub mod predicates;
pub mod reading;
mod scanner;
pub mod series;

pub use config::{DetectionConfig, MergeStrategy, NoiseFloor};
pub use detector::{detect_events, detect_many};
pub use error::{ConfigError, DataError, DetectError};
pub use event::{Detection, Event};
pub use metrics::{EventMetrics, OutlierFilter, event_metrics};
pub use peaks::{ChannelPair, PeakConfig, PeakPair};
pub use reading::{Reading, ReadingError, parse_readings};
pub use scanner::{ScanResult, scan};
pub use series::{Channel, DEFAULT_DERIVATIVE_PERIODS, Series, SeriesBuilder};
