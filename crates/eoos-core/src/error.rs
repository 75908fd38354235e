//! Error types for series construction and detection runs.

use thiserror::Error;

use crate::series::Channel;

/// The input series cannot be scanned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DataError {
    #[error("series is empty")]
    EmptySeries,

    /// The named tank never produced a reading, so no valid start exists.
    #[error("{channel} channel has no valid readings")]
    ChannelNeverValid { channel: Channel },

    #[error("column {column} has {actual} samples, expected {expected}")]
    LengthMismatch {
        column: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("reading {index} is not later than the one before it")]
    UnorderedTime { index: usize },

    #[error("derivative lag must be at least 1 tick")]
    ZeroDerivativeLag,
}

/// A detection parameter is outside its usable range.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be at least 1 tick")]
    ZeroLookahead { field: &'static str },
}

/// Any failure of a single detection run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DetectError {
    #[error(transparent)]
    Data(#[from] DataError),
    #[error("invalid detection config: {0}")]
    Config(#[from] ConfigError),
}
