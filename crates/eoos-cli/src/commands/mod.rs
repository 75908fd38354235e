//! CLI subcommand implementations.

pub mod batch;
pub mod config;
pub mod detect;
pub mod report;
pub mod util;
