//! EOOS command-line library.
//!
//! This crate provides the CLI interface for elimination-event detection.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands};
pub use config::Config;
