//! Timesheet validator CLI library.
//!
//! This crate provides the CLI interface for the timesheet validator.

mod cli;
pub mod commands;
mod config;
pub mod render;

pub use cli::{Cli, Commands};
pub use config::Config;
