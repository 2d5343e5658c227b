//! CLI module
//!
//! Command-line interface for reading a delta stream.
//!
//! # Commands
//!
//! - `url` - Print the first request URL without touching the network
//! - `page` - Fetch one raw page
//! - `tail` - Pull items and print them as JSON

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
