//! CLI commands and argument parsing

use clap::{Parser, Subcommand};

/// deltafeed CLI
#[derive(Parser, Debug)]
#[command(name = "deltafeed")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// API method (e.g. permalink.getDelta)
    #[arg(short, long, global = true)]
    pub api: Option<String>,

    /// Vendor key
    #[arg(long, global = true)]
    pub vendor: Option<String>,

    /// Extra query parameter, repeatable
    #[arg(short, long = "param", value_name = "KEY=VALUE", value_parser = parse_key_val, global = true)]
    pub params: Vec<(String, String)>,

    /// API version tag
    #[arg(long, global = true)]
    pub api_version: Option<String>,

    /// Endpoint override
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Attempts per page
    #[arg(long, global = true)]
    pub retries: Option<u32>,

    /// Seconds between attempts
    #[arg(long, global = true)]
    pub retry_sleep: Option<u64>,

    /// Inline options JSON, overridden by the flags above
    #[arg(long, global = true)]
    pub options_json: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Print the first request URL
    Url,

    /// Fetch one raw page
    Page {
        /// Fetch this URL instead of the first page
        #[arg(long)]
        next_url: Option<String>,
    },

    /// Pull items and print them
    Tail {
        /// Stop after this many items (0 = until the stream ends)
        #[arg(short = 'n', long, default_value = "0")]
        limit: usize,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one item per line)
    Json,
    /// Indented JSON
    Pretty,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
