//! CLI commands and argument parsing

use crate::types::LogLevel;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Solidafy Paging CLI
#[derive(Parser, Debug)]
#[command(name = "solidafy-paging")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level (overridden by --verbose)
    #[arg(long, global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Page through the in-memory sample source
    Demo {
        /// Number of pages the source serves
        #[arg(long, default_value = "3")]
        max_page: u32,

        /// Items per page
        #[arg(long, default_value = "10")]
        page_size: usize,

        /// Number of refresh loads that fail before succeeding
        #[arg(long, default_value = "0")]
        refresh_failures: u32,

        /// Number of append loads that fail before succeeding
        #[arg(long, default_value = "0")]
        append_failures: u32,

        /// Artificial delay per load in milliseconds
        #[arg(long, default_value = "0")]
        delay_ms: u64,

        #[command(flatten)]
        session: SessionArgs,
    },

    /// Page through a JSON HTTP endpoint
    Fetch {
        /// HTTP source definition (YAML or JSON)
        #[arg(short, long)]
        source: PathBuf,

        /// Paging config file (YAML or JSON)
        #[arg(short = 'C', long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        session: SessionArgs,
    },

    /// Validate a paging config file
    Validate {
        /// Paging config file (YAML or JSON)
        #[arg(short = 'C', long)]
        config: PathBuf,
    },
}

/// Options shared by every session-running command
#[derive(Args, Debug, Clone, Default)]
pub struct SessionArgs {
    /// Retry retryable failures up to this many times
    #[arg(long, default_value = "0")]
    pub retries: u32,

    /// Stop after this many pages
    #[arg(long)]
    pub max_pages: Option<usize>,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
