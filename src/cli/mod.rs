//! CLI module
//!
//! Command-line interface for running paging sessions.
//!
//! # Commands
//!
//! - `demo` - Page through the in-memory sample source
//! - `fetch` - Page through a JSON HTTP endpoint
//! - `validate` - Validate a paging config file

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat, SessionArgs};
pub use runner::{run_session, Runner, SessionSummary};
