// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Solidafy Paging
//!
//! An incremental list-loading engine. Give it a key-based source of pages
//! and it fetches them on demand, tracks the status of each load direction,
//! and emits an ordered stream of (data delta, status) events for a list
//! renderer to apply.
//!
//! ## Features
//!
//! - **Refresh / Append / Retry**: One load in flight at a time, explicit retries only
//! - **Load States**: Per-direction status (loading, success, fully loaded, failure)
//! - **Hot Event Streams**: Any number of subscribers, each seeing events from when it joined
//! - **Bundled Sources**: Closure-backed, in-memory sample, and JSON-over-HTTP sources
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use futures::StreamExt;
//! use solidafy_paging::{Pager, PagingCollector, PagingConfig, PagingDataSink, SampleSource};
//!
//! #[tokio::main]
//! async fn main() -> solidafy_paging::Result<()> {
//!     let pager = Pager::new(PagingConfig::new(20), SampleSource::INITIAL_KEY, SampleSource::new(5))?;
//!     let mut events = pager.events();
//!     let mut list = PagingCollector::new();
//!
//!     pager.refresh();
//!     while let Some(event) = events.next().await {
//!         list.apply(event);
//!         if list.is_end_reached() {
//!             break;
//!         }
//!         pager.on_item_accessed(list.len().saturating_sub(1), list.len());
//!     }
//!
//!     pager.close();
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Trigger source: refresh() append() retry() close()          │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │
//! ┌──────────────────────────────┴───────────────────────────────┐
//! │  Pager ── PagingFetcher task (states, keys, retry, guards)   │
//! └───────────────┬───────────────────────────────┬──────────────┘
//!                 │ load(params)                  │ PagingEvent
//! ┌───────────────┴──────────────┐ ┌──────────────┴──────────────┐
//! │  PagingSource                │ │  Collector / PagingDataSink │
//! │  FnSource  Sample  Http      │ │  replace / extend / states  │
//! └──────────────────────────────┘ └─────────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Paging configuration
pub mod config;

/// Load state model
pub mod load_state;

/// Paging sources
pub mod source;

/// Refresh/append/retry state machine
pub mod fetcher;

/// Pager facade and collectors
pub mod pager;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::PagingConfig;
pub use error::{Error, Result};
pub use fetcher::{FetcherSnapshot, PagingEvent, PagingEventStream, PagingFetcher};
pub use load_state::{LoadState, LoadStates, LoadType};
pub use pager::{collect, Pager, PagingCollector, PagingDataSink};
pub use source::{
    source_fn, FnSource, HttpPageKey, HttpPageStrategy, HttpPagingSource, HttpSourceConfig,
    LoadParams, LoadResult, PagingSource, SampleSource,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
