//! Paging source module
//!
//! The only abstraction a caller must provide: something that can load one
//! page for a key.
//!
//! # Overview
//!
//! The source module provides:
//! - `PagingSource` - The async load capability
//! - `LoadParams` / `LoadResult` - One load request and its outcome
//! - `FnSource` - Adapts an async closure into a source
//! - `SampleSource` - In-memory numbered pages with simulated failures
//! - `HttpPagingSource` - JSON-over-HTTP pages (page number, offset, cursor)

mod func;
mod http;
mod rate_limit;
mod sample;
mod types;

pub use func::{source_fn, FnSource};
pub use http::{HttpPageKey, HttpPageStrategy, HttpPagingSource, HttpSourceConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use sample::SampleSource;
pub use types::{LoadParams, LoadResult, PagingSource};
