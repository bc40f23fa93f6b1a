//! In-memory sample source
//!
//! Serves numbered pages `1..=max_page` and can simulate failures, which is
//! what the demo command and the fetcher tests drive.

use super::types::{LoadParams, LoadResult, PagingSource};
use crate::error::Error;
use crate::load_state::LoadType;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// Numbered pages of string items with optional simulated failures
///
/// Page `n` holds `load_size` items named `"Page {n} Item {i}"`. The next key
/// of page `n` is `n + 1` until `max_page` is reached.
#[derive(Debug)]
pub struct SampleSource {
    max_page: u32,
    delay: Duration,
    refresh_failures: AtomicU32,
    append_failures: AtomicU32,
    calls: AtomicUsize,
    requests: Mutex<Vec<LoadParams<u32>>>,
}

impl SampleSource {
    /// Key of the first page
    pub const INITIAL_KEY: u32 = 1;

    /// Create a source with `max_page` pages
    pub fn new(max_page: u32) -> Self {
        Self {
            max_page,
            delay: Duration::ZERO,
            refresh_failures: AtomicU32::new(0),
            append_failures: AtomicU32::new(0),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Fail the first `count` refresh loads
    #[must_use]
    pub fn with_refresh_failures(self, count: u32) -> Self {
        self.refresh_failures.store(count, Ordering::SeqCst);
        self
    }

    /// Fail the first `count` append loads
    #[must_use]
    pub fn with_append_failures(self, count: u32) -> Self {
        self.append_failures.store(count, Ordering::SeqCst);
        self
    }

    /// Sleep this long inside every load
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of pages served
    pub fn max_page(&self) -> u32 {
        self.max_page
    }

    /// Number of times `load` was called
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every params value `load` received, in call order
    pub async fn requests(&self) -> Vec<LoadParams<u32>> {
        self.requests.lock().await.clone()
    }

    fn take_failure(&self, load_type: LoadType) -> bool {
        let remaining = match load_type {
            LoadType::Refresh => &self.refresh_failures,
            LoadType::Append => &self.append_failures,
        };
        remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl PagingSource<u32, String> for SampleSource {
    async fn load(&self, params: LoadParams<u32>) -> LoadResult<u32, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().await.push(params.clone());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let page = *params.key();
        if self.take_failure(params.load_type()) {
            debug!(page, load_type = %params.load_type(), "Simulating load failure");
            return LoadResult::failure(Error::load(format!(
                "simulated {} failure for page {page}",
                params.load_type()
            )));
        }

        if page == 0 || page > self.max_page {
            return LoadResult::success(Vec::new(), None);
        }

        let data = (0..params.load_size())
            .map(|i| format!("Page {page} Item {i}"))
            .collect();
        let next_key = (page < self.max_page).then_some(page + 1);
        LoadResult::success(data, next_key)
    }
}
