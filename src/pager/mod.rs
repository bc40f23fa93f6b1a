//! Pager module
//!
//! Binds a paging source and config into one list session.
//!
//! # Overview
//!
//! The pager module provides:
//! - `Pager` - Facade over a `PagingFetcher` with validated config
//! - `PagingDataSink` - Contract for applying events to a list
//! - `PagingCollector` - In-memory list built from events
//! - `collect` - Drain an event stream into a sink

mod collector;

pub use collector::{collect, PagingCollector, PagingDataSink};

use crate::config::PagingConfig;
use crate::error::Result;
use crate::fetcher::{FetcherSnapshot, PagingEventStream, PagingFetcher};
use crate::load_state::LoadStates;
use crate::source::PagingSource;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::debug;

/// One list session over a paging source
///
/// ```rust,ignore
/// let pager = Pager::new(PagingConfig::new(20), 1, SampleSource::new(5))?;
/// let mut events = pager.events();
/// pager.refresh();
/// while let Some(event) = events.next().await {
///     collector.apply(event);
/// }
/// ```
pub struct Pager<K, T> {
    fetcher: PagingFetcher<K, T>,
    config: PagingConfig,
}

impl<K, T> Pager<K, T>
where
    K: Clone + Debug + Send + Sync + 'static,
    T: Clone + Send + 'static,
{
    /// Create a pager, validating the config
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new<S>(config: PagingConfig, init_key: K, source: S) -> Result<Self>
    where
        S: PagingSource<K, T> + 'static,
    {
        Self::with_shared_source(config, init_key, Arc::new(source))
    }

    /// Create a pager over a source shared with other owners
    pub fn with_shared_source(
        config: PagingConfig,
        init_key: K,
        source: Arc<dyn PagingSource<K, T>>,
    ) -> Result<Self> {
        config.validate()?;
        debug!(
            "Starting pager: page_size={}, initial_size={}, key={:?}",
            config.page_size, config.initial_size, init_key
        );
        let fetcher = PagingFetcher::new(init_key, config.clone(), source);
        Ok(Self { fetcher, config })
    }

    /// Get the config
    pub fn config(&self) -> &PagingConfig {
        &self.config
    }

    /// Get the underlying fetcher
    pub fn fetcher(&self) -> &PagingFetcher<K, T> {
        &self.fetcher
    }

    /// Subscribe to events emitted from now on
    pub fn events(&self) -> PagingEventStream<T> {
        self.fetcher.subscribe()
    }

    /// Reload the list from the initial key
    pub fn refresh(&self) {
        self.fetcher.refresh();
    }

    /// Load the next page
    pub fn append(&self) {
        self.fetcher.append();
    }

    /// Reissue the load that failed last
    pub fn retry(&self) {
        self.fetcher.retry();
    }

    /// End the session
    pub fn close(&self) {
        self.fetcher.close();
    }

    /// Check if the session has ended
    pub fn is_closed(&self) -> bool {
        self.fetcher.is_closed()
    }

    /// Current load states, or `None` once closed
    pub async fn load_states(&self) -> Option<LoadStates> {
        self.fetcher.snapshot().await.map(|snapshot| snapshot.states)
    }

    /// Current session state, or `None` once closed
    pub async fn snapshot(&self) -> Option<FetcherSnapshot<K>> {
        self.fetcher.snapshot().await
    }

    /// Report that the item at `index` of a list of `item_count` items was
    /// shown, appending when it is within the prefetch distance of the end
    pub fn on_item_accessed(&self, index: usize, item_count: usize) {
        if self.config.should_prefetch(index, item_count) {
            self.fetcher.append();
        }
    }
}

impl<K, T> std::fmt::Debug for Pager<K, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pager")
            .field("config", &self.config)
            .field("fetcher", &self.fetcher)
            .finish()
    }
}

#[cfg(test)]
mod tests;
