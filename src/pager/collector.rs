//! Applying events to a list
//!
//! The collector side of a session: replace the list on refresh, extend it on
//! append, and keep the latest load states for status rendering.

use crate::fetcher::PagingEvent;
use crate::load_state::{LoadState, LoadStates};
use futures::{Stream, StreamExt};

/// Something that renders a paged list
pub trait PagingDataSink<T> {
    /// Replace the whole list
    fn submit_refresh(&mut self, data: Vec<T>);

    /// Add a page to the end of the list
    fn submit_append(&mut self, data: Vec<T>);

    /// Record the latest load states
    fn submit_states(&mut self, states: LoadStates);

    /// Apply one event: data first, then states
    fn apply(&mut self, event: PagingEvent<T>) {
        match event {
            PagingEvent::Refresh { data, states } => {
                if let Some(data) = data {
                    self.submit_refresh(data);
                }
                self.submit_states(states);
            }
            PagingEvent::Append { data, states } => {
                if let Some(data) = data {
                    self.submit_append(data);
                }
                self.submit_states(states);
            }
        }
    }
}

/// In-memory list built from paging events
#[derive(Debug, Clone)]
pub struct PagingCollector<T> {
    items: Vec<T>,
    states: LoadStates,
    pages: usize,
}

impl<T> Default for PagingCollector<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            states: LoadStates::idle(),
            pages: 0,
        }
    }
}

impl<T> PagingCollector<T> {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Items in list order
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Take the items
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the list is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Pages applied since the last refresh (inclusive)
    pub fn pages(&self) -> usize {
        self.pages
    }

    /// Latest load states
    pub fn load_states(&self) -> &LoadStates {
        &self.states
    }

    /// Whether a "no more data" footer should show
    pub fn is_end_reached(&self) -> bool {
        self.states.append.is_fully_loaded()
    }

    /// Whether a retry button should show
    pub fn can_retry(&self) -> bool {
        self.states.refresh.is_failure() || self.states.append.is_failure()
    }

    /// Whether a loading spinner should show
    pub fn is_loading(&self) -> bool {
        self.states.is_loading()
    }

    /// Whether no load is pending on either direction
    ///
    /// Before the first refresh both directions are idle, so this is false.
    pub fn is_settled(&self) -> bool {
        self.states.refresh.is_terminal()
            && (self.states.append.is_terminal() || self.states.append == LoadState::Idle)
    }
}

impl<T> PagingDataSink<T> for PagingCollector<T> {
    fn submit_refresh(&mut self, data: Vec<T>) {
        self.items = data;
        self.pages = 1;
    }

    fn submit_append(&mut self, data: Vec<T>) {
        self.items.extend(data);
        self.pages += 1;
    }

    fn submit_states(&mut self, states: LoadStates) {
        self.states = states;
    }
}

/// Apply every event of `stream` to `sink` until the stream ends
///
/// Returns the number of events applied.
pub async fn collect<T, S, D>(mut stream: S, sink: &mut D) -> usize
where
    S: Stream<Item = PagingEvent<T>> + Unpin,
    D: PagingDataSink<T> + ?Sized,
{
    let mut applied = 0;
    while let Some(event) = stream.next().await {
        sink.apply(event);
        applied += 1;
    }
    applied
}
