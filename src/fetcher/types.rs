//! Fetcher types
//!
//! Events emitted by a fetcher, the subscriber stream, and the command set
//! understood by the fetcher task.

use crate::load_state::{LoadStates, LoadType};
use crate::source::LoadParams;
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::{mpsc, oneshot};

/// One state transition of a paging session
///
/// `data` is `Some` only on the event reporting a successful load: the full
/// new list for `Refresh`, the newly loaded page for `Append`. Loading and
/// failure transitions carry `None`.
#[derive(Debug, Clone, PartialEq)]
pub enum PagingEvent<T> {
    /// Refresh direction changed
    Refresh {
        /// Replacement list, on success
        data: Option<Vec<T>>,
        /// States at emission time
        states: LoadStates,
    },
    /// Append direction changed
    Append {
        /// Newly loaded page, on success
        data: Option<Vec<T>>,
        /// States at emission time
        states: LoadStates,
    },
}

impl<T> PagingEvent<T> {
    /// Build an event for the given direction
    pub fn new(load_type: LoadType, data: Option<Vec<T>>, states: LoadStates) -> Self {
        match load_type {
            LoadType::Refresh => Self::Refresh { data, states },
            LoadType::Append => Self::Append { data, states },
        }
    }

    /// Direction this event belongs to
    pub fn load_type(&self) -> LoadType {
        match self {
            Self::Refresh { .. } => LoadType::Refresh,
            Self::Append { .. } => LoadType::Append,
        }
    }

    /// States at emission time
    pub fn states(&self) -> &LoadStates {
        match self {
            Self::Refresh { states, .. } | Self::Append { states, .. } => states,
        }
    }

    /// Data delta, if the event reports a successful load
    pub fn data(&self) -> Option<&[T]> {
        match self {
            Self::Refresh { data, .. } | Self::Append { data, .. } => data.as_deref(),
        }
    }

    /// Take the data delta
    pub fn into_data(self) -> Option<Vec<T>> {
        match self {
            Self::Refresh { data, .. } | Self::Append { data, .. } => data,
        }
    }

    /// Check if this is a refresh event
    pub fn is_refresh(&self) -> bool {
        matches!(self, Self::Refresh { .. })
    }

    /// Check if this is an append event
    pub fn is_append(&self) -> bool {
        matches!(self, Self::Append { .. })
    }
}

/// Hot event stream for one subscriber
///
/// Only events emitted after subscribing are delivered. The stream ends
/// cleanly when the session closes.
#[derive(Debug)]
pub struct PagingEventStream<T> {
    receiver: mpsc::UnboundedReceiver<PagingEvent<T>>,
}

impl<T> PagingEventStream<T> {
    pub(crate) fn new(receiver: mpsc::UnboundedReceiver<PagingEvent<T>>) -> Self {
        Self { receiver }
    }

    /// Wait for the next event, `None` once the session is closed
    pub async fn recv(&mut self) -> Option<PagingEvent<T>> {
        self.receiver.recv().await
    }
}

impl<T> Stream for PagingEventStream<T> {
    type Item = PagingEvent<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

/// Point-in-time view of a fetcher
#[derive(Debug, Clone, PartialEq)]
pub struct FetcherSnapshot<K> {
    /// Current load states
    pub states: LoadStates,
    /// Direction of the in-flight load, if any
    pub in_flight: Option<LoadType>,
    /// Key the next append would use
    pub next_key: Option<K>,
    /// Params `retry` would reissue
    pub pending_retry: Option<LoadParams<K>>,
    /// Items loaded since the last successful refresh (inclusive)
    pub loaded_items: usize,
    /// Pages loaded since the last successful refresh (inclusive)
    pub loaded_pages: usize,
}

/// Commands processed by the fetcher task
pub(crate) enum Command<K, T> {
    Refresh,
    Append,
    Retry,
    Close,
    Subscribe(mpsc::UnboundedSender<PagingEvent<T>>),
    Snapshot(oneshot::Sender<FetcherSnapshot<K>>),
}
