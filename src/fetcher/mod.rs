//! Paging fetcher module
//!
//! The refresh/append/retry state machine of one paging session.
//!
//! # Overview
//!
//! The fetcher module provides:
//! - `PagingFetcher` - Handle used to trigger loads and subscribe to events
//! - `PagingEvent` - One state transition with its data delta
//! - `PagingEventStream` - Hot stream of events for one subscriber
//! - `FetcherSnapshot` - Point-in-time view of the session state
//!
//! All state lives in a single task that processes triggers in order. Each
//! load runs in its own task and reports back to it, so at most one load is
//! ever in flight and stale results are recognised and dropped.

mod actor;
mod types;

pub use types::{FetcherSnapshot, PagingEvent, PagingEventStream};

use crate::config::PagingConfig;
use crate::source::PagingSource;
use actor::FetcherActor;
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use types::Command;

/// Orchestrates loads for one paging session
///
/// Triggers are fire-and-forget: their outcome is observed through the event
/// stream. Triggers that are not currently allowed (an append before the
/// first successful refresh, any trigger while a load is in flight, anything
/// after `close`) are ignored without an event.
///
/// Dropping the last handle closes the session.
pub struct PagingFetcher<K, T> {
    commands: mpsc::UnboundedSender<Command<K, T>>,
    closed: AtomicBool,
}

impl<K, T> PagingFetcher<K, T>
where
    K: Clone + Debug + Send + Sync + 'static,
    T: Clone + Send + 'static,
{
    /// Start a session
    ///
    /// Must be called from within a Tokio runtime. `config` is expected to be
    /// validated already (see `PagingConfig::validate`).
    pub fn new(init_key: K, config: PagingConfig, source: Arc<dyn PagingSource<K, T>>) -> Self {
        let (commands, receiver) = mpsc::unbounded_channel();
        let actor = FetcherActor::new(init_key, config, source, receiver);
        tokio::spawn(actor.run());

        Self {
            commands,
            closed: AtomicBool::new(false),
        }
    }

    /// Reload the list from the initial key, cancelling any in-flight append
    pub fn refresh(&self) {
        self.send(Command::Refresh);
    }

    /// Load the page after the current end of the list
    pub fn append(&self) {
        self.send(Command::Append);
    }

    /// Reissue the load that failed last
    pub fn retry(&self) {
        self.send(Command::Retry);
    }

    /// End the session
    ///
    /// Cancels any in-flight load and ends every event stream. Idempotent.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            let _ = self.commands.send(Command::Close);
        }
    }

    /// Check if the session has ended
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst) || self.commands.is_closed()
    }

    /// Subscribe to events emitted from now on
    ///
    /// The stream ends when the session closes. Subscribing to a closed
    /// session yields an already-finished stream.
    pub fn subscribe(&self) -> PagingEventStream<T> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.send(Command::Subscribe(sender));
        PagingEventStream::new(receiver)
    }

    /// Current session state, or `None` once closed
    ///
    /// Every trigger sent before this call has been handled by the time it
    /// returns.
    pub async fn snapshot(&self) -> Option<FetcherSnapshot<K>> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Snapshot(reply));
        response.await.ok()
    }

    fn send(&self, command: Command<K, T>) {
        if self.closed.load(Ordering::SeqCst) {
            return;
        }
        let _ = self.commands.send(command);
    }
}

impl<K, T> std::fmt::Debug for PagingFetcher<K, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagingFetcher")
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}
