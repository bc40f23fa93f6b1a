//! Fetcher task
//!
//! Owns every piece of mutable session state. Commands and load completions
//! are handled one at a time, which is what serializes the state machine.

use super::types::{Command, FetcherSnapshot, PagingEvent};
use crate::config::PagingConfig;
use crate::error::Error;
use crate::load_state::{LoadState, LoadStates, LoadType};
use crate::source::{LoadParams, LoadResult, PagingSource};
use futures::FutureExt;
use std::any::Any;
use std::fmt::Debug;
use std::ops::ControlFlow;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// The single load allowed to run
struct InFlight<K> {
    id: u64,
    params: LoadParams<K>,
    handle: JoinHandle<()>,
}

/// Result of a load, tagged with the id it was started under
struct Completion<K, T> {
    id: u64,
    result: LoadResult<K, T>,
}

pub(crate) struct FetcherActor<K, T> {
    source: Arc<dyn PagingSource<K, T>>,
    config: PagingConfig,
    init_key: K,
    next_key: Option<K>,
    states: LoadStates,
    in_flight: Option<InFlight<K>>,
    pending_retry: Option<LoadParams<K>>,
    next_load_id: u64,
    loaded_items: usize,
    loaded_pages: usize,
    subscribers: Vec<mpsc::UnboundedSender<PagingEvent<T>>>,
    commands: mpsc::UnboundedReceiver<Command<K, T>>,
    completion_sender: mpsc::UnboundedSender<Completion<K, T>>,
    completions: mpsc::UnboundedReceiver<Completion<K, T>>,
}

impl<K, T> FetcherActor<K, T>
where
    K: Clone + Debug + Send + Sync + 'static,
    T: Clone + Send + 'static,
{
    pub(crate) fn new(
        init_key: K,
        config: PagingConfig,
        source: Arc<dyn PagingSource<K, T>>,
        commands: mpsc::UnboundedReceiver<Command<K, T>>,
    ) -> Self {
        let (completion_sender, completions) = mpsc::unbounded_channel();
        Self {
            source,
            config,
            init_key,
            next_key: None,
            states: LoadStates::idle(),
            in_flight: None,
            pending_retry: None,
            next_load_id: 0,
            loaded_items: 0,
            loaded_pages: 0,
            subscribers: Vec::new(),
            commands,
            completion_sender,
            completions,
        }
    }

    /// Process commands and completions until closed
    pub(crate) async fn run(mut self) {
        loop {
            // Commands first: a close that is already queued wins over a
            // completion that arrived at the same time.
            tokio::select! {
                biased;
                command = self.commands.recv() => {
                    let Some(command) = command else { break };
                    if self.handle_command(command).is_break() {
                        break;
                    }
                }
                Some(completion) = self.completions.recv() => self.complete(completion),
            }
        }
        self.shutdown();
    }

    fn handle_command(&mut self, command: Command<K, T>) -> ControlFlow<()> {
        match command {
            Command::Refresh => self.refresh(),
            Command::Append => self.append(),
            Command::Retry => self.retry(),
            Command::Subscribe(subscriber) => self.subscribers.push(subscriber),
            Command::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
            Command::Close => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    // ========================================================================
    // Triggers
    // ========================================================================

    fn refresh(&mut self) {
        if let Some(in_flight) = &self.in_flight {
            if in_flight.params.load_type() == LoadType::Refresh {
                debug!("Ignoring refresh: refresh already in flight");
                return;
            }
        }
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.handle.abort();
            debug!(load_id = in_flight.id, "Cancelled in-flight append for refresh");
        }

        self.pending_retry = None;
        self.next_key = None;
        self.states = LoadStates::new(LoadState::Loading, LoadState::Idle);
        self.emit(LoadType::Refresh, None);
        self.launch(LoadParams::refresh(
            self.init_key.clone(),
            self.config.initial_size,
        ));
    }

    fn append(&mut self) {
        if let Some(in_flight) = &self.in_flight {
            debug!(
                "Ignoring append: {} load in flight",
                in_flight.params.load_type()
            );
            return;
        }
        if !self.states.allows_append() {
            debug!("Ignoring append: {}", self.states);
            return;
        }
        let Some(key) = self.next_key.clone() else {
            debug!("Ignoring append: no next key");
            return;
        };

        self.states.append = LoadState::Loading;
        self.emit(LoadType::Append, None);
        self.launch(LoadParams::append(key, self.config.page_size));
    }

    fn retry(&mut self) {
        if let Some(in_flight) = &self.in_flight {
            debug!(
                "Ignoring retry: {} load in flight",
                in_flight.params.load_type()
            );
            return;
        }
        let Some(params) = self.pending_retry.take() else {
            debug!("Ignoring retry: no failed load");
            return;
        };

        let load_type = params.load_type();
        info!("Retrying {} load for key {:?}", load_type, params.key());
        self.states.set(load_type, LoadState::Loading);
        self.emit(load_type, None);
        self.launch(params);
    }

    // ========================================================================
    // Loads
    // ========================================================================

    fn launch(&mut self, params: LoadParams<K>) {
        let id = self.next_load_id;
        self.next_load_id += 1;

        debug!(
            load_id = id,
            "Starting {} load for key {:?} ({} items)",
            params.load_type(),
            params.key(),
            params.load_size()
        );

        let source = Arc::clone(&self.source);
        let completions = self.completion_sender.clone();
        let load_params = params.clone();
        let handle = tokio::spawn(async move {
            let result = match AssertUnwindSafe(source.load(load_params))
                .catch_unwind()
                .await
            {
                Ok(result) => result,
                Err(payload) => LoadResult::Failure(Error::LoadPanicked {
                    message: panic_message(payload.as_ref()),
                }),
            };
            let _ = completions.send(Completion { id, result });
        });

        self.in_flight = Some(InFlight { id, params, handle });
    }

    fn complete(&mut self, completion: Completion<K, T>) {
        let params = match self.in_flight.take() {
            Some(in_flight) if in_flight.id == completion.id => in_flight.params,
            other => {
                self.in_flight = other;
                debug!(load_id = completion.id, "Discarding stale load result");
                return;
            }
        };
        let load_type = params.load_type();

        match completion.result {
            LoadResult::Success { data, next_key } => {
                let fully = next_key.is_none();
                self.pending_retry = None;
                self.next_key = next_key;

                match load_type {
                    LoadType::Refresh => {
                        self.loaded_items = data.len();
                        self.loaded_pages = 1;
                        self.states.refresh = LoadState::Success { fully };
                        self.states.append = if fully {
                            LoadState::Success { fully: true }
                        } else {
                            LoadState::Idle
                        };
                    }
                    LoadType::Append => {
                        self.loaded_items += data.len();
                        self.loaded_pages += 1;
                        self.states.append = LoadState::Success { fully };
                        if self.loaded_items > self.config.max_size {
                            warn!(
                                "Loaded {} items, above max_size {}; nothing is evicted",
                                self.loaded_items, self.config.max_size
                            );
                        }
                    }
                }

                debug!(
                    "{} load finished: {} items, fully loaded: {}",
                    load_type,
                    data.len(),
                    fully
                );
                self.emit(load_type, Some(data));
            }
            LoadResult::Failure(error) => {
                warn!("{} load for key {:?} failed: {}", load_type, params.key(), error);
                self.states.set(load_type, LoadState::failure(error));
                self.pending_retry = Some(params);
                self.emit(load_type, None);
            }
        }
    }

    // ========================================================================
    // Output
    // ========================================================================

    fn emit(&mut self, load_type: LoadType, data: Option<Vec<T>>) {
        let event = PagingEvent::new(load_type, data, self.states.clone());
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }

    fn snapshot(&self) -> FetcherSnapshot<K> {
        FetcherSnapshot {
            states: self.states.clone(),
            in_flight: self
                .in_flight
                .as_ref()
                .map(|in_flight| in_flight.params.load_type()),
            next_key: self.next_key.clone(),
            pending_retry: self.pending_retry.clone(),
            loaded_items: self.loaded_items,
            loaded_pages: self.loaded_pages,
        }
    }

    fn shutdown(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.handle.abort();
            debug!(load_id = in_flight.id, "Cancelled in-flight load on close");
        }
        self.subscribers.clear();
        info!("Paging fetcher closed");
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
