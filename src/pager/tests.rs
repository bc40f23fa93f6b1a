//! Tests for pager module

use super::*;
use crate::error::Error;
use crate::fetcher::PagingEvent;
use crate::load_state::{LoadState, LoadType};
use crate::source::SampleSource;
use futures::StreamExt;
use pretty_assertions::assert_eq;
use std::time::Duration;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(5);

async fn next_event<T>(events: &mut PagingEventStream<T>) -> PagingEvent<T> {
    timeout(WAIT, events.next())
        .await
        .expect("timed out waiting for event")
        .expect("event stream ended")
}

/// Wait for the event that ends the current load
async fn settle<T>(events: &mut PagingEventStream<T>) -> PagingEvent<T> {
    loop {
        let event = next_event(events).await;
        if event.states().get(event.load_type()).is_terminal() {
            return event;
        }
    }
}

fn states(refresh: LoadState, append: LoadState) -> LoadStates {
    LoadStates::new(refresh, append)
}

// ============================================================================
// Pager Tests
// ============================================================================

#[tokio::test]
async fn test_pager_rejects_invalid_config() {
    let result = Pager::new(PagingConfig::new(0), 1, SampleSource::new(1));
    assert!(matches!(result, Err(Error::InvalidConfigValue { .. })));
}

#[tokio::test]
async fn test_pager_refresh_and_append() {
    let pager = Pager::new(PagingConfig::new(4), 1, SampleSource::new(2)).unwrap();
    let mut events = pager.events();

    pager.refresh();
    let refreshed = settle(&mut events).await;
    assert_eq!(refreshed.data().map(<[String]>::len), Some(4));

    pager.append();
    let appended = settle(&mut events).await;
    assert!(appended.is_append());
    assert_eq!(
        pager.load_states().await,
        Some(states(
            LoadState::Success { fully: false },
            LoadState::Success { fully: true }
        ))
    );
}

#[tokio::test]
async fn test_pager_shared_source() {
    let source = Arc::new(SampleSource::new(1));
    let pager: Pager<u32, String> =
        Pager::with_shared_source(PagingConfig::new(3), 1, source.clone()).unwrap();
    let mut events = pager.events();

    pager.refresh();
    settle(&mut events).await;
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn test_pager_on_item_accessed_prefetches() {
    let config = PagingConfig::new(10).with_prefetch_distance(3);
    let source = Arc::new(SampleSource::new(3));
    let pager: Pager<u32, String> =
        Pager::with_shared_source(config, 1, source.clone()).unwrap();
    let mut events = pager.events();

    pager.refresh();
    settle(&mut events).await;

    // Far from the end: no append
    pager.on_item_accessed(2, 10);
    let snapshot = pager.snapshot().await.unwrap();
    assert_eq!(snapshot.in_flight, None);
    assert_eq!(source.calls(), 1);

    // Within prefetch distance: append
    pager.on_item_accessed(7, 10);
    let appended = settle(&mut events).await;
    assert!(appended.is_append());
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_pager_close() {
    let pager = Pager::new(PagingConfig::new(5), 1, SampleSource::new(1)).unwrap();
    let mut events = pager.events();

    pager.close();
    pager.refresh();

    assert!(timeout(WAIT, events.next()).await.unwrap().is_none());
    assert!(pager.is_closed());
    assert_eq!(pager.load_states().await, None);
}

#[tokio::test]
async fn test_pager_collects_full_list() {
    let pager = Pager::new(PagingConfig::new(2), 1, SampleSource::new(3)).unwrap();
    let collected = pager.events();
    let mut watch = pager.events();

    let handle = tokio::spawn(async move {
        let mut collector = PagingCollector::new();
        let applied = collect(collected, &mut collector).await;
        (applied, collector)
    });

    pager.refresh();
    settle(&mut watch).await;
    pager.append();
    settle(&mut watch).await;
    pager.append();
    let last = settle(&mut watch).await;
    assert!(last.states().append.is_fully_loaded());
    pager.close();

    let (applied, collector) = timeout(WAIT, handle).await.unwrap().unwrap();
    assert_eq!(applied, 6);
    assert_eq!(collector.len(), 6);
    assert_eq!(collector.pages(), 3);
    assert_eq!(collector.items()[0], "Page 1 Item 0");
    assert_eq!(collector.items()[5], "Page 3 Item 1");
    assert!(collector.is_end_reached());
    assert!(!collector.can_retry());
}

// ============================================================================
// Collector Tests
// ============================================================================

#[test]
fn test_collector_applies_events() {
    let mut collector = PagingCollector::new();
    assert!(collector.is_empty());

    collector.apply(PagingEvent::Refresh {
        data: None,
        states: states(LoadState::Loading, LoadState::Idle),
    });
    assert!(collector.is_empty());
    assert!(collector.load_states().refresh.is_loading());

    collector.apply(PagingEvent::Refresh {
        data: Some(vec!["a", "b"]),
        states: states(LoadState::Success { fully: false }, LoadState::Idle),
    });
    assert_eq!(collector.items(), &["a", "b"]);

    collector.apply(PagingEvent::Append {
        data: Some(vec!["c"]),
        states: states(
            LoadState::Success { fully: false },
            LoadState::Success { fully: true },
        ),
    });
    assert_eq!(collector.items(), &["a", "b", "c"]);
    assert_eq!(collector.pages(), 2);
    assert!(collector.is_end_reached());

    // A new refresh replaces everything
    collector.apply(PagingEvent::Refresh {
        data: Some(vec!["z"]),
        states: states(LoadState::Success { fully: true }, LoadState::Idle),
    });
    assert_eq!(collector.clone().into_items(), vec!["z"]);
    assert_eq!(collector.pages(), 1);
}

#[test]
fn test_collector_failure_keeps_items() {
    let mut collector = PagingCollector::new();
    collector.apply(PagingEvent::Refresh {
        data: Some(vec![1, 2, 3]),
        states: states(LoadState::Success { fully: false }, LoadState::Idle),
    });
    collector.apply(PagingEvent::Append {
        data: None,
        states: states(
            LoadState::Success { fully: false },
            LoadState::failure(Error::load("offline")),
        ),
    });

    assert_eq!(collector.len(), 3);
    assert!(collector.can_retry());
    assert_eq!(
        collector.load_states().get(LoadType::Append).to_string(),
        "failure: Load failed: offline"
    );
}

#[test]
fn test_collector_status_helpers() {
    let mut collector: PagingCollector<u32> = PagingCollector::new();
    assert!(!collector.is_loading());
    assert!(!collector.is_settled());

    collector.apply(PagingEvent::Refresh {
        data: None,
        states: states(LoadState::Loading, LoadState::Idle),
    });
    assert!(collector.is_loading());
    assert!(!collector.is_settled());

    collector.apply(PagingEvent::Refresh {
        data: Some(vec![1, 2]),
        states: states(LoadState::Success { fully: false }, LoadState::Idle),
    });
    assert!(!collector.is_loading());
    assert!(collector.is_settled());

    collector.apply(PagingEvent::Append {
        data: None,
        states: states(LoadState::Success { fully: false }, LoadState::Loading),
    });
    assert!(collector.is_loading());
    assert!(!collector.is_settled());

    collector.apply(PagingEvent::Append {
        data: None,
        states: states(
            LoadState::Success { fully: false },
            LoadState::failure(Error::load("offline")),
        ),
    });
    assert!(!collector.is_loading());
    assert!(collector.is_settled());
}

#[tokio::test]
async fn test_collect_counts_events() {
    let events = futures::stream::iter(vec![
        PagingEvent::Refresh {
            data: None,
            states: states(LoadState::Loading, LoadState::Idle),
        },
        PagingEvent::Refresh {
            data: Some(vec![1u8]),
            states: states(LoadState::Success { fully: true }, LoadState::Idle),
        },
    ]);
    let mut collector = PagingCollector::new();

    assert_eq!(collect(events, &mut collector).await, 2);
    assert_eq!(collector.items(), &[1]);
}
