//! Tests for load_state module

use super::*;
use crate::error::Error;

// ============================================================================
// LoadType Tests
// ============================================================================

#[test]
fn test_load_type_display() {
    assert_eq!(LoadType::Refresh.to_string(), "refresh");
    assert_eq!(LoadType::Append.as_str(), "append");
}

// ============================================================================
// LoadState Tests
// ============================================================================

#[test]
fn test_load_state_default_is_idle() {
    let state = LoadState::default();
    assert_eq!(state, LoadState::Idle);
    assert!(!state.is_terminal());
    assert!(!state.is_loading());
}

#[test]
fn test_load_state_predicates() {
    assert!(LoadState::Loading.is_loading());

    let partial = LoadState::Success { fully: false };
    assert!(partial.is_success());
    assert!(!partial.is_fully_loaded());
    assert!(partial.is_terminal());

    let full = LoadState::Success { fully: true };
    assert!(full.is_fully_loaded());

    let failed = LoadState::failure(Error::load("boom"));
    assert!(failed.is_failure());
    assert!(failed.is_terminal());
    assert_eq!(failed.error().unwrap().to_string(), "Load failed: boom");
}

#[test]
fn test_load_state_equality() {
    assert_eq!(LoadState::Success { fully: true }, LoadState::Success { fully: true });
    assert_ne!(LoadState::Success { fully: true }, LoadState::Success { fully: false });
    assert_ne!(LoadState::Loading, LoadState::Idle);

    // Failures compare by message
    assert_eq!(
        LoadState::failure(Error::load("boom")),
        LoadState::failure(Error::load("boom"))
    );
    assert_ne!(
        LoadState::failure(Error::load("boom")),
        LoadState::failure(Error::load("bang"))
    );
}

#[test]
fn test_load_state_display() {
    assert_eq!(LoadState::Idle.to_string(), "idle");
    assert_eq!(LoadState::Loading.to_string(), "loading");
    assert_eq!(LoadState::Success { fully: false }.to_string(), "success");
    assert_eq!(
        LoadState::Success { fully: true }.to_string(),
        "success (fully loaded)"
    );
    assert_eq!(
        LoadState::failure(Error::load("x")).to_string(),
        "failure: Load failed: x"
    );
}

// ============================================================================
// LoadStates Tests
// ============================================================================

#[test]
fn test_load_states_get_set() {
    let mut states = LoadStates::idle();
    states.set(LoadType::Refresh, LoadState::Loading);
    assert_eq!(states.get(LoadType::Refresh), &LoadState::Loading);
    assert_eq!(states.get(LoadType::Append), &LoadState::Idle);
    assert!(states.is_loading());

    states.set(LoadType::Refresh, LoadState::Success { fully: false });
    states.set(LoadType::Append, LoadState::Loading);
    assert_eq!(states.append, LoadState::Loading);
    assert!(states.is_loading());
}

#[test]
fn test_allows_append() {
    // Refresh never completed
    assert!(!LoadStates::idle().allows_append());
    assert!(!LoadStates::new(LoadState::Loading, LoadState::Idle).allows_append());

    // Refresh failed
    let failed = LoadStates::new(LoadState::failure(Error::load("x")), LoadState::Idle);
    assert!(!failed.allows_append());

    // Refresh reached the end
    let full = LoadStates::new(LoadState::Success { fully: true }, LoadState::Idle);
    assert!(!full.allows_append());

    // Append reached the end
    let append_full = LoadStates::new(
        LoadState::Success { fully: false },
        LoadState::Success { fully: true },
    );
    assert!(!append_full.allows_append());

    // Normal partial refresh, with or without a failed append
    let open = LoadStates::new(LoadState::Success { fully: false }, LoadState::Idle);
    assert!(open.allows_append());
    let append_failed = LoadStates::new(
        LoadState::Success { fully: false },
        LoadState::failure(Error::load("x")),
    );
    assert!(append_failed.allows_append());
}

#[test]
fn test_load_states_display() {
    let states = LoadStates::new(LoadState::Success { fully: false }, LoadState::Loading);
    assert_eq!(states.to_string(), "refresh=success, append=loading");
}
