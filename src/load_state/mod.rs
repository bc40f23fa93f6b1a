//! Load state module
//!
//! Status model for the two load directions of a paging session.
//!
//! # Overview
//!
//! The state module provides:
//! - `LoadType` - Which direction a load belongs to (refresh or append)
//! - `LoadState` - Status of one direction
//! - `LoadStates` - The refresh/append pair carried by every event

mod types;

pub use types::{LoadState, LoadStates, LoadType};

#[cfg(test)]
mod tests;
