//! Source types and traits
//!
//! Defines the load request/outcome values and the `PagingSource` trait.

use crate::error::Error;
use crate::load_state::LoadType;
use async_trait::async_trait;
use std::sync::Arc;

/// One load request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadParams<K> {
    /// Load the first page of a fresh list
    Refresh {
        /// Initial key of the session
        key: K,
        /// Number of items requested (always > 0)
        load_size: usize,
    },
    /// Load the page following the current end of the list
    Append {
        /// Next key returned by the previous successful load
        key: K,
        /// Number of items requested (always > 0)
        load_size: usize,
    },
}

impl<K> LoadParams<K> {
    /// Create refresh params
    pub fn refresh(key: K, load_size: usize) -> Self {
        Self::Refresh { key, load_size }
    }

    /// Create append params
    pub fn append(key: K, load_size: usize) -> Self {
        Self::Append { key, load_size }
    }

    /// The key to load
    pub fn key(&self) -> &K {
        match self {
            Self::Refresh { key, .. } | Self::Append { key, .. } => key,
        }
    }

    /// Number of items requested
    pub fn load_size(&self) -> usize {
        match self {
            Self::Refresh { load_size, .. } | Self::Append { load_size, .. } => *load_size,
        }
    }

    /// Direction of the load
    pub fn load_type(&self) -> LoadType {
        match self {
            Self::Refresh { .. } => LoadType::Refresh,
            Self::Append { .. } => LoadType::Append,
        }
    }
}

/// Outcome of one load
#[derive(Debug)]
pub enum LoadResult<K, T> {
    /// The page loaded
    Success {
        /// Items of the page, in list order
        data: Vec<T>,
        /// Key of the following page, `None` when there is no more data
        next_key: Option<K>,
    },
    /// The page failed to load
    Failure(Error),
}

impl<K, T> LoadResult<K, T> {
    /// Create a success result
    pub fn success(data: Vec<T>, next_key: Option<K>) -> Self {
        Self::Success { data, next_key }
    }

    /// Create a failure result
    pub fn failure(error: impl Into<Error>) -> Self {
        Self::Failure(error.into())
    }

    /// Check if this is a success result
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Check if this is a failure result
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }
}

impl<K, T, E: Into<Error>> From<std::result::Result<(Vec<T>, Option<K>), E>>
    for LoadResult<K, T>
{
    fn from(result: std::result::Result<(Vec<T>, Option<K>), E>) -> Self {
        match result {
            Ok((data, next_key)) => Self::Success { data, next_key },
            Err(e) => Self::Failure(e.into()),
        }
    }
}

/// A key-based source of pages
///
/// Implementations may suspend, perform I/O, or keep their own counters. The
/// fetcher calls `load` at most once at a time per session and never retries
/// on its own.
#[async_trait]
pub trait PagingSource<K, T>: Send + Sync {
    /// Load the page described by `params`
    async fn load(&self, params: LoadParams<K>) -> LoadResult<K, T>;
}

#[async_trait]
impl<K, T, S> PagingSource<K, T> for Arc<S>
where
    K: Send + 'static,
    T: Send + 'static,
    S: PagingSource<K, T> + ?Sized,
{
    async fn load(&self, params: LoadParams<K>) -> LoadResult<K, T> {
        (**self).load(params).await
    }
}
