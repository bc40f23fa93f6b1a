//! Closure-backed paging source

use super::types::{LoadParams, LoadResult, PagingSource};
use async_trait::async_trait;
use std::fmt;
use std::future::Future;

/// A source that delegates every load to an async closure
///
/// ```rust,ignore
/// let source = source_fn(|params: LoadParams<u32>| async move {
///     let page = *params.key();
///     let next = (page < 3).then_some(page + 1);
///     LoadResult::success(vec![format!("page {page}")], next)
/// });
/// ```
pub struct FnSource<F> {
    load: F,
}

impl<F> FnSource<F> {
    /// Wrap a closure
    pub fn new(load: F) -> Self {
        Self { load }
    }
}

impl<F> fmt::Debug for FnSource<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSource").finish_non_exhaustive()
    }
}

/// Build a source from an async closure
pub fn source_fn<F>(load: F) -> FnSource<F> {
    FnSource::new(load)
}

#[async_trait]
impl<K, T, F, Fut> PagingSource<K, T> for FnSource<F>
where
    K: Send + 'static,
    T: Send + 'static,
    F: Fn(LoadParams<K>) -> Fut + Send + Sync,
    Fut: Future<Output = LoadResult<K, T>> + Send,
{
    async fn load(&self, params: LoadParams<K>) -> LoadResult<K, T> {
        (self.load)(params).await
    }
}
