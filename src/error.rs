use std::sync::Arc;

use anyhow::Error;

/// Failure surfaced by [`Memoizer::get`](crate::Memoizer::get) and
/// [`Registry::fetch`](crate::Registry::fetch).
///
/// Cloneable so that a single failed attempt can be delivered to every
/// caller waiting on it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    /// The wrapped delegate failed during a claimed attempt. The claim has
    /// been released; a later call may retry the fetch.
    #[error("delegate fetch failed: {0}")]
    Fetch(Arc<Error>),

    /// The per-key delegate factory failed during first creation. No
    /// memoizer was installed for the key; a later call may retry creation.
    #[error("delegate factory failed: {0}")]
    Factory(Arc<Error>),
}

impl FetchError {
    pub(crate) fn fetch(err: Error) -> Self {
        Self::Fetch(Arc::new(err))
    }

    pub(crate) fn factory(err: Error) -> Self {
        Self::Factory(Arc::new(err))
    }
}
