use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use anyhow::Error;
use tokio::sync::Mutex;

use crate::delegate::BoxDelegate;
use crate::error::FetchError;
use crate::memoizer::Memoizer;

/// Multiplexes independent [`Memoizer`]s by a request-scoped key.
///
/// Each distinct key gets its own memoizer, created lazily from the
/// caller-supplied factory; keys are fully independent of each other. The
/// registry never evicts, so its lifetime must be scoped by the host:
/// construct one per top-level request and drop it when the request
/// completes. Cloning yields another handle to the same underlying map.
pub struct Registry<K, C, T> {
    entries: Arc<Mutex<HashMap<K, Arc<Memoizer<C, T>>>>>,
}

impl<K, C, T> Clone for Registry<K, C, T> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<K, C, T> Default for Registry<K, C, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, C, T> Registry<K, C, T> {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<K, C, T> Registry<K, C, T>
where
    K: Eq + Hash + fmt::Debug,
    T: Clone + Send + Sync + 'static,
{
    /// Look up the memoizer for `key`, creating it on first access.
    ///
    /// The check-and-insert runs under the registry lock, so the factory is
    /// invoked exactly once per distinct key even when many callers hit an
    /// unseen key at the same time. A factory failure installs nothing; a
    /// later call may retry creation for the same key.
    pub async fn get_or_create<F>(
        &self,
        key: K,
        factory: F,
    ) -> Result<Arc<Memoizer<C, T>>, FetchError>
    where
        F: FnOnce() -> Result<BoxDelegate<C, T>, Error>,
    {
        let mut entries = self.entries.lock().await;
        if let Some(memoizer) = entries.get(&key) {
            return Ok(Arc::clone(memoizer));
        }

        tracing::debug!("Creating memoizer for key {:?}", key);
        let delegate = factory().map_err(FetchError::factory)?;
        let memoizer = Arc::new(Memoizer::from_boxed(delegate));
        entries.insert(key, Arc::clone(&memoizer));
        Ok(memoizer)
    }

    /// Resolve `key` through its per-key memoizer, creating one on first
    /// access. All single-flight guarantees apply per key.
    pub async fn fetch<F>(&self, key: K, factory: F, ctx: C) -> Result<T, FetchError>
    where
        F: FnOnce() -> Result<BoxDelegate<C, T>, Error>,
    {
        let memoizer = self.get_or_create(key, factory).await?;
        memoizer.get(ctx).await
    }
}
