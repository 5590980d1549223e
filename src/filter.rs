use std::sync::Arc;

use futures::FutureExt;

use crate::delegate::{BoxDelegate, BoxFetchFuture, Fetch};

/// Delegate combinator that fetches a full collection through an inner
/// delegate and keeps only the rows matching the calling context.
///
/// The usual pairing with a [`Memoizer`](crate::Memoizer) is the other way
/// around: memoize the unfiltered collection once per request key, then let
/// each caller narrow it down with a `FilteringFetch` over the shared rows.
pub struct FilteringFetch<C, T> {
    inner: BoxDelegate<C, Vec<T>>,
    keep: Arc<dyn Fn(&C, &T) -> bool + Send + Sync>,
}

impl<C, T> FilteringFetch<C, T> {
    pub fn new(
        inner: impl Fetch<C, Value = Vec<T>> + 'static,
        keep: impl Fn(&C, &T) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            inner: Box::new(inner),
            keep: Arc::new(keep),
        }
    }
}

impl<C, T> Fetch<C> for FilteringFetch<C, T>
where
    C: Clone + Send + Sync + 'static,
    T: Send + 'static,
{
    type Value = Vec<T>;

    fn invoke(&self, ctx: C) -> BoxFetchFuture<Vec<T>> {
        let keep = Arc::clone(&self.keep);
        let rows = self.inner.invoke(ctx.clone());
        async move {
            let rows = rows.await?;
            Ok(rows.into_iter().filter(|row| keep(&ctx, row)).collect())
        }
        .boxed()
    }
}
