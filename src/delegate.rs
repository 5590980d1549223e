use anyhow::Error;
use futures::future::BoxFuture;

/// Future returned by one delegate invocation.
pub type BoxFetchFuture<T> = BoxFuture<'static, Result<T, Error>>;

/// An owned, type-erased delegate, as stored by a
/// [`Memoizer`](crate::Memoizer) and produced by registry factories.
pub type BoxDelegate<C, T> = Box<dyn Fetch<C, Value = T>>;

/// The wrapped fetch operation: an opaque capability taking a request
/// context and producing a value or an error.
///
/// Implementations are stateless as far as the memoizer is concerned; it
/// only promises to start at most one invocation per successful claim.
/// Any closure of shape `Fn(C) -> BoxFetchFuture<T>` is a `Fetch`.
pub trait Fetch<C>: Send + Sync {
    type Value;

    /// Start one fetch for the given request context.
    fn invoke(&self, ctx: C) -> BoxFetchFuture<Self::Value>;
}

impl<C, T, F> Fetch<C> for F
where
    F: Fn(C) -> BoxFetchFuture<T> + Send + Sync,
{
    type Value = T;

    fn invoke(&self, ctx: C) -> BoxFetchFuture<T> {
        self(ctx)
    }
}
