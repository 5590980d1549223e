//! Single-flight memoized fetches, multiplexed per request key.
//!
//! Wraps an expensive, possibly failing fetch so that it executes at most
//! once per logical key even under concurrent callers, with every caller of
//! that key observing the same outcome. A [`Registry`] multiplexes
//! independent [`Memoizer`]s by a request-scoped key, creating one lazily
//! the first time a key is seen.
//!
//! A failed attempt is delivered to every caller waiting on it and releases
//! the claim, so a later call may retry. A successful attempt is terminal:
//! the value is cached for the lifetime of the key's entry.
//!
//! The registry performs no eviction. Construct one per top-level request
//! scope and drop it when the request completes.
//!
//! ```
//! use futures::FutureExt;
//! use memoflight::{BoxDelegate, BoxFetchFuture, Registry};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), memoflight::FetchError> {
//! let registry: Registry<&str, (), u64> = Registry::new();
//!
//! let factory = || {
//!     let delegate = |_ctx: ()| -> BoxFetchFuture<u64> { async move { Ok(42) }.boxed() };
//!     Ok(Box::new(delegate) as BoxDelegate<(), u64>)
//! };
//!
//! let value = registry.fetch("req-1", factory, ()).await?;
//! assert_eq!(value, 42);
//! # Ok(())
//! # }
//! ```

mod delegate;
mod error;
mod filter;
mod memoizer;
mod registry;

pub use crate::delegate::{BoxDelegate, BoxFetchFuture, Fetch};
pub use crate::error::FetchError;
pub use crate::filter::FilteringFetch;
pub use crate::memoizer::Memoizer;
pub use crate::registry::Registry;
