use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex;

use crate::delegate::{BoxDelegate, Fetch};
use crate::error::FetchError;

// One attempt's outcome, shared by the claim holder and every waiter that
// joined while the attempt was in flight. Carrying the error in the shared
// result is what unblocks waiters when an attempt fails.
type SharedAttempt<T> = Shared<BoxFuture<'static, Result<T, FetchError>>>;

/// Per-memoizer fetch state. `Idle` means no claim is held, `InFlight`
/// holds the shared outcome of the claimed attempt, `Resolved` is terminal.
enum Slot<T> {
    Idle,
    InFlight(SharedAttempt<T>),
    Resolved(T),
}

/// Wraps one delegate so that it executes at most once per claimed attempt,
/// with every concurrent caller observing that attempt's outcome.
///
/// A successful attempt is terminal: the value is cached and the delegate
/// is never invoked again. A failed attempt releases the claim, so the next
/// caller starts a fresh attempt; the failure itself is delivered to every
/// caller that was waiting on it.
pub struct Memoizer<C, T> {
    delegate: BoxDelegate<C, T>,
    slot: Mutex<Slot<T>>,
}

impl<C, T> Memoizer<C, T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(delegate: impl Fetch<C, Value = T> + 'static) -> Self {
        Self::from_boxed(Box::new(delegate))
    }

    pub fn from_boxed(delegate: BoxDelegate<C, T>) -> Self {
        Self {
            delegate,
            slot: Mutex::new(Slot::Idle),
        }
    }

    /// Resolve the memoized fetch for `ctx`.
    ///
    /// Exactly one concurrent caller claims the attempt and the delegate
    /// runs inside the shared attempt future; everyone else awaits the same
    /// outcome. Losers never invoke the delegate themselves.
    pub async fn get(&self, ctx: C) -> Result<T, FetchError> {
        let (attempt, claimed) = {
            let mut slot = self.slot.lock().await;
            match &*slot {
                Slot::Resolved(value) => {
                    tracing::trace!("Returning memoized value");
                    return Ok(value.clone());
                }
                Slot::InFlight(attempt) => {
                    tracing::trace!("Joining in-flight fetch attempt");
                    (attempt.clone(), false)
                }
                Slot::Idle => {
                    tracing::trace!("Claimed a new fetch attempt");
                    let attempt = self
                        .delegate
                        .invoke(ctx)
                        .map(|res| res.map_err(FetchError::fetch))
                        .boxed()
                        .shared();
                    *slot = Slot::InFlight(attempt.clone());
                    (attempt, true)
                }
            }
        };

        let result = attempt.await;

        // Only the claim holder publishes the terminal transition; waiters
        // already hold the attempt's shared outcome.
        if claimed {
            let mut slot = self.slot.lock().await;
            match &result {
                Ok(value) => *slot = Slot::Resolved(value.clone()),
                Err(error) => {
                    tracing::debug!("Fetch attempt failed, releasing claim: {error}");
                    *slot = Slot::Idle;
                }
            }
        }

        result
    }
}
