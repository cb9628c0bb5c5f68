//! Single-flight execution guard.
//!
//! Concurrent callers asking for the same key share one execution of the
//! producer and all observe its outcome. The key is registered and looked up
//! in a single map operation, and the registration is cleared as soon as the
//! execution resolves so a later call can run the producer again.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use metrics::counter;
use tracing::debug;

type SharedOutcome<T, E> = Shared<BoxFuture<'static, Result<T, E>>>;

struct Flight<T, E> {
    id: u64,
    outcome: SharedOutcome<T, E>,
}

/// Registry of in-flight executions keyed by artifact identity.
pub struct SingleFlight<T, E> {
    name: &'static str,
    flights: Arc<DashMap<String, Flight<T, E>>>,
    next_id: AtomicU64,
}

impl<T, E> SingleFlight<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// `name` labels this guard in logs and metrics.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            flights: Arc::new(DashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Run `producer` for `key` unless an execution is already in flight,
    /// in which case wait for that one instead.
    ///
    /// `producer` is only called by the caller that registers the flight.
    pub async fn run_exclusive<F, Fut>(&self, key: &str, producer: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let outcome = match self.flights.entry(key.to_string()) {
            Entry::Occupied(flight) => {
                debug!(flight = self.name, key = %key, "Joining in-flight execution");
                counter!("reel_single_flight_joins_total", "flight" => self.name).increment(1);
                flight.get().outcome.clone()
            }
            Entry::Vacant(slot) => {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                let flights = Arc::clone(&self.flights);
                let owned_key = key.to_string();
                let work = producer();

                let outcome = async move {
                    let result = work.await;
                    flights.remove_if(&owned_key, |_, flight| flight.id == id);
                    result
                }
                .boxed()
                .shared();

                slot.insert(Flight {
                    id,
                    outcome: outcome.clone(),
                });
                outcome
            }
        };

        outcome.await
    }
}
