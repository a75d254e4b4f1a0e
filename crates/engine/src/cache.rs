//! Process-wide read cache shared by every resource hook.
//!
//! Each [`QueryKey`] maps to either a ready value or a single in-flight
//! fetch. Concurrent readers of the same key join the in-flight fetch instead
//! of issuing their own request. Mutations invalidate a whole
//! [`ResourceFamily`]; a fetch that settles after its slot was invalidated
//! never writes its result back.

use std::{
    collections::HashMap,
    fmt,
    future::Future,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use bullpen_api::ClientError;
use bullpen_registry::{Operation, ResourceFamily};
use futures_util::{
    FutureExt,
    future::{BoxFuture, Shared},
};
use serde_json::Value;
use tokio::time::Instant;
use tracing::debug;

type SharedFetch = Shared<BoxFuture<'static, Result<Value, ClientError>>>;

/// Identity of one cached read: the operation plus the concrete path
/// (including id and query filters) it was issued against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub family: ResourceFamily,
    pub operation: Operation,
    pub target: String,
}

impl QueryKey {
    pub fn new(operation: Operation, target: impl Into<String>) -> Self {
        Self {
            family: operation.family(),
            operation,
            target: target.into(),
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.operation, self.target)
    }
}

#[derive(Clone)]
enum Slot {
    Ready { value: Value, fetched_at: Instant },
    InFlight { generation: u64, fetch: SharedFetch },
}

#[derive(Default)]
struct CacheState {
    slots: HashMap<QueryKey, Slot>,
    next_generation: u64,
}

#[derive(Clone)]
pub struct QueryCache {
    state: Arc<Mutex<CacheState>>,
    time_to_live: Option<Duration>,
}

impl fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCache")
            .field("time_to_live", &self.time_to_live)
            .field("slots", &self.lock().slots.len())
            .finish()
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(None)
    }
}

impl QueryCache {
    /// `None` keeps values until they are invalidated.
    pub fn new(time_to_live: Option<Duration>) -> Self {
        Self {
            state: Arc::new(Mutex::new(CacheState::default())),
            time_to_live,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn is_fresh(&self, fetched_at: Instant) -> bool {
        self.time_to_live.is_none_or(|ttl| fetched_at.elapsed() < ttl)
    }

    /// Return the cached value for `key`, joining or starting a fetch when
    /// there is no fresh value.
    pub async fn get_or_fetch<F, Fut>(&self, key: QueryKey, fetch: F) -> Result<Value, ClientError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, ClientError>> + Send + 'static,
    {
        let (generation, shared) = {
            let mut state = self.lock();
            match state.slots.get(&key).cloned() {
                Some(Slot::Ready { value, fetched_at }) if self.is_fresh(fetched_at) => {
                    debug!(key = %key, "query cache hit");
                    return Ok(value);
                }
                Some(Slot::InFlight { generation, fetch }) => {
                    debug!(key = %key, "joining in-flight query");
                    (generation, fetch)
                }
                _ => {
                    state.next_generation += 1;
                    let generation = state.next_generation;
                    let shared = fetch().boxed().shared();
                    state.slots.insert(
                        key.clone(),
                        Slot::InFlight {
                            generation,
                            fetch: shared.clone(),
                        },
                    );
                    debug!(key = %key, generation, "query fetch started");
                    (generation, shared)
                }
            }
        };

        let outcome = shared.await;
        self.settle(&key, generation, &outcome);
        outcome
    }

    /// Drop any ready value for `key` and fetch again. An in-flight fetch is
    /// joined rather than duplicated.
    pub async fn refetch<F, Fut>(&self, key: QueryKey, fetch: F) -> Result<Value, ClientError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, ClientError>> + Send + 'static,
    {
        {
            let mut state = self.lock();
            if matches!(state.slots.get(&key), Some(Slot::Ready { .. })) {
                state.slots.remove(&key);
            }
        }
        self.get_or_fetch(key, fetch).await
    }

    fn settle(&self, key: &QueryKey, generation: u64, outcome: &Result<Value, ClientError>) {
        let mut state = self.lock();
        let current = matches!(
            state.slots.get(key),
            Some(Slot::InFlight { generation: slot_generation, .. }) if *slot_generation == generation
        );
        if !current {
            return;
        }
        match outcome {
            Ok(value) => {
                state.slots.insert(
                    key.clone(),
                    Slot::Ready {
                        value: value.clone(),
                        fetched_at: Instant::now(),
                    },
                );
            }
            Err(_) => {
                state.slots.remove(key);
            }
        }
    }

    /// Last settled value for `key`, fresh or not.
    pub fn peek(&self, key: &QueryKey) -> Option<Value> {
        match self.lock().slots.get(key) {
            Some(Slot::Ready { value, .. }) => Some(value.clone()),
            _ => None,
        }
    }

    pub fn is_in_flight(&self, key: &QueryKey) -> bool {
        matches!(self.lock().slots.get(key), Some(Slot::InFlight { .. }))
    }

    /// Remove every ready and in-flight slot of `family`.
    pub fn invalidate(&self, family: ResourceFamily) {
        let mut state = self.lock();
        let before = state.slots.len();
        state.slots.retain(|key, _| key.family != family);
        debug!(family = %family, removed = before - state.slots.len(), "query cache invalidated");
    }

    pub fn invalidate_key(&self, key: &QueryKey) {
        self.lock().slots.remove(key);
    }

    pub fn len(&self) -> usize {
        self.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
