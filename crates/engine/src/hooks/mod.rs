//! Per-resource read/write operations over the executor and the shared
//! [`QueryCache`].
//!
//! Reads are cached under the concrete path they were issued against, retried
//! on transport failures and deduplicated while in flight. Writes are never
//! retried; after a successful write the owning hook invalidates its family.

mod assessments;
mod athletes;
mod coaches;
mod onboarding;
mod teams;

pub use assessments::AssessmentsHook;
pub use athletes::AthletesHook;
pub use coaches::CoachesHook;
pub use onboarding::OnboardingHook;
pub use teams::TeamsHook;

use std::sync::Arc;

use bullpen_api::{ClientError, Executor, HttpTransport, RequestParts, decode};
use bullpen_registry::{ContractEntry, ContractRegistry, Operation, ResourceFamily};
use bullpen_util::append_query;
use futures_util::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::{
    cache::{QueryCache, QueryKey},
    retry::RetryPolicy,
};

/// Executor, cache and retry policy shared by every hook.
#[derive(Debug, Clone)]
pub struct QueryClient {
    executor: Executor,
    cache: QueryCache,
    retry: RetryPolicy,
}

impl QueryClient {
    pub fn new(executor: Executor, cache: QueryCache, retry: RetryPolicy) -> Self {
        Self { executor, cache, retry }
    }

    pub fn with_transport(transport: Arc<dyn HttpTransport>) -> Self {
        Self::new(Executor::new(transport), QueryCache::default(), RetryPolicy::default())
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    pub fn athletes(&self) -> AthletesHook {
        AthletesHook::new(self.clone())
    }

    pub fn teams(&self) -> TeamsHook {
        TeamsHook::new(self.clone())
    }

    pub fn coaches(&self) -> CoachesHook {
        CoachesHook::new(self.clone())
    }

    pub fn assessments(&self) -> AssessmentsHook {
        AssessmentsHook::new(self.clone())
    }

    pub fn onboarding(&self) -> OnboardingHook {
        OnboardingHook::new(self.clone())
    }

    /// Cache key a read of `operation` with `parts` is stored under.
    pub fn key_for(&self, operation: Operation, parts: &RequestParts) -> Result<QueryKey, ClientError> {
        let entry = entry(operation);
        let path = entry.build_path(&parts.path_params)?;
        let query: Vec<(String, String)> = parts
            .query
            .iter()
            .filter(|(key, _)| entry.query_keys.contains(&key.as_str()))
            .cloned()
            .collect();
        Ok(QueryKey::new(operation, append_query(&path, &query)))
    }

    /// Cached, deduplicated read.
    pub(crate) async fn read<T: DeserializeOwned>(&self, operation: Operation, parts: RequestParts) -> Result<T, ClientError> {
        let key = self.key_for(operation, &parts)?;
        let fetch = self.fetch(operation, parts);
        let body = self.cache.get_or_fetch(key, move || fetch).await?;
        decode_body(operation, body)
    }

    /// Read that skips any cached value but still joins an in-flight fetch.
    pub(crate) async fn refetch<T: DeserializeOwned>(&self, operation: Operation, parts: RequestParts) -> Result<T, ClientError> {
        let key = self.key_for(operation, &parts)?;
        let fetch = self.fetch(operation, parts);
        let body = self.cache.refetch(key, move || fetch).await?;
        decode_body(operation, body)
    }

    /// Last settled value of a read, without touching the network.
    pub(crate) fn cached<T: DeserializeOwned>(&self, operation: Operation, parts: &RequestParts) -> Option<T> {
        let key = self.key_for(operation, parts).ok()?;
        let body = self.cache.peek(&key)?;
        serde_json::from_value(body).ok()
    }

    /// Single attempt write followed by invalidation of `invalidates`.
    pub(crate) async fn mutate<T: DeserializeOwned>(
        &self,
        operation: Operation,
        parts: RequestParts,
        invalidates: &[ResourceFamily],
    ) -> Result<T, ClientError> {
        let entry = entry(operation);
        let response = self.executor.execute(entry, parts).await?;
        for family in invalidates {
            self.cache.invalidate(*family);
        }
        debug!(%operation, invalidated = invalidates.len(), "mutation settled");
        decode(entry, response)
    }

    fn fetch(&self, operation: Operation, parts: RequestParts) -> BoxFuture<'static, Result<Value, ClientError>> {
        let executor = self.executor.clone();
        let retry = self.retry;
        Box::pin(async move {
            let entry = entry(operation);
            let response = retry
                .run(operation.name(), || executor.execute(entry, parts.clone()))
                .await?;
            Ok(response.body)
        })
    }
}

fn entry(operation: Operation) -> &'static ContractEntry {
    ContractRegistry::global().entry(operation)
}

fn decode_body<T: DeserializeOwned>(operation: Operation, body: Value) -> Result<T, ClientError> {
    serde_json::from_value(body).map_err(|error| ClientError::ContractViolation {
        operation,
        status: 200,
        detail: format!("cached body does not decode: {error}"),
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use bullpen_api::testing::ScriptedTransport;

    use super::QueryClient;
    use crate::{cache::QueryCache, retry::RetryPolicy};
    use bullpen_api::Executor;

    /// Client over a scripted transport with retries disabled.
    pub(crate) fn scripted_client() -> (QueryClient, Arc<ScriptedTransport>) {
        let transport = Arc::new(ScriptedTransport::new());
        let client = QueryClient::new(Executor::new(transport.clone()), QueryCache::default(), RetryPolicy::none());
        (client, transport)
    }
}
