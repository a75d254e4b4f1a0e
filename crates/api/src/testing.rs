//! Scripted [`HttpTransport`] for exercising the client without a server.
//!
//! Responses are queued either for a specific `(method, path)` route or on a
//! fallback queue. A route queue keeps replaying its last response once the
//! earlier ones are consumed; the fallback queue does not.

use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
    time::Duration,
};

use async_trait::async_trait;
use bullpen_types::HttpMethod;
use serde_json::Value;

use crate::transport::{HttpRequest, HttpResponse, HttpTransport, NetworkError};

type Scripted = Result<HttpResponse, NetworkError>;

#[derive(Debug, Default)]
struct Script {
    routes: HashMap<(HttpMethod, String), VecDeque<Scripted>>,
    fallback: VecDeque<Scripted>,
    delays: HashMap<(HttpMethod, String), Duration>,
    requests: Vec<HttpRequest>,
}

#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: Mutex<Script>,
    latency: Mutex<Option<Duration>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a JSON response on the fallback queue.
    pub fn respond(&self, status: u16, body: Value) {
        self.push_fallback(Ok(HttpResponse::new(status, body.to_string())));
    }

    /// Queue a raw text response on the fallback queue.
    pub fn respond_text(&self, status: u16, body: &str) {
        self.push_fallback(Ok(HttpResponse::new(status, body)));
    }

    /// Queue a network failure on the fallback queue.
    pub fn fail(&self, message: &str) {
        self.push_fallback(Err(NetworkError(message.to_string())));
    }

    /// Queue a JSON response for one route.
    pub fn respond_to(&self, method: HttpMethod, path: &str, status: u16, body: Value) {
        self.push_route(method, path, Ok(HttpResponse::new(status, body.to_string())));
    }

    /// Queue a network failure for one route.
    pub fn fail_on(&self, method: HttpMethod, path: &str, message: &str) {
        self.push_route(method, path, Err(NetworkError(message.to_string())));
    }

    /// Delay every response by `latency` (honours a paused tokio clock).
    pub fn set_latency(&self, latency: Duration) {
        if let Ok(mut slot) = self.latency.lock() {
            *slot = Some(latency);
        }
    }

    /// Delay responses for one route, overriding [`Self::set_latency`].
    pub fn delay_route(&self, method: HttpMethod, path: &str, delay: Duration) {
        if let Ok(mut script) = self.script.lock() {
            script.delays.insert((method, path.to_string()), delay);
        }
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.script.lock().map(|script| script.requests.clone()).unwrap_or_default()
    }

    /// Number of requests received for one route.
    pub fn count(&self, method: HttpMethod, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|request| request.method == method && request.path == path)
            .count()
    }

    fn push_fallback(&self, scripted: Scripted) {
        if let Ok(mut script) = self.script.lock() {
            script.fallback.push_back(scripted);
        }
    }

    fn push_route(&self, method: HttpMethod, path: &str, scripted: Scripted) {
        if let Ok(mut script) = self.script.lock() {
            script.routes.entry((method, path.to_string())).or_default().push_back(scripted);
        }
    }

    fn delay_for(&self, request: &HttpRequest) -> Option<Duration> {
        let key = (request.method, request.path.clone());
        let routed = self.script.lock().ok().and_then(|script| script.delays.get(&key).copied());
        routed.or_else(|| self.latency.lock().ok().and_then(|slot| *slot))
    }

    fn next(&self, request: HttpRequest) -> Scripted {
        let mut script = self
            .script
            .lock()
            .map_err(|_| NetworkError("scripted transport poisoned".to_string()))?;
        let key = (request.method, request.path.clone());
        let description = format!("{} {}", request.method, request.path);
        script.requests.push(request);

        if let Some(queue) = script.routes.get_mut(&key) {
            let next = if queue.len() > 1 { queue.pop_front() } else { queue.front().cloned() };
            if let Some(next) = next {
                return next;
            }
        }
        script
            .fallback
            .pop_front()
            .unwrap_or_else(|| Err(NetworkError(format!("no scripted response for {description}"))))
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, NetworkError> {
        let latency = self.delay_for(&request);
        let outcome = self.next(request);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        outcome
    }
}
