//! Contract-checked request execution.
//!
//! [`Executor::execute`] runs one registry operation end to end:
//! 1. builds the path from path parameters and allowed query filters,
//! 2. validates the request body against the input schema (nothing is sent
//!    when it fails),
//! 3. sends the request through the transport,
//! 4. validates the response body against the schema registered for the
//!    returned status and maps the outcome onto [`ClientError`].

use std::{collections::HashMap, fmt::Display, sync::Arc, time::Instant};

use bullpen_registry::{ContractEntry, validate};
use bullpen_types::ErrorBody;
use bullpen_util::{append_query, redact_sensitive, truncate_for_summary};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::{
    ClientError,
    transport::{HttpRequest, HttpResponse, HttpTransport},
};

/// Maximum characters of a response body echoed into logs and errors.
const BODY_PREVIEW_LEN: usize = 160;

/// Inputs for one call: path parameters, query filters and an optional body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestParts {
    pub path_params: HashMap<String, String>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RequestParts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path_param(mut self, name: &str, value: impl Display) -> Self {
        self.path_params.insert(name.to_string(), value.to_string());
        self
    }

    pub fn query_param(mut self, name: &str, value: impl Display) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    /// Add an optional query filter; `None` leaves the query untouched.
    pub fn maybe_query_param(self, name: &str, value: Option<impl Display>) -> Self {
        match value {
            Some(value) => self.query_param(name, value),
            None => self,
        }
    }

    pub fn json_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Serialize a typed request model into the body. A model that cannot be
    /// serialized leaves a `null` body, which then fails input validation.
    pub fn payload<T: Serialize>(self, payload: &T) -> Self {
        let body = serde_json::to_value(payload).unwrap_or_else(|error| {
            warn!(error = %error, "request payload could not be serialized");
            Value::Null
        });
        self.json_body(body)
    }
}

/// A response whose body matched its registered schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedResponse {
    pub status: u16,
    pub body: Value,
}

/// Stateless executor; cheap to clone and safe to share across tasks.
#[derive(Clone)]
pub struct Executor {
    transport: Arc<dyn HttpTransport>,
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor").finish_non_exhaustive()
    }
}

impl Executor {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// Run `entry` and return the validated body.
    pub async fn execute(&self, entry: &ContractEntry, parts: RequestParts) -> Result<ValidatedResponse, ClientError> {
        let operation = entry.operation;
        let path = entry.build_path(&parts.path_params)?;
        let query = allowed_query(entry, parts.query);
        let path = append_query(&path, &query);

        if let Some(schema) = entry.input_schema {
            let missing = Value::Null;
            let candidate = parts.body.as_ref().unwrap_or(&missing);
            if let Err(violations) = validate(schema, candidate) {
                debug!(%operation, violation_count = violations.len(), "request rejected before send");
                return Err(ClientError::Validation { operation, violations });
            }
        }
        let body = if entry.method.has_body() { parts.body } else { None };

        let start = Instant::now();
        debug!(%operation, method = %entry.method, path = %path, has_body = body.is_some(), "http request started");
        let request = HttpRequest {
            method: entry.method,
            path: path.clone(),
            body,
        };
        let response = self.transport.send(request).await.map_err(|network_error| {
            warn!(
                %operation,
                path = %path,
                error = %redact_sensitive(&network_error.0),
                duration_ms = start.elapsed().as_millis(),
                "http request failed"
            );
            ClientError::Transport {
                operation,
                status: None,
                message: network_error.0,
            }
        })?;
        debug!(
            %operation,
            path = %path,
            status = response.status,
            duration_ms = start.elapsed().as_millis(),
            "http request completed"
        );

        if response.is_success() {
            interpret_success(entry, response)
        } else {
            Err(interpret_failure(entry, response))
        }
    }

    /// Run `entry` and deserialize the validated body into `T`.
    pub async fn execute_as<T: DeserializeOwned>(&self, entry: &ContractEntry, parts: RequestParts) -> Result<T, ClientError> {
        let response = self.execute(entry, parts).await?;
        decode(entry, response)
    }
}

/// Deserialize a validated body. A mismatch here means the schema and the
/// model disagree, which is reported as a contract violation.
pub fn decode<T: DeserializeOwned>(entry: &ContractEntry, response: ValidatedResponse) -> Result<T, ClientError> {
    serde_json::from_value(response.body).map_err(|error| ClientError::ContractViolation {
        operation: entry.operation,
        status: response.status,
        detail: format!("body does not decode: {error}"),
    })
}

fn allowed_query(entry: &ContractEntry, query: Vec<(String, String)>) -> Vec<(String, String)> {
    query
        .into_iter()
        .filter(|(key, _)| {
            let allowed = entry.query_keys.contains(&key.as_str());
            if !allowed {
                warn!(operation = %entry.operation, key = %key, "dropping query parameter not in contract");
            }
            allowed
        })
        .collect()
}

fn parse_body(text: &str) -> Result<Value, serde_json::Error> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text)
}

fn body_preview(text: &str) -> String {
    truncate_for_summary(&redact_sensitive(text), BODY_PREVIEW_LEN)
}

fn contract_violation(entry: &ContractEntry, status: u16, detail: String) -> ClientError {
    error!(
        operation = %entry.operation,
        status,
        detail = %detail,
        "response violates registered contract"
    );
    ClientError::ContractViolation {
        operation: entry.operation,
        status,
        detail,
    }
}

fn interpret_success(entry: &ContractEntry, response: HttpResponse) -> Result<ValidatedResponse, ClientError> {
    let status = response.status;
    let Some(schema) = entry.success_schema(status) else {
        return Err(contract_violation(entry, status, "no success schema registered".into()));
    };
    let body = parse_body(&response.body).map_err(|error| {
        contract_violation(
            entry,
            status,
            format!("body is not JSON ({error}): {}", body_preview(&response.body)),
        )
    })?;
    validate(schema, &body).map_err(|violations| {
        let detail = violations
            .iter()
            .map(|violation| violation.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        contract_violation(entry, status, detail)
    })?;
    Ok(ValidatedResponse { status, body })
}

fn interpret_failure(entry: &ContractEntry, response: HttpResponse) -> ClientError {
    let operation = entry.operation;
    let status = response.status;
    let Some(schema) = entry.response_schema(status) else {
        warn!(%operation, status, body = %body_preview(&response.body), "unregistered error status");
        return ClientError::Transport {
            operation,
            status: Some(status),
            message: body_preview(&response.body),
        };
    };

    let parsed = parse_body(&response.body)
        .map_err(|error| error.to_string())
        .and_then(|body| {
            validate(schema, &body).map_err(|violations| {
                violations
                    .iter()
                    .map(|violation| violation.message.clone())
                    .collect::<Vec<_>>()
                    .join("; ")
            })?;
            serde_json::from_value::<ErrorBody>(body).map_err(|error| error.to_string())
        });

    match parsed {
        Ok(error_body) => {
            warn!(%operation, status, message = %error_body.message, "request rejected by server");
            ClientError::Domain {
                operation,
                status,
                message: error_body.message,
            }
        }
        Err(detail) => contract_violation(entry, status, detail),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedTransport;
    use bullpen_registry::{ContractRegistry, Operation};
    use bullpen_types::{Athlete, CreateAthleteRequest};
    use serde_json::json;

    fn entry(operation: Operation) -> &'static ContractEntry {
        ContractRegistry::global().entry(operation)
    }

    fn executor(transport: &Arc<ScriptedTransport>) -> Executor {
        Executor::new(transport.clone())
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_the_network() {
        let transport = Arc::new(ScriptedTransport::new());
        let parts = RequestParts::new().json_body(json!({ "name": "" }));

        let error = executor(&transport)
            .execute(entry(Operation::AthletesCreate), parts)
            .await
            .unwrap_err();

        assert!(matches!(error, ClientError::Validation { operation: Operation::AthletesCreate, .. }));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn missing_path_parameter_fails_before_send() {
        let transport = Arc::new(ScriptedTransport::new());

        let error = executor(&transport)
            .execute(entry(Operation::AthletesGet), RequestParts::new())
            .await
            .unwrap_err();

        assert!(matches!(error, ClientError::MissingParameter(ref missing) if missing.parameter == "id"));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn created_athlete_round_trips_through_both_schemas() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(201, json!({ "id": 5, "name": "Lee Ames", "teamId": 2 }));
        let mut request = CreateAthleteRequest::named("Lee Ames");
        request.team_id = Some(2);

        let athlete: Athlete = executor(&transport)
            .execute_as(entry(Operation::AthletesCreate), RequestParts::new().payload(&request))
            .await
            .unwrap();

        assert_eq!(athlete.id, 5);
        assert_eq!(athlete.team_id, Some(2));
        let sent = transport.requests();
        assert_eq!(sent[0].path, "/api/athletes");
        assert_eq!(sent[0].body, Some(json!({ "name": "Lee Ames", "teamId": 2 })));
    }

    #[tokio::test]
    async fn registered_error_status_becomes_domain_error() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(400, json!({ "message": "An athlete with that email already exists" }));
        let parts = RequestParts::new().json_body(json!({ "name": "Lee Ames" }));

        let error = executor(&transport)
            .execute(entry(Operation::AthletesCreate), parts)
            .await
            .unwrap_err();

        assert_eq!(
            error,
            ClientError::Domain {
                operation: Operation::AthletesCreate,
                status: 400,
                message: "An athlete with that email already exists".into(),
            }
        );
    }

    #[tokio::test]
    async fn unregistered_error_status_becomes_transport_error() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond_text(500, "Internal Server Error");

        let error = executor(&transport)
            .execute(entry(Operation::TeamsList), RequestParts::new())
            .await
            .unwrap_err();

        assert!(matches!(error, ClientError::Transport { status: Some(500), .. }));
        assert!(error.is_retryable());
    }

    #[tokio::test]
    async fn success_body_that_drifts_is_a_contract_violation() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(200, json!({ "id": 42, "athleteId": 7, "status": "queued" }));

        let error = executor(&transport)
            .execute(entry(Operation::AssessmentsGet), RequestParts::new().path_param("id", 42))
            .await
            .unwrap_err();

        assert!(matches!(error, ClientError::ContractViolation { status: 200, .. }));
    }

    #[tokio::test]
    async fn non_json_success_body_is_a_contract_violation() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond_text(200, "<html>login</html>");

        let error = executor(&transport)
            .execute(entry(Operation::TeamsList), RequestParts::new())
            .await
            .unwrap_err();

        assert!(matches!(error, ClientError::ContractViolation { .. }));
    }

    #[tokio::test]
    async fn network_failure_becomes_transport_error_without_status() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.fail("connection reset");

        let error = executor(&transport)
            .execute(entry(Operation::OnboardingStatus), RequestParts::new())
            .await
            .unwrap_err();

        assert!(matches!(error, ClientError::Transport { status: None, ref message, .. } if message == "connection reset"));
    }

    #[tokio::test]
    async fn query_filters_outside_the_contract_are_dropped() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(200, json!([]));
        let parts = RequestParts::new().query_param("teamId", 4).query_param("debug", true);

        executor(&transport)
            .execute(entry(Operation::AthletesList), parts)
            .await
            .unwrap();

        assert_eq!(transport.requests()[0].path, "/api/athletes?teamId=4");
    }

    #[tokio::test]
    async fn analyze_twice_sends_identical_requests() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(200, json!({ "message": "Analysis started" }));
        transport.respond_text(200, "");
        let executor = executor(&transport);
        let analyze = entry(Operation::AssessmentsAnalyze);

        let first = executor.execute(analyze, RequestParts::new().path_param("id", 42)).await.unwrap();
        let second = executor.execute(analyze, RequestParts::new().path_param("id", 42)).await.unwrap();

        assert_eq!(first.status, second.status);
        assert_eq!(second.body, Value::Null);
        let sent = transport.requests();
        assert_eq!(sent[0], sent[1]);
        assert_eq!(sent[0].path, "/api/assessments/42/analyze");
    }

    #[tokio::test]
    async fn upload_stub_surfaces_not_implemented() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(501, json!({ "message": "Upload not implemented" }));

        let error = executor(&transport)
            .execute(entry(Operation::Upload), RequestParts::new())
            .await
            .unwrap_err();

        assert!(error.is_domain_status(501));
    }
}
