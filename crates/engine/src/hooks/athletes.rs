use bullpen_api::{ClientError, RequestParts};
use bullpen_registry::{Operation, ResourceFamily};
use bullpen_types::{Athlete, CreateAthleteRequest, UpdateAthleteRequest};

use super::QueryClient;

#[derive(Debug, Clone)]
pub struct AthletesHook {
    client: QueryClient,
}

impl AthletesHook {
    pub(crate) fn new(client: QueryClient) -> Self {
        Self { client }
    }

    /// All athletes, optionally narrowed to one team.
    pub async fn list(&self, team_id: Option<i64>) -> Result<Vec<Athlete>, ClientError> {
        let parts = RequestParts::new().maybe_query_param("teamId", team_id);
        self.client.read(Operation::AthletesList, parts).await
    }

    pub async fn get(&self, id: i64) -> Result<Athlete, ClientError> {
        self.client
            .read(Operation::AthletesGet, RequestParts::new().path_param("id", id))
            .await
    }

    /// A 400 from the server surfaces as [`ClientError::Domain`] carrying the
    /// server's message.
    pub async fn create(&self, request: &CreateAthleteRequest) -> Result<Athlete, ClientError> {
        self.client
            .mutate(
                Operation::AthletesCreate,
                RequestParts::new().payload(request),
                &[ResourceFamily::Athletes],
            )
            .await
    }

    pub async fn update(&self, id: i64, patch: &UpdateAthleteRequest) -> Result<Athlete, ClientError> {
        let parts = RequestParts::new().path_param("id", id).payload(patch);
        self.client
            .mutate(Operation::AthletesUpdate, parts, &[ResourceFamily::Athletes])
            .await
    }
}

#[cfg(test)]
mod tests {
    use bullpen_types::HttpMethod;
    use serde_json::json;

    use super::*;
    use crate::hooks::test_support::scripted_client;

    #[tokio::test]
    async fn list_is_served_from_cache_until_a_create() {
        let (client, transport) = scripted_client();
        let athletes = client.athletes();
        transport.respond_to(HttpMethod::Get, "/api/athletes", 200, json!([{ "id": 1, "name": "Ada" }]));
        transport.respond_to(HttpMethod::Post, "/api/athletes", 201, json!({ "id": 2, "name": "Bo" }));

        assert_eq!(athletes.list(None).await.unwrap().len(), 1);
        assert_eq!(athletes.list(None).await.unwrap().len(), 1);
        assert_eq!(transport.count(HttpMethod::Get, "/api/athletes"), 1);

        athletes.create(&CreateAthleteRequest::named("Bo")).await.unwrap();
        athletes.list(None).await.unwrap();
        assert_eq!(transport.count(HttpMethod::Get, "/api/athletes"), 2);
    }

    #[tokio::test]
    async fn team_filter_is_a_separate_cache_entry() {
        let (client, transport) = scripted_client();
        let athletes = client.athletes();
        transport.respond_to(HttpMethod::Get, "/api/athletes", 200, json!([]));
        transport.respond_to(HttpMethod::Get, "/api/athletes?teamId=3", 200, json!([{ "id": 1, "name": "Ada", "teamId": 3 }]));

        assert!(athletes.list(None).await.unwrap().is_empty());
        let filtered = athletes.list(Some(3)).await.unwrap();

        assert_eq!(filtered[0].team_id, Some(3));
    }

    #[tokio::test]
    async fn update_invalidates_the_item_and_the_lists() {
        let (client, transport) = scripted_client();
        let athletes = client.athletes();
        transport.respond_to(HttpMethod::Get, "/api/athletes/4", 200, json!({ "id": 4, "name": "Cy" }));
        transport.respond_to(HttpMethod::Get, "/api/athletes/4", 200, json!({ "id": 4, "name": "Cy Young" }));
        transport.respond_to(HttpMethod::Patch, "/api/athletes/4", 200, json!({ "id": 4, "name": "Cy Young" }));
        let patch = UpdateAthleteRequest {
            name: Some("Cy Young".into()),
            ..Default::default()
        };

        assert_eq!(athletes.get(4).await.unwrap().name, "Cy");
        athletes.update(4, &patch).await.unwrap();

        assert_eq!(athletes.get(4).await.unwrap().name, "Cy Young");
        assert_eq!(transport.count(HttpMethod::Get, "/api/athletes/4"), 2);
    }

    #[tokio::test]
    async fn rejected_create_keeps_the_cache() {
        let (client, transport) = scripted_client();
        let athletes = client.athletes();
        transport.respond_to(HttpMethod::Get, "/api/athletes", 200, json!([]));
        transport.respond_to(HttpMethod::Post, "/api/athletes", 400, json!({ "message": "Email already registered" }));

        athletes.list(None).await.unwrap();
        let error = athletes.create(&CreateAthleteRequest::named("Ada")).await.unwrap_err();

        assert_eq!(error.to_string(), "Email already registered");
        athletes.list(None).await.unwrap();
        assert_eq!(transport.count(HttpMethod::Get, "/api/athletes"), 1);
    }

    #[tokio::test]
    async fn blank_name_is_rejected_locally() {
        let (client, transport) = scripted_client();

        let error = client.athletes().create(&CreateAthleteRequest::named("")).await.unwrap_err();

        assert!(matches!(error, ClientError::Validation { .. }));
        assert!(transport.requests().is_empty());
    }
}
