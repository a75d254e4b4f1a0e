use bullpen_api::{ClientError, RequestParts};
use bullpen_registry::{Operation, ResourceFamily};
use bullpen_types::{CreateTeamRequest, Team};

use super::QueryClient;

#[derive(Debug, Clone)]
pub struct TeamsHook {
    client: QueryClient,
}

impl TeamsHook {
    pub(crate) fn new(client: QueryClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Team>, ClientError> {
        self.client.read(Operation::TeamsList, RequestParts::new()).await
    }

    pub async fn create(&self, request: &CreateTeamRequest) -> Result<Team, ClientError> {
        self.client
            .mutate(Operation::TeamsCreate, RequestParts::new().payload(request), &[ResourceFamily::Teams])
            .await
    }
}
