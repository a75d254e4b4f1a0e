use bullpen_api::{ClientError, RequestParts};
use bullpen_registry::{Operation, ResourceFamily};
use bullpen_types::{Coach, CreateCoachRequest};

use super::QueryClient;

#[derive(Debug, Clone)]
pub struct CoachesHook {
    client: QueryClient,
}

impl CoachesHook {
    pub(crate) fn new(client: QueryClient) -> Self {
        Self { client }
    }

    /// Coach profile of the signed-in user; `None` when no profile exists yet.
    ///
    /// Any 404 counts as "no profile", whatever its body looks like.
    pub async fn me(&self) -> Result<Option<Coach>, ClientError> {
        match self.client.read(Operation::CoachesMe, RequestParts::new()).await {
            Ok(coach) => Ok(Some(coach)),
            Err(error) if error.status() == Some(404) => Ok(None),
            Err(error) => Err(error),
        }
    }

    pub async fn create(&self, request: &CreateCoachRequest) -> Result<Coach, ClientError> {
        self.client
            .mutate(Operation::CoachesCreate, RequestParts::new().payload(request), &[ResourceFamily::Coaches])
            .await
    }
}
