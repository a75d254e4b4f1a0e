use bullpen_api::{ClientError, RequestParts};
use bullpen_registry::{Operation, ResourceFamily};
use bullpen_types::{AnalysisAccepted, Assessment, CreateAssessmentRequest};

use super::QueryClient;

#[derive(Debug, Clone)]
pub struct AssessmentsHook {
    client: QueryClient,
}

impl AssessmentsHook {
    pub(crate) fn new(client: QueryClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, athlete_id: Option<i64>) -> Result<Vec<Assessment>, ClientError> {
        let parts = RequestParts::new().maybe_query_param("athleteId", athlete_id);
        self.client.read(Operation::AssessmentsList, parts).await
    }

    pub async fn get(&self, id: i64) -> Result<Assessment, ClientError> {
        self.client.read(Operation::AssessmentsGet, Self::item(id)).await
    }

    /// Re-read one assessment from the server, replacing the cached copy.
    pub async fn refetch(&self, id: i64) -> Result<Assessment, ClientError> {
        self.client.refetch(Operation::AssessmentsGet, Self::item(id)).await
    }

    /// Cached copy of one assessment, if any read has settled.
    pub fn cached(&self, id: i64) -> Option<Assessment> {
        self.client.cached(Operation::AssessmentsGet, &Self::item(id))
    }

    pub async fn create(&self, request: &CreateAssessmentRequest) -> Result<Assessment, ClientError> {
        self.client
            .mutate(
                Operation::AssessmentsCreate,
                RequestParts::new().payload(request),
                &[ResourceFamily::Assessments],
            )
            .await
    }

    /// Ask the server to (re)start analysis. The cached status is left alone;
    /// the next read observes the transition.
    pub async fn analyze(&self, id: i64) -> Result<AnalysisAccepted, ClientError> {
        let accepted: Option<AnalysisAccepted> = self
            .client
            .mutate(Operation::AssessmentsAnalyze, Self::item(id), &[])
            .await?;
        Ok(accepted.unwrap_or_default())
    }

    fn item(id: i64) -> RequestParts {
        RequestParts::new().path_param("id", id)
    }
}
