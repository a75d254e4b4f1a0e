use bullpen_api::{ClientError, RequestParts};
use bullpen_registry::Operation;
use bullpen_types::OnboardingStatus;

use super::QueryClient;

#[derive(Debug, Clone)]
pub struct OnboardingHook {
    client: QueryClient,
}

impl OnboardingHook {
    pub(crate) fn new(client: QueryClient) -> Self {
        Self { client }
    }

    pub async fn status(&self) -> Result<OnboardingStatus, ClientError> {
        self.client.read(Operation::OnboardingStatus, RequestParts::new()).await
    }

    /// Fresh snapshot; the gate calls this on every mount.
    pub async fn refresh(&self) -> Result<OnboardingStatus, ClientError> {
        self.client.refetch(Operation::OnboardingStatus, RequestParts::new()).await
    }
}

#[cfg(test)]
mod tests {
    use bullpen_types::HttpMethod;
    use serde_json::json;

    use super::*;
    use crate::hooks::test_support::scripted_client;

    #[tokio::test]
    async fn refresh_always_reaches_the_server() {
        let (client, transport) = scripted_client();
        let onboarding = client.onboarding();
        transport.respond_to(
            HttpMethod::Get,
            "/api/player/onboarding",
            200,
            json!({ "dashboardUnlocked": false, "baselineComplete": false }),
        );
        transport.respond_to(
            HttpMethod::Get,
            "/api/player/onboarding",
            200,
            json!({ "dashboardUnlocked": true, "baselineComplete": true }),
        );

        assert!(!onboarding.status().await.unwrap().dashboard_unlocked);
        assert!(!onboarding.status().await.unwrap().dashboard_unlocked);
        assert!(onboarding.refresh().await.unwrap().dashboard_unlocked);
        assert_eq!(transport.count(HttpMethod::Get, "/api/player/onboarding"), 2);
    }
}
