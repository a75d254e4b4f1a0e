//! Access gate and router.
//!
//! Navigation runs two layers. Role resolution picks the route table for the
//! session and matches the path. Player routes marked as gated then go
//! through the [`OnboardingGate`], which fetches a fresh onboarding status on
//! every navigation.

mod onboarding;
mod routes;

pub use onboarding::{GateOutcome, GateState, OnboardingGate, UnlockLatch};
pub use routes::{
    DASHBOARD_PATH, LANDING_PATH, LOGIN_PATH, Navigation, ONBOARDING_PATH, Route, RouteSet, View, normalize_path,
    resolve_route_set,
};

use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    hooks::OnboardingHook,
    session::{IdentityProvider, Session},
};

/// Final answer for one navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Render(View),
    Redirect(String),
    /// Indeterminate state; nothing gated is shown.
    Loading,
}

pub struct Router {
    identity: Arc<dyn IdentityProvider>,
    onboarding: OnboardingHook,
    latch: UnlockLatch,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router").field("latch", &self.latch).finish_non_exhaustive()
    }
}

impl Router {
    pub fn new(identity: Arc<dyn IdentityProvider>, onboarding: OnboardingHook) -> Self {
        Self {
            identity,
            onboarding,
            latch: UnlockLatch::default(),
        }
    }

    /// Resolve `path` for whoever is signed in right now.
    pub async fn navigate(&self, path: &str) -> Decision {
        match self.identity.current_session().await {
            Ok(session) => self.decide(&session, path).await,
            Err(error) => {
                warn!(path, error = %error, "session lookup failed; holding navigation");
                Decision::Loading
            }
        }
    }

    pub async fn decide(&self, session: &Session, path: &str) -> Decision {
        let routes = resolve_route_set(session);
        let route = match routes.resolve_navigation(path) {
            Navigation::Render(route) => route,
            Navigation::Redirect(target) => {
                debug!(path, ?routes, redirect = %target, "path not in route set");
                return Decision::Redirect(target);
            }
        };
        if !route.gated {
            return Decision::Render(route.view);
        }

        let mut gate = OnboardingGate::mount();
        let fetched = self.onboarding.refresh().await.map(|status| match session.user() {
            Some(user) => self.latch.apply(&user.id, status),
            None => status,
        });
        gate.resolve(fetched);

        match gate.outcome() {
            GateOutcome::ShowLoading => Decision::Loading,
            GateOutcome::Redirect(target) => {
                debug!(path, redirect = target, "onboarding incomplete; redirecting");
                Decision::Redirect(target.to_string())
            }
            GateOutcome::Render => Decision::Render(route.view),
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use bullpen_api::ClientError;
    use bullpen_registry::Operation;
    use bullpen_types::{HttpMethod, SessionUser};
    use serde_json::json;

    use super::*;
    use crate::{hooks::test_support::scripted_client, session::StaticIdentity};

    const STATUS: &str = "/api/player/onboarding";

    fn router_for(role: Option<&str>) -> (Router, Arc<bullpen_api::testing::ScriptedTransport>) {
        let (client, transport) = scripted_client();
        let identity = StaticIdentity(Session::SignedIn(SessionUser::new("u-1", role)));
        (Router::new(Arc::new(identity), client.onboarding()), transport)
    }

    fn unlocked(value: bool) -> serde_json::Value {
        json!({ "dashboardUnlocked": value, "baselineComplete": value })
    }

    #[tokio::test]
    async fn no_role_shows_role_selection_instead_of_drills() {
        let (router, transport) = router_for(None);

        assert_eq!(router.navigate("/drills").await, Decision::Render(View::RoleSelection));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn pitching_coach_routes() {
        let (router, _) = router_for(Some("pitching_coach"));

        assert_eq!(router.navigate("/roster").await, Decision::Render(View::Roster));
        assert_eq!(router.navigate("/teams").await, Decision::Redirect("/dashboard".into()));
    }

    #[tokio::test]
    async fn locked_player_is_sent_to_onboarding() {
        let (router, transport) = router_for(Some("player"));
        transport.respond_to(HttpMethod::Get, STATUS, 200, unlocked(false));

        assert_eq!(router.navigate("/dashboard").await, Decision::Redirect("/player/onboarding".into()));
        assert_eq!(router.navigate("/player/onboarding").await, Decision::Render(View::Onboarding));
        assert_eq!(transport.count(HttpMethod::Get, STATUS), 1);
    }

    #[tokio::test]
    async fn status_failure_keeps_gated_content_hidden() {
        let (router, transport) = router_for(Some("player"));
        transport.fail_on(HttpMethod::Get, STATUS, "connection refused");

        assert_eq!(router.navigate("/drills").await, Decision::Loading);
    }

    #[tokio::test]
    async fn every_gated_navigation_refreshes_status() {
        let (router, transport) = router_for(Some("player"));
        transport.respond_to(HttpMethod::Get, STATUS, 200, unlocked(false));
        transport.respond_to(HttpMethod::Get, STATUS, 200, unlocked(true));

        assert_eq!(router.navigate("/assessments").await, Decision::Redirect("/player/onboarding".into()));
        assert_eq!(router.navigate("/assessments").await, Decision::Render(View::Assessments));
        assert_eq!(transport.count(HttpMethod::Get, STATUS), 2);
    }

    #[tokio::test]
    async fn unlocked_player_stays_unlocked_when_status_regresses() {
        let (router, transport) = router_for(Some("player"));
        transport.respond_to(HttpMethod::Get, STATUS, 200, unlocked(true));
        transport.respond_to(HttpMethod::Get, STATUS, 200, unlocked(false));

        assert_eq!(router.navigate("/dashboard").await, Decision::Render(View::Dashboard));
        assert_eq!(router.navigate("/dashboard").await, Decision::Render(View::Dashboard));
    }

    struct FailingIdentity;

    #[async_trait]
    impl IdentityProvider for FailingIdentity {
        async fn current_session(&self) -> Result<Session, ClientError> {
            Err(ClientError::Transport {
                operation: Operation::AuthUser,
                status: None,
                message: "connection refused".into(),
            })
        }
    }

    #[tokio::test]
    async fn identity_failure_holds_navigation() {
        let (client, _) = scripted_client();
        let router = Router::new(Arc::new(FailingIdentity), client.onboarding());

        assert_eq!(router.navigate("/dashboard").await, Decision::Loading);
    }

    #[tokio::test]
    async fn anonymous_users_are_sent_to_landing() {
        let (client, _) = scripted_client();
        let router = Router::new(Arc::new(StaticIdentity::default()), client.onboarding());

        assert_eq!(router.navigate("/assessments/42").await, Decision::Redirect("/".into()));
        assert_eq!(router.navigate("/auth").await, Decision::Render(View::LoginRedirect));
    }
}
