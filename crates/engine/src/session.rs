//! Identity provider seam for the router.

use async_trait::async_trait;
use bullpen_api::{ClientError, Executor, RequestParts};
use bullpen_registry::{ContractRegistry, Operation};
use bullpen_types::{Role, SessionUser};

/// Authentication state as the router sees it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    Anonymous,
    SignedIn(SessionUser),
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::SignedIn(_))
    }

    pub fn user(&self) -> Option<&SessionUser> {
        match self {
            Self::SignedIn(user) => Some(user),
            Self::Anonymous => None,
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.user().and_then(SessionUser::role)
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_session(&self) -> Result<Session, ClientError>;
}

/// Reads the session from `GET /api/auth/user`; a 401 means signed out.
#[derive(Debug, Clone)]
pub struct HttpIdentityProvider {
    executor: Executor,
}

impl HttpIdentityProvider {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn current_session(&self) -> Result<Session, ClientError> {
        let entry = ContractRegistry::global().entry(Operation::AuthUser);
        match self.executor.execute_as::<SessionUser>(entry, RequestParts::new()).await {
            Ok(user) => Ok(Session::SignedIn(user)),
            Err(error) if error.status() == Some(401) => Ok(Session::Anonymous),
            Err(error) => Err(error),
        }
    }
}

/// Fixed session, for callers that already know who is signed in.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity(pub Session);

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn current_session(&self) -> Result<Session, ClientError> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bullpen_api::testing::ScriptedTransport;
    use bullpen_types::HttpMethod;
    use serde_json::json;

    use super::*;

    fn provider(transport: &Arc<ScriptedTransport>) -> HttpIdentityProvider {
        HttpIdentityProvider::new(Executor::new(transport.clone()))
    }

    #[tokio::test]
    async fn unauthorized_means_anonymous() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond_to(HttpMethod::Get, "/api/auth/user", 401, json!({ "message": "Unauthorized" }));

        assert_eq!(provider(&transport).current_session().await.unwrap(), Session::Anonymous);
    }

    #[tokio::test]
    async fn signed_in_user_carries_role() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond_to(HttpMethod::Get, "/api/auth/user", 200, json!({ "id": "u-9", "role": "pitching_coach" }));

        let session = provider(&transport).current_session().await.unwrap();

        assert!(session.is_authenticated());
        assert_eq!(session.role(), Some(Role::PitchingCoach));
    }

    #[tokio::test]
    async fn network_failure_is_an_error_not_a_sign_out() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.fail_on(HttpMethod::Get, "/api/auth/user", "connection refused");

        assert!(provider(&transport).current_session().await.is_err());
    }
}
