//! Onboarding gate for player routes.
//!
//! The gate fails closed: while the status is loading, and when it could not
//! be fetched, nothing behind the gate is rendered.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use bullpen_api::ClientError;
use bullpen_types::OnboardingStatus;
use tracing::warn;

use super::routes::ONBOARDING_PATH;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum GateState {
    #[default]
    Loading,
    Failed(ClientError),
    Loaded(OnboardingStatus),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// Indeterminate loading state; no gated content.
    ShowLoading,
    /// Navigate away and render nothing for this frame.
    Redirect(&'static str),
    Render,
}

#[derive(Debug, Clone, Default)]
pub struct OnboardingGate {
    state: GateState,
}

impl OnboardingGate {
    /// A freshly mounted gate, waiting for its status fetch.
    pub fn mount() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GateState {
        &self.state
    }

    pub fn resolve(&mut self, fetched: Result<OnboardingStatus, ClientError>) {
        self.state = match fetched {
            Ok(status) => GateState::Loaded(status),
            Err(error) => {
                warn!(error = %error, "onboarding status unavailable; keeping gate closed");
                GateState::Failed(error)
            }
        };
    }

    pub fn outcome(&self) -> GateOutcome {
        match &self.state {
            GateState::Loading | GateState::Failed(_) => GateOutcome::ShowLoading,
            GateState::Loaded(status) if status.dashboard_unlocked => GateOutcome::Render,
            GateState::Loaded(_) => GateOutcome::Redirect(ONBOARDING_PATH),
        }
    }

    pub fn renders_children(&self) -> bool {
        self.outcome() == GateOutcome::Render
    }
}

/// Remembers which users have been seen with an unlocked dashboard.
///
/// `dashboardUnlocked` is assumed to never go back to false. If the server
/// reports a regression the user stays unlocked and a warning is logged.
#[derive(Debug, Clone, Default)]
pub struct UnlockLatch {
    unlocked: Arc<Mutex<HashSet<String>>>,
}

impl UnlockLatch {
    pub fn apply(&self, user_id: &str, status: OnboardingStatus) -> OnboardingStatus {
        let mut unlocked = self.unlocked.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if status.dashboard_unlocked {
            unlocked.insert(user_id.to_string());
            return status;
        }
        if unlocked.contains(user_id) {
            warn!(user_id, "dashboard unlock regressed to false; keeping user unlocked");
            return OnboardingStatus {
                dashboard_unlocked: true,
                ..status
            };
        }
        status
    }

    pub fn is_unlocked(&self, user_id: &str) -> bool {
        self.unlocked
            .lock()
            .map(|unlocked| unlocked.contains(user_id))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use bullpen_registry::Operation;

    use super::*;

    fn status(dashboard_unlocked: bool) -> OnboardingStatus {
        OnboardingStatus {
            dashboard_unlocked,
            baseline_complete: dashboard_unlocked,
        }
    }

    fn unavailable() -> ClientError {
        ClientError::Transport {
            operation: Operation::OnboardingStatus,
            status: Some(502),
            message: "bad gateway".into(),
        }
    }

    #[test]
    fn locked_player_never_sees_children() {
        let mut gate = OnboardingGate::mount();
        assert_eq!(gate.outcome(), GateOutcome::ShowLoading);
        assert!(!gate.renders_children());

        gate.resolve(Err(unavailable()));
        assert_eq!(gate.outcome(), GateOutcome::ShowLoading);
        assert!(!gate.renders_children());

        gate.resolve(Ok(status(false)));
        assert_eq!(gate.outcome(), GateOutcome::Redirect("/player/onboarding"));
        assert!(!gate.renders_children());
    }

    #[test]
    fn unlocked_player_sees_children() {
        let mut gate = OnboardingGate::mount();
        gate.resolve(Ok(status(true)));
        assert_eq!(gate.outcome(), GateOutcome::Render);
    }

    #[test]
    fn unlock_is_assumed_monotonic() {
        let latch = UnlockLatch::default();
        assert!(!latch.apply("u-1", status(false)).dashboard_unlocked);
        assert!(latch.apply("u-1", status(true)).dashboard_unlocked);

        let regressed = latch.apply("u-1", status(false));

        assert!(regressed.dashboard_unlocked);
        assert!(!regressed.baseline_complete);
        assert!(latch.is_unlocked("u-1"));
        assert!(!latch.is_unlocked("u-2"));
    }
}
