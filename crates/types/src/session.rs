//! Identity and onboarding snapshots read by the access gate.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Signed-in user as reported by the identity provider.
///
/// `role` stays a raw string on the wire; [`SessionUser::role`] classifies it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    #[serde(default, rename = "role")]
    pub raw_role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl SessionUser {
    pub fn new(id: impl Into<String>, role: Option<&str>) -> Self {
        Self {
            id: id.into(),
            raw_role: role.map(str::to_string),
            email: None,
            first_name: None,
            last_name: None,
        }
    }

    /// Classified role, `None` while the user has not picked one yet.
    pub fn role(&self) -> Option<Role> {
        self.raw_role.as_deref().and_then(Role::classify)
    }
}

/// Concrete roles. Any unrecognized role string is treated as a generic coach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Player,
    TeamCoach,
    PitchingCoach,
    Coach,
}

impl Role {
    /// Classify a raw role string; blank strings mean "no role".
    pub fn classify(raw: &str) -> Option<Self> {
        match raw.trim() {
            "" => None,
            "player" => Some(Self::Player),
            "team_coach" => Some(Self::TeamCoach),
            "pitching_coach" => Some(Self::PitchingCoach),
            _ => Some(Self::Coach),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::TeamCoach => "team_coach",
            Self::PitchingCoach => "pitching_coach",
            Self::Coach => "coach",
        }
    }
}

/// Server-derived onboarding progress for a player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingStatus {
    pub dashboard_unlocked: bool,
    pub baseline_complete: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_roles_fall_back_to_generic_coach() {
        assert_eq!(Role::classify("player"), Some(Role::Player));
        assert_eq!(Role::classify("pitching_coach"), Some(Role::PitchingCoach));
        assert_eq!(Role::classify("strength_coach"), Some(Role::Coach));
        assert_eq!(Role::classify("  "), None);
    }

    #[test]
    fn session_user_without_role_has_none() {
        let user: SessionUser = serde_json::from_value(json!({ "id": "u-1", "role": null })).unwrap();
        assert_eq!(user.role(), None);

        let user: SessionUser = serde_json::from_value(json!({ "id": "u-2", "role": "team_coach" })).unwrap();
        assert_eq!(user.role(), Some(Role::TeamCoach));
    }
}
