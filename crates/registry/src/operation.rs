use std::{fmt, str::FromStr};

use crate::RegistryError;

/// Every API operation the client knows how to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    AthletesList,
    AthletesGet,
    AthletesCreate,
    AthletesUpdate,
    TeamsList,
    TeamsCreate,
    CoachesMe,
    CoachesCreate,
    AssessmentsList,
    AssessmentsGet,
    AssessmentsCreate,
    AssessmentsAnalyze,
    OnboardingStatus,
    Upload,
    AuthUser,
}

impl Operation {
    /// All operations in registry order.
    pub const ALL: [Operation; 15] = [
        Self::AthletesList,
        Self::AthletesGet,
        Self::AthletesCreate,
        Self::AthletesUpdate,
        Self::TeamsList,
        Self::TeamsCreate,
        Self::CoachesMe,
        Self::CoachesCreate,
        Self::AssessmentsList,
        Self::AssessmentsGet,
        Self::AssessmentsCreate,
        Self::AssessmentsAnalyze,
        Self::OnboardingStatus,
        Self::Upload,
        Self::AuthUser,
    ];

    /// Stable dotted name, e.g. `athletes.create`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AthletesList => "athletes.list",
            Self::AthletesGet => "athletes.get",
            Self::AthletesCreate => "athletes.create",
            Self::AthletesUpdate => "athletes.update",
            Self::TeamsList => "teams.list",
            Self::TeamsCreate => "teams.create",
            Self::CoachesMe => "coaches.me",
            Self::CoachesCreate => "coaches.create",
            Self::AssessmentsList => "assessments.list",
            Self::AssessmentsGet => "assessments.get",
            Self::AssessmentsCreate => "assessments.create",
            Self::AssessmentsAnalyze => "assessments.analyze",
            Self::OnboardingStatus => "onboarding.status",
            Self::Upload => "upload",
            Self::AuthUser => "auth.user",
        }
    }

    pub fn family(&self) -> ResourceFamily {
        match self {
            Self::AthletesList | Self::AthletesGet | Self::AthletesCreate | Self::AthletesUpdate => ResourceFamily::Athletes,
            Self::TeamsList | Self::TeamsCreate => ResourceFamily::Teams,
            Self::CoachesMe | Self::CoachesCreate => ResourceFamily::Coaches,
            Self::AssessmentsList | Self::AssessmentsGet | Self::AssessmentsCreate | Self::AssessmentsAnalyze => {
                ResourceFamily::Assessments
            }
            Self::OnboardingStatus => ResourceFamily::Onboarding,
            Self::Upload => ResourceFamily::Uploads,
            Self::AuthUser => ResourceFamily::Auth,
        }
    }

    /// Position of this operation in [`Operation::ALL`].
    pub(crate) fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|operation| operation.name() == name)
            .ok_or_else(|| RegistryError::UnknownOperation(name.to_string()))
    }
}

/// Cache-invalidation family an operation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceFamily {
    Athletes,
    Teams,
    Coaches,
    Assessments,
    Onboarding,
    Uploads,
    Auth,
}

impl ResourceFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Athletes => "athletes",
            Self::Teams => "teams",
            Self::Coaches => "coaches",
            Self::Assessments => "assessments",
            Self::Onboarding => "onboarding",
            Self::Uploads => "uploads",
            Self::Auth => "auth",
        }
    }
}

impl fmt::Display for ResourceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for operation in Operation::ALL {
            assert_eq!(operation.name().parse::<Operation>().unwrap(), operation);
        }
    }

    #[test]
    fn all_is_in_declaration_order() {
        for (position, operation) in Operation::ALL.iter().enumerate() {
            assert_eq!(operation.index(), position);
        }
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert!(matches!("drills.list".parse::<Operation>(), Err(RegistryError::UnknownOperation(name)) if name == "drills.list"));
    }
}
