//! Schema catalog.
//!
//! JSON Schemas are derived from the `bullpen-types` models with `schemars`
//! and compiled into `jsonschema` validators the first time the catalog is
//! touched. Compiled validators are shared read-only for the rest of the
//! process.

use std::{collections::HashMap, fmt};

use bullpen_types::{
    AnalysisAccepted, Assessment, Athlete, Coach, CreateAssessmentRequest, CreateAthleteRequest, CreateCoachRequest,
    CreateTeamRequest, ErrorBody, OnboardingStatus, SessionUser, Team, UpdateAthleteRequest,
};
use jsonschema::Validator;
use once_cell::sync::Lazy;
use schemars::schema_for;
use serde_json::Value;
use tracing::error;

/// Identifier of a registered schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaId {
    Athlete,
    AthleteList,
    CreateAthlete,
    UpdateAthlete,
    Team,
    TeamList,
    CreateTeam,
    Coach,
    CreateCoach,
    Assessment,
    AssessmentList,
    CreateAssessment,
    AnalysisAccepted,
    OnboardingStatus,
    SessionUser,
    ErrorBody,
}

impl SchemaId {
    pub const ALL: [SchemaId; 16] = [
        Self::Athlete,
        Self::AthleteList,
        Self::CreateAthlete,
        Self::UpdateAthlete,
        Self::Team,
        Self::TeamList,
        Self::CreateTeam,
        Self::Coach,
        Self::CreateCoach,
        Self::Assessment,
        Self::AssessmentList,
        Self::CreateAssessment,
        Self::AnalysisAccepted,
        Self::OnboardingStatus,
        Self::SessionUser,
        Self::ErrorBody,
    ];

    /// Raw JSON Schema document for this id.
    pub fn json_schema(&self) -> Value {
        let schema = match self {
            Self::Athlete => schema_for!(Athlete),
            Self::AthleteList => schema_for!(Vec<Athlete>),
            Self::CreateAthlete => schema_for!(CreateAthleteRequest),
            Self::UpdateAthlete => schema_for!(UpdateAthleteRequest),
            Self::Team => schema_for!(Team),
            Self::TeamList => schema_for!(Vec<Team>),
            Self::CreateTeam => schema_for!(CreateTeamRequest),
            Self::Coach => schema_for!(Coach),
            Self::CreateCoach => schema_for!(CreateCoachRequest),
            Self::Assessment => schema_for!(Assessment),
            Self::AssessmentList => schema_for!(Vec<Assessment>),
            Self::CreateAssessment => schema_for!(CreateAssessmentRequest),
            // The analyze endpoint may answer with an empty body.
            Self::AnalysisAccepted => schema_for!(Option<AnalysisAccepted>),
            Self::OnboardingStatus => schema_for!(OnboardingStatus),
            Self::SessionUser => schema_for!(SessionUser),
            Self::ErrorBody => schema_for!(ErrorBody),
        };
        schema.to_value()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Athlete => "Athlete",
            Self::AthleteList => "Athlete[]",
            Self::CreateAthlete => "CreateAthleteRequest",
            Self::UpdateAthlete => "UpdateAthleteRequest",
            Self::Team => "Team",
            Self::TeamList => "Team[]",
            Self::CreateTeam => "CreateTeamRequest",
            Self::Coach => "Coach",
            Self::CreateCoach => "CreateCoachRequest",
            Self::Assessment => "Assessment",
            Self::AssessmentList => "Assessment[]",
            Self::CreateAssessment => "CreateAssessmentRequest",
            Self::AnalysisAccepted => "AnalysisAccepted",
            Self::OnboardingStatus => "OnboardingStatus",
            Self::SessionUser => "SessionUser",
            Self::ErrorBody => "ErrorBody",
        }
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One reason a JSON value failed its schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    pub schema: SchemaId,
    pub message: String,
}

impl SchemaViolation {
    fn new(schema: SchemaId, message: impl Into<String>) -> Self {
        Self {
            schema,
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.schema, self.message)
    }
}

static CATALOG: Lazy<HashMap<SchemaId, Result<Validator, String>>> = Lazy::new(|| {
    SchemaId::ALL
        .iter()
        .map(|id| {
            let compiled = jsonschema::validator_for(&id.json_schema()).map_err(|compile_error| {
                error!(schema = %id, error = %compile_error, "schema failed to compile");
                compile_error.to_string()
            });
            (*id, compiled)
        })
        .collect()
});

/// Validate `instance` against the schema registered under `id`.
///
/// Returns every violation found; an empty result is never returned as `Err`.
pub fn validate(id: SchemaId, instance: &Value) -> Result<(), Vec<SchemaViolation>> {
    let validator = match CATALOG.get(&id) {
        Some(Ok(validator)) => validator,
        Some(Err(message)) => return Err(vec![SchemaViolation::new(id, format!("schema unavailable: {message}"))]),
        None => return Err(vec![SchemaViolation::new(id, "schema not registered")]),
    };

    let violations: Vec<SchemaViolation> = validator
        .iter_errors(instance)
        .map(|validation_error| SchemaViolation::new(id, validation_error.to_string()))
        .collect();
    if violations.is_empty() { Ok(()) } else { Err(violations) }
}
