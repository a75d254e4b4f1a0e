use std::collections::HashMap;

use bullpen_types::HttpMethod;
use bullpen_util::{MissingParameterError, build_url, template_placeholders};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use thiserror::Error;

use crate::{Operation, ResourceFamily, SchemaId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("unknown operation '{0}'")]
    UnknownOperation(String),
}

/// Description of a single API operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractEntry {
    pub operation: Operation,
    pub method: HttpMethod,
    /// Path with `{param}` placeholders, e.g. `/api/assessments/{id}/analyze`.
    pub path_template: &'static str,
    /// Schema the request body must satisfy before it is sent.
    pub input_schema: Option<SchemaId>,
    /// Response schema by HTTP status code.
    pub responses: IndexMap<u16, SchemaId>,
    /// Optional query filters accepted by the operation.
    pub query_keys: &'static [&'static str],
}

impl ContractEntry {
    fn new(operation: Operation, method: HttpMethod, path_template: &'static str) -> Self {
        Self {
            operation,
            method,
            path_template,
            input_schema: None,
            responses: IndexMap::new(),
            query_keys: &[],
        }
    }

    fn input(mut self, schema: SchemaId) -> Self {
        self.input_schema = Some(schema);
        self
    }

    fn respond(mut self, status: u16, schema: SchemaId) -> Self {
        self.responses.insert(status, schema);
        self
    }

    fn query(mut self, keys: &'static [&'static str]) -> Self {
        self.query_keys = keys;
        self
    }

    pub fn family(&self) -> ResourceFamily {
        self.operation.family()
    }

    /// Schema registered for exactly `status`.
    pub fn response_schema(&self, status: u16) -> Option<SchemaId> {
        self.responses.get(&status).copied()
    }

    /// Schema used to validate a 2xx body: the exact status when registered,
    /// otherwise the first registered 2xx schema.
    pub fn success_schema(&self, status: u16) -> Option<SchemaId> {
        self.response_schema(status).or_else(|| {
            self.responses
                .iter()
                .find(|(code, _)| (200..300).contains(*code))
                .map(|(_, schema)| *schema)
        })
    }

    /// Placeholder names that must be supplied to [`ContractEntry::build_path`].
    pub fn path_params(&self) -> Vec<&'static str> {
        template_placeholders(self.path_template)
    }

    pub fn build_path(&self, params: &HashMap<String, String>) -> Result<String, MissingParameterError> {
        build_url(self.path_template, params)
    }
}

/// Immutable operation table.
#[derive(Debug)]
pub struct ContractRegistry {
    entries: IndexMap<Operation, ContractEntry>,
}

static GLOBAL_REGISTRY: Lazy<ContractRegistry> = Lazy::new(ContractRegistry::build);

impl ContractRegistry {
    /// Process-wide registry.
    pub fn global() -> &'static ContractRegistry {
        &GLOBAL_REGISTRY
    }

    fn build() -> Self {
        let entries = Operation::ALL
            .iter()
            .map(|operation| (*operation, contract_for(*operation)))
            .collect();
        Self { entries }
    }

    pub fn entry(&self, operation: Operation) -> &ContractEntry {
        // Entries are inserted in `Operation::ALL` order.
        &self.entries[operation.index()]
    }

    /// Look up an operation by its dotted name.
    pub fn resolve(&self, name: &str) -> Result<&ContractEntry, RegistryError> {
        let operation: Operation = name.parse()?;
        Ok(self.entry(operation))
    }

    pub fn entries(&self) -> impl Iterator<Item = &ContractEntry> {
        self.entries.values()
    }
}

/// Shorthand for `ContractRegistry::global().resolve(name)`.
pub fn resolve(name: &str) -> Result<&'static ContractEntry, RegistryError> {
    ContractRegistry::global().resolve(name)
}

fn contract_for(operation: Operation) -> ContractEntry {
    use HttpMethod::{Get, Patch, Post};
    use SchemaId as S;

    let entry = ContractEntry::new;
    match operation {
        Operation::AthletesList => entry(operation, Get, "/api/athletes")
            .respond(200, S::AthleteList)
            .query(&["teamId"]),
        Operation::AthletesGet => entry(operation, Get, "/api/athletes/{id}").respond(200, S::Athlete),
        Operation::AthletesCreate => entry(operation, Post, "/api/athletes")
            .input(S::CreateAthlete)
            .respond(201, S::Athlete)
            .respond(400, S::ErrorBody),
        Operation::AthletesUpdate => entry(operation, Patch, "/api/athletes/{id}")
            .input(S::UpdateAthlete)
            .respond(200, S::Athlete),
        Operation::TeamsList => entry(operation, Get, "/api/teams").respond(200, S::TeamList),
        Operation::TeamsCreate => entry(operation, Post, "/api/teams")
            .input(S::CreateTeam)
            .respond(201, S::Team),
        Operation::CoachesMe => entry(operation, Get, "/api/coaches/me")
            .respond(200, S::Coach)
            .respond(404, S::ErrorBody),
        Operation::CoachesCreate => entry(operation, Post, "/api/coaches")
            .input(S::CreateCoach)
            .respond(201, S::Coach)
            .respond(400, S::ErrorBody),
        Operation::AssessmentsList => entry(operation, Get, "/api/assessments")
            .respond(200, S::AssessmentList)
            .query(&["athleteId"]),
        Operation::AssessmentsGet => entry(operation, Get, "/api/assessments/{id}").respond(200, S::Assessment),
        Operation::AssessmentsCreate => entry(operation, Post, "/api/assessments")
            .input(S::CreateAssessment)
            .respond(201, S::Assessment),
        Operation::AssessmentsAnalyze => {
            entry(operation, Post, "/api/assessments/{id}/analyze").respond(200, S::AnalysisAccepted)
        }
        Operation::OnboardingStatus => entry(operation, Get, "/api/player/onboarding").respond(200, S::OnboardingStatus),
        Operation::Upload => entry(operation, Post, "/api/upload").respond(501, S::ErrorBody),
        Operation::AuthUser => entry(operation, Get, "/api/auth/user")
            .respond(200, S::SessionUser)
            .respond(401, S::ErrorBody),
    }
}
