//! Video assessment records and their analysis lifecycle status.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Server-owned analysis status.
///
/// `Pending` and `Analyzing` are in progress; `Complete` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentStatus {
    Pending,
    Analyzing,
    Complete,
    Failed,
}

impl AssessmentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }

    pub fn is_in_progress(&self) -> bool {
        !self.is_terminal()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Analyzing => "analyzing",
            Self::Complete => "complete",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for AssessmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub id: i64,
    pub athlete_id: i64,
    pub status: AssessmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Analysis output; opaque to the client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Value>,
}

/// Payload for `POST /api/assessments`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssessmentRequest {
    pub athlete_id: i64,
    #[schemars(length(min = 1))]
    pub video_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Acknowledgement returned by `POST /api/assessments/{id}/analyze`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisAccepted {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AssessmentStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn terminal_statuses_are_complete_and_failed() {
        assert!(AssessmentStatus::Complete.is_terminal());
        assert!(AssessmentStatus::Failed.is_terminal());
        assert!(AssessmentStatus::Pending.is_in_progress());
        assert!(AssessmentStatus::Analyzing.is_in_progress());
    }

    #[test]
    fn assessment_without_created_at_deserializes() {
        let assessment: Assessment = serde_json::from_value(json!({ "id": 42, "status": "pending", "athleteId": 7 }))
            .expect("minimal assessment should deserialize");

        assert_eq!(assessment.status, AssessmentStatus::Pending);
        assert!(assessment.results.is_none());
    }
}
