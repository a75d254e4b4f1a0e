//! Shared type definitions for the Bullpen coaching client.
//!
//! Every wire model derives [`schemars::JsonSchema`] so the contract registry
//! can derive its validators from the same definitions the client
//! deserializes into. Field names follow the backend's camelCase JSON.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

pub mod assessment;
pub mod resources;
pub mod session;

pub use assessment::{AnalysisAccepted, Assessment, AssessmentStatus, CreateAssessmentRequest};
pub use resources::{Athlete, Coach, CreateAthleteRequest, CreateCoachRequest, CreateTeamRequest, Team, UpdateAthleteRequest};
pub use session::{OnboardingStatus, Role, SessionUser};

/// Generic error payload returned by the backend for recognized failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ErrorBody {
    /// Human-readable message suitable for display.
    pub message: String,
}

/// HTTP methods used by the contract registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Whether requests with this method carry a JSON body.
    pub fn has_body(&self) -> bool {
        matches!(self, Self::Post | Self::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseHttpMethodError(pub String);

impl fmt::Display for ParseHttpMethodError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported HTTP method '{}'; expected GET, POST, PATCH or DELETE", self.0)
    }
}

impl std::error::Error for ParseHttpMethodError {}

impl FromStr for HttpMethod {
    type Err = ParseHttpMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            _ => Err(ParseHttpMethodError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_method_parses_case_insensitively() {
        assert_eq!("patch".parse::<HttpMethod>(), Ok(HttpMethod::Patch));
        assert_eq!(" GET ".parse::<HttpMethod>(), Ok(HttpMethod::Get));
        assert!("PUT".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn only_post_and_patch_carry_bodies() {
        assert!(HttpMethod::Post.has_body());
        assert!(HttpMethod::Patch.has_body());
        assert!(!HttpMethod::Get.has_body());
        assert!(!HttpMethod::Delete.has_body());
    }
}
