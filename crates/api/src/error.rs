//! Error taxonomy surfaced by every API call.

use bullpen_registry::{Operation, SchemaViolation};
use bullpen_util::MissingParameterError;
use thiserror::Error;

/// Failure of a contract-checked API call.
///
/// `Clone` so a deduplicated read can hand the same failure to every caller
/// that joined it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Local input failed its schema; nothing was sent.
    #[error("{operation}: invalid input: {}", join_violations(.violations))]
    Validation {
        operation: Operation,
        violations: Vec<SchemaViolation>,
    },
    /// The server answered with a registered error status and body.
    #[error("{message}")]
    Domain {
        operation: Operation,
        status: u16,
        message: String,
    },
    /// A body did not match its registered schema. Always a defect.
    #[error("{operation}: HTTP {status} response does not match contract: {detail}")]
    ContractViolation {
        operation: Operation,
        status: u16,
        detail: String,
    },
    /// Network failure or an unregistered status code.
    #[error("{operation}: {}", transport_summary(.status, .message))]
    Transport {
        operation: Operation,
        status: Option<u16>,
        message: String,
    },
    #[error(transparent)]
    MissingParameter(#[from] MissingParameterError),
}

impl ClientError {
    /// Only transport failures are worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// HTTP status carried by the error, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Domain { status, .. } | Self::ContractViolation { status, .. } => Some(*status),
            Self::Transport { status, .. } => *status,
            Self::Validation { .. } | Self::MissingParameter(_) => None,
        }
    }

    pub fn is_domain_status(&self, expected: u16) -> bool {
        matches!(self, Self::Domain { status, .. } if *status == expected)
    }
}

fn join_violations(violations: &[SchemaViolation]) -> String {
    violations
        .iter()
        .map(|violation| violation.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

fn transport_summary(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("unexpected HTTP {code}: {message}"),
        None => format!("network error: {message}"),
    }
}
