//! Error types for the FHIR REST client.
//!
//! Errors come in two tiers:
//!
//! | Tier | Variants | Meaning |
//! |------|----------|---------|
//! | Defect | `Serialization`, `Tag`, `NotAResourceUrl`, `EndpointMismatch`, `InvalidBundleKind`, `InvalidArgument`, `InvalidUrl` | Caller or server data is unusable. Raised before or instead of a request. |
//! | Rejection | `OperationRejected` | The server answered with a status outside the operation's accepted set. Carries the recovered `OperationOutcome` when there is one. |
//! | Transport | `Transport` | No answer at all (connection, timeout, cancellation). |

use helios_fhir::model::OperationOutcome;
use helios_serde::SerializationError;
use http::StatusCode;
use thiserror::Error;

use crate::transport::TransportError;

/// Failures of the category header codec.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TagError {
    /// The tag cannot be written without producing an unparseable header.
    #[error("invalid tag '{term}': {reason}")]
    InvalidTag { term: String, reason: String },

    /// A category in a received header cannot be turned into a tag.
    #[error("malformed category '{category}': {reason}")]
    MalformedTag { category: String, reason: String },
}

/// The error type of every client operation.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Serialization(#[from] SerializationError),

    #[error(transparent)]
    Tag(#[from] TagError),

    /// The url has no resource collection segment (or no id where one is
    /// required).
    #[error("'{url}' is not a FHIR REST url: {reason}")]
    NotAResourceUrl { url: String, reason: String },

    /// An absolute url does not belong to the client's endpoint.
    #[error("'{url}' is not located on endpoint '{endpoint}'")]
    EndpointMismatch { url: String, endpoint: String },

    /// A bundle's declared kind does not fit the operation it was sent to.
    #[error("a '{found}' bundle cannot be sent to {operation}, expected {expected}")]
    InvalidBundleKind {
        operation: &'static str,
        expected: String,
        found: String,
    },

    #[error("invalid argument '{name}': {message}")]
    InvalidArgument { name: &'static str, message: String },

    /// The server answered with a status the operation does not accept.
    #[error("operation failed with status code {status}{}", outcome_suffix(.outcome))]
    OperationRejected {
        status: StatusCode,
        outcome: Option<OperationOutcome>,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("invalid url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

fn outcome_suffix(outcome: &Option<OperationOutcome>) -> String {
    match outcome {
        Some(outcome) => format!(": {}", outcome.message()),
        None => String::new(),
    }
}

impl ClientError {
    pub fn invalid_argument(name: &'static str, message: impl Into<String>) -> Self {
        ClientError::InvalidArgument {
            name,
            message: message.into(),
        }
    }

    pub fn not_a_resource_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        ClientError::NotAResourceUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Whether the server rejected the operation, as opposed to the client
    /// failing before or while talking to it.
    pub fn is_rejection(&self) -> bool {
        matches!(self, ClientError::OperationRejected { .. })
    }

    /// Status code of a rejected operation.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::OperationRejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Outcome recovered from a rejected operation.
    pub fn outcome(&self) -> Option<&OperationOutcome> {
        match self {
            ClientError::OperationRejected { outcome, .. } => outcome.as_ref(),
            _ => None,
        }
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_accessors() {
        let err = ClientError::OperationRejected {
            status: StatusCode::CONFLICT,
            outcome: Some(OperationOutcome::for_message("version conflict")),
        };
        assert!(err.is_rejection());
        assert_eq!(err.status(), Some(StatusCode::CONFLICT));
        assert_eq!(err.outcome().map(|o| o.message()), Some("version conflict".to_string()));
        assert_eq!(
            err.to_string(),
            "operation failed with status code 409 Conflict: version conflict"
        );
    }

    #[test]
    fn test_defects_are_not_rejections() {
        let err = ClientError::invalid_argument("entry", "entry has no id");
        assert!(!err.is_rejection());
        assert_eq!(err.status(), None);
        assert!(err.outcome().is_none());
    }

    #[test]
    fn test_bare_rejection_message() {
        let err = ClientError::OperationRejected {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            outcome: None,
        };
        assert_eq!(
            err.to_string(),
            "operation failed with status code 500 Internal Server Error"
        );
    }
}
