//! Error types for FHIR serialization and deserialization.

use helios_fhir::{AssignError, MetadataError};
use thiserror::Error;

use crate::format::ResourceFormat;

/// Errors raised while encoding or decoding a resource.
#[derive(Error, Debug)]
pub enum SerializationError {
    /// A type's declared shape is inconsistent. This is a model defect.
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    /// The body cannot be parsed as the declared format at all.
    #[error("malformed {format} body: {message}")]
    MalformedBody {
        format: ResourceFormat,
        message: String,
    },

    /// The root element names no registered resource.
    #[error("unknown resource type '{0}'")]
    UnknownRootType(String),

    /// The root element names a different resource than the one requested.
    #[error("expected a '{expected}' resource, found '{found}'")]
    RootTypeMismatch { expected: String, found: String },

    /// A choice element holds, or a wire name suffix names, a type outside the
    /// element's allowed set.
    #[error("'{type_name}' is not an allowed type for choice element '{element}'")]
    UnsupportedChoiceType { element: String, type_name: String },

    /// An element occurs more often than its declared maximum.
    #[error("element '{element}' of '{owner}' occurs {count} times, at most {max} allowed")]
    CardinalityViolation {
        owner: String,
        element: String,
        count: usize,
        max: String,
    },

    /// A value does not fit the element it was found in.
    #[error("invalid value for '{element}': {message}")]
    InvalidValue { element: String, message: String },

    /// The requested format is not compiled in or not recognized.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A tree writer received events out of order.
    #[error("writer error: {0}")]
    Writer(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "xml")]
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SerializationError {
    pub fn malformed(format: ResourceFormat, message: impl Into<String>) -> Self {
        SerializationError::MalformedBody {
            format,
            message: message.into(),
        }
    }

    pub fn invalid_value(element: impl Into<String>, message: impl ToString) -> Self {
        SerializationError::InvalidValue {
            element: element.into(),
            message: message.to_string(),
        }
    }

    /// Whether the failure came from the input document rather than from the
    /// model or the caller.
    pub fn is_malformed_body(&self) -> bool {
        matches!(self, SerializationError::MalformedBody { .. })
    }
}

impl From<AssignError> for SerializationError {
    fn from(err: AssignError) -> Self {
        let element = match &err {
            AssignError::UnknownElement { element, .. }
            | AssignError::WrongKind { element, .. }
            | AssignError::InvalidCode { element, .. } => element.clone(),
        };
        SerializationError::InvalidValue {
            element,
            message: err.to_string(),
        }
    }
}

/// Result type alias for FHIR serialization operations
pub type Result<T> = std::result::Result<T, SerializationError>;
