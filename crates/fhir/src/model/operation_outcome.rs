//! Structured error and warning payloads returned by servers.

use crate::metadata::{ElementDescriptor, MetadataError, TypeDescriptor};
use crate::model::datatypes::{Coding, Narrative};
use crate::model::resource::{Resource, resource_values};
use crate::node::UnmappedElement;
use crate::object::{
    AssignError, FhirCode, FhirObject, FhirResource, FhirType, Value, ValueRef, code_value,
    object_value, object_values, text_value, text_values, unknown_element,
};
use crate::primitive::PrimitiveKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IssueSeverity {
    Fatal,
    Error,
    Warning,
    Information,
}

impl FhirCode for IssueSeverity {
    fn as_code(&self) -> &'static str {
        match self {
            IssueSeverity::Fatal => "fatal",
            IssueSeverity::Error => "error",
            IssueSeverity::Warning => "warning",
            IssueSeverity::Information => "information",
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        match code {
            "fatal" => Some(IssueSeverity::Fatal),
            "error" => Some(IssueSeverity::Error),
            "warning" => Some(IssueSeverity::Warning),
            "information" => Some(IssueSeverity::Information),
            _ => None,
        }
    }
}

/// A collection of issues reported for one interaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationOutcome {
    pub language: Option<String>,
    pub text: Option<Narrative>,
    pub contained: Vec<Resource>,
    pub issue: Vec<OperationOutcomeIssue>,
    pub unmapped: Vec<UnmappedElement>,
}

impl OperationOutcome {
    /// An outcome carrying a single error issue with `details` as its text.
    ///
    /// Used when a rejected response body is not itself an outcome.
    pub fn for_message(details: impl Into<String>) -> Self {
        Self {
            issue: vec![OperationOutcomeIssue::new(IssueSeverity::Error, details)],
            ..Default::default()
        }
    }

    /// Details of every issue, one per line.
    pub fn message(&self) -> String {
        self.issue
            .iter()
            .filter_map(|issue| issue.details.as_deref())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// True when no issue is an error or worse.
    pub fn is_success(&self) -> bool {
        !self.issue.iter().any(|issue| {
            matches!(
                issue.severity,
                Some(IssueSeverity::Fatal) | Some(IssueSeverity::Error)
            )
        })
    }
}

impl FhirType for OperationOutcome {
    const TYPE_NAME: &'static str = "OperationOutcome";

    fn describe() -> Result<TypeDescriptor, MetadataError> {
        TypeDescriptor::builder::<Self>()
            .resource_root()
            .element(ElementDescriptor::primitive("language", 10, PrimitiveKind::Code))
            .element(ElementDescriptor::complex::<Narrative>("text", 20))
            .element(ElementDescriptor::resource("contained", 30).repeating())
            .element(ElementDescriptor::complex::<OperationOutcomeIssue>("issue", 40).repeating())
            .build()
    }
}

impl FhirResource for OperationOutcome {}

impl FhirObject for OperationOutcome {
    crate::fhir_object_common!();

    fn element(&self, name: &str) -> Vec<ValueRef<'_>> {
        match name {
            "language" => text_value(PrimitiveKind::Code, &self.language),
            "text" => object_value(&self.text),
            "contained" => resource_values(&self.contained),
            "issue" => object_values(&self.issue),
            _ => Vec::new(),
        }
    }

    fn set_element(&mut self, name: &str, value: Value) -> Result<(), AssignError> {
        let owner = Self::TYPE_NAME;
        match name {
            "language" => self.language = Some(value.into_text(owner, name)?),
            "text" => self.text = Some(value.into_object(owner, name)?),
            "contained" => self.contained.push(value.into_resource(owner, name)?),
            "issue" => self.issue.push(value.into_object(owner, name)?),
            _ => return Err(unknown_element(owner, name)),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationOutcomeIssue {
    pub severity: Option<IssueSeverity>,
    pub type_: Vec<Coding>,
    pub details: Option<String>,
    pub location: Vec<String>,
    pub unmapped: Vec<UnmappedElement>,
}

impl OperationOutcomeIssue {
    pub fn new(severity: IssueSeverity, details: impl Into<String>) -> Self {
        Self {
            severity: Some(severity),
            details: Some(details.into()),
            ..Default::default()
        }
    }
}

impl FhirType for OperationOutcomeIssue {
    const TYPE_NAME: &'static str = "OperationOutcomeIssueComponent";

    fn describe() -> Result<TypeDescriptor, MetadataError> {
        TypeDescriptor::builder::<Self>()
            .element(ElementDescriptor::primitive("severity", 40, PrimitiveKind::Code).required())
            .element(ElementDescriptor::complex::<Coding>("type", 50).repeating())
            .element(ElementDescriptor::primitive("details", 60, PrimitiveKind::String))
            .element(ElementDescriptor::primitive("location", 70, PrimitiveKind::String).repeating())
            .build()
    }
}

impl FhirObject for OperationOutcomeIssue {
    crate::fhir_object_common!();

    fn element(&self, name: &str) -> Vec<ValueRef<'_>> {
        match name {
            "severity" => code_value(&self.severity),
            "type" => object_values(&self.type_),
            "details" => text_value(PrimitiveKind::String, &self.details),
            "location" => text_values(PrimitiveKind::String, &self.location),
            _ => Vec::new(),
        }
    }

    fn set_element(&mut self, name: &str, value: Value) -> Result<(), AssignError> {
        let owner = Self::TYPE_NAME;
        match name {
            "severity" => self.severity = Some(value.into_code(owner, name)?),
            "type" => self.type_.push(value.into_object(owner, name)?),
            "details" => self.details = Some(value.into_text(owner, name)?),
            "location" => self.location.push(value.into_text(owner, name)?),
            _ => return Err(unknown_element(owner, name)),
        }
        Ok(())
    }
}
