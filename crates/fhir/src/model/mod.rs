//! The bundled resource model.

mod bundle;
mod conformance;
mod datatypes;
mod group;
mod operation_outcome;
mod patient;
mod resource;
mod tag;

pub use bundle::{Bundle, BundleEntry, BundleKind, BundleLink, relation};
pub use conformance::Conformance;
pub use datatypes::{
    CodeableConcept, Coding, HumanName, Identifier, Narrative, NarrativeStatus, Quantity,
    QuantityComparator, Range, ResourceReference,
};
pub use group::{Group, GroupCharacteristic, GroupCharacteristicValue, GroupType};
pub use operation_outcome::{IssueSeverity, OperationOutcome, OperationOutcomeIssue};
pub use patient::{Patient, PatientDeceased, PatientMultipleBirth};
pub use resource::{Resource, register_resources, resource_value, resource_values};
pub use tag::{GENERAL_TAG_SCHEME, PROFILE_TAG_SCHEME, SECURITY_TAG_SCHEME, Tag, TagList};
