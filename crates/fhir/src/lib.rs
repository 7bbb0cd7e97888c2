//! # Helios FHIR Model
//!
//! Type metadata, the per-type metadata cache and the bundled clinical model.
//!
//! Every model type is a plain struct that declares its shape once, through
//! [`FhirType::describe`]. The declaration lists the type's elements in
//! sequence order together with their cardinality and allowed types. The
//! serialization engine in `helios-serde` walks any type through that shape
//! and the object-safe [`FhirObject`] accessors, so new types need no
//! format-specific code.
//!
//! ```ignore
//! use helios_fhir::{ModelInspector, model::Patient};
//!
//! let inspector = ModelInspector::with_default_model();
//! let patient = inspector.describe::<Patient>()?;
//! for element in patient.elements() {
//!     println!("{} ({})", element.name(), element.max());
//! }
//! ```

pub mod inspector;
pub mod metadata;
pub mod model;
pub mod node;
pub mod object;
pub mod primitive;

pub use inspector::ModelInspector;
pub use metadata::{
    ComplexTypeRef, ElementDescriptor, ElementMatch, MetadataError, Occurs, TypeDescriptor,
    TypeDescriptorBuilder, TypeRef,
};
pub use model::Resource;
pub use node::{Node, ObjectNode, Scalar, UnmappedElement};
pub use object::{AssignError, FhirCode, FhirObject, FhirResource, FhirType, Value, ValueRef};
pub use primitive::{Primitive, PrimitiveError, PrimitiveKind};

/// The FHIR XML namespace.
pub const FHIR_NAMESPACE: &str = "http://hl7.org/fhir";

/// The XHTML namespace of narrative `div` content.
pub const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";
