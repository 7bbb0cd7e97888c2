//! Type metadata: the declarative shape of every FHIR type.
//!
//! A [`TypeDescriptor`] lists a type's wire name and its elements in declared
//! order. Each [`ElementDescriptor`] carries the element's wire name, its
//! cardinality and the closed set of types its values may take. Descriptors
//! are produced by [`FhirType::describe`](crate::FhirType::describe) through
//! [`TypeDescriptorBuilder`], which rejects inconsistent shapes with a
//! [`MetadataError`] instead of silently dropping elements.
//!
//! ```ignore
//! fn describe() -> Result<TypeDescriptor, MetadataError> {
//!     TypeDescriptor::builder::<Coding>()
//!         .element(ElementDescriptor::primitive("system", 40, PrimitiveKind::Uri))
//!         .element(ElementDescriptor::primitive("code", 60, PrimitiveKind::Code))
//!         .build()
//! }
//! ```

use std::any::TypeId;
use std::fmt;

use thiserror::Error;

use crate::object::{FhirObject, FhirType};
use crate::primitive::PrimitiveKind;

/// Errors describing an inconsistent type declaration.
///
/// These are programming defects in a model type, never data errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    #[error("type declared without a wire name")]
    MissingTypeName,

    #[error("element at order {order} of '{type_name}' has no wire name")]
    MissingElementName { type_name: String, order: u32 },

    #[error("elements '{first}' and '{second}' of '{type_name}' share order {order}")]
    ConflictingOrder {
        type_name: String,
        order: u32,
        first: String,
        second: String,
    },

    #[error("element '{element}' is declared twice on '{type_name}'")]
    DuplicateElement { type_name: String, element: String },

    #[error(
        "choice element '{element}' of '{type_name}' allows {count} type(s), at least two are required"
    )]
    ChoiceTooNarrow {
        type_name: String,
        element: String,
        count: usize,
    },

    #[error("element '{element}' of '{type_name}' must declare exactly one type, found {count}")]
    AmbiguousElementType {
        type_name: String,
        element: String,
        count: usize,
    },

    #[error("element '{element}' of '{type_name}' has invalid cardinality {min}..{max}")]
    InvalidCardinality {
        type_name: String,
        element: String,
        min: u32,
        max: Occurs,
    },
}

/// Upper bound on how often an element may occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occurs {
    Bounded(u32),
    Unbounded,
}

impl Occurs {
    /// Whether `count` occurrences stay within this bound.
    pub fn admits(&self, count: usize) -> bool {
        match self {
            Occurs::Bounded(max) => count <= *max as usize,
            Occurs::Unbounded => true,
        }
    }
}

impl fmt::Display for Occurs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Occurs::Bounded(n) => write!(f, "{}", n),
            Occurs::Unbounded => f.write_str("*"),
        }
    }
}

/// Lazy reference to a complex type's metadata.
///
/// Holding the describe function instead of a built descriptor lets types
/// reference each other (and themselves) without building the whole graph.
#[derive(Debug, Clone, Copy)]
pub struct ComplexTypeRef {
    name: &'static str,
    type_id: TypeId,
    describe: fn() -> Result<TypeDescriptor, MetadataError>,
}

impl ComplexTypeRef {
    pub fn of<T: FhirType>() -> Self {
        Self {
            name: T::TYPE_NAME,
            type_id: TypeId::of::<T>(),
            describe: T::describe,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Builds the descriptor. Callers normally go through the
    /// [`ModelInspector`](crate::ModelInspector) cache instead.
    pub fn describe(&self) -> Result<TypeDescriptor, MetadataError> {
        (self.describe)()
    }
}

impl PartialEq for ComplexTypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ComplexTypeRef {}

/// A type an element value may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeRef {
    Primitive(PrimitiveKind),
    Complex(ComplexTypeRef),
    /// Any registered resource, nested inline as a contained resource.
    Resource,
}

impl TypeRef {
    pub fn type_name(&self) -> &'static str {
        match self {
            TypeRef::Primitive(kind) => kind.type_name(),
            TypeRef::Complex(complex) => complex.name(),
            TypeRef::Resource => "Resource",
        }
    }

    /// Suffix appended to a choice element's name on the wire: the type name
    /// with its first letter upper-cased (`valueBoolean`, `valueQuantity`).
    pub fn choice_suffix(&self) -> String {
        let name = self.type_name();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// Shape of a single element within a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementDescriptor {
    name: &'static str,
    order: u32,
    min: u32,
    max: Occurs,
    choice: bool,
    allowed_types: Vec<TypeRef>,
}

impl ElementDescriptor {
    fn new(name: &'static str, order: u32, choice: bool, allowed_types: Vec<TypeRef>) -> Self {
        Self {
            name,
            order,
            min: 0,
            max: Occurs::Bounded(1),
            choice,
            allowed_types,
        }
    }

    /// An optional, single primitive element.
    pub fn primitive(name: &'static str, order: u32, kind: PrimitiveKind) -> Self {
        Self::new(name, order, false, vec![TypeRef::Primitive(kind)])
    }

    /// An optional, single complex element of type `T`.
    pub fn complex<T: FhirType>(name: &'static str, order: u32) -> Self {
        Self::new(name, order, false, vec![TypeRef::Complex(ComplexTypeRef::of::<T>())])
    }

    /// An element holding a nested (contained) resource of any registered type.
    pub fn resource(name: &'static str, order: u32) -> Self {
        Self::new(name, order, false, vec![TypeRef::Resource])
    }

    /// A polymorphic `name[x]` element restricted to `allowed_types`.
    pub fn choice(name: &'static str, order: u32, allowed_types: Vec<TypeRef>) -> Self {
        Self::new(name, order, true, allowed_types)
    }

    pub fn required(mut self) -> Self {
        self.min = 1;
        self
    }

    pub fn repeating(mut self) -> Self {
        self.max = Occurs::Unbounded;
        self
    }

    pub fn cardinality(mut self, min: u32, max: Occurs) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn order(&self) -> u32 {
        self.order
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> Occurs {
        self.max
    }

    pub fn is_choice(&self) -> bool {
        self.choice
    }

    pub fn is_repeating(&self) -> bool {
        !matches!(self.max, Occurs::Bounded(0 | 1))
    }

    pub fn allowed_types(&self) -> &[TypeRef] {
        &self.allowed_types
    }

    /// The single declared type of a non-choice element.
    pub fn declared_type(&self) -> Option<&TypeRef> {
        if self.choice {
            None
        } else {
            self.allowed_types.first()
        }
    }

    /// Finds the allowed type whose name is `type_name`.
    pub fn allowed_type_named(&self, type_name: &str) -> Option<&TypeRef> {
        self.allowed_types
            .iter()
            .find(|t| t.type_name() == type_name)
    }

    /// Wire name used for a value of `type_ref`: the element name, suffixed
    /// for choice elements.
    pub fn wire_name_for(&self, type_ref: &TypeRef) -> String {
        if self.choice {
            format!("{}{}", self.name, type_ref.choice_suffix())
        } else {
            self.name.to_string()
        }
    }
}

/// How an incoming wire name relates to a type's declared elements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ElementMatch<'a> {
    /// The name resolved to an element and one of its allowed types.
    Resolved(&'a ElementDescriptor, &'a TypeRef),
    /// The name carries a choice element's prefix but its suffix names no
    /// allowed type (or is missing).
    UnknownChoiceType(&'a ElementDescriptor, &'a str),
    /// No element claims the name.
    Unmapped,
}

/// The complete, immutable shape of a FHIR type.
pub struct TypeDescriptor {
    name: &'static str,
    is_resource_root: bool,
    elements: Vec<ElementDescriptor>,
    factory: fn() -> Box<dyn FhirObject>,
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("is_resource_root", &self.is_resource_root)
            .field("elements", &self.elements)
            .finish()
    }
}

impl TypeDescriptor {
    /// Starts describing `T`, named by its `TYPE_NAME`.
    pub fn builder<T: FhirType>() -> TypeDescriptorBuilder {
        TypeDescriptorBuilder {
            name: T::TYPE_NAME,
            is_resource_root: false,
            elements: Vec::new(),
            factory: new_boxed::<T>,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_resource_root(&self) -> bool {
        self.is_resource_root
    }

    /// Elements in declared order.
    pub fn elements(&self) -> &[ElementDescriptor] {
        &self.elements
    }

    pub fn element(&self, name: &str) -> Option<&ElementDescriptor> {
        self.elements.iter().find(|e| e.name == name)
    }

    /// Creates an empty instance of the described type.
    pub fn instantiate(&self) -> Box<dyn FhirObject> {
        (self.factory)()
    }

    /// Resolves an incoming wire name. Exact names win; otherwise a choice
    /// element claims any name made of its own name plus an upper-case suffix.
    pub fn match_wire_name<'a>(&'a self, wire_name: &'a str) -> ElementMatch<'a> {
        if let Some(element) = self.element(wire_name) {
            return match element.declared_type() {
                Some(type_ref) => ElementMatch::Resolved(element, type_ref),
                None => ElementMatch::UnknownChoiceType(element, ""),
            };
        }

        for element in self.elements.iter().filter(|e| e.choice) {
            let Some(suffix) = wire_name.strip_prefix(element.name) else {
                continue;
            };
            if !suffix.chars().next().is_some_and(|c| c.is_ascii_uppercase()) {
                continue;
            }
            return match element
                .allowed_types
                .iter()
                .find(|t| t.choice_suffix() == suffix)
            {
                Some(type_ref) => ElementMatch::Resolved(element, type_ref),
                None => ElementMatch::UnknownChoiceType(element, suffix),
            };
        }

        ElementMatch::Unmapped
    }
}

fn new_boxed<T: FhirType>() -> Box<dyn FhirObject> {
    Box::new(T::default())
}

/// Collects element declarations and validates them into a [`TypeDescriptor`].
pub struct TypeDescriptorBuilder {
    name: &'static str,
    is_resource_root: bool,
    elements: Vec<ElementDescriptor>,
    factory: fn() -> Box<dyn FhirObject>,
}

impl TypeDescriptorBuilder {
    /// Marks the type as a resource: it can be a document root and can be
    /// nested as a contained resource.
    pub fn resource_root(mut self) -> Self {
        self.is_resource_root = true;
        self
    }

    pub fn element(mut self, element: ElementDescriptor) -> Self {
        self.elements.push(element);
        self
    }

    pub fn build(mut self) -> Result<TypeDescriptor, MetadataError> {
        if self.name.is_empty() {
            return Err(MetadataError::MissingTypeName);
        }
        let type_name = self.name.to_string();

        for element in &self.elements {
            if element.name.is_empty() {
                return Err(MetadataError::MissingElementName {
                    type_name,
                    order: element.order,
                });
            }
            let count = element.allowed_types.len();
            if element.choice && count < 2 {
                return Err(MetadataError::ChoiceTooNarrow {
                    type_name,
                    element: element.name.to_string(),
                    count,
                });
            }
            if !element.choice && count != 1 {
                return Err(MetadataError::AmbiguousElementType {
                    type_name,
                    element: element.name.to_string(),
                    count,
                });
            }
            let invalid_max = match element.max {
                Occurs::Bounded(max) => max == 0 || max < element.min,
                Occurs::Unbounded => false,
            };
            if invalid_max {
                return Err(MetadataError::InvalidCardinality {
                    type_name,
                    element: element.name.to_string(),
                    min: element.min,
                    max: element.max,
                });
            }
        }

        self.elements.sort_by_key(|e| e.order);
        for pair in self.elements.windows(2) {
            if pair[0].order == pair[1].order {
                return Err(MetadataError::ConflictingOrder {
                    type_name,
                    order: pair[0].order,
                    first: pair[0].name.to_string(),
                    second: pair[1].name.to_string(),
                });
            }
        }
        for (i, element) in self.elements.iter().enumerate() {
            if self.elements[..i].iter().any(|e| e.name == element.name) {
                return Err(MetadataError::DuplicateElement {
                    type_name,
                    element: element.name.to_string(),
                });
            }
        }

        Ok(TypeDescriptor {
            name: self.name,
            is_resource_root: self.is_resource_root,
            elements: self.elements,
            factory: self.factory,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CodeableConcept, Coding, Group, GroupCharacteristic, Patient, Quantity};
    use crate::object::FhirType;

    #[test]
    fn test_elements_sorted_by_declared_order() {
        let descriptor = TypeDescriptor::builder::<Coding>()
            .element(ElementDescriptor::primitive("display", 70, PrimitiveKind::String))
            .element(ElementDescriptor::primitive("system", 40, PrimitiveKind::Uri))
            .element(ElementDescriptor::primitive("code", 60, PrimitiveKind::Code))
            .build()
            .unwrap();

        let names: Vec<_> = descriptor.elements().iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["system", "code", "display"]);
    }

    #[test]
    fn test_conflicting_order_rejected() {
        let err = TypeDescriptor::builder::<Coding>()
            .element(ElementDescriptor::primitive("system", 40, PrimitiveKind::Uri))
            .element(ElementDescriptor::primitive("code", 40, PrimitiveKind::Code))
            .build()
            .unwrap_err();

        assert!(matches!(err, MetadataError::ConflictingOrder { order: 40, .. }));
    }

    #[test]
    fn test_duplicate_element_rejected() {
        let err = TypeDescriptor::builder::<Coding>()
            .element(ElementDescriptor::primitive("code", 40, PrimitiveKind::Code))
            .element(ElementDescriptor::primitive("code", 50, PrimitiveKind::Code))
            .build()
            .unwrap_err();

        assert!(matches!(err, MetadataError::DuplicateElement { .. }));
    }

    #[test]
    fn test_narrow_choice_rejected() {
        let err = TypeDescriptor::builder::<Coding>()
            .element(ElementDescriptor::choice(
                "value",
                40,
                vec![TypeRef::Primitive(PrimitiveKind::Boolean)],
            ))
            .build()
            .unwrap_err();

        assert_eq!(
            err,
            MetadataError::ChoiceTooNarrow {
                type_name: "Coding".to_string(),
                element: "value".to_string(),
                count: 1,
            }
        );
    }

    #[test]
    fn test_invalid_cardinality_rejected() {
        let err = TypeDescriptor::builder::<Coding>()
            .element(
                ElementDescriptor::primitive("code", 40, PrimitiveKind::Code)
                    .cardinality(2, Occurs::Bounded(1)),
            )
            .build()
            .unwrap_err();

        assert!(matches!(err, MetadataError::InvalidCardinality { min: 2, .. }));
    }

    #[test]
    fn test_choice_suffixes() {
        assert_eq!(TypeRef::Primitive(PrimitiveKind::Boolean).choice_suffix(), "Boolean");
        assert_eq!(TypeRef::Primitive(PrimitiveKind::DateTime).choice_suffix(), "DateTime");
        assert_eq!(
            TypeRef::Complex(ComplexTypeRef::of::<CodeableConcept>()).choice_suffix(),
            "CodeableConcept"
        );
    }

    #[test]
    fn test_match_wire_name_resolves_choice() {
        let descriptor = GroupCharacteristic::describe().unwrap();

        match descriptor.match_wire_name("valueQuantity") {
            ElementMatch::Resolved(element, type_ref) => {
                assert_eq!(element.name(), "value");
                assert_eq!(*type_ref, TypeRef::Complex(ComplexTypeRef::of::<Quantity>()));
            }
            other => panic!("unexpected match: {:?}", other),
        }

        assert!(matches!(
            descriptor.match_wire_name("valueString"),
            ElementMatch::UnknownChoiceType(_, "String")
        ));
        assert!(matches!(
            descriptor.match_wire_name("value"),
            ElementMatch::UnknownChoiceType(_, "")
        ));
        assert_eq!(descriptor.match_wire_name("valuation"), ElementMatch::Unmapped);
    }

    #[test]
    fn test_exact_name_match() {
        let descriptor = Coding::describe().unwrap();
        assert!(matches!(
            descriptor.match_wire_name("valueSet"),
            ElementMatch::Resolved(element, _) if element.name() == "valueSet"
        ));
    }

    #[test]
    fn test_resource_flags() {
        assert!(Patient::describe().unwrap().is_resource_root());
        assert!(Group::describe().unwrap().is_resource_root());
        assert!(!Coding::describe().unwrap().is_resource_root());
    }

    #[test]
    fn test_instantiate_builds_default() {
        let descriptor = Patient::describe().unwrap();
        let object = descriptor.instantiate();
        assert_eq!(object.type_name(), "Patient");
    }
}
