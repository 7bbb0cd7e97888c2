//! Metadata declared by the bundled model: every type must describe cleanly,
//! keep its elements in sequence order and expose choice elements correctly.

use helios_fhir::model::*;
use helios_fhir::{
    ElementMatch, FhirObject, FhirType, MetadataError, ModelInspector, Occurs, PrimitiveKind,
    TypeDescriptor, TypeRef, Value,
};

// =============================================================================
// Descriptor sanity
// =============================================================================

fn all_descriptors() -> Vec<TypeDescriptor> {
    vec![
        Coding::describe().unwrap(),
        CodeableConcept::describe().unwrap(),
        Quantity::describe().unwrap(),
        Range::describe().unwrap(),
        Identifier::describe().unwrap(),
        ResourceReference::describe().unwrap(),
        HumanName::describe().unwrap(),
        Narrative::describe().unwrap(),
        Tag::describe().unwrap(),
        TagList::describe().unwrap(),
        Patient::describe().unwrap(),
        Group::describe().unwrap(),
        GroupCharacteristic::describe().unwrap(),
        OperationOutcome::describe().unwrap(),
        OperationOutcomeIssue::describe().unwrap(),
        Bundle::describe().unwrap(),
        BundleLink::describe().unwrap(),
        BundleEntry::describe().unwrap(),
        Conformance::describe().unwrap(),
    ]
}

#[test]
fn test_every_model_type_describes_in_order() {
    for descriptor in all_descriptors() {
        let orders: Vec<u32> = descriptor.elements().iter().map(|e| e.order()).collect();
        let mut sorted = orders.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(orders, sorted, "{} elements out of order", descriptor.name());
    }
}

#[test]
fn test_resource_roots() {
    let roots: Vec<&str> = all_descriptors()
        .iter()
        .filter(|d| d.is_resource_root())
        .map(|d| d.name())
        .collect();
    assert_eq!(
        roots,
        vec!["TagList", "Patient", "Group", "OperationOutcome", "Bundle", "Conformance"]
    );
}

#[test]
fn test_instantiate_produces_empty_instance() {
    let descriptor = Patient::describe().unwrap();
    let object = descriptor.instantiate();
    assert_eq!(object.type_name(), "Patient");
    assert!(object.element("name").is_empty());
}

// =============================================================================
// Choice elements
// =============================================================================

#[test]
fn test_group_characteristic_choice_wire_names() {
    let descriptor = GroupCharacteristic::describe().unwrap();
    let value = descriptor.element("value").unwrap();

    assert!(value.is_choice());
    assert_eq!(value.min(), 1);
    let wire_names: Vec<String> = value
        .allowed_types()
        .iter()
        .map(|t| value.wire_name_for(t))
        .collect();
    assert_eq!(
        wire_names,
        vec!["valueCodeableConcept", "valueBoolean", "valueQuantity", "valueRange"]
    );
}

#[test]
fn test_match_wire_name_resolves_choice_suffix() {
    let descriptor = GroupCharacteristic::describe().unwrap();

    match descriptor.match_wire_name("valueQuantity") {
        ElementMatch::Resolved(element, type_ref) => {
            assert_eq!(element.name(), "value");
            assert_eq!(type_ref.type_name(), "Quantity");
        }
        other => panic!("unexpected match {:?}", other),
    }

    assert!(matches!(
        descriptor.match_wire_name("valueString"),
        ElementMatch::UnknownChoiceType(_, "String")
    ));
    assert!(matches!(
        descriptor.match_wire_name("value"),
        ElementMatch::UnknownChoiceType(_, "")
    ));
    assert!(matches!(
        descriptor.match_wire_name("valuer"),
        ElementMatch::Unmapped
    ));
}

#[test]
fn test_patient_choice_elements() {
    let descriptor = Patient::describe().unwrap();
    let deceased = descriptor.element("deceased").unwrap();
    assert_eq!(
        deceased.allowed_types(),
        &[
            TypeRef::Primitive(PrimitiveKind::Boolean),
            TypeRef::Primitive(PrimitiveKind::DateTime)
        ]
    );
    assert!(matches!(
        descriptor.match_wire_name("multipleBirthInteger"),
        ElementMatch::Resolved(_, TypeRef::Primitive(PrimitiveKind::Integer))
    ));
}

// =============================================================================
// Declaration defects
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
struct Broken {
    unmapped: Vec<helios_fhir::UnmappedElement>,
}

impl FhirType for Broken {
    const TYPE_NAME: &'static str = "Broken";

    fn describe() -> Result<TypeDescriptor, MetadataError> {
        TypeDescriptor::builder::<Self>()
            .element(helios_fhir::ElementDescriptor::primitive("a", 10, PrimitiveKind::String))
            .element(helios_fhir::ElementDescriptor::primitive("b", 10, PrimitiveKind::String))
            .build()
    }
}

impl FhirObject for Broken {
    helios_fhir::fhir_object_common!();

    fn element(&self, _name: &str) -> Vec<helios_fhir::ValueRef<'_>> {
        Vec::new()
    }

    fn set_element(&mut self, name: &str, _value: Value) -> Result<(), helios_fhir::AssignError> {
        Err(helios_fhir::object::unknown_element(Self::TYPE_NAME, name))
    }
}

#[test]
fn test_conflicting_order_is_reported_on_every_lookup() {
    let inspector = ModelInspector::new();
    for _ in 0..2 {
        let err = inspector.describe::<Broken>().unwrap_err();
        assert!(matches!(err, MetadataError::ConflictingOrder { order: 10, .. }));
    }
    assert_eq!(inspector.cached_types(), 0);
}

#[test]
fn test_cardinality_display() {
    let descriptor = Bundle::describe().unwrap();
    assert_eq!(descriptor.element("entry").unwrap().max(), Occurs::Unbounded);
    assert_eq!(descriptor.element("title").unwrap().max(), Occurs::Bounded(1));
}
