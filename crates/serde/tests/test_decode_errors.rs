//! Decoding failures map onto distinct error kinds.

mod common;

use common::inspector;
use helios_fhir::model::{Group, Patient};
use helios_serde::{
    SerializationError, from_json_str, from_xml_str, resource_from_json_str, resource_from_xml_str,
};

// =============================================================================
// Document level
// =============================================================================

#[test]
fn test_malformed_json_body() {
    let err = from_json_str::<Patient>("{\"resourceType\":", &inspector()).unwrap_err();
    assert!(err.is_malformed_body(), "{:?}", err);
}

#[test]
fn test_malformed_xml_body() {
    let err = from_xml_str::<Patient>("<Patient><active value=\"true\"></Patient>", &inspector())
        .unwrap_err();
    assert!(err.is_malformed_body(), "{:?}", err);
}

#[test]
fn test_unknown_root_type() {
    let inspector = inspector();

    let err = resource_from_json_str(r#"{"resourceType":"Observation"}"#, &inspector).unwrap_err();
    assert!(matches!(err, SerializationError::UnknownRootType(ref name) if name == "Observation"));

    let err = resource_from_xml_str("<Observation xmlns=\"http://hl7.org/fhir\"/>", &inspector)
        .unwrap_err();
    assert!(matches!(err, SerializationError::UnknownRootType(ref name) if name == "Observation"));
}

#[test]
fn test_root_type_mismatch() {
    let err = from_json_str::<Patient>(r#"{"resourceType":"Group","actual":true}"#, &inspector())
        .unwrap_err();
    match err {
        SerializationError::RootTypeMismatch { expected, found } => {
            assert_eq!(expected, "Patient");
            assert_eq!(found, "Group");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_unregistered_root_when_decoding_a_known_type() {
    let err = from_json_str::<Patient>(r#"{"resourceType":"Observation"}"#, &inspector())
        .unwrap_err();
    assert!(matches!(err, SerializationError::UnknownRootType(ref name) if name == "Observation"));

    let err = from_xml_str::<Patient>("<Observation xmlns=\"http://hl7.org/fhir\"/>", &inspector())
        .unwrap_err();
    assert!(matches!(err, SerializationError::UnknownRootType(ref name) if name == "Observation"));
}

// =============================================================================
// Element level
// =============================================================================

#[test]
fn test_too_many_values_for_single_element() {
    let err = from_json_str::<Patient>(r#"{"resourceType":"Patient","active":[true,false]}"#, &inspector())
        .unwrap_err();
    assert!(matches!(
        err,
        SerializationError::CardinalityViolation { ref element, count: 2, .. } if element == "active"
    ));

    let xml = "<Patient xmlns=\"http://hl7.org/fhir\">\
               <birthDate value=\"1974\"/><birthDate value=\"1975\"/>\
               </Patient>";
    let err = from_xml_str::<Patient>(xml, &inspector()).unwrap_err();
    assert!(matches!(err, SerializationError::CardinalityViolation { .. }));
}

#[test]
fn test_choice_suffix_outside_allowed_types() {
    let err = from_json_str::<Patient>(r#"{"resourceType":"Patient","deceasedString":"yes"}"#, &inspector())
        .unwrap_err();
    match err {
        SerializationError::UnsupportedChoiceType { element, type_name } => {
            assert_eq!(element, "deceased");
            assert_eq!(type_name, "String");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_bare_choice_name_is_rejected() {
    let err = from_json_str::<Patient>(r#"{"resourceType":"Patient","deceased":true}"#, &inspector())
        .unwrap_err();
    assert!(matches!(err, SerializationError::UnsupportedChoiceType { .. }));
}

#[test]
fn test_unparseable_primitive() {
    let err = from_json_str::<Patient>(r#"{"resourceType":"Patient","active":"maybe"}"#, &inspector())
        .unwrap_err();
    assert!(matches!(err, SerializationError::InvalidValue { ref element, .. } if element == "active"));
}

#[test]
fn test_object_where_primitive_expected() {
    let err = from_json_str::<Group>(
        r#"{"resourceType":"Group","type":"person","actual":{"value":true}}"#,
        &inspector(),
    )
    .unwrap_err();
    assert!(matches!(err, SerializationError::InvalidValue { .. }));
}

#[test]
fn test_unknown_code_value() {
    let err = from_json_str::<Group>(r#"{"resourceType":"Group","type":"spaceship","actual":true}"#, &inspector())
        .unwrap_err();
    assert!(matches!(err, SerializationError::InvalidValue { ref element, .. } if element == "type"));
}
