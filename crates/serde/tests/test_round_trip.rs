//! Round trips through both wire formats with the bundled model.

mod common;

use common::*;
use helios_fhir::model::*;
use helios_fhir::{FhirType, Node, Scalar, UnmappedElement};
use helios_serde::{
    EncodedBody, ResourceFormat, deserialize, deserialize_resource, from_json_str, from_xml_str,
    serialize, to_json_string, to_xml_string,
};

const FORMATS: [ResourceFormat; 2] = [ResourceFormat::Json, ResourceFormat::Xml];

fn round_trip<T: FhirType + std::fmt::Debug + PartialEq>(value: &T, format: ResourceFormat) -> T {
    let inspector = inspector();
    let body = serialize(value, format, &inspector).unwrap();
    assert_eq!(body.format(), format);
    deserialize::<T>(&body, &inspector).unwrap()
}

// =============================================================================
// Round trips
// =============================================================================

#[test]
fn test_patient_round_trip() {
    let patient = sample_patient();
    for format in FORMATS {
        assert_eq!(round_trip(&patient, format), patient, "format {}", format);
    }
}

#[test]
fn test_group_characteristics_round_trip() {
    let group = group_with_every_characteristic();
    for format in FORMATS {
        assert_eq!(round_trip(&group, format), group, "format {}", format);
    }
}

#[test]
fn test_bundle_round_trip() {
    let bundle = sample_bundle();
    for format in FORMATS {
        let decoded = round_trip(&bundle, format);
        assert_eq!(decoded, bundle, "format {}", format);
        assert_eq!(decoded.resources().count(), 1);
        assert!(decoded.entry[1].is_deleted());
    }
}

#[test]
fn test_operation_outcome_round_trip() {
    let mut outcome = OperationOutcome::for_message("Resource id is missing");
    outcome.issue.push(OperationOutcomeIssue::new(
        IssueSeverity::Warning,
        "Narrative was regenerated",
    ));
    for format in FORMATS {
        let decoded = round_trip(&outcome, format);
        assert_eq!(decoded, outcome);
        assert_eq!(
            decoded.message(),
            "Resource id is missing\nNarrative was regenerated"
        );
    }
}

#[test]
fn test_tag_list_round_trip() {
    let tags = TagList::new(vec![
        Tag::general("http://example.org/tags/vip").with_label("VIP"),
        Tag::new("http://example.org/labels/restricted", SECURITY_TAG_SCHEME),
    ]);
    for format in FORMATS {
        assert_eq!(round_trip(&tags, format), tags);
    }
}

#[test]
fn test_resource_type_discovered_from_body() {
    let inspector = inspector();
    let group = group_with_every_characteristic();
    for format in FORMATS {
        let body = serialize(&group, format, &inspector).unwrap();
        match deserialize_resource(&body, &inspector).unwrap() {
            Resource::Group(decoded) => assert_eq!(*decoded, group),
            other => panic!("expected a Group, got {}", other.resource_type()),
        }
    }
}

#[test]
fn test_json_and_xml_carry_the_same_content() {
    let inspector = inspector();
    let patient = sample_patient();

    let json = to_json_string(&patient, &inspector).unwrap();
    let from_json: Patient = from_json_str(&json, &inspector).unwrap();
    let xml = to_xml_string(&from_json, &inspector).unwrap();
    let from_xml: Patient = from_xml_str(&xml, &inspector).unwrap();

    assert_eq!(from_xml, patient);
}

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn test_encoding_is_repeatable() {
    let inspector = inspector();
    let bundle = sample_bundle();
    for format in FORMATS {
        let first = serialize(&bundle, format, &inspector).unwrap();
        let second = serialize(&bundle, format, &inspector).unwrap();
        assert_eq!(first.as_bytes(), second.as_bytes());

        let decoded: Bundle = deserialize(&first, &inspector).unwrap();
        let again = serialize(&decoded, format, &inspector).unwrap();
        assert_eq!(first.as_bytes(), again.as_bytes());
    }
}

#[test]
fn test_json_member_order_follows_declaration() {
    let inspector = inspector();
    let patient = Patient {
        active: Some(true),
        birth_date: Some("1974-12-25".to_string()),
        name: vec![HumanName::new("Chalmers", "Peter")],
        ..Default::default()
    };
    let json = to_json_string(&patient, &inspector).unwrap();
    assert_eq!(
        json,
        r#"{"resourceType":"Patient","name":[{"family":["Chalmers"],"given":["Peter"]}],"birthDate":"1974-12-25","active":true}"#
    );
}

// =============================================================================
// Wire shape
// =============================================================================

#[test]
fn test_choice_values_use_typed_wire_names() {
    let inspector = inspector();
    let group = group_with_every_characteristic();

    let json = to_json_string(&group, &inspector).unwrap();
    for wire_name in ["valueCodeableConcept", "valueBoolean", "valueQuantity", "valueRange"] {
        assert!(json.contains(&format!("\"{}\"", wire_name)), "missing {}", wire_name);
    }

    let xml = to_xml_string(&group, &inspector).unwrap();
    for wire_name in ["valueCodeableConcept", "valueBoolean", "valueQuantity", "valueRange"] {
        assert!(xml.contains(&format!("<{}", wire_name)), "missing {}", wire_name);
    }
    assert!(xml.contains("<valueBoolean value=\"true\"/>"));
}

#[test]
fn test_json_scalars_and_decimals() {
    let inspector = inspector();
    let json = to_json_string(&group_with_every_characteristic(), &inspector).unwrap();

    assert!(json.contains(r#""quantity":2"#));
    assert!(json.contains(r#""actual":true"#));
    assert!(json.contains(r#""value":72.50"#));
}

#[test]
fn test_xml_wraps_contained_resources() {
    let inspector = inspector();
    let xml = to_xml_string(&sample_patient(), &inspector).unwrap();

    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(xml.contains("<Patient xmlns=\"http://hl7.org/fhir\">"));
    assert!(xml.contains("<contained><Group>"));
    assert!(xml.contains(&format!("<text><status value=\"generated\"/>{}</text>", NARRATIVE_DIV)));
}

#[test]
fn test_json_contained_resources_carry_resource_type() {
    let inspector = inspector();
    let json = to_json_string(&sample_patient(), &inspector).unwrap();
    assert!(json.contains(r#""contained":[{"resourceType":"Group""#));
}

// =============================================================================
// Unmapped content
// =============================================================================

#[test]
fn test_unknown_json_members_survive_a_round_trip() {
    let inspector = inspector();
    let json = r#"{"resourceType":"Patient","active":true,"favouriteColour":"blue","pet":{"species":"dog"}}"#;

    let patient: Patient = from_json_str(json, &inspector).unwrap();
    assert_eq!(patient.active, Some(true));
    assert_eq!(
        patient.unmapped[0],
        UnmappedElement::new("favouriteColour", Node::Primitive("blue".into()))
    );
    assert_eq!(patient.unmapped[1].name, "pet");

    assert_eq!(to_json_string(&patient, &inspector).unwrap(), json);
}

#[test]
fn test_unknown_json_scalars_and_arrays_keep_their_shape() {
    let inspector = inspector();
    let json = r#"{"resourceType":"Patient","futureList":[7],"futureFlag":true,"futureScore":1.50,"futureGroup":{"codes":["a"],"weights":[0.5,2]}}"#;

    let patient: Patient = from_json_str(json, &inspector).unwrap();
    assert_eq!(
        patient.unmapped[0],
        UnmappedElement::new("futureList", Node::Scalar(Scalar::Number("7".into())))
            .with_in_array(true)
    );
    assert_eq!(
        patient.unmapped[1],
        UnmappedElement::new("futureFlag", Node::Scalar(Scalar::Boolean(true)))
    );

    assert_eq!(to_json_string(&patient, &inspector).unwrap(), json);
}

#[test]
fn test_unknown_json_scalars_are_written_as_xml_values() {
    let inspector = inspector();
    let json = r#"{"resourceType":"Patient","futureList":[7],"futureFlag":true}"#;

    let patient: Patient = from_json_str(json, &inspector).unwrap();
    let xml = to_xml_string(&patient, &inspector).unwrap();
    assert!(xml.contains(r#"<futureList value="7"/>"#), "{}", xml);
    assert!(xml.contains(r#"<futureFlag value="true"/>"#), "{}", xml);
}

#[test]
fn test_unknown_xml_elements_survive_a_round_trip() {
    let inspector = inspector();
    let xml = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
               <Patient xmlns=\"http://hl7.org/fhir\">\
               <active value=\"true\"/>\
               <favouriteColour value=\"blue\"/>\
               <pet><species value=\"dog\"/></pet>\
               </Patient>";

    let patient: Patient = from_xml_str(xml, &inspector).unwrap();
    assert_eq!(patient.unmapped.len(), 2);
    assert_eq!(to_xml_string(&patient, &inspector).unwrap(), xml);
}

#[test]
fn test_encoded_body_keeps_its_format() {
    let inspector = inspector();
    let body = EncodedBody::new(ResourceFormat::Xml, to_xml_string(&sample_group(), &inspector).unwrap());
    let group: Group = deserialize(&body, &inspector).unwrap();
    assert_eq!(group, sample_group());
}
