//! Shared fixtures for the serialization tests.

#![allow(dead_code)]

use chrono::DateTime;
use helios_fhir::ModelInspector;
use helios_fhir::model::*;
use rust_decimal_macros::dec;

pub const NARRATIVE_DIV: &str =
    "<div xmlns=\"http://www.w3.org/1999/xhtml\">Peter <b>James</b> Chalmers</div>";

pub fn inspector() -> ModelInspector {
    ModelInspector::with_default_model()
}

fn concept(code: &str, display: &str) -> CodeableConcept {
    CodeableConcept::from_coding(Coding::new("http://snomed.info/sct", code).with_display(display))
}

pub fn sample_group() -> Group {
    let mut group = Group::new(GroupType::Person, true);
    group.name = Some("Trial cohort".to_string());
    group.quantity = Some(2);
    group.member = vec![ResourceReference::to("Patient/example")];
    group
}

/// A group with one characteristic per allowed `value[x]` type.
pub fn group_with_every_characteristic() -> Group {
    let mut group = sample_group();
    group.characteristic = vec![
        GroupCharacteristic::new(
            concept("263495000", "Gender"),
            GroupCharacteristicValue::CodeableConcept(concept("248152002", "Female")),
            false,
        ),
        GroupCharacteristic::new(
            CodeableConcept::from_text("Smoker"),
            GroupCharacteristicValue::Boolean(true),
            true,
        ),
        GroupCharacteristic::new(
            CodeableConcept::from_text("Weight"),
            GroupCharacteristicValue::Quantity(Quantity::new(dec!(72.50), "kg")),
            false,
        ),
        GroupCharacteristic::new(
            CodeableConcept::from_text("Age"),
            GroupCharacteristicValue::Range(Range {
                low: Some(Quantity::new(dec!(18), "a")),
                high: Some(Quantity::new(dec!(65), "a")),
                ..Default::default()
            }),
            false,
        ),
    ];
    group
}

pub fn sample_patient() -> Patient {
    Patient {
        text: Some(Narrative::generated(NARRATIVE_DIV)),
        contained: vec![sample_group().into()],
        identifier: vec![Identifier::new("urn:oid:1.2.36.146.595.217.0.1", "12345")],
        name: vec![HumanName {
            use_: Some("official".to_string()),
            family: vec!["Chalmers".to_string()],
            given: vec!["Peter".to_string(), "James".to_string()],
            ..Default::default()
        }],
        gender: Some(concept("248153007", "Male")),
        birth_date: Some("1974-12-25".to_string()),
        deceased: Some(PatientDeceased::DateTime("2015-02-14T13:42:00+10:00".to_string())),
        multiple_birth: Some(PatientMultipleBirth::Integer(2)),
        managing_organization: Some(ResourceReference::to("Organization/1")),
        active: Some(true),
        ..Default::default()
    }
}

pub fn sample_bundle() -> Bundle {
    let updated = DateTime::parse_from_rfc3339("2014-08-18T01:43:30Z").unwrap();

    let mut entry = BundleEntry::new(sample_patient());
    entry.id = Some("http://example.org/fhir/Patient/1".to_string());
    entry.self_link = Some("http://example.org/fhir/Patient/1/_history/2".to_string());
    entry.updated = Some(updated);
    entry.category = vec![
        Tag::general("http://example.org/tags/vip").with_label("VIP"),
        Tag::new("http://example.org/profiles/patient", PROFILE_TAG_SCHEME),
    ];

    let deleted = BundleEntry {
        id: Some("http://example.org/fhir/Patient/2".to_string()),
        deleted: Some(updated),
        ..Default::default()
    };

    let mut bundle = Bundle::new(BundleKind::Collection)
        .with_link(relation::SELF, "http://example.org/fhir/Patient?name=chalmers")
        .with_link(relation::NEXT, "http://example.org/fhir/Patient?name=chalmers&page=2")
        .with_entry(entry)
        .with_entry(deleted);
    bundle.title = Some("Search results".to_string());
    bundle.updated = Some(updated);
    bundle.total_results = Some(2);
    bundle
}
