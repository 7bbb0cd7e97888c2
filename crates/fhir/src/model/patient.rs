//! Patient resource.

use crate::metadata::{ElementDescriptor, MetadataError, TypeDescriptor, TypeRef};
use crate::model::datatypes::{CodeableConcept, HumanName, Identifier, Narrative, ResourceReference};
use crate::model::resource::{Resource, resource_values};
use crate::node::UnmappedElement;
use crate::object::{
    AssignError, FhirObject, FhirResource, FhirType, Value, ValueRef, object_value, object_values,
    primitive_value, text_value, unknown_element,
};
use crate::primitive::{Primitive, PrimitiveKind};

/// `deceased[x]`: a flag or the moment of death.
#[derive(Debug, Clone, PartialEq)]
pub enum PatientDeceased {
    Boolean(bool),
    DateTime(String),
}

/// `multipleBirth[x]`: a flag or the birth order.
#[derive(Debug, Clone, PartialEq)]
pub enum PatientMultipleBirth {
    Boolean(bool),
    Integer(i32),
}

/// Demographics of a person receiving care.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patient {
    pub language: Option<String>,
    pub text: Option<Narrative>,
    pub contained: Vec<Resource>,
    pub identifier: Vec<Identifier>,
    pub name: Vec<HumanName>,
    pub gender: Option<CodeableConcept>,
    pub birth_date: Option<String>,
    pub deceased: Option<PatientDeceased>,
    pub marital_status: Option<CodeableConcept>,
    pub multiple_birth: Option<PatientMultipleBirth>,
    pub communication: Vec<CodeableConcept>,
    pub care_provider: Vec<ResourceReference>,
    pub managing_organization: Option<ResourceReference>,
    pub active: Option<bool>,
    pub unmapped: Vec<UnmappedElement>,
}

impl FhirType for Patient {
    const TYPE_NAME: &'static str = "Patient";

    fn describe() -> Result<TypeDescriptor, MetadataError> {
        TypeDescriptor::builder::<Self>()
            .resource_root()
            .element(ElementDescriptor::primitive("language", 10, PrimitiveKind::Code))
            .element(ElementDescriptor::complex::<Narrative>("text", 20))
            .element(ElementDescriptor::resource("contained", 30).repeating())
            .element(ElementDescriptor::complex::<Identifier>("identifier", 70).repeating())
            .element(ElementDescriptor::complex::<HumanName>("name", 80).repeating())
            .element(ElementDescriptor::complex::<CodeableConcept>("gender", 100))
            .element(ElementDescriptor::primitive("birthDate", 110, PrimitiveKind::DateTime))
            .element(ElementDescriptor::choice(
                "deceased",
                120,
                vec![
                    TypeRef::Primitive(PrimitiveKind::Boolean),
                    TypeRef::Primitive(PrimitiveKind::DateTime),
                ],
            ))
            .element(ElementDescriptor::complex::<CodeableConcept>("maritalStatus", 140))
            .element(ElementDescriptor::choice(
                "multipleBirth",
                150,
                vec![
                    TypeRef::Primitive(PrimitiveKind::Boolean),
                    TypeRef::Primitive(PrimitiveKind::Integer),
                ],
            ))
            .element(ElementDescriptor::complex::<CodeableConcept>("communication", 190).repeating())
            .element(ElementDescriptor::complex::<ResourceReference>("careProvider", 200).repeating())
            .element(ElementDescriptor::complex::<ResourceReference>("managingOrganization", 210))
            .element(ElementDescriptor::primitive("active", 230, PrimitiveKind::Boolean))
            .build()
    }
}

impl FhirResource for Patient {}

impl FhirObject for Patient {
    crate::fhir_object_common!();

    fn element(&self, name: &str) -> Vec<ValueRef<'_>> {
        match name {
            "language" => text_value(PrimitiveKind::Code, &self.language),
            "text" => object_value(&self.text),
            "contained" => resource_values(&self.contained),
            "identifier" => object_values(&self.identifier),
            "name" => object_values(&self.name),
            "gender" => object_value(&self.gender),
            "birthDate" => text_value(PrimitiveKind::DateTime, &self.birth_date),
            "deceased" => match &self.deceased {
                Some(PatientDeceased::Boolean(b)) => vec![ValueRef::Primitive(Primitive::Boolean(*b))],
                Some(PatientDeceased::DateTime(dt)) => {
                    vec![ValueRef::Primitive(Primitive::DateTime(dt.clone()))]
                }
                None => Vec::new(),
            },
            "maritalStatus" => object_value(&self.marital_status),
            "multipleBirth" => match &self.multiple_birth {
                Some(PatientMultipleBirth::Boolean(b)) => {
                    vec![ValueRef::Primitive(Primitive::Boolean(*b))]
                }
                Some(PatientMultipleBirth::Integer(i)) => {
                    vec![ValueRef::Primitive(Primitive::Integer(*i))]
                }
                None => Vec::new(),
            },
            "communication" => object_values(&self.communication),
            "careProvider" => object_values(&self.care_provider),
            "managingOrganization" => object_value(&self.managing_organization),
            "active" => primitive_value(&self.active, Primitive::Boolean),
            _ => Vec::new(),
        }
    }

    fn set_element(&mut self, name: &str, value: Value) -> Result<(), AssignError> {
        let owner = Self::TYPE_NAME;
        match name {
            "language" => self.language = Some(value.into_text(owner, name)?),
            "text" => self.text = Some(value.into_object(owner, name)?),
            "contained" => self.contained.push(value.into_resource(owner, name)?),
            "identifier" => self.identifier.push(value.into_object(owner, name)?),
            "name" => self.name.push(value.into_object(owner, name)?),
            "gender" => self.gender = Some(value.into_object(owner, name)?),
            "birthDate" => self.birth_date = Some(value.into_text(owner, name)?),
            "deceased" => {
                self.deceased = Some(match value.into_primitive(owner, name)? {
                    Primitive::Boolean(b) => PatientDeceased::Boolean(b),
                    Primitive::DateTime(dt) => PatientDeceased::DateTime(dt),
                    other => return Err(wrong_choice(name, other)),
                })
            }
            "maritalStatus" => self.marital_status = Some(value.into_object(owner, name)?),
            "multipleBirth" => {
                self.multiple_birth = Some(match value.into_primitive(owner, name)? {
                    Primitive::Boolean(b) => PatientMultipleBirth::Boolean(b),
                    Primitive::Integer(i) => PatientMultipleBirth::Integer(i),
                    other => return Err(wrong_choice(name, other)),
                })
            }
            "communication" => self.communication.push(value.into_object(owner, name)?),
            "careProvider" => self.care_provider.push(value.into_object(owner, name)?),
            "managingOrganization" => {
                self.managing_organization = Some(value.into_object(owner, name)?)
            }
            "active" => self.active = Some(value.into_bool(owner, name)?),
            _ => return Err(unknown_element(owner, name)),
        }
        Ok(())
    }
}

fn wrong_choice(element: &str, found: Primitive) -> AssignError {
    AssignError::WrongKind {
        type_name: Patient::TYPE_NAME,
        element: element.to_string(),
        found: found.kind().type_name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deceased_choice_values() {
        let patient = Patient {
            deceased: Some(PatientDeceased::DateTime("2014-03-01".to_string())),
            ..Default::default()
        };
        let values = patient.element("deceased");
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].type_name(), "dateTime");
    }

    #[test]
    fn test_deceased_rejects_other_primitives() {
        let mut patient = Patient::default();
        let err = patient
            .set_element("deceased", Value::Primitive(Primitive::Integer(3)))
            .unwrap_err();
        assert!(matches!(err, AssignError::WrongKind { .. }));
    }

    #[test]
    fn test_contained_accepts_resources_only() {
        let mut patient = Patient::default();
        patient
            .set_element("contained", Value::Object(Box::new(Patient::default())))
            .unwrap();
        assert_eq!(patient.contained.len(), 1);

        let err = patient
            .set_element(
                "contained",
                Value::Object(Box::new(CodeableConcept::from_text("x"))),
            )
            .unwrap_err();
        assert!(matches!(err, AssignError::WrongKind { .. }));
    }

    #[test]
    fn test_collection_name() {
        assert_eq!(Patient::collection_name(), "Patient");
    }
}
