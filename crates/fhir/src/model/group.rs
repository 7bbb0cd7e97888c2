//! Group resource and its characteristic component.

use crate::metadata::{ComplexTypeRef, ElementDescriptor, MetadataError, TypeDescriptor, TypeRef};
use crate::model::datatypes::{
    CodeableConcept, Identifier, Narrative, Quantity, Range, ResourceReference,
};
use crate::model::resource::{Resource, resource_values};
use crate::node::UnmappedElement;
use crate::object::{
    AssignError, FhirCode, FhirObject, FhirResource, FhirType, Value, ValueRef, code_value,
    downcast, object_value, object_values, primitive_value, text_value, unknown_element,
};
use crate::primitive::{Primitive, PrimitiveKind};

/// Kind of the entities a group gathers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupType {
    Person,
    Animal,
    Practitioner,
    Device,
    Medication,
    Substance,
}

impl FhirCode for GroupType {
    fn as_code(&self) -> &'static str {
        match self {
            GroupType::Person => "person",
            GroupType::Animal => "animal",
            GroupType::Practitioner => "practitioner",
            GroupType::Device => "device",
            GroupType::Medication => "medication",
            GroupType::Substance => "substance",
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        match code {
            "person" => Some(GroupType::Person),
            "animal" => Some(GroupType::Animal),
            "practitioner" => Some(GroupType::Practitioner),
            "device" => Some(GroupType::Device),
            "medication" => Some(GroupType::Medication),
            "substance" => Some(GroupType::Substance),
            _ => None,
        }
    }
}

/// A defined collection of entities.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    pub language: Option<String>,
    pub text: Option<Narrative>,
    pub contained: Vec<Resource>,
    pub identifier: Option<Identifier>,
    pub type_: Option<GroupType>,
    pub actual: Option<bool>,
    pub code: Option<CodeableConcept>,
    pub name: Option<String>,
    pub quantity: Option<i32>,
    pub characteristic: Vec<GroupCharacteristic>,
    pub member: Vec<ResourceReference>,
    pub unmapped: Vec<UnmappedElement>,
}

impl Group {
    pub fn new(type_: GroupType, actual: bool) -> Self {
        Self {
            type_: Some(type_),
            actual: Some(actual),
            ..Default::default()
        }
    }
}

impl FhirType for Group {
    const TYPE_NAME: &'static str = "Group";

    fn describe() -> Result<TypeDescriptor, MetadataError> {
        TypeDescriptor::builder::<Self>()
            .resource_root()
            .element(ElementDescriptor::primitive("language", 10, PrimitiveKind::Code))
            .element(ElementDescriptor::complex::<Narrative>("text", 20))
            .element(ElementDescriptor::resource("contained", 30).repeating())
            .element(ElementDescriptor::complex::<Identifier>("identifier", 70))
            .element(ElementDescriptor::primitive("type", 80, PrimitiveKind::Code).required())
            .element(ElementDescriptor::primitive("actual", 90, PrimitiveKind::Boolean).required())
            .element(ElementDescriptor::complex::<CodeableConcept>("code", 100))
            .element(ElementDescriptor::primitive("name", 110, PrimitiveKind::String))
            .element(ElementDescriptor::primitive("quantity", 120, PrimitiveKind::Integer))
            .element(ElementDescriptor::complex::<GroupCharacteristic>("characteristic", 130).repeating())
            .element(ElementDescriptor::complex::<ResourceReference>("member", 140).repeating())
            .build()
    }
}

impl FhirResource for Group {}

impl FhirObject for Group {
    crate::fhir_object_common!();

    fn element(&self, name: &str) -> Vec<ValueRef<'_>> {
        match name {
            "language" => text_value(PrimitiveKind::Code, &self.language),
            "text" => object_value(&self.text),
            "contained" => resource_values(&self.contained),
            "identifier" => object_value(&self.identifier),
            "type" => code_value(&self.type_),
            "actual" => primitive_value(&self.actual, Primitive::Boolean),
            "code" => object_value(&self.code),
            "name" => text_value(PrimitiveKind::String, &self.name),
            "quantity" => primitive_value(&self.quantity, Primitive::Integer),
            "characteristic" => object_values(&self.characteristic),
            "member" => object_values(&self.member),
            _ => Vec::new(),
        }
    }

    fn set_element(&mut self, name: &str, value: Value) -> Result<(), AssignError> {
        let owner = Self::TYPE_NAME;
        match name {
            "language" => self.language = Some(value.into_text(owner, name)?),
            "text" => self.text = Some(value.into_object(owner, name)?),
            "contained" => self.contained.push(value.into_resource(owner, name)?),
            "identifier" => self.identifier = Some(value.into_object(owner, name)?),
            "type" => self.type_ = Some(value.into_code(owner, name)?),
            "actual" => self.actual = Some(value.into_bool(owner, name)?),
            "code" => self.code = Some(value.into_object(owner, name)?),
            "name" => self.name = Some(value.into_text(owner, name)?),
            "quantity" => self.quantity = Some(value.into_integer(owner, name)?),
            "characteristic" => self.characteristic.push(value.into_object(owner, name)?),
            "member" => self.member.push(value.into_object(owner, name)?),
            _ => return Err(unknown_element(owner, name)),
        }
        Ok(())
    }
}

/// `value[x]` of a group characteristic.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupCharacteristicValue {
    CodeableConcept(CodeableConcept),
    Boolean(bool),
    Quantity(Quantity),
    Range(Range),
}

/// A trait shared by every member of a group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupCharacteristic {
    pub code: Option<CodeableConcept>,
    pub value: Option<GroupCharacteristicValue>,
    pub exclude: Option<bool>,
    pub unmapped: Vec<UnmappedElement>,
}

impl GroupCharacteristic {
    pub fn new(code: CodeableConcept, value: GroupCharacteristicValue, exclude: bool) -> Self {
        Self {
            code: Some(code),
            value: Some(value),
            exclude: Some(exclude),
            unmapped: Vec::new(),
        }
    }
}

impl FhirType for GroupCharacteristic {
    const TYPE_NAME: &'static str = "GroupCharacteristicComponent";

    fn describe() -> Result<TypeDescriptor, MetadataError> {
        TypeDescriptor::builder::<Self>()
            .element(ElementDescriptor::complex::<CodeableConcept>("code", 40).required())
            .element(
                ElementDescriptor::choice(
                    "value",
                    50,
                    vec![
                        TypeRef::Complex(ComplexTypeRef::of::<CodeableConcept>()),
                        TypeRef::Primitive(PrimitiveKind::Boolean),
                        TypeRef::Complex(ComplexTypeRef::of::<Quantity>()),
                        TypeRef::Complex(ComplexTypeRef::of::<Range>()),
                    ],
                )
                .required(),
            )
            .element(ElementDescriptor::primitive("exclude", 60, PrimitiveKind::Boolean).required())
            .build()
    }
}

impl FhirObject for GroupCharacteristic {
    crate::fhir_object_common!();

    fn element(&self, name: &str) -> Vec<ValueRef<'_>> {
        match name {
            "code" => object_value(&self.code),
            "value" => match &self.value {
                Some(GroupCharacteristicValue::CodeableConcept(c)) => vec![ValueRef::Object(c)],
                Some(GroupCharacteristicValue::Boolean(b)) => {
                    vec![ValueRef::Primitive(Primitive::Boolean(*b))]
                }
                Some(GroupCharacteristicValue::Quantity(q)) => vec![ValueRef::Object(q)],
                Some(GroupCharacteristicValue::Range(r)) => vec![ValueRef::Object(r)],
                None => Vec::new(),
            },
            "exclude" => primitive_value(&self.exclude, Primitive::Boolean),
            _ => Vec::new(),
        }
    }

    fn set_element(&mut self, name: &str, value: Value) -> Result<(), AssignError> {
        let owner = Self::TYPE_NAME;
        match name {
            "code" => self.code = Some(value.into_object(owner, name)?),
            "value" => self.value = Some(characteristic_value(name, value)?),
            "exclude" => self.exclude = Some(value.into_bool(owner, name)?),
            _ => return Err(unknown_element(owner, name)),
        }
        Ok(())
    }
}

fn characteristic_value(element: &str, value: Value) -> Result<GroupCharacteristicValue, AssignError> {
    let wrong_kind = |found: &str| AssignError::WrongKind {
        type_name: GroupCharacteristic::TYPE_NAME,
        element: element.to_string(),
        found: found.to_string(),
    };

    match value {
        Value::Primitive(Primitive::Boolean(b)) => Ok(GroupCharacteristicValue::Boolean(b)),
        Value::Primitive(other) => Err(wrong_kind(other.kind().type_name())),
        Value::Object(object) => match object.type_name() {
            "CodeableConcept" => downcast::<CodeableConcept>(object)
                .map(GroupCharacteristicValue::CodeableConcept)
                .map_err(wrong_kind),
            "Quantity" => downcast::<Quantity>(object)
                .map(GroupCharacteristicValue::Quantity)
                .map_err(wrong_kind),
            "Range" => downcast::<Range>(object)
                .map(GroupCharacteristicValue::Range)
                .map_err(wrong_kind),
            other => Err(wrong_kind(other)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_characteristic_value_by_runtime_type() {
        let mut characteristic = GroupCharacteristic::default();
        characteristic
            .set_element("value", Value::Object(Box::new(Quantity::new(dec!(80), "kg"))))
            .unwrap();
        assert_eq!(
            characteristic.value,
            Some(GroupCharacteristicValue::Quantity(Quantity::new(dec!(80), "kg")))
        );

        let values = characteristic.element("value");
        assert_eq!(values[0].type_name(), "Quantity");
    }

    #[test]
    fn test_characteristic_value_rejects_undeclared_type() {
        let mut characteristic = GroupCharacteristic::default();
        let err = characteristic
            .set_element("value", Value::Object(Box::new(Identifier::new("urn:x", "1"))))
            .unwrap_err();
        assert!(matches!(err, AssignError::WrongKind { found, .. } if found == "Identifier"));
    }

    #[test]
    fn test_group_type_code() {
        let mut group = Group::default();
        group
            .set_element("type", Value::Primitive(Primitive::Code("animal".into())))
            .unwrap();
        assert_eq!(group.type_, Some(GroupType::Animal));

        let err = group
            .set_element("type", Value::Primitive(Primitive::Code("robot".into())))
            .unwrap_err();
        assert!(matches!(err, AssignError::InvalidCode { .. }));
    }
}
