//! Conformance statement: what a server supports.

use crate::metadata::{ElementDescriptor, MetadataError, TypeDescriptor};
use crate::model::datatypes::Narrative;
use crate::model::resource::{Resource, resource_values};
use crate::node::UnmappedElement;
use crate::object::{
    AssignError, FhirObject, FhirResource, FhirType, Value, ValueRef, object_value,
    primitive_value, text_value, text_values, unknown_element,
};
use crate::primitive::{Primitive, PrimitiveKind};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conformance {
    pub language: Option<String>,
    pub text: Option<Narrative>,
    pub contained: Vec<Resource>,
    pub name: Option<String>,
    pub publisher: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub fhir_version: Option<String>,
    pub accept_unknown: Option<bool>,
    /// Mime types or short format names the server accepts.
    pub format: Vec<String>,
    pub unmapped: Vec<UnmappedElement>,
}

impl Conformance {
    pub fn supports_format(&self, format: &str) -> bool {
        self.format.iter().any(|f| f.eq_ignore_ascii_case(format))
    }
}

impl FhirType for Conformance {
    const TYPE_NAME: &'static str = "Conformance";

    fn describe() -> Result<TypeDescriptor, MetadataError> {
        TypeDescriptor::builder::<Self>()
            .resource_root()
            .element(ElementDescriptor::primitive("language", 10, PrimitiveKind::Code))
            .element(ElementDescriptor::complex::<Narrative>("text", 20))
            .element(ElementDescriptor::resource("contained", 30).repeating())
            .element(ElementDescriptor::primitive("name", 90, PrimitiveKind::String))
            .element(ElementDescriptor::primitive("publisher", 100, PrimitiveKind::String))
            .element(ElementDescriptor::primitive("description", 120, PrimitiveKind::String))
            .element(ElementDescriptor::primitive("date", 140, PrimitiveKind::DateTime).required())
            .element(ElementDescriptor::primitive("fhirVersion", 170, PrimitiveKind::Id).required())
            .element(ElementDescriptor::primitive("acceptUnknown", 180, PrimitiveKind::Boolean).required())
            .element(
                ElementDescriptor::primitive("format", 190, PrimitiveKind::Code)
                    .repeating()
                    .required(),
            )
            .build()
    }
}

impl FhirResource for Conformance {}

impl FhirObject for Conformance {
    crate::fhir_object_common!();

    fn element(&self, name: &str) -> Vec<ValueRef<'_>> {
        match name {
            "language" => text_value(PrimitiveKind::Code, &self.language),
            "text" => object_value(&self.text),
            "contained" => resource_values(&self.contained),
            "name" => text_value(PrimitiveKind::String, &self.name),
            "publisher" => text_value(PrimitiveKind::String, &self.publisher),
            "description" => text_value(PrimitiveKind::String, &self.description),
            "date" => text_value(PrimitiveKind::DateTime, &self.date),
            "fhirVersion" => text_value(PrimitiveKind::Id, &self.fhir_version),
            "acceptUnknown" => primitive_value(&self.accept_unknown, Primitive::Boolean),
            "format" => text_values(PrimitiveKind::Code, &self.format),
            _ => Vec::new(),
        }
    }

    fn set_element(&mut self, name: &str, value: Value) -> Result<(), AssignError> {
        let owner = Self::TYPE_NAME;
        match name {
            "language" => self.language = Some(value.into_text(owner, name)?),
            "text" => self.text = Some(value.into_object(owner, name)?),
            "contained" => self.contained.push(value.into_resource(owner, name)?),
            "name" => self.name = Some(value.into_text(owner, name)?),
            "publisher" => self.publisher = Some(value.into_text(owner, name)?),
            "description" => self.description = Some(value.into_text(owner, name)?),
            "date" => self.date = Some(value.into_text(owner, name)?),
            "fhirVersion" => self.fhir_version = Some(value.into_text(owner, name)?),
            "acceptUnknown" => self.accept_unknown = Some(value.into_bool(owner, name)?),
            "format" => self.format.push(value.into_text(owner, name)?),
            _ => return Err(unknown_element(owner, name)),
        }
        Ok(())
    }
}
