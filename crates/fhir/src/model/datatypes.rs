//! General-purpose complex datatypes.

use crate::metadata::{ElementDescriptor, MetadataError, TypeDescriptor};
use crate::node::UnmappedElement;
use crate::object::{
    AssignError, FhirCode, FhirObject, FhirType, Value, ValueRef, code_value, object_value,
    object_values, primitive_value, text_value, text_values, unknown_element,
};
use crate::primitive::{Primitive, PrimitiveKind};
use rust_decimal::Decimal;

/// A reference to a code defined by a terminology system.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Coding {
    pub system: Option<String>,
    pub version: Option<String>,
    pub code: Option<String>,
    pub display: Option<String>,
    pub primary: Option<bool>,
    pub value_set: Option<ResourceReference>,
    pub unmapped: Vec<UnmappedElement>,
}

impl Coding {
    pub fn new(system: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            code: Some(code.into()),
            ..Default::default()
        }
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }
}

impl FhirType for Coding {
    const TYPE_NAME: &'static str = "Coding";

    fn describe() -> Result<TypeDescriptor, MetadataError> {
        TypeDescriptor::builder::<Self>()
            .element(ElementDescriptor::primitive("system", 40, PrimitiveKind::Uri))
            .element(ElementDescriptor::primitive("version", 50, PrimitiveKind::String))
            .element(ElementDescriptor::primitive("code", 60, PrimitiveKind::Code))
            .element(ElementDescriptor::primitive("display", 70, PrimitiveKind::String))
            .element(ElementDescriptor::primitive("primary", 80, PrimitiveKind::Boolean))
            .element(ElementDescriptor::complex::<ResourceReference>("valueSet", 90))
            .build()
    }
}

impl FhirObject for Coding {
    crate::fhir_object_common!();

    fn element(&self, name: &str) -> Vec<ValueRef<'_>> {
        match name {
            "system" => text_value(PrimitiveKind::Uri, &self.system),
            "version" => text_value(PrimitiveKind::String, &self.version),
            "code" => text_value(PrimitiveKind::Code, &self.code),
            "display" => text_value(PrimitiveKind::String, &self.display),
            "primary" => primitive_value(&self.primary, Primitive::Boolean),
            "valueSet" => object_value(&self.value_set),
            _ => Vec::new(),
        }
    }

    fn set_element(&mut self, name: &str, value: Value) -> Result<(), AssignError> {
        let owner = Self::TYPE_NAME;
        match name {
            "system" => self.system = Some(value.into_text(owner, name)?),
            "version" => self.version = Some(value.into_text(owner, name)?),
            "code" => self.code = Some(value.into_text(owner, name)?),
            "display" => self.display = Some(value.into_text(owner, name)?),
            "primary" => self.primary = Some(value.into_bool(owner, name)?),
            "valueSet" => self.value_set = Some(value.into_object(owner, name)?),
            _ => return Err(unknown_element(owner, name)),
        }
        Ok(())
    }
}

/// A concept expressed as codings and/or free text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CodeableConcept {
    pub coding: Vec<Coding>,
    pub text: Option<String>,
    pub unmapped: Vec<UnmappedElement>,
}

impl CodeableConcept {
    pub fn from_coding(coding: Coding) -> Self {
        Self {
            coding: vec![coding],
            ..Default::default()
        }
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }
}

impl FhirType for CodeableConcept {
    const TYPE_NAME: &'static str = "CodeableConcept";

    fn describe() -> Result<TypeDescriptor, MetadataError> {
        TypeDescriptor::builder::<Self>()
            .element(ElementDescriptor::complex::<Coding>("coding", 40).repeating())
            .element(ElementDescriptor::primitive("text", 50, PrimitiveKind::String))
            .build()
    }
}

impl FhirObject for CodeableConcept {
    crate::fhir_object_common!();

    fn element(&self, name: &str) -> Vec<ValueRef<'_>> {
        match name {
            "coding" => object_values(&self.coding),
            "text" => text_value(PrimitiveKind::String, &self.text),
            _ => Vec::new(),
        }
    }

    fn set_element(&mut self, name: &str, value: Value) -> Result<(), AssignError> {
        let owner = Self::TYPE_NAME;
        match name {
            "coding" => self.coding.push(value.into_object(owner, name)?),
            "text" => self.text = Some(value.into_text(owner, name)?),
            _ => return Err(unknown_element(owner, name)),
        }
        Ok(())
    }
}

/// How a measured quantity relates to its stated value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityComparator {
    LessThan,
    LessOrEqual,
    GreaterOrEqual,
    GreaterThan,
}

impl FhirCode for QuantityComparator {
    fn as_code(&self) -> &'static str {
        match self {
            QuantityComparator::LessThan => "<",
            QuantityComparator::LessOrEqual => "<=",
            QuantityComparator::GreaterOrEqual => ">=",
            QuantityComparator::GreaterThan => ">",
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        match code {
            "<" => Some(QuantityComparator::LessThan),
            "<=" => Some(QuantityComparator::LessOrEqual),
            ">=" => Some(QuantityComparator::GreaterOrEqual),
            ">" => Some(QuantityComparator::GreaterThan),
            _ => None,
        }
    }
}

/// A measured amount.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Quantity {
    pub value: Option<Decimal>,
    pub comparator: Option<QuantityComparator>,
    pub units: Option<String>,
    pub system: Option<String>,
    pub code: Option<String>,
    pub unmapped: Vec<UnmappedElement>,
}

impl Quantity {
    pub fn new(value: Decimal, units: impl Into<String>) -> Self {
        Self {
            value: Some(value),
            units: Some(units.into()),
            ..Default::default()
        }
    }
}

impl FhirType for Quantity {
    const TYPE_NAME: &'static str = "Quantity";

    fn describe() -> Result<TypeDescriptor, MetadataError> {
        TypeDescriptor::builder::<Self>()
            .element(ElementDescriptor::primitive("value", 40, PrimitiveKind::Decimal))
            .element(ElementDescriptor::primitive("comparator", 50, PrimitiveKind::Code))
            .element(ElementDescriptor::primitive("units", 60, PrimitiveKind::String))
            .element(ElementDescriptor::primitive("system", 70, PrimitiveKind::Uri))
            .element(ElementDescriptor::primitive("code", 80, PrimitiveKind::Code))
            .build()
    }
}

impl FhirObject for Quantity {
    crate::fhir_object_common!();

    fn element(&self, name: &str) -> Vec<ValueRef<'_>> {
        match name {
            "value" => primitive_value(&self.value, Primitive::Decimal),
            "comparator" => code_value(&self.comparator),
            "units" => text_value(PrimitiveKind::String, &self.units),
            "system" => text_value(PrimitiveKind::Uri, &self.system),
            "code" => text_value(PrimitiveKind::Code, &self.code),
            _ => Vec::new(),
        }
    }

    fn set_element(&mut self, name: &str, value: Value) -> Result<(), AssignError> {
        let owner = Self::TYPE_NAME;
        match name {
            "value" => self.value = Some(value.into_decimal(owner, name)?),
            "comparator" => self.comparator = Some(value.into_code(owner, name)?),
            "units" => self.units = Some(value.into_text(owner, name)?),
            "system" => self.system = Some(value.into_text(owner, name)?),
            "code" => self.code = Some(value.into_text(owner, name)?),
            _ => return Err(unknown_element(owner, name)),
        }
        Ok(())
    }
}

/// A closed interval between two quantities.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Range {
    pub low: Option<Quantity>,
    pub high: Option<Quantity>,
    pub unmapped: Vec<UnmappedElement>,
}

impl FhirType for Range {
    const TYPE_NAME: &'static str = "Range";

    fn describe() -> Result<TypeDescriptor, MetadataError> {
        TypeDescriptor::builder::<Self>()
            .element(ElementDescriptor::complex::<Quantity>("low", 40))
            .element(ElementDescriptor::complex::<Quantity>("high", 50))
            .build()
    }
}

impl FhirObject for Range {
    crate::fhir_object_common!();

    fn element(&self, name: &str) -> Vec<ValueRef<'_>> {
        match name {
            "low" => object_value(&self.low),
            "high" => object_value(&self.high),
            _ => Vec::new(),
        }
    }

    fn set_element(&mut self, name: &str, value: Value) -> Result<(), AssignError> {
        let owner = Self::TYPE_NAME;
        match name {
            "low" => self.low = Some(value.into_object(owner, name)?),
            "high" => self.high = Some(value.into_object(owner, name)?),
            _ => return Err(unknown_element(owner, name)),
        }
        Ok(())
    }
}

/// A business identifier for a resource.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Identifier {
    pub use_: Option<String>,
    pub label: Option<String>,
    pub system: Option<String>,
    pub value: Option<String>,
    pub unmapped: Vec<UnmappedElement>,
}

impl Identifier {
    pub fn new(system: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            value: Some(value.into()),
            ..Default::default()
        }
    }
}

impl FhirType for Identifier {
    const TYPE_NAME: &'static str = "Identifier";

    fn describe() -> Result<TypeDescriptor, MetadataError> {
        TypeDescriptor::builder::<Self>()
            .element(ElementDescriptor::primitive("use", 40, PrimitiveKind::Code))
            .element(ElementDescriptor::primitive("label", 50, PrimitiveKind::String))
            .element(ElementDescriptor::primitive("system", 60, PrimitiveKind::Uri))
            .element(ElementDescriptor::primitive("value", 70, PrimitiveKind::String))
            .build()
    }
}

impl FhirObject for Identifier {
    crate::fhir_object_common!();

    fn element(&self, name: &str) -> Vec<ValueRef<'_>> {
        match name {
            "use" => text_value(PrimitiveKind::Code, &self.use_),
            "label" => text_value(PrimitiveKind::String, &self.label),
            "system" => text_value(PrimitiveKind::Uri, &self.system),
            "value" => text_value(PrimitiveKind::String, &self.value),
            _ => Vec::new(),
        }
    }

    fn set_element(&mut self, name: &str, value: Value) -> Result<(), AssignError> {
        let owner = Self::TYPE_NAME;
        match name {
            "use" => self.use_ = Some(value.into_text(owner, name)?),
            "label" => self.label = Some(value.into_text(owner, name)?),
            "system" => self.system = Some(value.into_text(owner, name)?),
            "value" => self.value = Some(value.into_text(owner, name)?),
            _ => return Err(unknown_element(owner, name)),
        }
        Ok(())
    }
}

/// A reference from one resource to another.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceReference {
    pub reference: Option<String>,
    pub display: Option<String>,
    pub unmapped: Vec<UnmappedElement>,
}

impl ResourceReference {
    pub fn to(reference: impl Into<String>) -> Self {
        Self {
            reference: Some(reference.into()),
            ..Default::default()
        }
    }
}

impl FhirType for ResourceReference {
    const TYPE_NAME: &'static str = "ResourceReference";

    fn describe() -> Result<TypeDescriptor, MetadataError> {
        TypeDescriptor::builder::<Self>()
            .element(ElementDescriptor::primitive("reference", 40, PrimitiveKind::String))
            .element(ElementDescriptor::primitive("display", 50, PrimitiveKind::String))
            .build()
    }
}

impl FhirObject for ResourceReference {
    crate::fhir_object_common!();

    fn element(&self, name: &str) -> Vec<ValueRef<'_>> {
        match name {
            "reference" => text_value(PrimitiveKind::String, &self.reference),
            "display" => text_value(PrimitiveKind::String, &self.display),
            _ => Vec::new(),
        }
    }

    fn set_element(&mut self, name: &str, value: Value) -> Result<(), AssignError> {
        let owner = Self::TYPE_NAME;
        match name {
            "reference" => self.reference = Some(value.into_text(owner, name)?),
            "display" => self.display = Some(value.into_text(owner, name)?),
            _ => return Err(unknown_element(owner, name)),
        }
        Ok(())
    }
}

/// A person's name with its parts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HumanName {
    pub use_: Option<String>,
    pub text: Option<String>,
    pub family: Vec<String>,
    pub given: Vec<String>,
    pub prefix: Vec<String>,
    pub suffix: Vec<String>,
    pub unmapped: Vec<UnmappedElement>,
}

impl HumanName {
    pub fn new(family: impl Into<String>, given: impl Into<String>) -> Self {
        Self {
            family: vec![family.into()],
            given: vec![given.into()],
            ..Default::default()
        }
    }
}

impl FhirType for HumanName {
    const TYPE_NAME: &'static str = "HumanName";

    fn describe() -> Result<TypeDescriptor, MetadataError> {
        TypeDescriptor::builder::<Self>()
            .element(ElementDescriptor::primitive("use", 40, PrimitiveKind::Code))
            .element(ElementDescriptor::primitive("text", 50, PrimitiveKind::String))
            .element(ElementDescriptor::primitive("family", 60, PrimitiveKind::String).repeating())
            .element(ElementDescriptor::primitive("given", 70, PrimitiveKind::String).repeating())
            .element(ElementDescriptor::primitive("prefix", 80, PrimitiveKind::String).repeating())
            .element(ElementDescriptor::primitive("suffix", 90, PrimitiveKind::String).repeating())
            .build()
    }
}

impl FhirObject for HumanName {
    crate::fhir_object_common!();

    fn element(&self, name: &str) -> Vec<ValueRef<'_>> {
        match name {
            "use" => text_value(PrimitiveKind::Code, &self.use_),
            "text" => text_value(PrimitiveKind::String, &self.text),
            "family" => text_values(PrimitiveKind::String, &self.family),
            "given" => text_values(PrimitiveKind::String, &self.given),
            "prefix" => text_values(PrimitiveKind::String, &self.prefix),
            "suffix" => text_values(PrimitiveKind::String, &self.suffix),
            _ => Vec::new(),
        }
    }

    fn set_element(&mut self, name: &str, value: Value) -> Result<(), AssignError> {
        let owner = Self::TYPE_NAME;
        match name {
            "use" => self.use_ = Some(value.into_text(owner, name)?),
            "text" => self.text = Some(value.into_text(owner, name)?),
            "family" => self.family.push(value.into_text(owner, name)?),
            "given" => self.given.push(value.into_text(owner, name)?),
            "prefix" => self.prefix.push(value.into_text(owner, name)?),
            "suffix" => self.suffix.push(value.into_text(owner, name)?),
            _ => return Err(unknown_element(owner, name)),
        }
        Ok(())
    }
}

/// Where a narrative's content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrativeStatus {
    Generated,
    Extensions,
    Additional,
    Empty,
}

impl FhirCode for NarrativeStatus {
    fn as_code(&self) -> &'static str {
        match self {
            NarrativeStatus::Generated => "generated",
            NarrativeStatus::Extensions => "extensions",
            NarrativeStatus::Additional => "additional",
            NarrativeStatus::Empty => "empty",
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        match code {
            "generated" => Some(NarrativeStatus::Generated),
            "extensions" => Some(NarrativeStatus::Extensions),
            "additional" => Some(NarrativeStatus::Additional),
            "empty" => Some(NarrativeStatus::Empty),
            _ => None,
        }
    }
}

/// Human-readable XHTML summary of a resource.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Narrative {
    pub status: Option<NarrativeStatus>,
    /// The complete `<div>` element, namespace declaration included.
    pub div: Option<String>,
    pub unmapped: Vec<UnmappedElement>,
}

impl Narrative {
    pub fn generated(div: impl Into<String>) -> Self {
        Self {
            status: Some(NarrativeStatus::Generated),
            div: Some(div.into()),
            unmapped: Vec::new(),
        }
    }
}

impl FhirType for Narrative {
    const TYPE_NAME: &'static str = "Narrative";

    fn describe() -> Result<TypeDescriptor, MetadataError> {
        TypeDescriptor::builder::<Self>()
            .element(ElementDescriptor::primitive("status", 40, PrimitiveKind::Code).required())
            .element(ElementDescriptor::primitive("div", 50, PrimitiveKind::Xhtml).required())
            .build()
    }
}

impl FhirObject for Narrative {
    crate::fhir_object_common!();

    fn element(&self, name: &str) -> Vec<ValueRef<'_>> {
        match name {
            "status" => code_value(&self.status),
            "div" => text_value(PrimitiveKind::Xhtml, &self.div),
            _ => Vec::new(),
        }
    }

    fn set_element(&mut self, name: &str, value: Value) -> Result<(), AssignError> {
        let owner = Self::TYPE_NAME;
        match name {
            "status" => self.status = Some(value.into_code(owner, name)?),
            "div" => self.div = Some(value.into_text(owner, name)?),
            _ => return Err(unknown_element(owner, name)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_set_and_read_back_elements() {
        let mut coding = Coding::default();
        coding
            .set_element("system", Value::Primitive(Primitive::Uri("http://loinc.org".into())))
            .unwrap();
        coding
            .set_element("code", Value::Primitive(Primitive::Code("29463-7".into())))
            .unwrap();

        assert_eq!(coding, Coding::new("http://loinc.org", "29463-7"));
        assert_eq!(coding.element("code").len(), 1);
        assert!(coding.element("display").is_empty());
    }

    #[test]
    fn test_unknown_element_rejected() {
        let mut range = Range::default();
        let err = range
            .set_element("middle", Value::Primitive(Primitive::String("x".into())))
            .unwrap_err();
        assert!(matches!(err, AssignError::UnknownElement { type_name: "Range", .. }));
    }

    #[test]
    fn test_repeating_primitives_keep_order() {
        let mut name = HumanName::default();
        for given in ["Peter", "James"] {
            name.set_element("given", Value::Primitive(Primitive::String(given.into())))
                .unwrap();
        }
        assert_eq!(name.given, vec!["Peter", "James"]);
    }

    #[test]
    fn test_invalid_code_rejected() {
        let mut quantity = Quantity::new(dec!(85.5), "kg");
        let err = quantity
            .set_element("comparator", Value::Primitive(Primitive::Code("~".into())))
            .unwrap_err();
        assert_eq!(
            err,
            AssignError::InvalidCode {
                element: "comparator".to_string(),
                code: "~".to_string(),
            }
        );
    }

    #[test]
    fn test_narrative_requires_status_and_div() {
        let descriptor = Narrative::describe().unwrap();
        assert!(descriptor.elements().iter().all(|e| e.min() == 1));
    }
}
