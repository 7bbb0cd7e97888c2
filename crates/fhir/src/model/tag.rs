//! Classification tags and the tag list body used by the tag operations.

use std::fmt;

use crate::metadata::{ElementDescriptor, MetadataError, TypeDescriptor};
use crate::node::UnmappedElement;
use crate::object::{
    AssignError, FhirObject, FhirType, Value, ValueRef, object_values, text_value, unknown_element,
};
use crate::primitive::PrimitiveKind;

/// Scheme of profile tags.
pub const PROFILE_TAG_SCHEME: &str = "http://hl7.org/fhir/tag/profile";

/// Scheme of security labels.
pub const SECURITY_TAG_SCHEME: &str = "http://hl7.org/fhir/tag/security";

/// Scheme of general-purpose tags.
pub const GENERAL_TAG_SCHEME: &str = "http://hl7.org/fhir/tag";

/// A classification label attached to a resource without creating a version.
///
/// Collections of tags may hold duplicates; servers are allowed to return them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tag {
    pub term: String,
    pub scheme: String,
    pub label: Option<String>,
    pub unmapped: Vec<UnmappedElement>,
}

impl Tag {
    pub fn new(term: impl Into<String>, scheme: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            scheme: scheme.into(),
            label: None,
            unmapped: Vec::new(),
        }
    }

    /// A tag in the general tag scheme.
    pub fn general(term: impl Into<String>) -> Self {
        Self::new(term, GENERAL_TAG_SCHEME)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.term, self.scheme)?;
        if let Some(label) = &self.label {
            write!(f, " \"{}\"", label)?;
        }
        Ok(())
    }
}

impl FhirType for Tag {
    const TYPE_NAME: &'static str = "Tag";

    fn describe() -> Result<TypeDescriptor, MetadataError> {
        TypeDescriptor::builder::<Self>()
            .element(ElementDescriptor::primitive("term", 10, PrimitiveKind::Uri).required())
            .element(ElementDescriptor::primitive("scheme", 20, PrimitiveKind::Uri).required())
            .element(ElementDescriptor::primitive("label", 30, PrimitiveKind::String))
            .build()
    }
}

impl FhirObject for Tag {
    crate::fhir_object_common!();

    fn element(&self, name: &str) -> Vec<ValueRef<'_>> {
        match name {
            "term" => text_value(PrimitiveKind::Uri, &Some(self.term.clone())),
            "scheme" => text_value(PrimitiveKind::Uri, &Some(self.scheme.clone())),
            "label" => text_value(PrimitiveKind::String, &self.label),
            _ => Vec::new(),
        }
    }

    fn set_element(&mut self, name: &str, value: Value) -> Result<(), AssignError> {
        let owner = Self::TYPE_NAME;
        match name {
            "term" => self.term = value.into_text(owner, name)?,
            "scheme" => self.scheme = value.into_text(owner, name)?,
            "label" => self.label = Some(value.into_text(owner, name)?),
            _ => return Err(unknown_element(owner, name)),
        }
        Ok(())
    }
}

/// Body of the tag listing, affix and removal operations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagList {
    pub category: Vec<Tag>,
    pub unmapped: Vec<UnmappedElement>,
}

impl TagList {
    pub fn new(category: Vec<Tag>) -> Self {
        Self {
            category,
            unmapped: Vec::new(),
        }
    }
}

impl FhirType for TagList {
    const TYPE_NAME: &'static str = "TagList";

    fn describe() -> Result<TypeDescriptor, MetadataError> {
        TypeDescriptor::builder::<Self>()
            .resource_root()
            .element(ElementDescriptor::complex::<Tag>("category", 10).repeating())
            .build()
    }
}

impl FhirObject for TagList {
    crate::fhir_object_common!();

    fn element(&self, name: &str) -> Vec<ValueRef<'_>> {
        match name {
            "category" => object_values(&self.category),
            _ => Vec::new(),
        }
    }

    fn set_element(&mut self, name: &str, value: Value) -> Result<(), AssignError> {
        let owner = Self::TYPE_NAME;
        match name {
            "category" => self.category.push(value.into_object(owner, name)?),
            _ => return Err(unknown_element(owner, name)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_display() {
        let tag = Tag::general("vip").with_label("Very important");
        assert_eq!(
            tag.to_string(),
            "vip (http://hl7.org/fhir/tag) \"Very important\""
        );
    }

    #[test]
    fn test_tag_list_is_root_but_not_a_resource() {
        let descriptor = TagList::describe().unwrap();
        assert!(descriptor.is_resource_root());
        assert!(
            crate::ModelInspector::with_default_model()
                .resolve_root("TagList")
                .is_none()
        );
    }
}
