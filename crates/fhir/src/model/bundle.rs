//! Paged collections of resources: search results, histories, documents and
//! messages.

use chrono::{DateTime, FixedOffset};

use crate::metadata::{ElementDescriptor, MetadataError, TypeDescriptor};
use crate::model::resource::{Resource, resource_value};
use crate::model::tag::Tag;
use crate::node::UnmappedElement;
use crate::object::{
    AssignError, FhirCode, FhirObject, FhirResource, FhirType, Value, ValueRef, code_value,
    object_values, primitive_value, text_value, unknown_element,
};
use crate::primitive::{Primitive, PrimitiveKind};

/// Declared purpose of a bundle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BundleKind {
    #[default]
    Collection,
    Document,
    Message,
}

impl FhirCode for BundleKind {
    fn as_code(&self) -> &'static str {
        match self {
            BundleKind::Collection => "collection",
            BundleKind::Document => "document",
            BundleKind::Message => "message",
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        match code {
            "collection" => Some(BundleKind::Collection),
            "document" => Some(BundleKind::Document),
            "message" => Some(BundleKind::Message),
            _ => None,
        }
    }
}

/// Navigation link relations understood by the paging helpers.
pub mod relation {
    pub const SELF: &str = "self";
    pub const FIRST: &str = "first";
    pub const PREVIOUS: &str = "previous";
    pub const NEXT: &str = "next";
    pub const LAST: &str = "last";
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bundle {
    pub title: Option<String>,
    pub type_: Option<BundleKind>,
    pub updated: Option<DateTime<FixedOffset>>,
    pub total_results: Option<i32>,
    pub link: Vec<BundleLink>,
    pub entry: Vec<BundleEntry>,
    pub unmapped: Vec<UnmappedElement>,
}

impl Bundle {
    pub fn new(kind: BundleKind) -> Self {
        Self {
            type_: Some(kind),
            ..Default::default()
        }
    }

    /// The declared kind; a bundle without one is a plain collection.
    pub fn kind(&self) -> BundleKind {
        self.type_.unwrap_or_default()
    }

    /// Target of the first link with `relation`.
    pub fn link(&self, relation: &str) -> Option<&str> {
        self.link
            .iter()
            .find(|link| link.relation.as_deref() == Some(relation))
            .and_then(|link| link.url.as_deref())
    }

    pub fn with_link(mut self, relation: impl Into<String>, url: impl Into<String>) -> Self {
        self.link.push(BundleLink::new(relation, url));
        self
    }

    pub fn with_entry(mut self, entry: BundleEntry) -> Self {
        self.entry.push(entry);
        self
    }

    /// Resources of the entries that carry one, in entry order.
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.entry.iter().filter_map(|entry| entry.resource.as_ref())
    }
}

impl FhirType for Bundle {
    const TYPE_NAME: &'static str = "Bundle";

    fn describe() -> Result<TypeDescriptor, MetadataError> {
        TypeDescriptor::builder::<Self>()
            .resource_root()
            .element(ElementDescriptor::primitive("title", 10, PrimitiveKind::String))
            .element(ElementDescriptor::primitive("type", 20, PrimitiveKind::Code))
            .element(ElementDescriptor::primitive("updated", 30, PrimitiveKind::Instant))
            .element(ElementDescriptor::primitive("totalResults", 40, PrimitiveKind::Integer))
            .element(ElementDescriptor::complex::<BundleLink>("link", 50).repeating())
            .element(ElementDescriptor::complex::<BundleEntry>("entry", 60).repeating())
            .build()
    }
}

impl FhirResource for Bundle {}

impl FhirObject for Bundle {
    crate::fhir_object_common!();

    fn element(&self, name: &str) -> Vec<ValueRef<'_>> {
        match name {
            "title" => text_value(PrimitiveKind::String, &self.title),
            "type" => code_value(&self.type_),
            "updated" => primitive_value(&self.updated, Primitive::Instant),
            "totalResults" => primitive_value(&self.total_results, Primitive::Integer),
            "link" => object_values(&self.link),
            "entry" => object_values(&self.entry),
            _ => Vec::new(),
        }
    }

    fn set_element(&mut self, name: &str, value: Value) -> Result<(), AssignError> {
        let owner = Self::TYPE_NAME;
        match name {
            "title" => self.title = Some(value.into_text(owner, name)?),
            "type" => self.type_ = Some(value.into_code(owner, name)?),
            "updated" => self.updated = Some(value.into_instant(owner, name)?),
            "totalResults" => self.total_results = Some(value.into_integer(owner, name)?),
            "link" => self.link.push(value.into_object(owner, name)?),
            "entry" => self.entry.push(value.into_object(owner, name)?),
            _ => return Err(unknown_element(owner, name)),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BundleLink {
    pub relation: Option<String>,
    pub url: Option<String>,
    pub unmapped: Vec<UnmappedElement>,
}

impl BundleLink {
    pub fn new(relation: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            relation: Some(relation.into()),
            url: Some(url.into()),
            unmapped: Vec::new(),
        }
    }
}

impl FhirType for BundleLink {
    const TYPE_NAME: &'static str = "BundleLinkComponent";

    fn describe() -> Result<TypeDescriptor, MetadataError> {
        TypeDescriptor::builder::<Self>()
            .element(ElementDescriptor::primitive("relation", 10, PrimitiveKind::Code).required())
            .element(ElementDescriptor::primitive("url", 20, PrimitiveKind::Uri).required())
            .build()
    }
}

impl FhirObject for BundleLink {
    crate::fhir_object_common!();

    fn element(&self, name: &str) -> Vec<ValueRef<'_>> {
        match name {
            "relation" => text_value(PrimitiveKind::Code, &self.relation),
            "url" => text_value(PrimitiveKind::Uri, &self.url),
            _ => Vec::new(),
        }
    }

    fn set_element(&mut self, name: &str, value: Value) -> Result<(), AssignError> {
        let owner = Self::TYPE_NAME;
        match name {
            "relation" => self.relation = Some(value.into_text(owner, name)?),
            "url" => self.url = Some(value.into_text(owner, name)?),
            _ => return Err(unknown_element(owner, name)),
        }
        Ok(())
    }
}

/// One result in a bundle. A deleted entry has `deleted` set and no resource.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BundleEntry {
    pub id: Option<String>,
    pub self_link: Option<String>,
    pub updated: Option<DateTime<FixedOffset>>,
    pub deleted: Option<DateTime<FixedOffset>>,
    pub resource: Option<Resource>,
    pub category: Vec<Tag>,
    pub unmapped: Vec<UnmappedElement>,
}

impl BundleEntry {
    pub fn new(resource: impl Into<Resource>) -> Self {
        Self {
            resource: Some(resource.into()),
            ..Default::default()
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted.is_some()
    }
}

impl FhirType for BundleEntry {
    const TYPE_NAME: &'static str = "BundleEntryComponent";

    fn describe() -> Result<TypeDescriptor, MetadataError> {
        TypeDescriptor::builder::<Self>()
            .element(ElementDescriptor::primitive("id", 10, PrimitiveKind::Uri))
            .element(ElementDescriptor::primitive("selfLink", 20, PrimitiveKind::Uri))
            .element(ElementDescriptor::primitive("updated", 30, PrimitiveKind::Instant))
            .element(ElementDescriptor::primitive("deleted", 40, PrimitiveKind::Instant))
            .element(ElementDescriptor::resource("resource", 50))
            .element(ElementDescriptor::complex::<Tag>("category", 60).repeating())
            .build()
    }
}

impl FhirObject for BundleEntry {
    crate::fhir_object_common!();

    fn element(&self, name: &str) -> Vec<ValueRef<'_>> {
        match name {
            "id" => text_value(PrimitiveKind::Uri, &self.id),
            "selfLink" => text_value(PrimitiveKind::Uri, &self.self_link),
            "updated" => primitive_value(&self.updated, Primitive::Instant),
            "deleted" => primitive_value(&self.deleted, Primitive::Instant),
            "resource" => resource_value(&self.resource),
            "category" => object_values(&self.category),
            _ => Vec::new(),
        }
    }

    fn set_element(&mut self, name: &str, value: Value) -> Result<(), AssignError> {
        let owner = Self::TYPE_NAME;
        match name {
            "id" => self.id = Some(value.into_text(owner, name)?),
            "selfLink" => self.self_link = Some(value.into_text(owner, name)?),
            "updated" => self.updated = Some(value.into_instant(owner, name)?),
            "deleted" => self.deleted = Some(value.into_instant(owner, name)?),
            "resource" => self.resource = Some(value.into_resource(owner, name)?),
            "category" => self.category.push(value.into_object(owner, name)?),
            _ => return Err(unknown_element(owner, name)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Patient;

    #[test]
    fn test_kind_defaults_to_collection() {
        assert_eq!(Bundle::default().kind(), BundleKind::Collection);
        assert_eq!(Bundle::new(BundleKind::Message).kind(), BundleKind::Message);
    }

    #[test]
    fn test_link_lookup() {
        let bundle = Bundle::default()
            .with_link(relation::SELF, "http://example.org/Patient?_count=10")
            .with_link(relation::NEXT, "http://example.org/Patient?page=2");

        assert_eq!(bundle.link(relation::NEXT), Some("http://example.org/Patient?page=2"));
        assert_eq!(bundle.link(relation::PREVIOUS), None);
    }

    #[test]
    fn test_resources_skip_deleted_entries() {
        let deleted = BundleEntry {
            id: Some("http://example.org/Patient/2".into()),
            deleted: DateTime::parse_from_rfc3339("2014-01-01T00:00:00Z").ok(),
            ..Default::default()
        };
        let bundle = Bundle::default()
            .with_entry(BundleEntry::new(Patient::default()))
            .with_entry(deleted);

        assert_eq!(bundle.resources().count(), 1);
        assert!(bundle.entry[1].is_deleted());
    }
}
