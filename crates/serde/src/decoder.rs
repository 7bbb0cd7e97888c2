//! Generic, metadata-driven decoder.
//!
//! The inverse of the [`Encoder`](crate::Encoder): a [`TreeReader`] parses the
//! document into a node tree and the decoder maps each child name onto the
//! descriptor of the type being built. Choice suffixes are resolved against the
//! element's allowed types, repeated names accumulate in document order and
//! names no element claims are kept on the object as unmapped content.

use std::collections::HashMap;
use std::sync::Arc;

use helios_fhir::object::downcast;
use helios_fhir::{
    ElementMatch, FhirObject, FhirType, ModelInspector, Node, ObjectNode, Resource,
    TypeDescriptor, TypeRef, UnmappedElement, Value,
};
use tracing::debug;

use crate::error::{Result, SerializationError};
use crate::reader::TreeReader;

pub struct Decoder<'a> {
    inspector: &'a ModelInspector,
}

impl<'a> Decoder<'a> {
    pub fn new(inspector: &'a ModelInspector) -> Self {
        Self { inspector }
    }

    /// Decodes a document whose root must be the resource `expected`.
    pub fn decode(
        &self,
        reader: &mut dyn TreeReader,
        expected: &TypeDescriptor,
    ) -> Result<Box<dyn FhirObject>> {
        let root = reader.read_root()?;
        let found = root.type_name.as_deref().unwrap_or_default();
        if found != expected.name() && !self.inspector.is_registered(found) {
            return Err(SerializationError::UnknownRootType(found.to_string()));
        }
        if found != expected.name() {
            return Err(SerializationError::RootTypeMismatch {
                expected: expected.name().to_string(),
                found: found.to_string(),
            });
        }
        self.decode_object(&root, expected)
    }

    /// Decodes a document into `T`.
    pub fn decode_as<T: FhirType>(&self, reader: &mut dyn TreeReader) -> Result<T> {
        let descriptor = self.inspector.describe::<T>()?;
        let object = self.decode(reader, &descriptor)?;
        downcast::<T>(object).map_err(|found| SerializationError::RootTypeMismatch {
            expected: T::TYPE_NAME.to_string(),
            found: found.to_string(),
        })
    }

    /// Decodes a document whose root type is discovered from the document
    /// itself and looked up in the inspector's resource registry.
    pub fn decode_resource(&self, reader: &mut dyn TreeReader) -> Result<Resource> {
        let root = reader.read_root()?;
        let descriptor = self.resolve_resource(&root)?;
        let object = self.decode_object(&root, &descriptor)?;
        Resource::from_object(object)
            .map_err(|found| SerializationError::UnknownRootType(found.to_string()))
    }

    fn resolve_resource(&self, node: &ObjectNode) -> Result<Arc<TypeDescriptor>> {
        let name = node.type_name.as_deref().unwrap_or_default();
        let type_ref = self
            .inspector
            .resolve_root(name)
            .ok_or_else(|| SerializationError::UnknownRootType(name.to_string()))?;
        Ok(self.inspector.describe_ref(&type_ref)?)
    }

    fn decode_object(
        &self,
        node: &ObjectNode,
        descriptor: &TypeDescriptor,
    ) -> Result<Box<dyn FhirObject>> {
        let mut object = descriptor.instantiate();
        let mut counts: HashMap<&str, usize> = HashMap::new();

        for (wire_name, child) in &node.children {
            match descriptor.match_wire_name(wire_name) {
                ElementMatch::Resolved(element, type_ref) => {
                    let count = counts.entry(element.name()).or_insert(0);
                    *count += 1;
                    if !element.max().admits(*count) {
                        return Err(SerializationError::CardinalityViolation {
                            owner: descriptor.name().to_string(),
                            element: element.name().to_string(),
                            count: *count,
                            max: element.max().to_string(),
                        });
                    }

                    let value = self.decode_value(wire_name, child, type_ref)?;
                    object.set_element(element.name(), value)?;
                }
                ElementMatch::UnknownChoiceType(element, suffix) => {
                    return Err(SerializationError::UnsupportedChoiceType {
                        element: element.name().to_string(),
                        type_name: suffix.to_string(),
                    });
                }
                ElementMatch::Unmapped => {
                    debug!(
                        type_name = descriptor.name(),
                        element = wire_name.as_str(),
                        "Keeping unmapped element"
                    );
                    object.push_unmapped(
                        UnmappedElement::new(wire_name.clone(), child.clone())
                            .with_in_array(node.is_array(wire_name)),
                    );
                }
            }
        }

        Ok(object)
    }

    fn decode_value(&self, wire_name: &str, node: &Node, type_ref: &TypeRef) -> Result<Value> {
        match (type_ref, node) {
            (TypeRef::Primitive(kind), Node::Primitive(lexical)) => kind
                .parse(lexical)
                .map(Value::Primitive)
                .map_err(|e| SerializationError::invalid_value(wire_name, e)),
            (TypeRef::Primitive(kind), Node::Scalar(scalar)) => kind
                .parse(scalar.lexical())
                .map(Value::Primitive)
                .map_err(|e| SerializationError::invalid_value(wire_name, e)),
            (TypeRef::Complex(complex), Node::Object(object)) => {
                let descriptor = self.inspector.describe_ref(complex)?;
                Ok(Value::Object(self.decode_object(object, &descriptor)?))
            }
            (TypeRef::Resource, Node::Object(object)) => {
                let descriptor = self.resolve_resource(object)?;
                Ok(Value::Object(self.decode_object(object, &descriptor)?))
            }
            (TypeRef::Primitive(kind), Node::Object(_)) => Err(SerializationError::invalid_value(
                wire_name,
                format!("expected a {} value, found an object", kind),
            )),
            (_, Node::Primitive(_) | Node::Scalar(_)) => Err(SerializationError::invalid_value(
                wire_name,
                format!("expected a {} object, found a primitive", type_ref.type_name()),
            )),
        }
    }
}
