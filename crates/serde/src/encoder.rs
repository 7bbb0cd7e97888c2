//! Generic, metadata-driven encoder.
//!
//! One traversal serves both wire formats: the encoder only reads the type
//! descriptors and talks to a [`TreeWriter`]. Elements are emitted in declared
//! order, never in struct field order, so encoding the same value twice yields
//! the same bytes.

use helios_fhir::{
    FhirObject, ModelInspector, Node, ObjectNode, Primitive, TypeDescriptor, UnmappedElement,
    ValueRef,
};
use tracing::debug;

use crate::error::{Result, SerializationError};
use crate::writer::TreeWriter;

pub struct Encoder<'a> {
    inspector: &'a ModelInspector,
}

impl<'a> Encoder<'a> {
    pub fn new(inspector: &'a ModelInspector) -> Self {
        Self { inspector }
    }

    /// Encodes a resource as the root of a document.
    pub fn encode_root(&self, object: &dyn FhirObject, writer: &mut dyn TreeWriter) -> Result<()> {
        let descriptor = self.inspector.describe_ref(&object.type_ref())?;
        if !descriptor.is_resource_root() {
            return Err(SerializationError::UnknownRootType(descriptor.name().to_string()));
        }
        self.encode(object, &descriptor, writer, false)
    }

    /// Encodes `object` as a resource described by `descriptor`. `contained`
    /// marks a resource nested inline in another one.
    pub fn encode(
        &self,
        object: &dyn FhirObject,
        descriptor: &TypeDescriptor,
        writer: &mut dyn TreeWriter,
        contained: bool,
    ) -> Result<()> {
        writer.start_root_object(descriptor.name(), contained)?;
        self.write_members(object, descriptor, writer)?;
        writer.end_root_object(contained)
    }

    fn write_members(
        &self,
        object: &dyn FhirObject,
        descriptor: &TypeDescriptor,
        writer: &mut dyn TreeWriter,
    ) -> Result<()> {
        for element in descriptor.elements() {
            let values = object.element(element.name());
            if values.is_empty() {
                if element.min() > 0 {
                    debug!(
                        type_name = descriptor.name(),
                        element = element.name(),
                        "Required element is absent, encoding anyway"
                    );
                }
                continue;
            }

            if !element.max().admits(values.len()) {
                return Err(SerializationError::CardinalityViolation {
                    owner: descriptor.name().to_string(),
                    element: element.name().to_string(),
                    count: values.len(),
                    max: element.max().to_string(),
                });
            }

            if !element.is_choice() {
                self.write_property(element.name(), element.is_repeating(), &values, writer)?;
                continue;
            }

            // Values of a choice element are written under one wire name per
            // concrete type, in order of first appearance.
            let mut groups: Vec<(String, Vec<ValueRef<'_>>)> = Vec::new();
            for value in values {
                let type_name = value.type_name();
                let type_ref = element.allowed_type_named(type_name).ok_or_else(|| {
                    SerializationError::UnsupportedChoiceType {
                        element: element.name().to_string(),
                        type_name: type_name.to_string(),
                    }
                })?;
                let wire_name = element.wire_name_for(type_ref);
                match groups.iter_mut().find(|(name, _)| *name == wire_name) {
                    Some((_, group)) => group.push(value),
                    None => groups.push((wire_name, vec![value])),
                }
            }
            for (wire_name, group) in groups {
                self.write_property(&wire_name, element.is_repeating(), &group, writer)?;
            }
        }

        write_unmapped(object.unmapped(), writer)
    }

    fn write_property(
        &self,
        name: &str,
        repeating: bool,
        values: &[ValueRef<'_>],
        writer: &mut dyn TreeWriter,
    ) -> Result<()> {
        writer.start_property(name)?;
        if repeating {
            writer.start_array()?;
        }
        for value in values {
            self.write_value(value, writer)?;
        }
        if repeating {
            writer.end_array()?;
        }
        writer.end_property()
    }

    fn write_value(&self, value: &ValueRef<'_>, writer: &mut dyn TreeWriter) -> Result<()> {
        match value {
            ValueRef::Primitive(primitive) => writer.write_primitive(primitive),
            ValueRef::Object(object) => {
                let descriptor = self.inspector.describe_ref(&object.type_ref())?;
                if descriptor.is_resource_root() {
                    self.encode(*object, &descriptor, writer, true)
                } else {
                    writer.start_complex_content()?;
                    self.write_members(*object, &descriptor, writer)?;
                    writer.end_complex_content()
                }
            }
        }
    }
}

/// Writes preserved unknown content back after the declared elements.
fn write_unmapped(unmapped: &[UnmappedElement], writer: &mut dyn TreeWriter) -> Result<()> {
    let children: Vec<(&str, &Node)> = unmapped
        .iter()
        .map(|element| (element.name.as_str(), &element.node))
        .collect();
    let is_array = |name: &str| {
        unmapped
            .iter()
            .any(|element| element.name == name && element.in_array)
    };
    write_node_children(&children, &is_array, writer)
}

/// Writes children grouped by name. A group is an array when it has more than
/// one value or `is_array` says it was read from one.
fn write_node_children(
    children: &[(&str, &Node)],
    is_array: &dyn Fn(&str) -> bool,
    writer: &mut dyn TreeWriter,
) -> Result<()> {
    let mut groups: Vec<(&str, Vec<&Node>)> = Vec::new();
    for &(name, node) in children {
        match groups.iter_mut().find(|(group, _)| *group == name) {
            Some((_, nodes)) => nodes.push(node),
            None => groups.push((name, vec![node])),
        }
    }

    for (name, nodes) in groups {
        let repeating = nodes.len() > 1 || is_array(name);
        writer.start_property(name)?;
        if repeating {
            writer.start_array()?;
        }
        for node in nodes {
            write_node(node, writer)?;
        }
        if repeating {
            writer.end_array()?;
        }
        writer.end_property()?;
    }
    Ok(())
}

fn write_node(node: &Node, writer: &mut dyn TreeWriter) -> Result<()> {
    match node {
        Node::Primitive(lexical) => writer.write_primitive(&Primitive::String(lexical.clone())),
        Node::Scalar(scalar) => writer.write_scalar(scalar),
        Node::Object(object) => write_object_node(object, writer),
    }
}

fn write_object_node(object: &ObjectNode, writer: &mut dyn TreeWriter) -> Result<()> {
    let children: Vec<(&str, &Node)> = object
        .children
        .iter()
        .map(|(name, node)| (name.as_str(), node))
        .collect();

    let is_array = |name: &str| object.is_array(name);

    match &object.type_name {
        Some(type_name) => {
            writer.start_root_object(type_name, true)?;
            write_node_children(&children, &is_array, writer)?;
            writer.end_root_object(true)
        }
        None => {
            writer.start_complex_content()?;
            write_node_children(&children, &is_array, writer)?;
            writer.end_complex_content()
        }
    }
}
