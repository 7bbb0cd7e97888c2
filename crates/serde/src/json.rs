//! Structured-document (JSON) backend.
//!
//! Resources carry their type in a `resourceType` member, repeating elements
//! are always arrays, and booleans, integers and decimals are JSON scalars.
//! Decimals travel through `serde_json`'s arbitrary precision numbers, so
//! `1.50` stays `1.50`. Member order follows the encoder's declared order.

use std::str::FromStr;

use helios_fhir::{
    FhirObject, FhirType, ModelInspector, Node, ObjectNode, Primitive, Resource, Scalar,
};
use serde_json::{Map, Number, Value};

use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::{Result, SerializationError};
use crate::format::ResourceFormat;
use crate::reader::TreeReader;
use crate::writer::TreeWriter;

/// Name of the member carrying a resource's type.
pub const RESOURCE_TYPE: &str = "resourceType";

#[derive(Debug)]
enum Frame {
    Object {
        members: Map<String, Value>,
        key: Option<String>,
    },
    Array(Vec<Value>),
}

/// Builds a JSON document from encoder events.
#[derive(Debug, Default)]
pub struct JsonTreeWriter {
    stack: Vec<Frame>,
    root: Option<Value>,
    pretty: bool,
}

impl JsonTreeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A writer that indents its output.
    pub fn pretty() -> Self {
        Self {
            pretty: true,
            ..Self::default()
        }
    }

    fn push_object(&mut self, members: Map<String, Value>) {
        self.stack.push(Frame::Object { members, key: None });
    }

    fn pop_object(&mut self) -> Result<()> {
        match self.stack.pop() {
            Some(Frame::Object { members, .. }) => self.attach(Value::Object(members)),
            _ => Err(SerializationError::Writer("no open object to close".to_string())),
        }
    }

    /// Adds a finished value to the innermost open container.
    fn attach(&mut self, value: Value) -> Result<()> {
        match self.stack.last_mut() {
            Some(Frame::Array(items)) => {
                items.push(value);
                Ok(())
            }
            Some(Frame::Object { members, key }) => {
                let key = key.take().ok_or_else(|| {
                    SerializationError::Writer("value written outside a property".to_string())
                })?;
                members.insert(key, value);
                Ok(())
            }
            None if self.root.is_none() => {
                self.root = Some(value);
                Ok(())
            }
            None => Err(SerializationError::Writer(
                "a document has exactly one root".to_string(),
            )),
        }
    }
}

fn primitive_to_json(value: &Primitive) -> Result<Value> {
    match value {
        Primitive::Boolean(b) => Ok(Value::Bool(*b)),
        Primitive::Integer(i) => Ok(Value::from(*i)),
        Primitive::Decimal(d) => Number::from_str(&d.to_string())
            .map(Value::Number)
            .map_err(|e| SerializationError::Writer(e.to_string())),
        other => Ok(Value::String(other.to_lexical())),
    }
}

impl TreeWriter for JsonTreeWriter {
    fn format(&self) -> ResourceFormat {
        ResourceFormat::Json
    }

    fn start_root_object(&mut self, name: &str, _contained: bool) -> Result<()> {
        let mut members = Map::new();
        members.insert(RESOURCE_TYPE.to_string(), Value::String(name.to_string()));
        self.push_object(members);
        Ok(())
    }

    fn end_root_object(&mut self, _contained: bool) -> Result<()> {
        self.pop_object()
    }

    fn start_property(&mut self, name: &str) -> Result<()> {
        match self.stack.last_mut() {
            Some(Frame::Object { key, .. }) => {
                *key = Some(name.to_string());
                Ok(())
            }
            _ => Err(SerializationError::Writer(format!(
                "property '{}' started outside an object",
                name
            ))),
        }
    }

    fn end_property(&mut self) -> Result<()> {
        match self.stack.last_mut() {
            Some(Frame::Object { key, .. }) => {
                *key = None;
                Ok(())
            }
            _ => Err(SerializationError::Writer(
                "property ended outside an object".to_string(),
            )),
        }
    }

    fn start_array(&mut self) -> Result<()> {
        self.stack.push(Frame::Array(Vec::new()));
        Ok(())
    }

    fn end_array(&mut self) -> Result<()> {
        match self.stack.pop() {
            Some(Frame::Array(items)) => self.attach(Value::Array(items)),
            _ => Err(SerializationError::Writer("no open array to close".to_string())),
        }
    }

    fn start_complex_content(&mut self) -> Result<()> {
        self.push_object(Map::new());
        Ok(())
    }

    fn end_complex_content(&mut self) -> Result<()> {
        self.pop_object()
    }

    fn write_primitive(&mut self, value: &Primitive) -> Result<()> {
        let value = primitive_to_json(value)?;
        self.attach(value)
    }

    fn write_scalar(&mut self, value: &Scalar) -> Result<()> {
        let value = match value {
            Scalar::Boolean(b) => Value::Bool(*b),
            Scalar::Number(lexical) => Number::from_str(lexical)
                .map(Value::Number)
                .map_err(|e| SerializationError::Writer(e.to_string()))?,
        };
        self.attach(value)
    }

    fn finish(self) -> Result<Vec<u8>> {
        if !self.stack.is_empty() {
            return Err(SerializationError::Writer(
                "document finished with open objects".to_string(),
            ));
        }
        let root = self
            .root
            .ok_or_else(|| SerializationError::Writer("nothing was written".to_string()))?;
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(&root)?
        } else {
            serde_json::to_vec(&root)?
        };
        Ok(bytes)
    }
}

/// Parses a JSON document into the node tree.
#[derive(Debug, Clone, Copy)]
pub struct JsonTreeReader<'a> {
    input: &'a [u8],
}

impl<'a> JsonTreeReader<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self { input }
    }
}

fn malformed(message: impl Into<String>) -> SerializationError {
    SerializationError::malformed(ResourceFormat::Json, message)
}

fn object_node(members: &Map<String, Value>) -> Result<ObjectNode> {
    let mut node = ObjectNode::new();
    for (key, value) in members {
        if key == RESOURCE_TYPE {
            let type_name = value
                .as_str()
                .ok_or_else(|| malformed("resourceType must be a string"))?;
            node.type_name = Some(type_name.to_string());
            continue;
        }
        push_member(&mut node, key, value, false)?;
    }
    Ok(node)
}

fn push_member(node: &mut ObjectNode, key: &str, value: &Value, in_array: bool) -> Result<()> {
    match value {
        Value::Null => {}
        Value::Array(items) => {
            if in_array {
                return Err(malformed(format!("nested array in '{}'", key)));
            }
            node.mark_array(key);
            for item in items {
                push_member(node, key, item, true)?;
            }
        }
        Value::Object(members) => node.push(key, Node::Object(object_node(members)?)),
        Value::Bool(b) => node.push(key, Node::Scalar(Scalar::Boolean(*b))),
        Value::Number(n) => node.push(key, Node::Scalar(Scalar::Number(n.to_string()))),
        Value::String(s) => node.push(key, Node::Primitive(s.clone())),
    }
    Ok(())
}

impl TreeReader for JsonTreeReader<'_> {
    fn format(&self) -> ResourceFormat {
        ResourceFormat::Json
    }

    fn read_root(&mut self) -> Result<ObjectNode> {
        let value: Value =
            serde_json::from_slice(self.input).map_err(|e| malformed(e.to_string()))?;
        let Value::Object(members) = value else {
            return Err(malformed("the document root must be an object"));
        };
        let root = object_node(&members)?;
        if root.type_name.is_none() {
            return Err(malformed("the root object has no resourceType"));
        }
        Ok(root)
    }
}

/// Serialize a resource to a JSON string.
///
/// # Examples
///
/// ```ignore
/// use helios_fhir::{ModelInspector, model::Patient};
/// use helios_serde::json::to_json_string;
///
/// let inspector = ModelInspector::with_default_model();
/// let json = to_json_string(&Patient::default(), &inspector)?;
/// ```
pub fn to_json_string(object: &dyn FhirObject, inspector: &ModelInspector) -> Result<String> {
    let mut writer = JsonTreeWriter::new();
    Encoder::new(inspector).encode_root(object, &mut writer)?;
    let bytes = writer.finish()?;
    String::from_utf8(bytes).map_err(|e| SerializationError::Writer(e.to_string()))
}

/// Serialize a resource to an indented JSON string.
pub fn to_json_string_pretty(object: &dyn FhirObject, inspector: &ModelInspector) -> Result<String> {
    let mut writer = JsonTreeWriter::pretty();
    Encoder::new(inspector).encode_root(object, &mut writer)?;
    let bytes = writer.finish()?;
    String::from_utf8(bytes).map_err(|e| SerializationError::Writer(e.to_string()))
}

/// Deserialize a resource of type `T` from a JSON string.
pub fn from_json_str<T: FhirType>(json: &str, inspector: &ModelInspector) -> Result<T> {
    let mut reader = JsonTreeReader::new(json.as_bytes());
    Decoder::new(inspector).decode_as::<T>(&mut reader)
}

/// Deserialize any registered resource from a JSON string.
pub fn resource_from_json_str(json: &str, inspector: &ModelInspector) -> Result<Resource> {
    let mut reader = JsonTreeReader::new(json.as_bytes());
    Decoder::new(inspector).decode_resource(&mut reader)
}
