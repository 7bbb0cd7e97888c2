//! Markup-tree (XML) reader.

use std::borrow::Cow;

use helios_fhir::{Node, ObjectNode};
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};

use crate::error::{Result, SerializationError};
use crate::format::ResourceFormat;
use crate::reader::TreeReader;
use crate::xml::utils;

/// Parses FHIR XML into the node tree.
///
/// An element whose only content is a `value` attribute is a primitive. Other
/// attributes become primitive children. An element whose single child is a
/// resource-named element is the wrapper of a nested resource, and yields that
/// resource. Narrative `div` elements are captured as raw markup.
#[derive(Debug, Clone, Copy)]
pub struct XmlTreeReader<'a> {
    input: &'a str,
}

impl<'a> XmlTreeReader<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input }
    }
}

fn malformed(message: impl Into<String>) -> SerializationError {
    SerializationError::malformed(ResourceFormat::Xml, message)
}

fn local_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.local_name().as_ref()).into_owned()
}

/// Non-namespace attributes of an element, unescaped.
fn attributes(start: &BytesStart<'_>) -> Result<Vec<(String, String)>> {
    let mut result = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| malformed(format!("failed to parse attribute: {}", e)))?;
        if utils::is_namespace_declaration(attr.key.as_ref()) {
            continue;
        }
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let raw = String::from_utf8_lossy(&attr.value);
        let value = unescape(&raw)
            .map(Cow::into_owned)
            .map_err(|e| malformed(format!("bad escape in attribute '{}': {}", key, e)))?;
        result.push((key, value));
    }
    Ok(result)
}

/// Reads the content of an element whose start tag has just been consumed.
fn read_element(reader: &mut Reader<&[u8]>, start: &BytesStart<'_>, empty: bool) -> Result<Node> {
    let attributes = attributes(start)?;
    let mut object = ObjectNode::new();
    let mut has_elements = false;

    if !empty {
        loop {
            let event = reader
                .read_event()
                .map_err(|e| malformed(e.to_string()))?;
            match event {
                Event::Start(child) => {
                    has_elements = true;
                    let name = local_name(&child);
                    let node = if utils::is_div_element(&name) {
                        Node::Primitive(capture_div(reader, &child)?)
                    } else {
                        unwrap_resource(read_element(reader, &child, false)?)
                    };
                    object.push(name, node);
                }
                Event::Empty(child) => {
                    has_elements = true;
                    let name = local_name(&child);
                    let node = if utils::is_div_element(&name) {
                        Node::Primitive(render_empty(&child)?)
                    } else {
                        read_element(reader, &child, true)?
                    };
                    object.push(name, node);
                }
                Event::End(_) => break,
                Event::Text(text) => {
                    if !text.iter().all(u8::is_ascii_whitespace) {
                        return Err(malformed(format!(
                            "unexpected text in <{}>",
                            local_name(start)
                        )));
                    }
                }
                Event::CData(_) | Event::GeneralRef(_) => {
                    return Err(malformed(format!(
                        "unexpected text in <{}>",
                        local_name(start)
                    )));
                }
                Event::Eof => {
                    return Err(malformed(format!(
                        "unexpected end of document inside <{}>",
                        local_name(start)
                    )));
                }
                _ => {}
            }
        }
    }

    if !has_elements {
        if let [(key, value)] = attributes.as_slice() {
            if key == "value" {
                return Ok(Node::Primitive(value.clone()));
            }
        }
    }

    let mut children = Vec::with_capacity(attributes.len() + object.children.len());
    children.extend(
        attributes
            .into_iter()
            .map(|(key, value)| (key, Node::Primitive(value))),
    );
    children.append(&mut object.children);
    object.children = children;
    Ok(Node::Object(object))
}

/// A wrapper element holding exactly one resource-named element stands for
/// that resource.
fn unwrap_resource(node: Node) -> Node {
    match node {
        Node::Object(mut wrapper)
            if wrapper.children.len() == 1
                && utils::is_resource_name(&wrapper.children[0].0)
                && matches!(wrapper.children[0].1, Node::Object(_)) =>
        {
            match wrapper.children.pop() {
                Some((name, Node::Object(mut resource))) => {
                    resource.type_name = Some(name);
                    Node::Object(resource)
                }
                Some((name, other)) => {
                    wrapper.children.push((name, other));
                    Node::Object(wrapper)
                }
                None => Node::Object(wrapper),
            }
        }
        other => other,
    }
}

/// Copies a `div` element verbatim, whitespace included.
fn capture_div(reader: &mut Reader<&[u8]>, start: &BytesStart<'_>) -> Result<String> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Start(start.borrow()))?;

    reader.config_mut().trim_text(false);
    let mut depth = 1;
    let captured = loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => break Err(malformed(e.to_string())),
        };
        match &event {
            Event::Start(_) => depth += 1,
            Event::End(_) => depth -= 1,
            Event::Eof => break Err(malformed("unexpected end of document inside <div>")),
            _ => {}
        }
        if let Err(e) = writer.write_event(event) {
            break Err(e.into());
        }
        if depth == 0 {
            break Ok(());
        }
    };
    reader.config_mut().trim_text(true);
    captured?;

    String::from_utf8(writer.into_inner()).map_err(|e| malformed(e.to_string()))
}

fn render_empty(start: &BytesStart<'_>) -> Result<String> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Empty(start.borrow()))?;
    String::from_utf8(writer.into_inner()).map_err(|e| malformed(e.to_string()))
}

impl TreeReader for XmlTreeReader<'_> {
    fn format(&self) -> ResourceFormat {
        ResourceFormat::Xml
    }

    fn read_root(&mut self) -> Result<ObjectNode> {
        let mut reader = Reader::from_str(self.input);
        reader.config_mut().trim_text(true);

        loop {
            let event = reader
                .read_event()
                .map_err(|e| malformed(e.to_string()))?;
            let (start, empty) = match event {
                Event::Start(start) => (start, false),
                Event::Empty(start) => (start, true),
                Event::Eof => return Err(malformed("document has no root element")),
                Event::Text(text) if !text.iter().all(u8::is_ascii_whitespace) => {
                    return Err(malformed("text outside the root element"));
                }
                Event::End(_) => return Err(malformed("unbalanced end tag")),
                _ => continue,
            };

            let name = local_name(&start);
            return match read_element(&mut reader, &start, empty)? {
                Node::Object(mut root) => {
                    root.type_name = Some(name);
                    Ok(root)
                }
                Node::Primitive(_) | Node::Scalar(_) => {
                    Err(malformed(format!("root <{}> has no content", name)))
                }
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(xml: &str) -> Result<ObjectNode> {
        XmlTreeReader::new(xml).read_root()
    }

    #[test]
    fn test_value_attributes_become_primitives() {
        let root = read(
            r#"<?xml version="1.0" encoding="UTF-8"?>
            <Patient xmlns="http://hl7.org/fhir">
              <active value="true"/>
              <name><family value="O&apos;Brien"/></name>
            </Patient>"#,
        )
        .unwrap();

        assert_eq!(root.type_name.as_deref(), Some("Patient"));
        assert_eq!(root.child("active"), Some(&Node::Primitive("true".into())));
        let name = root.child("name").and_then(Node::as_object).unwrap();
        assert_eq!(name.child("family"), Some(&Node::Primitive("O'Brien".into())));
    }

    #[test]
    fn test_contained_wrapper_is_unwrapped() {
        let root = read(
            r#"<Patient xmlns="http://hl7.org/fhir">
              <contained><Group><actual value="true"/></Group></contained>
            </Patient>"#,
        )
        .unwrap();

        let contained = root.child("contained").and_then(Node::as_object).unwrap();
        assert_eq!(contained.type_name.as_deref(), Some("Group"));
        assert_eq!(contained.child("actual"), Some(&Node::Primitive("true".into())));
    }

    #[test]
    fn test_div_keeps_markup_and_whitespace() {
        let div = r#"<div xmlns="http://www.w3.org/1999/xhtml">Hello <b>big</b> world</div>"#;
        let xml = format!(
            r#"<Patient xmlns="http://hl7.org/fhir"><text><status value="generated"/>{}</text></Patient>"#,
            div
        );
        let root = read(&xml).unwrap();
        let text = root.child("text").and_then(Node::as_object).unwrap();
        assert_eq!(text.child("div"), Some(&Node::Primitive(div.to_string())));
    }

    #[test]
    fn test_other_attributes_become_children() {
        let root = read(r#"<Patient xmlns="http://hl7.org/fhir"><extra url="http://x" value="1"/></Patient>"#)
            .unwrap();
        let extra = root.child("extra").and_then(Node::as_object).unwrap();
        assert_eq!(extra.child("url"), Some(&Node::Primitive("http://x".into())));
        assert_eq!(extra.child("value"), Some(&Node::Primitive("1".into())));
    }

    #[test]
    fn test_malformed_documents() {
        assert!(read("").unwrap_err().is_malformed_body());
        assert!(read("<Patient><active value=\"true\"></Patient>")
            .unwrap_err()
            .is_malformed_body());
        assert!(read("<Patient>some text</Patient>")
            .unwrap_err()
            .is_malformed_body());
    }
}
