//! Markup-tree (XML) writer.

use helios_fhir::Primitive;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::error::{Result, SerializationError};
use crate::format::ResourceFormat;
use crate::writer::TreeWriter;
use crate::xml::utils;

/// Streams encoder events as FHIR XML.
///
/// Properties become elements named after the property. Primitives are
/// written as `<name value="..."/>`, except narrative XHTML which is copied in
/// as raw markup. A contained resource is wrapped in an element named after
/// the property holding it: `<contained><Patient>...</Patient></contained>`.
pub struct XmlTreeWriter {
    writer: Writer<Vec<u8>>,
    properties: Vec<String>,
    open_resources: Vec<String>,
    root_written: bool,
}

impl Default for XmlTreeWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlTreeWriter {
    pub fn new() -> Self {
        Self {
            writer: Writer::new(Vec::new()),
            properties: Vec::new(),
            open_resources: Vec::new(),
            root_written: false,
        }
    }

    /// A writer that indents nested elements.
    pub fn pretty() -> Self {
        Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', 2),
            ..Self::new()
        }
    }

    fn current_property(&self) -> Result<String> {
        self.properties
            .last()
            .cloned()
            .ok_or_else(|| SerializationError::Writer("value written outside a property".to_string()))
    }

    fn write_start(&mut self, name: &str) -> Result<()> {
        self.writer.write_event(Event::Start(BytesStart::new(name)))?;
        Ok(())
    }

    fn write_end(&mut self, name: &str) -> Result<()> {
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    /// Copies a narrative `div` into the output as markup.
    fn write_div(&mut self, xhtml: &str) -> Result<()> {
        let mut reader = Reader::from_str(xhtml);
        reader.config_mut().trim_text(false);

        loop {
            match reader.read_event() {
                Ok(Event::Eof) => break,
                Ok(Event::Decl(_)) => continue,
                Ok(event) => self.writer.write_event(event)?,
                Err(e) => {
                    return Err(SerializationError::invalid_value(
                        "div",
                        format!("narrative is not well-formed XHTML: {}", e),
                    ));
                }
            }
        }
        Ok(())
    }
}

impl TreeWriter for XmlTreeWriter {
    fn format(&self) -> ResourceFormat {
        ResourceFormat::Xml
    }

    fn start_root_object(&mut self, name: &str, contained: bool) -> Result<()> {
        if contained {
            let wrapper = self.current_property()?;
            self.write_start(&wrapper)?;
            self.write_start(name)?;
        } else {
            if self.root_written {
                return Err(SerializationError::Writer(
                    "a document has exactly one root".to_string(),
                ));
            }
            self.writer
                .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
            let mut element = BytesStart::new(name);
            element.push_attribute(("xmlns", utils::FHIR_NAMESPACE));
            self.writer.write_event(Event::Start(element))?;
            self.root_written = true;
        }
        self.open_resources.push(name.to_string());
        Ok(())
    }

    fn end_root_object(&mut self, contained: bool) -> Result<()> {
        let name = self
            .open_resources
            .pop()
            .ok_or_else(|| SerializationError::Writer("no open resource to close".to_string()))?;
        self.write_end(&name)?;
        if contained {
            let wrapper = self.current_property()?;
            self.write_end(&wrapper)?;
        }
        Ok(())
    }

    fn start_property(&mut self, name: &str) -> Result<()> {
        self.properties.push(name.to_string());
        Ok(())
    }

    fn end_property(&mut self) -> Result<()> {
        self.properties
            .pop()
            .map(|_| ())
            .ok_or_else(|| SerializationError::Writer("no open property to close".to_string()))
    }

    // Repeating elements are simply repeated siblings.
    fn start_array(&mut self) -> Result<()> {
        Ok(())
    }

    fn end_array(&mut self) -> Result<()> {
        Ok(())
    }

    fn start_complex_content(&mut self) -> Result<()> {
        let name = self.current_property()?;
        self.write_start(&name)
    }

    fn end_complex_content(&mut self) -> Result<()> {
        let name = self.current_property()?;
        self.write_end(&name)
    }

    fn write_primitive(&mut self, value: &Primitive) -> Result<()> {
        if let Primitive::Xhtml(xhtml) = value {
            return self.write_div(xhtml);
        }

        let name = self.current_property()?;
        let lexical = value.to_lexical();
        let mut element = BytesStart::new(name.as_str());
        element.push_attribute(("value", lexical.as_str()));
        self.writer.write_event(Event::Empty(element))?;
        Ok(())
    }

    fn finish(self) -> Result<Vec<u8>> {
        if !self.open_resources.is_empty() || !self.properties.is_empty() {
            return Err(SerializationError::Writer(
                "document finished with open elements".to_string(),
            ));
        }
        if !self.root_written {
            return Err(SerializationError::Writer("nothing was written".to_string()));
        }
        Ok(self.writer.into_inner())
    }
}
