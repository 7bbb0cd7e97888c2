//! XML backend for FHIR resources.
//!
//! ## FHIR XML mapping
//!
//! | Model | XML |
//! |-------|-----|
//! | primitive `active = true` | `<active value="true"/>` |
//! | repeating `given` | `<given value="John"/><given value="Doe"/>` |
//! | complex `name` | `<name><family value="Chalmers"/></name>` |
//! | nested resource in `contained` | `<contained><Group>...</Group></contained>` |
//! | narrative `div` | the XHTML element itself, copied verbatim |
//!
//! The document root is the resource element, named after the resource type
//! and carrying the FHIR namespace as its default namespace.
//!
//! ## Examples
//!
//! ```ignore
//! use helios_fhir::{ModelInspector, model::Patient};
//! use helios_serde::xml::{from_xml_str, to_xml_string};
//!
//! let inspector = ModelInspector::with_default_model();
//! let xml = to_xml_string(&Patient::default(), &inspector)?;
//! let patient: Patient = from_xml_str(&xml, &inspector)?;
//! ```

mod reader;
pub(crate) mod utils;
mod writer;

pub use reader::XmlTreeReader;
pub use writer::XmlTreeWriter;

use helios_fhir::{FhirObject, FhirType, ModelInspector, Resource};

use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::{Result, SerializationError};
use crate::writer::TreeWriter;

fn encode(object: &dyn FhirObject, inspector: &ModelInspector, mut writer: XmlTreeWriter) -> Result<String> {
    Encoder::new(inspector).encode_root(object, &mut writer)?;
    let bytes = writer.finish()?;
    String::from_utf8(bytes).map_err(|e| SerializationError::Writer(e.to_string()))
}

/// Serialize a resource to an XML string.
pub fn to_xml_string(object: &dyn FhirObject, inspector: &ModelInspector) -> Result<String> {
    encode(object, inspector, XmlTreeWriter::new())
}

/// Serialize a resource to an indented XML string.
pub fn to_xml_string_pretty(object: &dyn FhirObject, inspector: &ModelInspector) -> Result<String> {
    encode(object, inspector, XmlTreeWriter::pretty())
}

/// Deserialize a resource of type `T` from an XML string.
pub fn from_xml_str<T: FhirType>(xml: &str, inspector: &ModelInspector) -> Result<T> {
    let mut reader = XmlTreeReader::new(xml);
    Decoder::new(inspector).decode_as::<T>(&mut reader)
}

/// Deserialize any registered resource from an XML string.
pub fn resource_from_xml_str(xml: &str, inspector: &ModelInspector) -> Result<Resource> {
    let mut reader = XmlTreeReader::new(xml);
    Decoder::new(inspector).decode_resource(&mut reader)
}
