//! # Helios FHIR Serialization
//!
//! Metadata-driven XML and JSON serialization for the resource model in
//! [`helios_fhir`].
//!
//! ## Architecture
//!
//! There is one [`Encoder`] and one [`Decoder`]. Neither knows any concrete
//! resource: both walk the [`TypeDescriptor`](helios_fhir::TypeDescriptor)s
//! a [`ModelInspector`] derives from the model. The wire formats plug in
//! underneath as tree backends:
//!
//! - [`TreeWriter`]: event sink the encoder drives (`start_property`,
//!   `write_primitive`, ...). [`JsonTreeWriter`] builds a JSON document,
//!   [`XmlTreeWriter`](xml::XmlTreeWriter) streams quick-xml events.
//! - [`TreeReader`]: parses a document into a format-neutral
//!   [`Node`](helios_fhir::Node) tree which the decoder maps onto types.
//!
//! Adding a format therefore means adding a writer and a reader, never touching
//! the traversal.
//!
//! ## Features
//!
//! - `xml` (default): the XML backend, built on `quick-xml`.
//!
//! ## Examples
//!
//! ```ignore
//! use helios_fhir::{ModelInspector, model::Patient};
//! use helios_serde::{ResourceFormat, deserialize, serialize};
//!
//! let inspector = ModelInspector::with_default_model();
//! let body = serialize(&Patient::default(), ResourceFormat::Json, &inspector)?;
//! let patient: Patient = deserialize(&body, &inspector)?;
//! ```

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod format;
pub mod json;
pub mod reader;
pub mod writer;

#[cfg(feature = "xml")]
pub mod xml;

pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::{Result, SerializationError};
pub use format::{EncodedBody, FHIR_JSON_MIME, FHIR_XML_MIME, ResourceFormat};
pub use json::{
    JsonTreeReader, JsonTreeWriter, from_json_str, resource_from_json_str, to_json_string,
    to_json_string_pretty,
};
pub use reader::TreeReader;
pub use writer::TreeWriter;

#[cfg(feature = "xml")]
pub use xml::{from_xml_str, resource_from_xml_str, to_xml_string, to_xml_string_pretty};

use helios_fhir::{FhirObject, FhirType, ModelInspector, Resource};

/// Encodes a resource in the given format.
pub fn serialize(
    object: &dyn FhirObject,
    format: ResourceFormat,
    inspector: &ModelInspector,
) -> Result<EncodedBody> {
    let text = match format {
        ResourceFormat::Json => json::to_json_string(object, inspector)?,
        #[cfg(feature = "xml")]
        ResourceFormat::Xml => xml::to_xml_string(object, inspector)?,
        #[cfg(not(feature = "xml"))]
        ResourceFormat::Xml => return Err(SerializationError::UnsupportedFormat(format.to_string())),
    };
    Ok(EncodedBody::new(format, text))
}

/// Decodes a body into `T`, using the body's own format.
pub fn deserialize<T: FhirType>(body: &EncodedBody, inspector: &ModelInspector) -> Result<T> {
    match body.format() {
        ResourceFormat::Json => {
            let mut reader = JsonTreeReader::new(body.as_bytes());
            Decoder::new(inspector).decode_as::<T>(&mut reader)
        }
        #[cfg(feature = "xml")]
        ResourceFormat::Xml => xml::from_xml_str(body.as_str()?, inspector),
        #[cfg(not(feature = "xml"))]
        ResourceFormat::Xml => Err(SerializationError::UnsupportedFormat(body.format().to_string())),
    }
}

/// Decodes a body whose resource type is only known from the document.
pub fn deserialize_resource(body: &EncodedBody, inspector: &ModelInspector) -> Result<Resource> {
    match body.format() {
        ResourceFormat::Json => {
            let mut reader = JsonTreeReader::new(body.as_bytes());
            Decoder::new(inspector).decode_resource(&mut reader)
        }
        #[cfg(feature = "xml")]
        ResourceFormat::Xml => xml::resource_from_xml_str(body.as_str()?, inspector),
        #[cfg(not(feature = "xml"))]
        ResourceFormat::Xml => Err(SerializationError::UnsupportedFormat(body.format().to_string())),
    }
}
