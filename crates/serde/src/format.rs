//! Wire formats and encoded bodies.

use std::fmt;
use std::str::FromStr;

use mime::Mime;

use crate::error::SerializationError;

/// MIME type of FHIR XML.
pub const FHIR_XML_MIME: &str = "application/fhir+xml";

/// MIME type of FHIR JSON.
pub const FHIR_JSON_MIME: &str = "application/fhir+json";

/// The two interchangeable wire encodings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ResourceFormat {
    /// The markup-tree encoding.
    #[default]
    Xml,
    /// The structured-document encoding.
    Json,
}

impl ResourceFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ResourceFormat::Xml => FHIR_XML_MIME,
            ResourceFormat::Json => FHIR_JSON_MIME,
        }
    }

    /// Value of the `_format` query parameter.
    pub fn format_param(&self) -> &'static str {
        match self {
            ResourceFormat::Xml => "xml",
            ResourceFormat::Json => "json",
        }
    }

    /// Parses a `Content-Type` or `Accept` value. Parameters such as
    /// `charset` are ignored, as are the legacy `xml+fhir`/`json+fhir` and the
    /// generic XML and JSON media types.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let mime: Mime = content_type.trim().parse().ok()?;
        match mime.essence_str().to_ascii_lowercase().as_str() {
            "application/fhir+xml" | "application/xml+fhir" | "application/xml" | "text/xml" => {
                Some(ResourceFormat::Xml)
            }
            "application/fhir+json" | "application/json+fhir" | "application/json" => {
                Some(ResourceFormat::Json)
            }
            _ => None,
        }
    }

    /// Lenient parse of a short name (`xml`, `json`) or a content type.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "xml" => Some(ResourceFormat::Xml),
            "json" => Some(ResourceFormat::Json),
            other => Self::from_content_type(other),
        }
    }
}

impl fmt::Display for ResourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceFormat::Xml => f.write_str("XML"),
            ResourceFormat::Json => f.write_str("JSON"),
        }
    }
}

impl FromStr for ResourceFormat {
    type Err = SerializationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| SerializationError::UnsupportedFormat(s.to_string()))
    }
}

/// Bytes of a resource in one declared format.
///
/// A body is never reinterpreted as the other format; decoding always goes
/// through the format it was tagged with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBody {
    format: ResourceFormat,
    bytes: Vec<u8>,
}

impl EncodedBody {
    pub fn new(format: ResourceFormat, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            format,
            bytes: bytes.into(),
        }
    }

    pub fn format(&self) -> ResourceFormat {
        self.format
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The body as UTF-8 text.
    pub fn as_str(&self) -> Result<&str, SerializationError> {
        std::str::from_utf8(&self.bytes)
            .map_err(|e| SerializationError::malformed(self.format, format!("invalid UTF-8: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_content_type() {
        assert_eq!(
            ResourceFormat::from_content_type("application/fhir+xml; charset=UTF-8"),
            Some(ResourceFormat::Xml)
        );
        assert_eq!(
            ResourceFormat::from_content_type("application/json+fhir"),
            Some(ResourceFormat::Json)
        );
        assert_eq!(
            ResourceFormat::from_content_type("text/xml"),
            Some(ResourceFormat::Xml)
        );
        assert_eq!(ResourceFormat::from_content_type("text/html"), None);
        assert_eq!(ResourceFormat::from_content_type("not a mime type"), None);
    }

    #[test]
    fn test_parse_short_names() {
        assert_eq!(ResourceFormat::parse("JSON"), Some(ResourceFormat::Json));
        assert_eq!(ResourceFormat::parse("xml"), Some(ResourceFormat::Xml));
        assert!("yaml".parse::<ResourceFormat>().is_err());
    }

    #[test]
    fn test_default_is_xml() {
        assert_eq!(ResourceFormat::default().mime_type(), "application/fhir+xml");
        assert_eq!(ResourceFormat::Json.format_param(), "json");
    }

    #[test]
    fn test_encoded_body_keeps_format() {
        let body = EncodedBody::new(ResourceFormat::Json, b"{}".to_vec());
        assert_eq!(body.format(), ResourceFormat::Json);
        assert_eq!(body.as_str().unwrap(), "{}");
        assert_eq!(body.len(), 2);
    }
}
