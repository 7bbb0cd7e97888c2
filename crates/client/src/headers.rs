//! Header names and values the REST protocol reads and writes.

use chrono::{DateTime, FixedOffset};
use helios_serde::ResourceFormat;
use http::{HeaderName, HeaderValue};

pub use http::header::{ACCEPT, CONTENT_LOCATION, CONTENT_TYPE, LAST_MODIFIED, LOCATION};

/// Tags travelling with a single resource.
pub const CATEGORY: HeaderName = HeaderName::from_static("category");

/// Parses an HTTP date (`Tue, 15 Nov 1994 08:12:31 GMT`).
pub fn parse_last_modified(value: &str) -> Option<DateTime<FixedOffset>> {
    match DateTime::parse_from_rfc2822(value.trim()) {
        Ok(date) => Some(date),
        Err(e) => {
            tracing::debug!(value = %value, error = %e, "Ignoring unparseable Last-Modified");
            None
        }
    }
}

/// `Accept` value asking for `format`.
pub fn accept(format: ResourceFormat) -> HeaderValue {
    HeaderValue::from_static(format.mime_type())
}

/// `Content-Type` value of a request body in `format`.
pub fn content_type(format: ResourceFormat) -> HeaderValue {
    match format {
        ResourceFormat::Xml => HeaderValue::from_static("application/fhir+xml; charset=UTF-8"),
        ResourceFormat::Json => HeaderValue::from_static("application/fhir+json; charset=UTF-8"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_last_modified() {
        let date = parse_last_modified("Tue, 15 Nov 1994 08:12:31 GMT").unwrap();
        assert_eq!(date.to_rfc3339(), "1994-11-15T08:12:31+00:00");
        assert!(parse_last_modified("yesterday").is_none());
    }

    #[test]
    fn test_content_type_names_the_format() {
        for format in [ResourceFormat::Xml, ResourceFormat::Json] {
            let value = content_type(format);
            let parsed = value.to_str().ok().and_then(ResourceFormat::from_content_type);
            assert_eq!(parsed, Some(format));
        }
        assert_eq!(accept(ResourceFormat::Json), "application/fhir+json");
    }
}
