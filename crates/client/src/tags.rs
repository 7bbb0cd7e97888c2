//! Codec for the `Category` header that carries tags alongside a resource.
//!
//! ```text
//! Category: http://example.org/tags/vip; label="VIP"; scheme="http://hl7.org/fhir/tag",
//!           http://example.org/profiles/patient; scheme="http://hl7.org/fhir/tag/profile"
//! ```
//!
//! Each comma separated category is a term followed by `key="value"`
//! parameters. Separators inside double quotes do not split.

use helios_fhir::model::Tag;
use url::Url;

use crate::error::TagError;

const SCHEME: &str = "scheme";
const LABEL: &str = "label";

/// Splits on `separator` outside double quotes, trimming and dropping empty
/// parts.
fn split_not_in_quotes(value: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;

    for (index, c) in value.char_indices() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if c == separator && !in_quotes {
            parts.push(&value[start..index]);
            start = index + c.len_utf8();
        }
    }
    parts.push(&value[start..]);

    parts
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}

fn parse_category(category: &str) -> Result<Tag, TagError> {
    let malformed = |reason: &str| TagError::MalformedTag {
        category: category.to_string(),
        reason: reason.to_string(),
    };

    let mut parts = split_not_in_quotes(category, ';').into_iter();
    let term = parts.next().ok_or_else(|| malformed("no term"))?;

    let mut scheme = None;
    let mut label = None;
    for parameter in parts {
        let (key, value) = match parameter.split_once('=') {
            Some((key, value)) => (key.trim(), value.trim().trim_matches('"')),
            None => (parameter, ""),
        };
        match key {
            SCHEME => scheme = Some(value),
            LABEL => label = Some(value),
            _ => {}
        }
    }

    let scheme = scheme.ok_or_else(|| malformed("no scheme"))?;
    Url::parse(scheme).map_err(|e| malformed(&format!("scheme is not an absolute url: {}", e)))?;

    let mut tag = Tag::new(term, scheme);
    if let Some(label) = label {
        tag = tag.with_label(label);
    }
    Ok(tag)
}

/// Parses a `Category` header value. An empty value has no tags.
pub fn parse_category_header(value: &str) -> Result<Vec<Tag>, TagError> {
    split_not_in_quotes(value, ',')
        .into_iter()
        .map(parse_category)
        .collect()
}

/// Writes tags as a `Category` header value: the term, then the label if
/// there is one, then the scheme.
pub fn build_category_header(tags: &[Tag]) -> Result<String, TagError> {
    let mut categories = Vec::with_capacity(tags.len());

    for tag in tags {
        let invalid = |reason: &str| TagError::InvalidTag {
            term: tag.term.clone(),
            reason: reason.to_string(),
        };

        if tag.term.is_empty() {
            return Err(invalid("the term is empty"));
        }
        if tag.term.trim() != tag.term {
            return Err(invalid("the term has surrounding whitespace"));
        }
        if tag.term.contains([',', ';']) {
            return Err(invalid("the term contains ',' or ';'"));
        }
        if tag.term.contains('"') || tag.scheme.contains('"') {
            return Err(invalid("quotes cannot be written to a category header"));
        }

        let mut category = tag.term.clone();
        if let Some(label) = &tag.label {
            if label.contains('"') {
                return Err(invalid("the label contains a quote"));
            }
            category.push_str(&format!("; {}=\"{}\"", LABEL, label));
        }
        category.push_str(&format!("; {}=\"{}\"", SCHEME, tag.scheme));
        categories.push(category);
    }

    Ok(categories.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use helios_fhir::model::{GENERAL_TAG_SCHEME, PROFILE_TAG_SCHEME};

    #[test]
    fn test_parse_header() {
        let header = r#"http://example.org/tags/vip; label="VIP, really"; scheme="http://hl7.org/fhir/tag", http://example.org/profiles/patient; scheme="http://hl7.org/fhir/tag/profile""#;
        let tags = parse_category_header(header).unwrap();

        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].term, "http://example.org/tags/vip");
        assert_eq!(tags[0].label.as_deref(), Some("VIP, really"));
        assert_eq!(tags[0].scheme, GENERAL_TAG_SCHEME);
        assert_eq!(tags[1].scheme, PROFILE_TAG_SCHEME);
        assert_eq!(tags[1].label, None);
    }

    #[test]
    fn test_unknown_parameters_are_ignored() {
        let tags = parse_category_header(r#"urn:x; color="red"; scheme="http://hl7.org/fhir/tag""#).unwrap();
        assert_eq!(tags, vec![Tag::general("urn:x")]);
    }

    #[test]
    fn test_empty_header() {
        assert!(parse_category_header("").unwrap().is_empty());
        assert!(parse_category_header(" , ").unwrap().is_empty());
    }

    #[test]
    fn test_missing_scheme_is_malformed() {
        let err = parse_category_header(r#"urn:x; label="X""#).unwrap_err();
        assert!(matches!(err, TagError::MalformedTag { .. }));
    }

    #[test]
    fn test_relative_scheme_is_malformed() {
        let err = parse_category_header(r#"urn:x; scheme="tag""#).unwrap_err();
        assert!(matches!(err, TagError::MalformedTag { .. }));
    }

    #[test]
    fn test_build_header() {
        let tags = vec![
            Tag::general("http://example.org/tags/vip").with_label("VIP"),
            Tag::new("http://example.org/profiles/patient", PROFILE_TAG_SCHEME),
        ];
        let header = build_category_header(&tags).unwrap();
        assert_eq!(
            header,
            r#"http://example.org/tags/vip; label="VIP"; scheme="http://hl7.org/fhir/tag", http://example.org/profiles/patient; scheme="http://hl7.org/fhir/tag/profile""#
        );
        assert_eq!(parse_category_header(&header).unwrap(), tags);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let tags = vec![Tag::general("urn:a"), Tag::general("urn:a")];
        let header = build_category_header(&tags).unwrap();
        assert_eq!(parse_category_header(&header).unwrap(), tags);
    }

    #[test]
    fn test_terms_with_separators_are_rejected() {
        for term in ["urn:a,b", "urn:a;b"] {
            let err = build_category_header(&[Tag::general(term)]).unwrap_err();
            assert!(matches!(err, TagError::InvalidTag { .. }));
        }
    }

    #[test]
    fn test_terms_with_surrounding_whitespace_are_rejected() {
        for term in [" urn:a", "urn:a ", "\turn:a"] {
            let err = build_category_header(&[Tag::general(term)]).unwrap_err();
            assert!(matches!(err, TagError::InvalidTag { .. }));
        }

        let tags = vec![Tag::general("urn:a b")];
        let header = build_category_header(&tags).unwrap();
        assert_eq!(parse_category_header(&header).unwrap(), tags);
    }
}
