//! FHIR primitive datatypes.
//!
//! Every primitive has a wire type name (`boolean`, `dateTime`, ...), a lexical
//! form used by both encodings, and a typed in-memory value. The lexical form
//! is what travels in an XML `value` attribute; the JSON backend maps booleans
//! and numbers to native JSON scalars and everything else to strings.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat};
use rust_decimal::Decimal;
use thiserror::Error;

/// Error raised when a lexical value does not conform to its primitive type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{value}' is not a valid {kind}: {reason}")]
pub struct PrimitiveError {
    pub kind: PrimitiveKind,
    pub value: String,
    pub reason: String,
}

/// The closed set of primitive wire types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Boolean,
    Integer,
    Decimal,
    String,
    Uri,
    Code,
    Id,
    Date,
    DateTime,
    Instant,
    Base64Binary,
    Xhtml,
}

impl PrimitiveKind {
    /// Wire type name, also the source of the choice-element suffix.
    pub fn type_name(&self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Integer => "integer",
            PrimitiveKind::Decimal => "decimal",
            PrimitiveKind::String => "string",
            PrimitiveKind::Uri => "uri",
            PrimitiveKind::Code => "code",
            PrimitiveKind::Id => "id",
            PrimitiveKind::Date => "date",
            PrimitiveKind::DateTime => "dateTime",
            PrimitiveKind::Instant => "instant",
            PrimitiveKind::Base64Binary => "base64Binary",
            PrimitiveKind::Xhtml => "xhtml",
        }
    }

    /// Parses a lexical value into a typed primitive of this kind.
    pub fn parse(self, lexical: &str) -> Result<Primitive, PrimitiveError> {
        let invalid = |reason: &str| PrimitiveError {
            kind: self,
            value: lexical.to_string(),
            reason: reason.to_string(),
        };

        match self {
            PrimitiveKind::Boolean => match lexical {
                "true" => Ok(Primitive::Boolean(true)),
                "false" => Ok(Primitive::Boolean(false)),
                _ => Err(invalid("expected 'true' or 'false'")),
            },
            PrimitiveKind::Integer => lexical
                .parse::<i32>()
                .map(Primitive::Integer)
                .map_err(|e| invalid(&e.to_string())),
            PrimitiveKind::Decimal => Decimal::from_str(lexical)
                .map(Primitive::Decimal)
                .map_err(|e| invalid(&e.to_string())),
            PrimitiveKind::String => Ok(Primitive::String(lexical.to_string())),
            PrimitiveKind::Uri => Ok(Primitive::Uri(lexical.to_string())),
            PrimitiveKind::Code => {
                if lexical.is_empty() || lexical.trim() != lexical {
                    return Err(invalid("codes cannot be empty or padded with whitespace"));
                }
                Ok(Primitive::Code(lexical.to_string()))
            }
            PrimitiveKind::Id => {
                let valid = !lexical.is_empty()
                    && lexical.len() <= 64
                    && lexical
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.');
                if !valid {
                    return Err(invalid("ids are 1-64 characters of [A-Za-z0-9.-]"));
                }
                Ok(Primitive::Id(lexical.to_string()))
            }
            PrimitiveKind::Date => {
                if !is_partial_date(lexical) {
                    return Err(invalid("expected YYYY, YYYY-MM or YYYY-MM-DD"));
                }
                Ok(Primitive::Date(lexical.to_string()))
            }
            PrimitiveKind::DateTime => {
                if !is_partial_date(lexical) && DateTime::parse_from_rfc3339(lexical).is_err() {
                    return Err(invalid("expected a partial date or an RFC 3339 date-time"));
                }
                Ok(Primitive::DateTime(lexical.to_string()))
            }
            PrimitiveKind::Instant => DateTime::parse_from_rfc3339(lexical)
                .map(Primitive::Instant)
                .map_err(|e| invalid(&e.to_string())),
            PrimitiveKind::Base64Binary => BASE64
                .decode(lexical)
                .map(Primitive::Base64Binary)
                .map_err(|e| invalid(&e.to_string())),
            PrimitiveKind::Xhtml => {
                if !lexical.trim_start().starts_with("<div") {
                    return Err(invalid("narrative must be a single <div> element"));
                }
                Ok(Primitive::Xhtml(lexical.to_string()))
            }
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A typed primitive value.
///
/// `Date` and `DateTime` keep their lexical form because FHIR allows partial
/// precision (`2014`, `2014-03`) that no calendar type represents losslessly.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Boolean(bool),
    Integer(i32),
    Decimal(Decimal),
    String(String),
    Uri(String),
    Code(String),
    Id(String),
    Date(String),
    DateTime(String),
    Instant(DateTime<FixedOffset>),
    Base64Binary(Vec<u8>),
    Xhtml(String),
}

impl Primitive {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Primitive::Boolean(_) => PrimitiveKind::Boolean,
            Primitive::Integer(_) => PrimitiveKind::Integer,
            Primitive::Decimal(_) => PrimitiveKind::Decimal,
            Primitive::String(_) => PrimitiveKind::String,
            Primitive::Uri(_) => PrimitiveKind::Uri,
            Primitive::Code(_) => PrimitiveKind::Code,
            Primitive::Id(_) => PrimitiveKind::Id,
            Primitive::Date(_) => PrimitiveKind::Date,
            Primitive::DateTime(_) => PrimitiveKind::DateTime,
            Primitive::Instant(_) => PrimitiveKind::Instant,
            Primitive::Base64Binary(_) => PrimitiveKind::Base64Binary,
            Primitive::Xhtml(_) => PrimitiveKind::Xhtml,
        }
    }

    /// Lexical form as written to the wire.
    pub fn to_lexical(&self) -> String {
        match self {
            Primitive::Boolean(b) => b.to_string(),
            Primitive::Integer(i) => i.to_string(),
            Primitive::Decimal(d) => d.to_string(),
            Primitive::String(s)
            | Primitive::Uri(s)
            | Primitive::Code(s)
            | Primitive::Id(s)
            | Primitive::Date(s)
            | Primitive::DateTime(s)
            | Primitive::Xhtml(s) => s.clone(),
            Primitive::Instant(i) => i.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            Primitive::Base64Binary(bytes) => BASE64.encode(bytes),
        }
    }

    /// Borrowed text of the string-like variants.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Primitive::String(s)
            | Primitive::Uri(s)
            | Primitive::Code(s)
            | Primitive::Id(s)
            | Primitive::Date(s)
            | Primitive::DateTime(s)
            | Primitive::Xhtml(s) => Some(s),
            _ => None,
        }
    }
}

fn digits(s: &str, n: usize) -> bool {
    s.len() == n && s.chars().all(|c| c.is_ascii_digit())
}

fn is_partial_date(value: &str) -> bool {
    let parts: Vec<&str> = value.split('-').collect();
    match parts.as_slice() {
        [year] => digits(year, 4),
        [year, month] => {
            digits(year, 4)
                && digits(month, 2)
                && month.parse::<u32>().is_ok_and(|m| (1..=12).contains(&m))
        }
        [_, _, _] => NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok() && value.len() == 10,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_type_names() {
        assert_eq!(PrimitiveKind::DateTime.type_name(), "dateTime");
        assert_eq!(PrimitiveKind::Base64Binary.type_name(), "base64Binary");
        assert_eq!(PrimitiveKind::Boolean.to_string(), "boolean");
    }

    #[test]
    fn test_decimal_keeps_scale() {
        let parsed = PrimitiveKind::Decimal.parse("85.50").unwrap();
        assert_eq!(parsed, Primitive::Decimal(dec!(85.50)));
        assert_eq!(parsed.to_lexical(), "85.50");
    }

    #[test]
    fn test_boolean_is_strict() {
        assert_eq!(
            PrimitiveKind::Boolean.parse("true").unwrap(),
            Primitive::Boolean(true)
        );
        assert!(PrimitiveKind::Boolean.parse("True").is_err());
        assert!(PrimitiveKind::Boolean.parse("1").is_err());
    }

    #[test]
    fn test_partial_dates() {
        assert!(PrimitiveKind::Date.parse("1974").is_ok());
        assert!(PrimitiveKind::Date.parse("1974-12").is_ok());
        assert!(PrimitiveKind::Date.parse("1974-12-25").is_ok());
        assert!(PrimitiveKind::Date.parse("1974-13").is_err());
        assert!(PrimitiveKind::Date.parse("1974-02-30").is_err());
        assert!(PrimitiveKind::DateTime.parse("2014-03-01T10:30:00+01:00").is_ok());
        assert!(PrimitiveKind::DateTime.parse("yesterday").is_err());
    }

    #[test]
    fn test_instant_lexical_uses_zulu() {
        let parsed = PrimitiveKind::Instant
            .parse("2014-01-01T12:00:00+00:00")
            .unwrap();
        assert_eq!(parsed.to_lexical(), "2014-01-01T12:00:00Z");
    }

    #[test]
    fn test_base64_round_trip() {
        let value = Primitive::Base64Binary(b"helios".to_vec());
        let lexical = value.to_lexical();
        assert_eq!(lexical, "aGVsaW9z");
        assert_eq!(PrimitiveKind::Base64Binary.parse(&lexical).unwrap(), value);
    }

    #[test]
    fn test_id_rules() {
        assert!(PrimitiveKind::Id.parse("pat-1.a").is_ok());
        assert!(PrimitiveKind::Id.parse("").is_err());
        assert!(PrimitiveKind::Id.parse("has space").is_err());
    }

    #[test]
    fn test_invalid_error_message() {
        let err = PrimitiveKind::Integer.parse("abc").unwrap_err();
        assert_eq!(err.kind, PrimitiveKind::Integer);
        assert!(err.to_string().contains("'abc' is not a valid integer"));
    }
}
