//! The object-safe view the generic encoder and decoder use to walk model types.
//!
//! Model types stay plain structs. Each one implements [`FhirObject`] to expose
//! its elements by wire name, and [`FhirType`] to supply its metadata.

use std::any::Any;
use std::fmt;

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::metadata::{ComplexTypeRef, MetadataError, TypeDescriptor};
use crate::node::UnmappedElement;
use crate::primitive::{Primitive, PrimitiveKind};

/// A decoded value could not be stored on a typed object.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssignError {
    #[error("'{type_name}' has no element '{element}'")]
    UnknownElement {
        type_name: &'static str,
        element: String,
    },

    #[error("element '{element}' of '{type_name}' cannot hold a {found}")]
    WrongKind {
        type_name: &'static str,
        element: String,
        found: String,
    },

    #[error("'{code}' is not a valid code for '{element}'")]
    InvalidCode { element: String, code: String },
}

/// Borrowed view of one element value.
#[derive(Debug, Clone)]
pub enum ValueRef<'a> {
    Primitive(Primitive),
    Object(&'a dyn FhirObject),
}

impl ValueRef<'_> {
    /// Runtime type name: the primitive kind or the object's type name.
    pub fn type_name(&self) -> &'static str {
        match self {
            ValueRef::Primitive(p) => p.kind().type_name(),
            ValueRef::Object(o) => o.type_name(),
        }
    }
}

/// Owned element value handed to [`FhirObject::set_element`].
#[derive(Debug)]
pub enum Value {
    Primitive(Primitive),
    Object(Box<dyn FhirObject>),
}

/// Object-safe access to a model instance's elements.
///
/// `element` returns values in sequence order and an empty vector for absent
/// elements. `set_element` appends to repeating elements and replaces
/// singletons.
pub trait FhirObject: Any + Send + Sync + fmt::Debug {
    fn type_ref(&self) -> ComplexTypeRef;

    fn type_name(&self) -> &'static str {
        self.type_ref().name()
    }

    fn element(&self, name: &str) -> Vec<ValueRef<'_>>;

    fn set_element(&mut self, name: &str, value: Value) -> Result<(), AssignError>;

    fn unmapped(&self) -> &[UnmappedElement];

    fn push_unmapped(&mut self, element: UnmappedElement);
}

/// A model type with static metadata.
pub trait FhirType: FhirObject + Default + Clone + PartialEq {
    const TYPE_NAME: &'static str;

    fn describe() -> Result<TypeDescriptor, MetadataError>;
}

/// A model type addressable as a REST collection.
pub trait FhirResource: FhirType {
    /// The collection segment of this resource's URLs.
    fn collection_name() -> &'static str {
        Self::TYPE_NAME
    }
}

/// A closed set of codes bound to a `code` element.
pub trait FhirCode: Sized + Copy {
    fn as_code(&self) -> &'static str;

    fn from_code(code: &str) -> Option<Self>;
}

/// Error for a wire name the type does not declare.
pub fn unknown_element(type_name: &'static str, element: &str) -> AssignError {
    AssignError::UnknownElement {
        type_name,
        element: element.to_string(),
    }
}

/// Recovers the concrete type of a boxed object. On mismatch the error carries
/// the object's actual type name.
pub fn downcast<T: FhirObject>(object: Box<dyn FhirObject>) -> Result<T, &'static str> {
    let found = object.type_name();
    let any: Box<dyn Any> = object;
    any.downcast::<T>().map(|concrete| *concrete).map_err(|_| found)
}

impl Value {
    fn kind_name(&self) -> String {
        match self {
            Value::Primitive(p) => p.kind().type_name().to_string(),
            Value::Object(o) => o.type_name().to_string(),
        }
    }

    fn wrong_kind(self, type_name: &'static str, element: &str) -> AssignError {
        AssignError::WrongKind {
            type_name,
            element: element.to_string(),
            found: self.kind_name(),
        }
    }

    pub fn into_primitive(self, type_name: &'static str, element: &str) -> Result<Primitive, AssignError> {
        match self {
            Value::Primitive(p) => Ok(p),
            other => Err(other.wrong_kind(type_name, element)),
        }
    }

    pub fn into_object<T: FhirObject>(self, type_name: &'static str, element: &str) -> Result<T, AssignError> {
        match self {
            Value::Object(object) => downcast::<T>(object).map_err(|found| AssignError::WrongKind {
                type_name,
                element: element.to_string(),
                found: found.to_string(),
            }),
            other => Err(other.wrong_kind(type_name, element)),
        }
    }

    /// Text of any string-like primitive.
    pub fn into_text(self, type_name: &'static str, element: &str) -> Result<String, AssignError> {
        match self {
            Value::Primitive(
                Primitive::String(s)
                | Primitive::Uri(s)
                | Primitive::Code(s)
                | Primitive::Id(s)
                | Primitive::Date(s)
                | Primitive::DateTime(s)
                | Primitive::Xhtml(s),
            ) => Ok(s),
            other => Err(other.wrong_kind(type_name, element)),
        }
    }

    pub fn into_code<C: FhirCode>(self, type_name: &'static str, element: &str) -> Result<C, AssignError> {
        let code = self.into_text(type_name, element)?;
        C::from_code(&code).ok_or_else(|| AssignError::InvalidCode {
            element: element.to_string(),
            code,
        })
    }

    pub fn into_bool(self, type_name: &'static str, element: &str) -> Result<bool, AssignError> {
        match self {
            Value::Primitive(Primitive::Boolean(b)) => Ok(b),
            other => Err(other.wrong_kind(type_name, element)),
        }
    }

    pub fn into_integer(self, type_name: &'static str, element: &str) -> Result<i32, AssignError> {
        match self {
            Value::Primitive(Primitive::Integer(i)) => Ok(i),
            other => Err(other.wrong_kind(type_name, element)),
        }
    }

    pub fn into_decimal(self, type_name: &'static str, element: &str) -> Result<Decimal, AssignError> {
        match self {
            Value::Primitive(Primitive::Decimal(d)) => Ok(d),
            other => Err(other.wrong_kind(type_name, element)),
        }
    }

    pub fn into_instant(
        self,
        type_name: &'static str,
        element: &str,
    ) -> Result<DateTime<FixedOffset>, AssignError> {
        match self {
            Value::Primitive(Primitive::Instant(i)) => Ok(i),
            other => Err(other.wrong_kind(type_name, element)),
        }
    }
}

/// Values of an optional complex element.
pub fn object_value<T: FhirObject>(value: &Option<T>) -> Vec<ValueRef<'_>> {
    value
        .iter()
        .map(|v| ValueRef::Object(v as &dyn FhirObject))
        .collect()
}

/// Values of a repeating complex element.
pub fn object_values<T: FhirObject>(values: &[T]) -> Vec<ValueRef<'_>> {
    values
        .iter()
        .map(|v| ValueRef::Object(v as &dyn FhirObject))
        .collect()
}

/// Value of an optional string-like primitive element.
pub fn text_value<'a>(kind: PrimitiveKind, value: &Option<String>) -> Vec<ValueRef<'a>> {
    value
        .iter()
        .map(|text| ValueRef::Primitive(text_primitive(kind, text)))
        .collect()
}

/// Values of a repeating string-like primitive element.
pub fn text_values<'a>(kind: PrimitiveKind, values: &[String]) -> Vec<ValueRef<'a>> {
    values
        .iter()
        .map(|text| ValueRef::Primitive(text_primitive(kind, text)))
        .collect()
}

/// Value of an optional primitive held in its typed form.
pub fn primitive_value<'a, T: Clone>(value: &Option<T>, wrap: fn(T) -> Primitive) -> Vec<ValueRef<'a>> {
    value
        .iter()
        .map(|v| ValueRef::Primitive(wrap(v.clone())))
        .collect()
}

/// Value of an optional coded element.
pub fn code_value<'a, C: FhirCode>(value: &Option<C>) -> Vec<ValueRef<'a>> {
    value
        .iter()
        .map(|code| ValueRef::Primitive(Primitive::Code(code.as_code().to_string())))
        .collect()
}

fn text_primitive(kind: PrimitiveKind, text: &str) -> Primitive {
    let text = text.to_string();
    match kind {
        PrimitiveKind::Uri => Primitive::Uri(text),
        PrimitiveKind::Code => Primitive::Code(text),
        PrimitiveKind::Id => Primitive::Id(text),
        PrimitiveKind::Date => Primitive::Date(text),
        PrimitiveKind::DateTime => Primitive::DateTime(text),
        PrimitiveKind::Xhtml => Primitive::Xhtml(text),
        _ => Primitive::String(text),
    }
}

/// Implements the bookkeeping methods of [`FhirObject`] for a struct with an
/// `unmapped: Vec<UnmappedElement>` field.
#[macro_export]
macro_rules! fhir_object_common {
    () => {
        fn type_ref(&self) -> $crate::metadata::ComplexTypeRef {
            $crate::metadata::ComplexTypeRef::of::<Self>()
        }

        fn unmapped(&self) -> &[$crate::node::UnmappedElement] {
            &self.unmapped
        }

        fn push_unmapped(&mut self, element: $crate::node::UnmappedElement) {
            self.unmapped.push(element);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Coding, Quantity};

    #[test]
    fn test_downcast_round_trip() {
        let coding = Coding {
            code: Some("12345".to_string()),
            ..Default::default()
        };
        let boxed: Box<dyn FhirObject> = Box::new(coding.clone());
        assert_eq!(downcast::<Coding>(boxed).unwrap(), coding);
    }

    #[test]
    fn test_downcast_wrong_type_returns_object() {
        let boxed: Box<dyn FhirObject> = Box::new(Coding::default());
        assert_eq!(downcast::<Quantity>(boxed).unwrap_err(), "Coding");
    }

    #[test]
    fn test_into_text_rejects_boolean() {
        let err = Value::Primitive(Primitive::Boolean(true))
            .into_text("Coding", "code")
            .unwrap_err();
        assert_eq!(
            err,
            AssignError::WrongKind {
                type_name: "Coding",
                element: "code".to_string(),
                found: "boolean".to_string(),
            }
        );
    }

    #[test]
    fn test_text_value_keeps_kind() {
        let values = text_value(PrimitiveKind::Uri, &Some("http://loinc.org".to_string()));
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].type_name(), "uri");
    }
}
