//! The flat sum type over every resource kind of the model.

use crate::inspector::ModelInspector;
use crate::model::{Bundle, Conformance, Group, OperationOutcome, Patient};
use crate::object::{AssignError, FhirObject, Value, ValueRef, downcast};

/// Any resource of the model.
///
/// Variants are boxed so that resources nesting other resources (contained
/// resources, bundle entries) keep the enum small.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    Bundle(Box<Bundle>),
    Conformance(Box<Conformance>),
    Group(Box<Group>),
    OperationOutcome(Box<OperationOutcome>),
    Patient(Box<Patient>),
}

impl Resource {
    /// Wraps a decoded object. Returns the object's type name when it is not
    /// a resource of this model.
    pub fn from_object(object: Box<dyn FhirObject>) -> Result<Self, &'static str> {
        match object.type_name() {
            "Bundle" => downcast::<Bundle>(object).map(|r| Resource::Bundle(Box::new(r))),
            "Conformance" => {
                downcast::<Conformance>(object).map(|r| Resource::Conformance(Box::new(r)))
            }
            "Group" => downcast::<Group>(object).map(|r| Resource::Group(Box::new(r))),
            "OperationOutcome" => downcast::<OperationOutcome>(object)
                .map(|r| Resource::OperationOutcome(Box::new(r))),
            "Patient" => downcast::<Patient>(object).map(|r| Resource::Patient(Box::new(r))),
            other => Err(other),
        }
    }

    /// The resource as seen by the generic encoder.
    pub fn as_object(&self) -> &dyn FhirObject {
        match self {
            Resource::Bundle(r) => &**r as &dyn FhirObject,
            Resource::Conformance(r) => &**r as &dyn FhirObject,
            Resource::Group(r) => &**r as &dyn FhirObject,
            Resource::OperationOutcome(r) => &**r as &dyn FhirObject,
            Resource::Patient(r) => &**r as &dyn FhirObject,
        }
    }

    pub fn resource_type(&self) -> &'static str {
        self.as_object().type_name()
    }

    pub fn as_patient(&self) -> Option<&Patient> {
        match self {
            Resource::Patient(p) => Some(&**p),
            _ => None,
        }
    }

    pub fn as_operation_outcome(&self) -> Option<&OperationOutcome> {
        match self {
            Resource::OperationOutcome(o) => Some(&**o),
            _ => None,
        }
    }
}

impl From<Patient> for Resource {
    fn from(value: Patient) -> Self {
        Resource::Patient(Box::new(value))
    }
}

impl From<Group> for Resource {
    fn from(value: Group) -> Self {
        Resource::Group(Box::new(value))
    }
}

impl From<OperationOutcome> for Resource {
    fn from(value: OperationOutcome) -> Self {
        Resource::OperationOutcome(Box::new(value))
    }
}

impl From<Bundle> for Resource {
    fn from(value: Bundle) -> Self {
        Resource::Bundle(Box::new(value))
    }
}

impl From<Conformance> for Resource {
    fn from(value: Conformance) -> Self {
        Resource::Conformance(Box::new(value))
    }
}

/// Registers every resource of the model with `inspector`.
pub fn register_resources(inspector: &ModelInspector) {
    inspector.register_resource::<Bundle>();
    inspector.register_resource::<Conformance>();
    inspector.register_resource::<Group>();
    inspector.register_resource::<OperationOutcome>();
    inspector.register_resource::<Patient>();
}

/// Values of a repeating resource element.
pub fn resource_values(values: &[Resource]) -> Vec<ValueRef<'_>> {
    values.iter().map(|r| ValueRef::Object(r.as_object())).collect()
}

/// Value of an optional resource element.
pub fn resource_value(value: &Option<Resource>) -> Vec<ValueRef<'_>> {
    value.iter().map(|r| ValueRef::Object(r.as_object())).collect()
}

impl Value {
    pub fn into_resource(self, type_name: &'static str, element: &str) -> Result<Resource, AssignError> {
        let wrong_kind = |found: &str| AssignError::WrongKind {
            type_name,
            element: element.to_string(),
            found: found.to_string(),
        };
        match self {
            Value::Object(object) => Resource::from_object(object).map_err(wrong_kind),
            Value::Primitive(p) => Err(wrong_kind(p.kind().type_name())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Coding;

    #[test]
    fn test_from_object_round_trip() {
        let patient = Patient {
            active: Some(true),
            ..Default::default()
        };
        let boxed: Box<dyn FhirObject> = Box::new(patient.clone());
        let resource = Resource::from_object(boxed).unwrap();

        assert_eq!(resource.resource_type(), "Patient");
        assert_eq!(resource.as_patient(), Some(&patient));
    }

    #[test]
    fn test_from_object_rejects_datatypes() {
        let boxed: Box<dyn FhirObject> = Box::new(Coding::default());
        assert_eq!(Resource::from_object(boxed).unwrap_err(), "Coding");
    }

    #[test]
    fn test_resource_enum_size_is_small() {
        assert!(std::mem::size_of::<Resource>() <= 16);
    }
}
