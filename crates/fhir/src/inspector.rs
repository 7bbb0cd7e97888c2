//! Per-type metadata cache and resource registry.
//!
//! The inspector is an explicit object handed to the encoder, decoder and
//! client; there is no process-wide instance. Descriptors are computed on first
//! use, keyed by [`TypeId`], and kept for the inspector's lifetime.
//!
//! Concurrent first use of the same type may build its descriptor twice. The
//! descriptor is built outside the lock and only the first one inserted is
//! kept, so readers never observe a partially built descriptor.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::metadata::{ComplexTypeRef, MetadataError, TypeDescriptor};
use crate::model;
use crate::object::{FhirResource, FhirType};

/// Lazily populated metadata cache plus the table of known resource roots.
#[derive(Debug, Default)]
pub struct ModelInspector {
    descriptors: RwLock<HashMap<TypeId, Arc<TypeDescriptor>>>,
    roots: RwLock<HashMap<&'static str, ComplexTypeRef>>,
}

impl ModelInspector {
    /// Creates an inspector with no registered resources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an inspector that knows every resource of the bundled model.
    pub fn with_default_model() -> Self {
        let inspector = Self::new();
        model::register_resources(&inspector);
        inspector
    }

    /// Descriptor for `T`.
    pub fn describe<T: FhirType>(&self) -> Result<Arc<TypeDescriptor>, MetadataError> {
        self.describe_ref(&ComplexTypeRef::of::<T>())
    }

    /// Descriptor for the type behind `type_ref`. Metadata errors are returned
    /// on every call and never cached.
    pub fn describe_ref(&self, type_ref: &ComplexTypeRef) -> Result<Arc<TypeDescriptor>, MetadataError> {
        if let Some(descriptor) = self.descriptors.read().get(&type_ref.type_id()) {
            return Ok(Arc::clone(descriptor));
        }

        let built = Arc::new(type_ref.describe()?);
        debug!(
            type_name = built.name(),
            elements = built.elements().len(),
            "Cached type metadata"
        );

        let mut descriptors = self.descriptors.write();
        let cached = descriptors.entry(type_ref.type_id()).or_insert(built);
        Ok(Arc::clone(cached))
    }

    /// Makes `T` discoverable by its root wire name.
    pub fn register_resource<T: FhirResource>(&self) {
        self.roots.write().insert(T::TYPE_NAME, ComplexTypeRef::of::<T>());
    }

    /// Looks up a registered resource by the wire name found at a document root.
    pub fn resolve_root(&self, name: &str) -> Option<ComplexTypeRef> {
        self.roots.read().get(name).copied()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.roots.read().contains_key(name)
    }

    /// Number of descriptors built so far.
    pub fn cached_types(&self) -> usize {
        self.descriptors.read().len()
    }
}
