//! The parse side of the tree interface.

use helios_fhir::ObjectNode;

use crate::error::Result;
use crate::format::ResourceFormat;

/// Parses one document into the format-neutral tree.
///
/// Readers only check that the input is well formed. Mapping names onto
/// types, cardinality and choice resolution belong to the decoder. Any parse
/// failure is reported as [`SerializationError::MalformedBody`].
///
/// [`SerializationError::MalformedBody`]: crate::SerializationError::MalformedBody
pub trait TreeReader {
    fn format(&self) -> ResourceFormat;

    /// Reads the root resource. Its `type_name` is the root wire name.
    fn read_root(&mut self) -> Result<ObjectNode>;
}
