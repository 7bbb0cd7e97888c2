//! The event interface the generic encoder drives.
//!
//! The encoder walks an object once and reports what it sees; each backend
//! decides how those events look on the wire. A complete document is a single
//! root object:
//!
//! ```text
//! start_root_object("Patient", false)
//!   start_property("name")
//!     start_array()
//!       start_complex_content()
//!         start_property("family") write_primitive(..) end_property()
//!       end_complex_content()
//!     end_array()
//!   end_property()
//! end_root_object(false)
//! ```
//!
//! Resources nested inside another resource are opened with
//! `start_root_object(name, true)` inside a property.

use helios_fhir::{Primitive, Scalar};

use crate::error::Result;
use crate::format::ResourceFormat;

pub trait TreeWriter {
    fn format(&self) -> ResourceFormat;

    /// Opens a resource. `contained` is true for a resource nested inside
    /// another one.
    fn start_root_object(&mut self, name: &str, contained: bool) -> Result<()>;

    fn end_root_object(&mut self, contained: bool) -> Result<()>;

    fn start_property(&mut self, name: &str) -> Result<()>;

    fn end_property(&mut self) -> Result<()>;

    /// Brackets the values of a repeating element.
    fn start_array(&mut self) -> Result<()>;

    fn end_array(&mut self) -> Result<()>;

    /// Opens a complex (non-resource) value of the current property.
    fn start_complex_content(&mut self) -> Result<()>;

    fn end_complex_content(&mut self) -> Result<()>;

    /// Writes a primitive value of the current property.
    fn write_primitive(&mut self, value: &Primitive) -> Result<()>;

    /// Writes a boolean or number kept from a parsed document. Formats
    /// without typed scalars write its lexical form.
    fn write_scalar(&mut self, value: &Scalar) -> Result<()> {
        match value {
            Scalar::Boolean(b) => self.write_primitive(&Primitive::Boolean(*b)),
            Scalar::Number(lexical) => self.write_primitive(&Primitive::String(lexical.clone())),
        }
    }

    /// Completes the document and returns its bytes.
    fn finish(self) -> Result<Vec<u8>>
    where
        Self: Sized;
}
