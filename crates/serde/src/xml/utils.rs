//! Naming helpers shared by the XML writer and reader.

pub use helios_fhir::FHIR_NAMESPACE;

/// Checks if an element name represents a FHIR resource.
///
/// FHIR resources are identified by having an uppercase first letter.
pub fn is_resource_name(name: &str) -> bool {
    name.chars()
        .next()
        .map(|c| c.is_uppercase())
        .unwrap_or(false)
}

/// Checks if an element name is the special XHTML div element.
///
/// The `div` element requires special handling because it can contain
/// arbitrary XHTML content and uses a different namespace.
pub fn is_div_element(name: &str) -> bool {
    name == "div"
}

/// Whether an attribute key declares a namespace (`xmlns` or `xmlns:prefix`).
pub fn is_namespace_declaration(key: &[u8]) -> bool {
    key == b"xmlns" || key.starts_with(b"xmlns:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_resource_name() {
        assert!(is_resource_name("Patient"));
        assert!(is_resource_name("Bundle"));
        assert!(!is_resource_name("active"));
        assert!(!is_resource_name("birthDate"));
        assert!(!is_resource_name(""));
    }

    #[test]
    fn test_is_div_element() {
        assert!(is_div_element("div"));
        assert!(!is_div_element("Div"));
        assert!(!is_div_element("text"));
    }

    #[test]
    fn test_is_namespace_declaration() {
        assert!(is_namespace_declaration(b"xmlns"));
        assert!(is_namespace_declaration(b"xmlns:xhtml"));
        assert!(!is_namespace_declaration(b"value"));
    }
}
