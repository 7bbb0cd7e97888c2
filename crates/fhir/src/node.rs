//! Format-neutral parse tree.
//!
//! Both wire readers turn their input into this tree before the decoder maps it
//! onto typed objects. Repeated elements appear as repeated children in
//! document order, so a JSON array and a run of same-named XML siblings look
//! identical to the decoder. Objects remember which members were written as
//! JSON arrays, and JSON booleans and numbers stay [`Scalar`]s, so content no
//! model type claims can be written back in its original shape.

/// A node of the parse tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Lexical value of a primitive element.
    Primitive(String),
    /// A JSON boolean or number.
    Scalar(Scalar),
    Object(ObjectNode),
}

impl Node {
    pub fn as_object(&self) -> Option<&ObjectNode> {
        match self {
            Node::Object(object) => Some(object),
            Node::Primitive(_) | Node::Scalar(_) => None,
        }
    }

    /// Lexical value of a primitive or scalar node.
    pub fn as_primitive(&self) -> Option<&str> {
        match self {
            Node::Primitive(value) => Some(value),
            Node::Scalar(scalar) => Some(scalar.lexical()),
            Node::Object(_) => None,
        }
    }
}

/// A non-string JSON scalar.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Boolean(bool),
    /// A number, kept in its lexical form.
    Number(String),
}

impl Scalar {
    pub fn lexical(&self) -> &str {
        match self {
            Scalar::Boolean(true) => "true",
            Scalar::Boolean(false) => "false",
            Scalar::Number(lexical) => lexical,
        }
    }
}

/// A complex element or resource.
///
/// `type_name` is set for resource roots and for resources nested inside
/// another resource; it is `None` for ordinary complex datatypes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectNode {
    pub type_name: Option<String>,
    pub children: Vec<(String, Node)>,
    /// Names of the members that were written as arrays.
    pub arrays: Vec<String>,
}

impl ObjectNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resource(type_name: impl Into<String>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            ..Self::default()
        }
    }

    pub fn push(&mut self, name: impl Into<String>, node: Node) {
        self.children.push((name.into(), node));
    }

    /// Records that the member `name` was written as an array, even when it
    /// held a single value.
    pub fn mark_array(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.arrays.contains(&name) {
            self.arrays.push(name);
        }
    }

    pub fn is_array(&self, name: &str) -> bool {
        self.arrays.iter().any(|array| array == name)
    }

    /// First child with the given name.
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children
            .iter()
            .find(|(child, _)| child == name)
            .map(|(_, node)| node)
    }
}

/// Content a typed object did not recognize, kept so it can be written back.
#[derive(Debug, Clone, PartialEq)]
pub struct UnmappedElement {
    pub name: String,
    pub node: Node,
    /// Whether the value came from an array member.
    pub in_array: bool,
}

impl UnmappedElement {
    pub fn new(name: impl Into<String>, node: Node) -> Self {
        Self {
            name: name.into(),
            node,
            in_array: false,
        }
    }

    pub fn with_in_array(mut self, in_array: bool) -> Self {
        self.in_array = in_array;
        self
    }
}
