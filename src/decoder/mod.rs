//! Container views and the decode contract.
//!
//! A [`Decoder`] points at one node of a value tree. Schema types implement
//! [`Decode`] and ask the decoder for exactly one of three views:
//!
//! - [`KeyedContainer`] - named fields (JSON object, XML element)
//! - [`UnkeyedContainer`] - an ordered sequence (JSON array, XML children)
//! - [`SingleValueContainer`] - a scalar leaf
//!
//! Views are cheap, immutable snapshots. Descending into a field or an
//! element always yields a new `Decoder` with an extended [`CodingPath`];
//! nothing a nested call does is visible to its parent.

mod keyed;
mod resolve;
mod single;
mod unkeyed;

pub use keyed::KeyedContainer;
pub use single::SingleValueContainer;
pub use unkeyed::UnkeyedContainer;

use crate::coerce::Leaf;
use crate::error::{CodingPath, DecodeError, Error};
use crate::options::DecoderOptions;
use crate::value::{parse_json, parse_xml, JsonValue, XmlDocument, XmlNodeKind, XmlNodeRef};

/// The node a decoder is positioned on.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Node<'a> {
    Json(&'a JsonValue),
    Xml(XmlNodeRef<'a>),
}

impl<'a> Node<'a> {
    fn describe(&self) -> &'static str {
        match self {
            Node::Json(value) => value.kind_name(),
            Node::Xml(node) => node.describe(),
        }
    }

    fn is_null(&self) -> bool {
        match self {
            Node::Json(value) => value.is_null(),
            Node::Xml(node) => match node.kind() {
                XmlNodeKind::Element(e) => {
                    e.children.is_empty() && e.attributes.is_empty() && e.namespaces.is_empty()
                }
                _ => false,
            },
        }
    }

    fn leaf(&self) -> Leaf<'a> {
        match *self {
            Node::Json(value) => match value {
                JsonValue::Null => Leaf::Null,
                JsonValue::Bool(b) => Leaf::Bool(*b),
                JsonValue::Number(n) => Leaf::Number(n),
                JsonValue::String(s) => Leaf::String(s),
                JsonValue::Array(_) => Leaf::Composite("an array"),
                JsonValue::Object(_) => Leaf::Composite("an object"),
            },
            Node::Xml(node) => {
                if node.child_elements().next().is_some() {
                    Leaf::Composite("an element with child elements")
                } else {
                    Leaf::Text(node.text())
                }
            }
        }
    }
}

/// The decode contract every schema type implements.
///
/// ```ignore
/// struct Enclosure { url: Url, length: Option<u64> }
///
/// impl Decode for Enclosure {
///     fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
///         let c = decoder.keyed()?;
///         Ok(Self { url: c.decode("url")?, length: c.decode("length")? })
///     }
/// }
/// ```
pub trait Decode: Sized {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError>;

    /// Value to use when a keyed field is missing altogether. `None` makes the
    /// field required, which is the default; `Option<T>` overrides it.
    fn decode_absent() -> Option<Self> {
        None
    }
}

/// A position in a value tree plus the options of the current decode call.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    node: Node<'a>,
    path: CodingPath,
    options: &'a DecoderOptions,
}

impl<'a> Decoder<'a> {
    pub(crate) fn new(node: Node<'a>, path: CodingPath, options: &'a DecoderOptions) -> Self {
        Self {
            node,
            path,
            options,
        }
    }

    /// A decoder positioned on a JSON value.
    pub fn json(value: &'a JsonValue, options: &'a DecoderOptions) -> Self {
        Self::new(Node::Json(value), CodingPath::root(), options)
    }

    /// A decoder positioned on an XML node.
    pub fn xml(node: XmlNodeRef<'a>, options: &'a DecoderOptions) -> Self {
        Self::new(Node::Xml(node), CodingPath::root(), options)
    }

    pub fn path(&self) -> &CodingPath {
        &self.path
    }

    pub fn options(&self) -> &'a DecoderOptions {
        self.options
    }

    /// JSON `null`, or an XML element with no content and no attributes.
    pub fn is_null(&self) -> bool {
        self.node.is_null()
    }

    pub fn as_json(&self) -> Option<&'a JsonValue> {
        match self.node {
            Node::Json(value) => Some(value),
            Node::Xml(_) => None,
        }
    }

    pub fn as_xml(&self) -> Option<XmlNodeRef<'a>> {
        match self.node {
            Node::Xml(node) => Some(node),
            Node::Json(_) => None,
        }
    }

    pub fn decode<T: Decode>(&self) -> Result<T, DecodeError> {
        T::decode(self)
    }

    /// A `ValueCorrupted` error located at this decoder.
    pub fn corrupted(&self, message: impl Into<String>) -> DecodeError {
        DecodeError::corrupted(&self.path, message)
    }

    pub fn keyed(&self) -> Result<KeyedContainer<'a>, DecodeError> {
        match self.node {
            Node::Json(JsonValue::Object(_)) => {}
            Node::Xml(node) if node.is_element() => {}
            other => {
                return Err(DecodeError::type_mismatch(
                    &self.path,
                    "a keyed container",
                    format!("found {}", other.describe()),
                ))
            }
        }
        Ok(KeyedContainer::new(self.node, self.path.clone(), self.options))
    }

    pub fn unkeyed(&self) -> Result<UnkeyedContainer<'a>, DecodeError> {
        let items: Vec<Node<'a>> = match self.node {
            Node::Json(JsonValue::Array(items)) => items.iter().map(Node::Json).collect(),
            Node::Xml(node) if node.is_element() => node.child_elements().map(Node::Xml).collect(),
            other => {
                return Err(DecodeError::type_mismatch(
                    &self.path,
                    "an unkeyed container",
                    format!("found {}", other.describe()),
                ))
            }
        };
        Ok(UnkeyedContainer::new(items, self.path.clone(), self.options))
    }

    pub fn single_value(&self) -> Result<SingleValueContainer<'a>, DecodeError> {
        if let Leaf::Composite(kind) = self.node.leaf() {
            return Err(DecodeError::type_mismatch(
                &self.path,
                "a single value",
                format!("found {}", kind),
            ));
        }
        Ok(SingleValueContainer::new(
            self.node,
            self.path.clone(),
            self.options,
        ))
    }
}

// ============================================================================
// Top-level entry points
// ============================================================================

fn decode_root<T: Decode>(decoder: &Decoder<'_>, tree: &'static str) -> Result<T, DecodeError> {
    let target = std::any::type_name::<T>();
    tracing::debug!(tree, target, "Decoding value tree");
    T::decode(decoder).inspect_err(|e| {
        tracing::debug!(tree, target, path = %e.path(), error = %e, "Decode failed");
    })
}

/// Decodes `T` from a JSON value tree.
pub fn decode_json<T: Decode>(value: &JsonValue, options: &DecoderOptions) -> Result<T, DecodeError> {
    decode_root(&Decoder::json(value, options), "json")
}

/// Decodes `T` from the root element of an XML document.
pub fn decode_xml<T: Decode>(doc: &XmlDocument, options: &DecoderOptions) -> Result<T, DecodeError> {
    decode_xml_node(doc.root(), options)
}

/// Decodes `T` from any node of an XML document. Disjoint subtrees of one
/// document may be decoded independently.
pub fn decode_xml_node<T: Decode>(
    node: XmlNodeRef<'_>,
    options: &DecoderOptions,
) -> Result<T, DecodeError> {
    decode_root(&Decoder::xml(node, options), "xml")
}

/// Builds the JSON tree for `text` and decodes `T` from it.
pub fn decode_json_str<T: Decode>(text: &str, options: &DecoderOptions) -> Result<T, Error> {
    let value = parse_json(text)?;
    Ok(decode_json(&value, options)?)
}

/// Builds the XML tree for `text` and decodes `T` from its root element.
pub fn decode_xml_str<T: Decode>(text: &str, options: &DecoderOptions) -> Result<T, Error> {
    let doc = parse_xml(text)?;
    Ok(decode_xml(&doc, options)?)
}
