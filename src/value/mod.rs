//! Read-only value trees the decoder walks.
//!
//! Two interchangeable representations are supported:
//!
//! - [`JsonValue`] - a JSON document with numbers kept as text
//! - [`XmlDocument`] - an arena of elements, attributes, text and namespace
//!   declarations linked by [`NodeId`]
//!
//! Both are built once (by [`parse_json`] / [`parse_xml`] or by hand) and are
//! never mutated afterwards, so they can be shared freely between threads.

mod json;
mod xml;

use thiserror::Error;

pub use json::{parse_json, parse_json_slice, JsonValue};
pub use xml::{parse_xml, Element, NodeId, XmlDocument, XmlNode, XmlNodeKind, XmlNodeRef, MAX_XML_DEPTH};

/// Errors raised while building a value tree from text.
#[derive(Debug, Error)]
pub enum TreeError {
    /// The JSON tokenizer rejected the input.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The XML reader rejected the input.
    #[error("XML parse error: {0}")]
    Xml(String),

    /// Element nesting exceeds [`MAX_XML_DEPTH`].
    #[error("XML nesting depth exceeds maximum of {0} levels")]
    MaxDepthExceeded(usize),

    /// The input contained no element at all.
    #[error("XML document has no root element")]
    NoRootElement,
}
