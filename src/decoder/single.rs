use super::{Decode, Decoder, Node};
use crate::coerce::Leaf;
use crate::error::CodingPath;
use crate::error::DecodeError;
use crate::options::DecoderOptions;

/// Scalar view: a JSON primitive, an XML attribute, namespace URI, text
/// node, or an element holding only text.
#[derive(Debug, Clone)]
pub struct SingleValueContainer<'a> {
    node: Node<'a>,
    path: CodingPath,
    options: &'a DecoderOptions,
}

impl<'a> SingleValueContainer<'a> {
    pub(crate) fn new(node: Node<'a>, path: CodingPath, options: &'a DecoderOptions) -> Self {
        Self {
            node,
            path,
            options,
        }
    }

    pub fn path(&self) -> &CodingPath {
        &self.path
    }

    pub fn options(&self) -> &'a DecoderOptions {
        self.options
    }

    /// `true` for JSON `null` and for empty XML elements.
    pub fn decode_nil(&self) -> bool {
        self.node.is_null()
    }

    /// Decodes a scalar type from this leaf.
    pub fn decode<T: Decode>(&self) -> Result<T, DecodeError> {
        T::decode(&Decoder::new(self.node, self.path.clone(), self.options))
    }

    pub(crate) fn leaf(&self) -> Leaf<'a> {
        self.node.leaf()
    }
}
