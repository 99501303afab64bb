use super::{Decode, Decoder, Node};
use crate::error::{CodingPath, DecodeError, PathSegment};
use crate::options::DecoderOptions;

/// Ordered-sequence view over a JSON array, the child elements of an XML
/// element, or the matches of a repeated XML key.
///
/// The cursor only moves when [`UnkeyedContainer::decode_next`] succeeds, so
/// a caller may retry the same position with a different target type.
#[derive(Debug, Clone)]
pub struct UnkeyedContainer<'a> {
    items: Vec<Node<'a>>,
    path: CodingPath,
    options: &'a DecoderOptions,
    cursor: usize,
}

impl<'a> UnkeyedContainer<'a> {
    pub(crate) fn new(items: Vec<Node<'a>>, path: CodingPath, options: &'a DecoderOptions) -> Self {
        Self {
            items,
            path,
            options,
            cursor: 0,
        }
    }

    pub fn path(&self) -> &CodingPath {
        &self.path
    }

    /// Number of elements. Both trees are fully materialized, so this is
    /// always known.
    pub fn count(&self) -> Option<usize> {
        Some(self.items.len())
    }

    pub fn is_at_end(&self) -> bool {
        self.cursor >= self.items.len()
    }

    pub fn current_index(&self) -> usize {
        self.cursor
    }

    fn current(&self) -> Result<Decoder<'a>, DecodeError> {
        let path = self.path.child(PathSegment::Index(self.cursor));
        match self.items.get(self.cursor) {
            Some(&node) => Ok(Decoder::new(node, path, self.options)),
            None => Err(DecodeError::corrupted(&path, "unkeyed container is at end")),
        }
    }

    /// Decodes the element under the cursor and advances past it.
    pub fn decode_next<T: Decode>(&mut self) -> Result<T, DecodeError> {
        let value = T::decode(&self.current()?)?;
        self.cursor += 1;
        Ok(value)
    }

    /// A decoder for the element under the cursor; advances past it.
    pub fn nested_next(&mut self) -> Result<Decoder<'a>, DecodeError> {
        let decoder = self.current()?;
        self.cursor += 1;
        Ok(decoder)
    }
}
