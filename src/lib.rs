//! Generic pull-based decoding of feed documents.
//!
//! A document is first turned into a loosely typed value tree
//! ([`value::JsonValue`] or [`value::XmlDocument`]). Strongly typed results
//! are then pulled out of the tree by types implementing [`Decode`], which
//! ask a [`Decoder`] for keyed, unkeyed or single-value views of the node
//! they are positioned on.
//!
//! ```ignore
//! use skim_decode::{decode_xml_str, Decode, DecodeError, Decoder, DecoderOptions};
//!
//! struct Item {
//!     title: String,
//!     categories: Vec<String>,
//! }
//!
//! impl Decode for Item {
//!     fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
//!         let c = decoder.keyed()?;
//!         Ok(Self {
//!             title: c.decode("title")?,
//!             categories: c.decode_many("category")?,
//!         })
//!     }
//! }
//!
//! let item: Item = decode_xml_str(
//!     "<item><title>Hi</title><category>a</category><category>b</category></item>",
//!     &DecoderOptions::default(),
//! )?;
//! ```
//!
//! XML has no arrays, so whether a key means one element or all of its
//! same-named siblings is decided by the call: [`KeyedContainer::decode`]
//! takes the first match and [`KeyedContainer::decode_many`] takes them all.

pub mod config;
pub mod decoder;
pub mod error;
pub mod feed;
pub mod options;
pub mod value;

mod coerce;
mod well_known;

pub use decoder::{
    decode_json, decode_json_str, decode_xml, decode_xml_node, decode_xml_str, Decode, Decoder,
    KeyedContainer, SingleValueContainer, UnkeyedContainer,
};
pub use error::{CodingPath, DecodeError, DecodeErrorKind, Error, PathSegment};
pub use options::{
    snake_to_camel, DataStrategy, DateStrategy, DecoderOptions, KeyStrategy,
    NonConformingFloatStrategy,
};
pub use well_known::Data;
