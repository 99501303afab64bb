//! RSS 1.0 (RDF Site Summary).
//!
//! Unlike RSS 2.0, items are siblings of the channel under the `rdf:RDF`
//! root, and identity lives in `rdf:about` attributes.

use super::dublin_core::DublinCore;
use crate::decoder::{Decode, Decoder, KeyedContainer};
use crate::error::DecodeError;

const RDF_PREFIX: &str = "rdf";

fn about(c: &KeyedContainer<'_>) -> Result<Option<String>, DecodeError> {
    match c.namespaced_if_declared(RDF_PREFIX) {
        Some(rdf) => rdf.decode("about"),
        None => Ok(None),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RdfDocument {
    pub channel: RdfChannel,
    pub image: Option<RdfImage>,
    pub items: Vec<RdfItem>,
}

impl Decode for RdfDocument {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
        let c = decoder.keyed()?;
        Ok(Self {
            channel: c.decode("channel")?,
            image: c.decode("image")?,
            items: c.decode_many("item")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RdfChannel {
    pub about: Option<String>,
    pub title: String,
    pub link: Option<String>,
    pub description: Option<String>,
    pub dublin_core: Option<DublinCore>,
}

impl Decode for RdfChannel {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
        let c = decoder.keyed()?;
        Ok(Self {
            about: about(&c)?,
            title: c.decode("title")?,
            link: c.decode("link")?,
            description: c.decode("description")?,
            dublin_core: DublinCore::read(&c)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RdfImage {
    pub about: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub link: Option<String>,
}

impl Decode for RdfImage {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
        let c = decoder.keyed()?;
        Ok(Self {
            about: about(&c)?,
            title: c.decode("title")?,
            url: c.decode("url")?,
            link: c.decode("link")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RdfItem {
    pub about: Option<String>,
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub dublin_core: Option<DublinCore>,
}

impl Decode for RdfItem {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
        let c = decoder.keyed()?;
        let content = match c.namespaced_if_declared("content") {
            Some(ns) => ns.decode("encoded")?,
            None => None,
        };
        Ok(Self {
            about: about(&c)?,
            title: c.decode("title")?,
            link: c.decode("link")?,
            description: c.decode("description")?,
            content,
            dublin_core: DublinCore::read(&c)?,
        })
    }
}
