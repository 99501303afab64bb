//! Dublin Core metadata (`dc:` namespace), shared by RSS 2.0 and RSS 1.0.

use chrono::{DateTime, FixedOffset};

use crate::decoder::KeyedContainer;
use crate::error::DecodeError;

pub const PREFIX: &str = "dc";

/// The fifteen Dublin Core elements. Elements that feeds commonly repeat
/// (`creator`, `subject`, `contributor`) are sequences.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DublinCore {
    pub title: Option<String>,
    pub creator: Vec<String>,
    pub subject: Vec<String>,
    pub description: Option<String>,
    pub publisher: Option<String>,
    pub contributor: Vec<String>,
    pub date: Option<DateTime<FixedOffset>>,
    pub kind: Option<String>,
    pub format: Option<String>,
    pub identifier: Option<String>,
    pub source: Option<String>,
    pub language: Option<String>,
    pub relation: Option<String>,
    pub coverage: Option<String>,
    pub rights: Option<String>,
}

impl DublinCore {
    /// Reads the `dc:` children of the element behind `parent`.
    ///
    /// `None` when the prefix is not declared in scope or the element carries
    /// no Dublin Core fields at all.
    pub fn read(parent: &KeyedContainer<'_>) -> Result<Option<Self>, DecodeError> {
        let Some(dc) = parent.namespaced_if_declared(PREFIX) else {
            return Ok(None);
        };
        if dc.all_keys().is_empty() {
            return Ok(None);
        }

        Ok(Some(Self {
            title: dc.decode("title")?,
            creator: dc.decode_many("creator")?,
            subject: dc.decode_many("subject")?,
            description: dc.decode("description")?,
            publisher: dc.decode("publisher")?,
            contributor: dc.decode_many("contributor")?,
            date: dc.decode("date")?,
            kind: dc.decode("type")?,
            format: dc.decode("format")?,
            identifier: dc.decode("identifier")?,
            source: dc.decode("source")?,
            language: dc.decode("language")?,
            relation: dc.decode("relation")?,
            coverage: dc.decode("coverage")?,
            rights: dc.decode("rights")?,
        }))
    }
}
