//! Atom 1.0 (RFC 4287).

use chrono::{DateTime, FixedOffset};

use crate::decoder::{Decode, Decoder};
use crate::error::DecodeError;
use crate::value::{XmlNodeKind, XmlNodeRef};

#[derive(Debug, Clone, PartialEq)]
pub struct AtomFeed {
    pub id: String,
    pub title: Text,
    pub updated: Option<DateTime<FixedOffset>>,
    pub subtitle: Option<Text>,
    pub links: Vec<Link>,
    pub authors: Vec<Person>,
    pub contributors: Vec<Person>,
    pub categories: Vec<Category>,
    pub generator: Option<String>,
    pub icon: Option<String>,
    pub logo: Option<String>,
    pub rights: Option<Text>,
    pub entries: Vec<Entry>,
}

impl Decode for AtomFeed {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
        let c = decoder.keyed()?;
        Ok(Self {
            id: c.decode("id")?,
            title: c.decode("title")?,
            updated: c.decode("updated")?,
            subtitle: c.decode("subtitle")?,
            links: c.decode_many("link")?,
            authors: c.decode_many("author")?,
            contributors: c.decode_many("contributor")?,
            categories: c.decode_many("category")?,
            generator: c.decode("generator")?,
            icon: c.decode("icon")?,
            logo: c.decode("logo")?,
            rights: c.decode("rights")?,
            entries: c.decode_many("entry")?,
        })
    }
}

impl AtomFeed {
    /// The `alternate` link, or the first link if none is marked.
    pub fn alternate_link(&self) -> Option<&Link> {
        alternate(&self.links)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub id: String,
    pub title: Option<Text>,
    pub updated: Option<DateTime<FixedOffset>>,
    pub published: Option<DateTime<FixedOffset>>,
    pub links: Vec<Link>,
    pub authors: Vec<Person>,
    pub contributors: Vec<Person>,
    pub categories: Vec<Category>,
    pub summary: Option<Text>,
    pub content: Option<Text>,
    pub rights: Option<Text>,
}

impl Decode for Entry {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
        let c = decoder.keyed()?;
        Ok(Self {
            id: c.decode("id")?,
            title: c.decode("title")?,
            updated: c.decode("updated")?,
            published: c.decode("published")?,
            links: c.decode_many("link")?,
            authors: c.decode_many("author")?,
            contributors: c.decode_many("contributor")?,
            categories: c.decode_many("category")?,
            summary: c.decode("summary")?,
            content: c.decode("content")?,
            rights: c.decode("rights")?,
        })
    }
}

impl Entry {
    pub fn alternate_link(&self) -> Option<&Link> {
        alternate(&self.links)
    }
}

fn alternate(links: &[Link]) -> Option<&Link> {
    links
        .iter()
        .find(|l| l.rel.as_deref().map_or(true, |rel| rel == "alternate"))
        .or_else(|| links.first())
}

/// `<link href=".." rel=".." type=".."/>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub href: String,
    pub rel: Option<String>,
    pub mime_type: Option<String>,
    pub hreflang: Option<String>,
    pub title: Option<String>,
    pub length: Option<u64>,
}

impl Decode for Link {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
        let c = decoder.keyed()?;
        Ok(Self {
            href: c.decode("href")?,
            rel: c.decode("rel")?,
            mime_type: c.decode("type")?,
            hreflang: c.decode("hreflang")?,
            title: c.decode("title")?,
            length: c.decode("length")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub name: String,
    pub email: Option<String>,
    pub uri: Option<String>,
}

impl Decode for Person {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
        let c = decoder.keyed()?;
        Ok(Self {
            name: c.decode("name")?,
            email: c.decode("email")?,
            uri: c.decode("uri")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub term: String,
    pub scheme: Option<String>,
    pub label: Option<String>,
}

impl Decode for Category {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
        let c = decoder.keyed()?;
        Ok(Self {
            term: c.decode("term")?,
            scheme: c.decode("scheme")?,
            label: c.decode("label")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextType {
    Text,
    Html,
    Xhtml,
    /// A MIME type, allowed on `content`.
    Other(String),
}

impl From<&str> for TextType {
    fn from(value: &str) -> Self {
        match value {
            "text" => Self::Text,
            "html" => Self::Html,
            "xhtml" => Self::Xhtml,
            other => Self::Other(other.to_string()),
        }
    }
}

/// An Atom text construct.
///
/// Inline XHTML has no markup serializer behind it here; its character
/// data is collected in document order. The value tree trims every text
/// run, so the runs are joined with single spaces. This is lossy: inline
/// markup such as `foo<b>bar</b>` reads as `foo bar`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    pub kind: TextType,
    pub value: String,
    /// Out-of-line content (`<content src=".."/>`).
    pub src: Option<String>,
}

impl Decode for Text {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
        let c = decoder.keyed()?;
        let kind = c
            .decode::<Option<String>>("type")?
            .map_or(TextType::Text, |t| TextType::from(t.trim()));
        let value = match decoder.as_xml() {
            Some(node) if node.child_elements().next().is_some() => {
                let mut out = String::new();
                collect_text(node, &mut out);
                out
            }
            _ => decoder.decode()?,
        };
        Ok(Self {
            kind,
            value,
            src: c.decode("src")?,
        })
    }
}

/// Appends the text runs under `node`, one space between runs.
fn collect_text(node: XmlNodeRef<'_>, out: &mut String) {
    for child in node.children() {
        match child.kind() {
            XmlNodeKind::Text(text) => {
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(text);
            }
            XmlNodeKind::Element(_) => collect_text(child, out),
            _ => {}
        }
    }
}
