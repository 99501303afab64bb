//! JSON Feed 1.0 / 1.1.
//!
//! The format's keys are `snake_case`; these types ask for the `camelCase`
//! form, so they must be decoded with [`KeyStrategy::ConvertFromSnakeCase`].
//! [`JsonFeed::options`] returns options set up that way.

use chrono::{DateTime, FixedOffset};
use url::Url;

use crate::decoder::{Decode, Decoder, KeyedContainer};
use crate::error::DecodeError;
use crate::options::{DecoderOptions, KeyStrategy};

#[derive(Debug, Clone, PartialEq)]
pub struct JsonFeed {
    pub version: String,
    pub title: String,
    pub home_page_url: Option<Url>,
    pub feed_url: Option<Url>,
    pub description: Option<String>,
    pub user_comment: Option<String>,
    pub next_url: Option<Url>,
    pub icon: Option<Url>,
    pub favicon: Option<Url>,
    pub authors: Vec<Author>,
    pub language: Option<String>,
    pub expired: bool,
    pub items: Vec<JsonFeedItem>,
}

impl JsonFeed {
    /// Options under which the feed's `snake_case` keys resolve.
    pub fn options() -> DecoderOptions {
        DecoderOptions::default().with_key_strategy(KeyStrategy::ConvertFromSnakeCase)
    }
}

/// Version 1.1 replaced `author` with `authors`; both are read.
fn authors(c: &KeyedContainer<'_>) -> Result<Vec<Author>, DecodeError> {
    let mut authors: Vec<Author> = c.decode_many("authors")?;
    if authors.is_empty() {
        authors.extend(c.decode::<Option<Author>>("author")?);
    }
    Ok(authors)
}

impl Decode for JsonFeed {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
        let c = decoder.keyed()?;
        let version: String = c.decode("version")?;
        if !version.starts_with("https://jsonfeed.org/version/") {
            return Err(decoder.corrupted(format!("unsupported JSON Feed version {:?}", version)));
        }
        Ok(Self {
            version,
            title: c.decode("title")?,
            home_page_url: c.decode("homePageUrl")?,
            feed_url: c.decode("feedUrl")?,
            description: c.decode("description")?,
            user_comment: c.decode("userComment")?,
            next_url: c.decode("nextUrl")?,
            icon: c.decode("icon")?,
            favicon: c.decode("favicon")?,
            authors: authors(&c)?,
            language: c.decode("language")?,
            expired: c.decode::<Option<bool>>("expired")?.unwrap_or(false),
            items: c.decode_many("items")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JsonFeedItem {
    pub id: String,
    pub url: Option<String>,
    pub external_url: Option<String>,
    pub title: Option<String>,
    pub content_html: Option<String>,
    pub content_text: Option<String>,
    pub summary: Option<String>,
    pub image: Option<Url>,
    pub banner_image: Option<Url>,
    pub date_published: Option<DateTime<FixedOffset>>,
    pub date_modified: Option<DateTime<FixedOffset>>,
    pub authors: Vec<Author>,
    pub tags: Vec<String>,
    pub language: Option<String>,
    pub attachments: Vec<Attachment>,
}

impl Decode for JsonFeedItem {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
        let c = decoder.keyed()?;
        Ok(Self {
            id: c.decode("id")?,
            url: c.decode("url")?,
            external_url: c.decode("externalUrl")?,
            title: c.decode("title")?,
            content_html: c.decode("contentHtml")?,
            content_text: c.decode("contentText")?,
            summary: c.decode("summary")?,
            image: c.decode("image")?,
            banner_image: c.decode("bannerImage")?,
            date_published: c.decode("datePublished")?,
            date_modified: c.decode("dateModified")?,
            authors: authors(&c)?,
            tags: c.decode_many("tags")?,
            language: c.decode("language")?,
            attachments: c.decode_many("attachments")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Author {
    pub name: Option<String>,
    pub url: Option<String>,
    pub avatar: Option<Url>,
}

impl Decode for Author {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
        let c = decoder.keyed()?;
        Ok(Self {
            name: c.decode("name")?,
            url: c.decode("url")?,
            avatar: c.decode("avatar")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub url: Url,
    pub mime_type: String,
    pub title: Option<String>,
    pub size_in_bytes: Option<u64>,
    pub duration_in_seconds: Option<f64>,
}

impl Decode for Attachment {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
        let c = decoder.keyed()?;
        Ok(Self {
            url: c.decode("url")?,
            mime_type: c.decode("mimeType")?,
            title: c.decode("title")?,
            size_in_bytes: c.decode("sizeInBytes")?,
            duration_in_seconds: c.decode("durationInSeconds")?,
        })
    }
}
