//! RSS 2.0 (and the 0.9x dialects it grew out of).

use chrono::{DateTime, FixedOffset};
use url::Url;

use super::dublin_core::DublinCore;
use super::media::{self, MediaContent};
use crate::decoder::{Decode, Decoder};
use crate::error::DecodeError;

/// `<rss version="2.0"><channel>..</channel></rss>`
#[derive(Debug, Clone, PartialEq)]
pub struct RssDocument {
    pub version: Option<String>,
    pub channel: Channel,
}

impl Decode for RssDocument {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
        let c = decoder.keyed()?;
        Ok(Self {
            version: c.decode("version")?,
            channel: c.decode("channel")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub title: String,
    pub link: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub copyright: Option<String>,
    pub managing_editor: Option<String>,
    pub web_master: Option<String>,
    pub pub_date: Option<DateTime<FixedOffset>>,
    pub last_build_date: Option<DateTime<FixedOffset>>,
    pub categories: Vec<Category>,
    pub generator: Option<String>,
    pub docs: Option<String>,
    pub ttl: Option<u32>,
    pub image: Option<Image>,
    pub items: Vec<Item>,
    pub dublin_core: Option<DublinCore>,
}

impl Decode for Channel {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
        let c = decoder.keyed()?;
        Ok(Self {
            title: c.decode("title")?,
            link: c.decode("link")?,
            description: c.decode("description")?,
            language: c.decode("language")?,
            copyright: c.decode("copyright")?,
            managing_editor: c.decode("managingEditor")?,
            web_master: c.decode("webMaster")?,
            pub_date: c.decode("pubDate")?,
            last_build_date: c.decode("lastBuildDate")?,
            categories: c.decode_many("category")?,
            generator: c.decode("generator")?,
            docs: c.decode("docs")?,
            ttl: c.decode("ttl")?,
            image: c.decode("image")?,
            items: c.decode_many("item")?,
            dublin_core: DublinCore::read(&c)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub categories: Vec<Category>,
    pub comments: Option<String>,
    pub enclosures: Vec<Enclosure>,
    pub guid: Option<Guid>,
    pub pub_date: Option<DateTime<FixedOffset>>,
    /// `content:encoded`, the full article body most feeds ship.
    pub content: Option<String>,
    pub dublin_core: Option<DublinCore>,
    pub media: Vec<MediaContent>,
}

impl Decode for Item {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
        let c = decoder.keyed()?;
        let content = match c.namespaced_if_declared("content") {
            Some(ns) => ns.decode("encoded")?,
            None => None,
        };
        Ok(Self {
            title: c.decode("title")?,
            link: c.decode("link")?,
            description: c.decode("description")?,
            author: c.decode("author")?,
            categories: c.decode_many("category")?,
            comments: c.decode("comments")?,
            enclosures: c.decode_many("enclosure")?,
            guid: c.decode("guid")?,
            pub_date: c.decode("pubDate")?,
            content,
            dublin_core: DublinCore::read(&c)?,
            media: media::read_contents(&c)?,
        })
    }
}

/// `<guid isPermaLink="false">..</guid>`. Permalink unless stated otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guid {
    pub value: String,
    pub is_perma_link: bool,
}

impl Decode for Guid {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
        let c = decoder.keyed()?;
        Ok(Self {
            value: decoder.decode()?,
            is_perma_link: c.decode::<Option<bool>>("isPermaLink")?.unwrap_or(true),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enclosure {
    pub url: Url,
    pub length: Option<u64>,
    pub mime_type: Option<String>,
}

impl Decode for Enclosure {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
        let c = decoder.keyed()?;
        Ok(Self {
            url: c.decode("url")?,
            length: c.decode("length")?,
            mime_type: c.decode("type")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub domain: Option<String>,
}

impl Decode for Category {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
        let c = decoder.keyed()?;
        Ok(Self {
            name: decoder.decode()?,
            domain: c.decode("domain")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub url: Url,
    pub title: Option<String>,
    pub link: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub description: Option<String>,
}

impl Decode for Image {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
        let c = decoder.keyed()?;
        Ok(Self {
            url: c.decode("url")?,
            title: c.decode("title")?,
            link: c.decode("link")?,
            width: c.decode("width")?,
            height: c.decode("height")?,
            description: c.decode("description")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode_xml_str;
    use crate::error::{DecodeErrorKind, PathSegment};
    use crate::options::DecoderOptions;
    use pretty_assertions::assert_eq;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/">
  <channel>
    <title>Example</title>
    <link>https://example.com/</link>
    <description>An example feed</description>
    <ttl>60</ttl>
    <category>tech</category>
    <image>
      <url>https://example.com/logo.png</url>
      <title>Example</title>
    </image>
    <item>
      <title>First</title>
      <link>https://example.com/1</link>
      <guid isPermaLink="false">id-1</guid>
      <pubDate>Tue, 02 Jan 2024 03:04:05 +0000</pubDate>
      <category domain="tags">rust</category>
      <category>xml</category>
      <content:encoded><![CDATA[<p>Body</p>]]></content:encoded>
    </item>
    <item>
      <title>Second</title>
      <enclosure url="https://example.com/2.mp3" length="1234" type="audio/mpeg"/>
      <guid>https://example.com/2</guid>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_decode_rss() {
        let doc: RssDocument = decode_xml_str(FEED, &DecoderOptions::default()).unwrap();
        assert_eq!(doc.version.as_deref(), Some("2.0"));

        let channel = &doc.channel;
        assert_eq!(channel.title, "Example");
        assert_eq!(channel.ttl, Some(60));
        assert_eq!(
            channel.categories,
            vec![Category {
                name: "tech".to_string(),
                domain: None
            }]
        );
        assert_eq!(
            channel.image.as_ref().unwrap().url.as_str(),
            "https://example.com/logo.png"
        );
        assert_eq!(channel.items.len(), 2);

        let first = &channel.items[0];
        assert_eq!(first.title.as_deref(), Some("First"));
        assert_eq!(
            first.guid,
            Some(Guid {
                value: "id-1".to_string(),
                is_perma_link: false
            })
        );
        assert_eq!(first.pub_date.unwrap().timestamp(), 1704164645);
        assert_eq!(first.categories.len(), 2);
        assert_eq!(first.categories[0].domain.as_deref(), Some("tags"));
        assert_eq!(first.content.as_deref(), Some("<p>Body</p>"));
        assert!(first.enclosures.is_empty());

        let second = &channel.items[1];
        assert!(second.guid.as_ref().unwrap().is_perma_link);
        assert_eq!(second.enclosures[0].length, Some(1234));
        assert_eq!(second.enclosures[0].mime_type.as_deref(), Some("audio/mpeg"));
        assert_eq!(second.content, None);
    }

    #[test]
    fn test_single_item_channel_still_yields_a_list() {
        let doc: RssDocument = decode_xml_str(
            "<rss><channel><title>t</title><item><title>only</title></item></channel></rss>",
            &DecoderOptions::default(),
        )
        .unwrap();
        assert_eq!(doc.channel.items.len(), 1);
    }

    #[test]
    fn test_error_path_points_at_item() {
        let err = decode_xml_str::<RssDocument>(
            "<rss><channel><title>t</title><item/><item><ttl>x</ttl><pubDate>nope</pubDate></item></channel></rss>",
            &DecoderOptions::default(),
        )
        .unwrap_err();
        let crate::Error::Decode(err) = err else {
            panic!("expected a decode error");
        };
        assert_eq!(err.kind(), DecodeErrorKind::ValueCorrupted);
        assert_eq!(
            err.path().segments(),
            &[
                PathSegment::key("channel"),
                PathSegment::key("item"),
                PathSegment::Index(1),
                PathSegment::key("pubDate"),
            ]
        );
    }

    #[test]
    fn test_missing_channel_title() {
        let err = decode_xml_str::<RssDocument>(
            "<rss><channel><link>x</link></channel></rss>",
            &DecoderOptions::default(),
        )
        .unwrap_err();
        let crate::Error::Decode(err) = err else {
            panic!("expected a decode error");
        };
        assert_eq!(err.kind(), DecodeErrorKind::KeyNotFound);
        assert_eq!(err.path().keys(), vec!["channel", "title"]);
    }
}
