//! Media RSS (`media:` namespace) subset: content objects and thumbnails.

use url::Url;

use crate::decoder::{Decode, Decoder, KeyedContainer};
use crate::error::DecodeError;

pub const PREFIX: &str = "media";

/// `<media:thumbnail url=".." width=".." height=".."/>`
#[derive(Debug, Clone, PartialEq)]
pub struct MediaThumbnail {
    pub url: Url,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Decode for MediaThumbnail {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
        let c = decoder.keyed()?;
        Ok(Self {
            url: c.decode("url")?,
            width: c.decode("width")?,
            height: c.decode("height")?,
        })
    }
}

/// `<media:content>`. The object's own properties are plain attributes;
/// its optional children are `media:` elements.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaContent {
    pub url: Option<Url>,
    pub mime_type: Option<String>,
    pub medium: Option<String>,
    pub file_size: Option<u64>,
    pub duration: Option<u32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub is_default: bool,
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnails: Vec<MediaThumbnail>,
}

impl Decode for MediaContent {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
        let c = decoder.keyed()?;
        let media = c.namespaced(PREFIX)?;
        Ok(Self {
            url: c.decode("url")?,
            mime_type: c.decode("type")?,
            medium: c.decode("medium")?,
            file_size: c.decode("fileSize")?,
            duration: c.decode("duration")?,
            width: c.decode("width")?,
            height: c.decode("height")?,
            is_default: c.decode::<Option<bool>>("isDefault")?.unwrap_or(false),
            title: media.decode("title")?,
            description: media.decode("description")?,
            thumbnails: media.decode_many("thumbnail")?,
        })
    }
}

/// `<media:group>`: alternate encodings of one media object.
struct MediaGroup {
    contents: Vec<MediaContent>,
}

impl Decode for MediaGroup {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
        let media = decoder.keyed()?.namespaced(PREFIX)?;
        Ok(Self {
            contents: media.decode_many("content")?,
        })
    }
}

/// Every `media:content` under `parent`, including those wrapped in any
/// number of `media:group` elements. Empty when the prefix is not declared.
pub fn read_contents(parent: &KeyedContainer<'_>) -> Result<Vec<MediaContent>, DecodeError> {
    let Some(media) = parent.namespaced_if_declared(PREFIX) else {
        return Ok(Vec::new());
    };
    let mut contents: Vec<MediaContent> = media.decode_many("content")?;
    for group in media.decode_many::<MediaGroup>("group")? {
        contents.extend(group.contents);
    }
    Ok(contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::DecoderOptions;
    use crate::value::parse_xml;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_read_contents() {
        let doc = parse_xml(
            r#"<item xmlns:media="http://search.yahoo.com/mrss/">
                 <media:content url="https://example.com/a.jpg" type="image/jpeg" width="640" isDefault="true">
                   <media:title>A</media:title>
                   <media:thumbnail url="https://example.com/a_small.jpg" width="64"/>
                 </media:content>
                 <media:group>
                   <media:content url="https://example.com/b.mp4" medium="video" fileSize="1024"/>
                 </media:group>
               </item>"#,
        )
        .unwrap();
        let options = DecoderOptions::default();
        let item = Decoder::xml(doc.root(), &options).keyed().unwrap();

        let contents = read_contents(&item).unwrap();
        assert_eq!(contents.len(), 2);

        let first = &contents[0];
        assert_eq!(first.url.as_ref().unwrap().as_str(), "https://example.com/a.jpg");
        assert_eq!(first.mime_type.as_deref(), Some("image/jpeg"));
        assert_eq!(first.width, Some(640));
        assert!(first.is_default);
        assert_eq!(first.title.as_deref(), Some("A"));
        assert_eq!(first.thumbnails.len(), 1);
        assert_eq!(first.thumbnails[0].width, Some(64));

        let second = &contents[1];
        assert_eq!(second.medium.as_deref(), Some("video"));
        assert_eq!(second.file_size, Some(1024));
        assert!(!second.is_default);
        assert!(second.thumbnails.is_empty());
    }

    #[test]
    fn test_every_group_is_read() {
        let doc = parse_xml(
            r#"<item xmlns:media="http://search.yahoo.com/mrss/">
                 <media:group>
                   <media:content url="https://example.com/a.mp4"/>
                   <media:content url="https://example.com/a.webm"/>
                 </media:group>
                 <media:group>
                   <media:content url="https://example.com/b.mp3"/>
                 </media:group>
               </item>"#,
        )
        .unwrap();
        let options = DecoderOptions::default();
        let item = Decoder::xml(doc.root(), &options).keyed().unwrap();

        let urls: Vec<_> = read_contents(&item)
            .unwrap()
            .into_iter()
            .map(|c| c.url.unwrap().to_string())
            .collect();
        assert_eq!(
            urls,
            vec![
                "https://example.com/a.mp4",
                "https://example.com/a.webm",
                "https://example.com/b.mp3",
            ]
        );
    }

    #[test]
    fn test_no_media_namespace() {
        let doc = parse_xml("<item><title>t</title></item>").unwrap();
        let options = DecoderOptions::default();
        let item = Decoder::xml(doc.root(), &options).keyed().unwrap();
        assert!(read_contents(&item).unwrap().is_empty());
    }
}
