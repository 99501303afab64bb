use anyhow::{bail, Context, Result};
use sha2::{Digest, Sha256};

use super::atom::{AtomFeed, Entry};
use super::json_feed::{JsonFeed, JsonFeedItem};
use super::rdf::{RdfDocument, RdfItem};
use super::rss::{Item, RssDocument};
use crate::decoder::{decode_json, decode_xml};
use crate::options::DecoderOptions;
use crate::value::{parse_json_slice, parse_xml};

/// A decoded feed document of any supported format.
#[derive(Debug, Clone, PartialEq)]
pub enum Feed {
    Rss(RssDocument),
    Atom(AtomFeed),
    Rdf(RdfDocument),
    Json(JsonFeed),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedArticle {
    pub guid: String,
    pub title: String,
    pub url: Option<String>,
    pub published: Option<i64>,
    pub summary: Option<String>,
}

/// Detects the format of `bytes` and decodes it.
///
/// Input starting with `{` is JSON Feed; anything else is XML, dispatched
/// on the root element (`rss`, `feed`, `rdf:RDF`).
pub fn parse(bytes: &[u8]) -> Result<Feed> {
    let text = std::str::from_utf8(bytes).context("Feed is not valid UTF-8")?;
    let text = text.trim_start_matches('\u{feff}').trim_start();

    if text.starts_with('{') {
        let value = parse_json_slice(text.as_bytes()).context("Failed to parse JSON feed")?;
        let feed = decode_json(&value, &JsonFeed::options()).context("Invalid JSON feed")?;
        return Ok(Feed::Json(feed));
    }

    let doc = parse_xml(text).context("Failed to parse XML feed")?;
    let options = DecoderOptions::default();
    let root = doc.root();
    let element = root
        .as_element()
        .context("Feed document has no root element")?;
    tracing::debug!(root = %element.name, "Detected XML feed root");

    let feed = match (element.prefix(), element.local_name()) {
        (None, "rss") => Feed::Rss(decode_xml(&doc, &options).context("Invalid RSS feed")?),
        (None, "feed") => Feed::Atom(decode_xml(&doc, &options).context("Invalid Atom feed")?),
        (Some(_), "RDF") => Feed::Rdf(decode_xml(&doc, &options).context("Invalid RDF feed")?),
        _ => bail!("Unrecognized feed root element <{}>", element.name),
    };
    Ok(feed)
}

pub fn parse_feed(bytes: &[u8]) -> Result<Vec<ParsedArticle>> {
    let feed = parse(bytes)?;
    let articles = feed.into_articles();
    tracing::debug!(count = articles.len(), "Parsed feed articles");
    Ok(articles)
}

impl Feed {
    /// Flattens the feed's entries into format-independent articles.
    ///
    /// Entries with no title, link or text at all carry nothing to show and
    /// are skipped.
    pub fn into_articles(self) -> Vec<ParsedArticle> {
        match self {
            Feed::Rss(doc) => doc.channel.items.into_iter().filter_map(rss_article).collect(),
            Feed::Atom(feed) => feed.entries.into_iter().filter_map(atom_article).collect(),
            Feed::Rdf(doc) => doc.items.into_iter().filter_map(rdf_article).collect(),
            Feed::Json(feed) => feed.items.into_iter().filter_map(json_article).collect(),
        }
    }
}

fn article(
    existing_id: Option<&str>,
    title: Option<String>,
    url: Option<String>,
    published: Option<i64>,
    summary: Option<String>,
) -> Option<ParsedArticle> {
    let title = title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    if title.is_none() && url.is_none() && summary.is_none() {
        tracing::warn!(id = existing_id.unwrap_or(""), "Skipping feed entry with no content");
        return None;
    }
    let title = title.unwrap_or_else(|| "Untitled".to_string());
    let guid = generate_guid(existing_id, url.as_deref(), &title, published);

    Some(ParsedArticle {
        guid,
        title,
        url,
        published,
        summary,
    })
}

fn rss_article(item: Item) -> Option<ParsedArticle> {
    let dc = item.dublin_core.unwrap_or_default();
    let url = item.link.or_else(|| {
        item.guid
            .as_ref()
            .filter(|g| g.is_perma_link)
            .map(|g| g.value.clone())
    });
    let published = item.pub_date.or(dc.date).map(|dt| dt.timestamp());
    let summary = item.description.or(item.content).or(dc.description);
    let existing_id = item.guid.as_ref().map(|g| g.value.as_str());

    article(existing_id, item.title.or(dc.title), url, published, summary)
}

fn atom_article(entry: Entry) -> Option<ParsedArticle> {
    let url = entry.alternate_link().map(|l| l.href.clone());
    let published = entry
        .published
        .or(entry.updated)
        .map(|dt| dt.timestamp());
    let summary = entry
        .summary
        .map(|s| s.value)
        .or_else(|| entry.content.map(|c| c.value));

    article(
        Some(entry.id.as_str()),
        entry.title.map(|t| t.value),
        url,
        published,
        summary,
    )
}

fn rdf_article(item: RdfItem) -> Option<ParsedArticle> {
    let dc = item.dublin_core.unwrap_or_default();
    let published = dc.date.map(|dt| dt.timestamp());
    let summary = item.description.or(item.content).or(dc.description);

    article(
        item.about.as_deref(),
        item.title.or(dc.title),
        item.link,
        published,
        summary,
    )
}

fn json_article(item: JsonFeedItem) -> Option<ParsedArticle> {
    let url = item.url.or(item.external_url);
    let published = item
        .date_published
        .or(item.date_modified)
        .map(|dt| dt.timestamp());
    let summary = item
        .summary
        .or(item.content_text)
        .or(item.content_html);

    article(Some(item.id.as_str()), item.title, url, published, summary)
}

fn generate_guid(
    existing: Option<&str>,
    url: Option<&str>,
    title: &str,
    published: Option<i64>,
) -> String {
    if let Some(guid) = existing {
        let trimmed = guid.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let input = format!(
        "{}|{}|{}",
        url.unwrap_or(""),
        title,
        published.map(|p| p.to_string()).unwrap_or_default()
    );
    let hash = Sha256::digest(input.as_bytes());
    format!("{:x}", hash)
}
