//! Feed schemas built on the decoding engine.
//!
//! Each supported format is a set of plain data types implementing
//! [`Decode`](crate::Decode):
//!
//! - [`rss`] - RSS 2.0 channels and items
//! - [`atom`] - Atom 1.0 feeds and entries
//! - [`rdf`] - RSS 1.0, where items sit beside the channel
//! - [`json_feed`] - JSON Feed 1.x
//! - [`dublin_core`] and [`media`] - namespace extensions shared by the
//!   XML formats
//!
//! [`parse_feed`] detects the format of raw bytes and flattens whatever it
//! finds into [`ParsedArticle`]s.
//!
//! # Example
//!
//! ```ignore
//! use skim_decode::feed::parse_feed;
//!
//! let articles = parse_feed(&bytes)?;
//! for article in articles {
//!     println!("{} {}", article.guid, article.title);
//! }
//! ```

pub mod atom;
pub mod dublin_core;
pub mod json_feed;
pub mod media;
pub mod rdf;
pub mod rss;

mod parser;

pub use parser::{parse, parse_feed, Feed, ParsedArticle};
