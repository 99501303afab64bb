//! Decoding policies shared by every container of a decode call.
//!
//! A [`DecoderOptions`] value is built once by the caller and passed by
//! reference into [`crate::decode_json`] / [`crate::decode_xml`]. Nothing in
//! the engine mutates it, so one set of options can serve any number of
//! concurrent decode calls.

use chrono::{DateTime, FixedOffset};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::decoder::Decoder;
use crate::error::DecodeError;

/// Caller-supplied date decoder.
pub type DateDecodeFn =
    dyn Fn(&Decoder<'_>) -> Result<DateTime<FixedOffset>, DecodeError> + Send + Sync;

/// Caller-supplied binary data decoder.
pub type DataDecodeFn = dyn Fn(&Decoder<'_>) -> Result<Vec<u8>, DecodeError> + Send + Sync;

/// Caller-supplied key mapping, applied to every key found in the tree.
pub type KeyMapFn = dyn Fn(&str) -> String + Send + Sync;

// ============================================================================
// Strategies
// ============================================================================

/// How date values are read.
#[derive(Clone, Default)]
pub enum DateStrategy {
    /// Feed-native text dates: RFC 3339 first, then RFC 2822.
    #[default]
    DeferredToNative,
    /// A (possibly fractional) number of seconds since the Unix epoch.
    SecondsSinceEpoch,
    /// A (possibly fractional) number of milliseconds since the Unix epoch.
    MillisecondsSinceEpoch,
    /// RFC 3339 / ISO 8601 text.
    Iso8601,
    /// A chrono `strftime`-style format string.
    Formatted(String),
    Custom(Arc<DateDecodeFn>),
}

/// How binary data values are read.
#[derive(Clone, Default)]
pub enum DataStrategy {
    /// A sequence of byte-sized integers.
    DeferredToNative,
    /// Standard base64 text.
    #[default]
    Base64,
    Custom(Arc<DataDecodeFn>),
}

/// How keys found in the tree are normalized before being matched against
/// the keys a schema asks for.
#[derive(Clone, Default)]
pub enum KeyStrategy {
    #[default]
    UseAsIs,
    /// `snake_case_key` in the tree matches a request for `snakeCaseKey`.
    ConvertFromSnakeCase,
    Custom(Arc<KeyMapFn>),
}

/// How textual stand-ins for non-finite floats are treated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NonConformingFloatStrategy {
    /// Non-finite values are a type mismatch.
    #[default]
    Throw,
    /// Exact matches of these literals decode to the corresponding value.
    ConvertFromString {
        positive_infinity: String,
        negative_infinity: String,
        nan: String,
    },
}

impl fmt::Debug for DateStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeferredToNative => f.write_str("DeferredToNative"),
            Self::SecondsSinceEpoch => f.write_str("SecondsSinceEpoch"),
            Self::MillisecondsSinceEpoch => f.write_str("MillisecondsSinceEpoch"),
            Self::Iso8601 => f.write_str("Iso8601"),
            Self::Formatted(fmt_str) => f.debug_tuple("Formatted").field(fmt_str).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl fmt::Debug for DataStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeferredToNative => f.write_str("DeferredToNative"),
            Self::Base64 => f.write_str("Base64"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl fmt::Debug for KeyStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UseAsIs => f.write_str("UseAsIs"),
            Self::ConvertFromSnakeCase => f.write_str("ConvertFromSnakeCase"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl KeyStrategy {
    /// Maps a key as it appears in the tree to the form schemas ask for.
    pub fn convert<'k>(&self, key: &'k str) -> Cow<'k, str> {
        match self {
            Self::UseAsIs => Cow::Borrowed(key),
            Self::ConvertFromSnakeCase => snake_to_camel(key),
            Self::Custom(map) => Cow::Owned(map(key)),
        }
    }
}

/// Converts `snake_case` to `camelCase`.
///
/// Leading and trailing underscores are kept. Keys without an inner
/// underscore come back unchanged, which makes the conversion idempotent.
pub fn snake_to_camel(key: &str) -> Cow<'_, str> {
    let Some(start) = key.find(|c: char| c != '_') else {
        return Cow::Borrowed(key);
    };
    let Some(last) = key.rfind(|c: char| c != '_') else {
        return Cow::Borrowed(key);
    };
    let end = last + key[last..].chars().next().map_or(0, char::len_utf8);

    let middle = &key[start..end];
    if !middle.contains('_') {
        return Cow::Borrowed(key);
    }

    let mut out = String::with_capacity(key.len());
    out.push_str(&key[..start]);
    let mut components = middle.split('_').filter(|c| !c.is_empty());
    if let Some(first) = components.next() {
        out.push_str(&first.to_lowercase());
    }
    for component in components {
        let mut chars = component.chars();
        if let Some(head) = chars.next() {
            out.extend(head.to_uppercase());
            out.push_str(&chars.as_str().to_lowercase());
        }
    }
    out.push_str(&key[end..]);
    Cow::Owned(out)
}

// ============================================================================
// Options
// ============================================================================

/// The full strategy set for one or more decode calls.
#[derive(Debug, Clone, Default)]
pub struct DecoderOptions {
    pub date: DateStrategy,
    pub data: DataStrategy,
    pub non_conforming_float: NonConformingFloatStrategy,
    pub keys: KeyStrategy,
}

impl DecoderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_date_strategy(mut self, strategy: DateStrategy) -> Self {
        self.date = strategy;
        self
    }

    pub fn with_data_strategy(mut self, strategy: DataStrategy) -> Self {
        self.data = strategy;
        self
    }

    pub fn with_non_conforming_float_strategy(
        mut self,
        strategy: NonConformingFloatStrategy,
    ) -> Self {
        self.non_conforming_float = strategy;
        self
    }

    pub fn with_key_strategy(mut self, strategy: KeyStrategy) -> Self {
        self.keys = strategy;
        self
    }

    /// Installs a custom date decoder.
    pub fn with_custom_date<F>(self, f: F) -> Self
    where
        F: Fn(&Decoder<'_>) -> Result<DateTime<FixedOffset>, DecodeError> + Send + Sync + 'static,
    {
        self.with_date_strategy(DateStrategy::Custom(Arc::new(f)))
    }

    /// Installs a custom binary data decoder.
    pub fn with_custom_data<F>(self, f: F) -> Self
    where
        F: Fn(&Decoder<'_>) -> Result<Vec<u8>, DecodeError> + Send + Sync + 'static,
    {
        self.with_data_strategy(DataStrategy::Custom(Arc::new(f)))
    }

    /// Installs a custom key mapping.
    pub fn with_custom_keys<F>(self, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.with_key_strategy(KeyStrategy::Custom(Arc::new(f)))
    }
}
