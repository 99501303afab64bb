//! [`Decode`] implementations for primitives, standard containers and the
//! well-known types that need policy rather than structure.
//!
//! Dates, binary data, URLs and string-keyed maps are resolved here before a
//! schema type ever sees them. Dates and data consult the active
//! [`DateStrategy`] / [`DataStrategy`]; everything else is structural.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use url::Url;

use crate::coerce;
use crate::decoder::{Decode, Decoder};
use crate::error::DecodeError;
use crate::options::{DataStrategy, DateStrategy};

// ============================================================================
// Primitives
// ============================================================================

impl Decode for bool {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
        let single = decoder.single_value()?;
        coerce::to_bool(&single.leaf(), single.path())
    }
}

impl Decode for String {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
        let single = decoder.single_value()?;
        coerce::to_string(&single.leaf(), single.path())
    }
}

impl Decode for char {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
        let single = decoder.single_value()?;
        coerce::to_char(&single.leaf(), single.path())
    }
}

macro_rules! decode_integer {
    ($($t:ty),*) => {
        $(impl Decode for $t {
            fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
                let single = decoder.single_value()?;
                coerce::to_integer(&single.leaf(), single.path())
            }
        })*
    };
}

decode_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! decode_float {
    ($($t:ty),*) => {
        $(impl Decode for $t {
            fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
                let single = decoder.single_value()?;
                coerce::to_float(
                    &single.leaf(),
                    &single.options().non_conforming_float,
                    single.path(),
                )
            }
        })*
    };
}

decode_float!(f32, f64);

// ============================================================================
// Containers
// ============================================================================

impl<T: Decode> Decode for Option<T> {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
        if decoder.is_null() {
            return Ok(None);
        }
        T::decode(decoder).map(Some)
    }

    fn decode_absent() -> Option<Self> {
        Some(None)
    }
}

impl<T: Decode> Decode for Box<T> {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
        T::decode(decoder).map(Box::new)
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
        let mut list = decoder.unkeyed()?;
        let mut out = Vec::with_capacity(list.count().unwrap_or(0));
        while !list.is_at_end() {
            out.push(list.decode_next()?);
        }
        Ok(out)
    }
}

impl<T: Decode> Decode for HashMap<String, T> {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
        let keyed = decoder.keyed()?;
        keyed
            .all_keys()
            .into_iter()
            .map(|key| -> Result<(String, T), DecodeError> {
                let value = keyed.decode(&key)?;
                Ok((key, value))
            })
            .collect()
    }
}

impl<T: Decode> Decode for BTreeMap<String, T> {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
        let keyed = decoder.keyed()?;
        keyed
            .all_keys()
            .into_iter()
            .map(|key| -> Result<(String, T), DecodeError> {
                let value = keyed.decode(&key)?;
                Ok((key, value))
            })
            .collect()
    }
}

// ============================================================================
// Dates
// ============================================================================

/// Feed dates come as RFC 3339 (Atom, JSON Feed, Dublin Core) or RFC 2822
/// (RSS 2.0).
fn parse_native_date(text: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(text)
        .or_else(|_| DateTime::parse_from_rfc2822(text))
        .ok()
}

fn parse_formatted_date(text: &str, format: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(text, format)
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(text, format)
                .ok()
                .map(|naive| naive.and_utc().fixed_offset())
        })
}

fn date_from_epoch(
    decoder: &Decoder<'_>,
    value: f64,
    units_per_second: i64,
) -> Result<DateTime<FixedOffset>, DecodeError> {
    const NANOS_PER_SECOND: i64 = 1_000_000_000;
    let out_of_range = || decoder.corrupted(format!("timestamp {} is out of range", value));

    let whole = value.floor();
    if !value.is_finite() || whole < i64::MIN as f64 || whole >= i64::MAX as f64 {
        return Err(out_of_range());
    }
    let whole_units = whole as i64;
    let nanos_per_unit = NANOS_PER_SECOND / units_per_second;
    let fraction_nanos = ((value - whole) * nanos_per_unit as f64).round() as i64;
    let nanos = whole_units.rem_euclid(units_per_second) * nanos_per_unit + fraction_nanos;

    let secs = whole_units.div_euclid(units_per_second) + nanos.div_euclid(NANOS_PER_SECOND);
    let nanos = nanos.rem_euclid(NANOS_PER_SECOND) as u32;
    DateTime::from_timestamp(secs, nanos)
        .map(|dt| dt.fixed_offset())
        .ok_or_else(out_of_range)
}

fn decode_date(decoder: &Decoder<'_>) -> Result<DateTime<FixedOffset>, DecodeError> {
    match &decoder.options().date {
        DateStrategy::DeferredToNative => {
            let text = String::decode(decoder)?;
            parse_native_date(text.trim()).ok_or_else(|| {
                decoder.corrupted(format!(
                    "expected an RFC 3339 or RFC 2822 date, found {:?}",
                    text
                ))
            })
        }
        DateStrategy::SecondsSinceEpoch => {
            let value = f64::decode(decoder)?;
            date_from_epoch(decoder, value, 1)
        }
        DateStrategy::MillisecondsSinceEpoch => {
            let value = f64::decode(decoder)?;
            date_from_epoch(decoder, value, 1000)
        }
        DateStrategy::Iso8601 => {
            let text = String::decode(decoder)?;
            DateTime::parse_from_rfc3339(text.trim()).map_err(|e| {
                decoder.corrupted(format!("expected an ISO 8601 date, found {:?}: {}", text, e))
            })
        }
        DateStrategy::Formatted(format) => {
            let text = String::decode(decoder)?;
            parse_formatted_date(text.trim(), format).ok_or_else(|| {
                decoder.corrupted(format!(
                    "date {:?} does not match format {:?}",
                    text, format
                ))
            })
        }
        DateStrategy::Custom(decode) => decode(decoder),
    }
}

impl Decode for DateTime<FixedOffset> {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
        decode_date(decoder)
    }
}

impl Decode for DateTime<Utc> {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
        decode_date(decoder).map(|dt| dt.with_timezone(&Utc))
    }
}

// ============================================================================
// Binary data
// ============================================================================

/// Binary payload decoded through the active [`DataStrategy`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Data(pub Vec<u8>);

impl Data {
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for Data {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Decode for Data {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
        match &decoder.options().data {
            DataStrategy::DeferredToNative => Vec::<u8>::decode(decoder).map(Data),
            DataStrategy::Base64 => {
                let text = String::decode(decoder)?;
                STANDARD
                    .decode(text.trim())
                    .map(Data)
                    .map_err(|e| decoder.corrupted(format!("invalid base64 data: {}", e)))
            }
            DataStrategy::Custom(decode) => decode(decoder).map(Data),
        }
    }
}

// ============================================================================
// URLs
// ============================================================================

impl Decode for Url {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
        let text = String::decode(decoder)?;
        Url::parse(text.trim())
            .map_err(|e| decoder.corrupted(format!("invalid URL {:?}: {}", text, e)))
    }
}
