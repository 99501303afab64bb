//! Scalar coercion: untyped leaves into requested primitive widths.
//!
//! Integers are first parsed directly into the requested width. When that
//! fails, the text goes through [`WIDENING_TABLE`], an ordered list of wider
//! readings (`i128`, `u128`, then an exact decimal reading of fraction and
//! exponent spellings), and the first reading that succeeds is narrowed back
//! into the requested width.
//! A number that is well-formed but does not fit is `ValueCorrupted`; text
//! that is not a number at all is `TypeMismatch`.

use std::borrow::Cow;
use std::str::FromStr;

use crate::error::{CodingPath, DecodeError};
use crate::options::NonConformingFloatStrategy;

/// A scalar as the containers hand it to the coercion engine.
#[derive(Debug, Clone)]
pub(crate) enum Leaf<'a> {
    Null,
    Bool(bool),
    /// JSON number text.
    Number(&'a str),
    /// JSON string.
    String(&'a str),
    /// XML character data, which may stand for any scalar type.
    Text(Cow<'a, str>),
    /// Anything that is not a scalar; carries a description for messages.
    Composite(&'static str),
}

impl Leaf<'_> {
    fn describe(&self) -> String {
        match self {
            Leaf::Null => "found null".to_string(),
            Leaf::Bool(b) => format!("found boolean {}", b),
            Leaf::Number(n) => format!("found number {}", n),
            Leaf::String(s) => format!("found string {:?}", s),
            Leaf::Text(t) => format!("found text {:?}", t),
            Leaf::Composite(kind) => format!("found {}", kind),
        }
    }

    fn mismatch(&self, path: &CodingPath, expected: &'static str) -> DecodeError {
        DecodeError::type_mismatch(path, expected, self.describe())
    }
}

// ============================================================================
// Bool / String / char
// ============================================================================

pub(crate) fn to_bool(leaf: &Leaf<'_>, path: &CodingPath) -> Result<bool, DecodeError> {
    match leaf {
        Leaf::Bool(b) => Ok(*b),
        Leaf::Text(t) => match &**t {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(leaf.mismatch(path, "bool")),
        },
        _ => Err(leaf.mismatch(path, "bool")),
    }
}

pub(crate) fn to_string(leaf: &Leaf<'_>, path: &CodingPath) -> Result<String, DecodeError> {
    match leaf {
        Leaf::String(s) => Ok((*s).to_string()),
        Leaf::Text(t) => Ok(t.clone().into_owned()),
        _ => Err(leaf.mismatch(path, "String")),
    }
}

pub(crate) fn to_char(leaf: &Leaf<'_>, path: &CodingPath) -> Result<char, DecodeError> {
    let s = to_string(leaf, path)?;
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(DecodeError::corrupted(
            path,
            format!("expected a single character, found {:?}", s),
        )),
    }
}

// ============================================================================
// Integers
// ============================================================================

/// Integer widths the engine can coerce into.
pub(crate) trait Integer: Sized + FromStr + TryFrom<i128> + TryFrom<u128> {
    const NAME: &'static str;
}

macro_rules! impl_integer {
    ($($t:ty),*) => {
        $(impl Integer for $t {
            const NAME: &'static str = stringify!($t);
        })*
    };
}

impl_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

/// Result of reading number text through a wider representation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Widened {
    Signed(i128),
    Unsigned(u128),
    /// A number with a non-zero fractional part.
    Fractional,
    /// An integer beyond every integer width.
    OutOfRange,
}

type Widening = fn(&str) -> Option<Widened>;

/// Wider readings tried, in order, after a direct parse fails.
pub(crate) const WIDENING_TABLE: &[Widening] = &[widen_i128, widen_u128, widen_decimal];

fn widen_i128(text: &str) -> Option<Widened> {
    text.parse::<i128>().ok().map(Widened::Signed)
}

fn widen_u128(text: &str) -> Option<Widened> {
    text.parse::<u128>().ok().map(Widened::Unsigned)
}

/// Exact reading of decimal text with a fraction and/or exponent, such as
/// `1.50e2`. No floating point is involved: the significant digits are
/// scaled by the exponent and must land on an integer.
fn widen_decimal(text: &str) -> Option<Widened> {
    let (negative, rest) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    let (mantissa, exponent) = match rest.find(['e', 'E']) {
        Some(at) => (&rest[..at], Some(&rest[at + 1..])),
        None => (rest, None),
    };
    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
        return None;
    }

    let exponent: i64 = match exponent {
        None => 0,
        Some(exp) => {
            let digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
            if digits.is_empty() || !all_digits(digits) {
                return None;
            }
            // Only overflow can fail here; saturate, the digits decide the rest.
            let magnitude = digits.parse::<i64>().unwrap_or(i64::MAX);
            if exp.starts_with('-') {
                -magnitude
            } else {
                magnitude
            }
        }
    };

    let digits = format!("{}{}", whole, fraction);
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Some(Widened::Signed(0));
    }
    let significant = digits.trim_end_matches('0');
    let trailing_zeros = (digits.len() - significant.len()) as i64;
    let scale = exponent
        .saturating_sub(fraction.len() as i64)
        .saturating_add(trailing_zeros);
    if scale < 0 {
        return Some(Widened::Fractional);
    }
    // u128::MAX has 39 digits.
    if (significant.len() as i64).saturating_add(scale) > 39 {
        return Some(Widened::OutOfRange);
    }

    let magnitude = significant
        .bytes()
        .try_fold(0u128, |acc, b| {
            acc.checked_mul(10)?.checked_add(u128::from(b - b'0'))
        })
        .and_then(|m| 10u128.checked_pow(scale as u32).and_then(|p| m.checked_mul(p)));
    let Some(magnitude) = magnitude else {
        return Some(Widened::OutOfRange);
    };

    Some(if !negative {
        match i128::try_from(magnitude) {
            Ok(v) => Widened::Signed(v),
            Err(_) => Widened::Unsigned(magnitude),
        }
    } else if magnitude == i128::MIN.unsigned_abs() {
        Widened::Signed(i128::MIN)
    } else {
        match i128::try_from(magnitude) {
            Ok(v) => Widened::Signed(-v),
            Err(_) => Widened::OutOfRange,
        }
    })
}

fn number_text<'l>(leaf: &'l Leaf<'_>) -> Option<&'l str> {
    match leaf {
        Leaf::Number(n) => Some(n),
        Leaf::Text(t) => Some(&**t),
        _ => None,
    }
}

pub(crate) fn to_integer<T: Integer>(leaf: &Leaf<'_>, path: &CodingPath) -> Result<T, DecodeError> {
    let text = number_text(leaf).ok_or_else(|| leaf.mismatch(path, T::NAME))?;
    parse_integer(text, path).ok_or_else(|| leaf.mismatch(path, T::NAME))?
}

/// `None` when the text is not a number at all; `Some(Err)` when it is a
/// number that `T` cannot hold.
fn parse_integer<T: Integer>(text: &str, path: &CodingPath) -> Option<Result<T, DecodeError>> {
    if let Ok(v) = text.parse::<T>() {
        return Some(Ok(v));
    }

    let widened = WIDENING_TABLE.iter().find_map(|widen| widen(text))?;
    let narrowed = match widened {
        Widened::Signed(v) => <T as TryFrom<i128>>::try_from(v).ok(),
        Widened::Unsigned(v) => <T as TryFrom<u128>>::try_from(v).ok(),
        Widened::Fractional | Widened::OutOfRange => None,
    };
    Some(narrowed.ok_or_else(|| {
        DecodeError::corrupted(
            path,
            format!("parsed number <{}> does not fit in {}", text, T::NAME),
        )
    }))
}

// ============================================================================
// Floats
// ============================================================================

pub(crate) trait Float: Sized + FromStr + Copy {
    const NAME: &'static str;
    const INFINITY: Self;
    const NEG_INFINITY: Self;
    const NAN: Self;

    fn is_finite(self) -> bool;
    /// Narrows a finite `f64`; `None` when the magnitude does not fit.
    fn from_f64(v: f64) -> Option<Self>;
}

impl Float for f64 {
    const NAME: &'static str = "f64";
    const INFINITY: Self = f64::INFINITY;
    const NEG_INFINITY: Self = f64::NEG_INFINITY;
    const NAN: Self = f64::NAN;

    fn is_finite(self) -> bool {
        f64::is_finite(self)
    }

    fn from_f64(v: f64) -> Option<Self> {
        Some(v)
    }
}

impl Float for f32 {
    const NAME: &'static str = "f32";
    const INFINITY: Self = f32::INFINITY;
    const NEG_INFINITY: Self = f32::NEG_INFINITY;
    const NAN: Self = f32::NAN;

    fn is_finite(self) -> bool {
        f32::is_finite(self)
    }

    fn from_f64(v: f64) -> Option<Self> {
        (v.abs() <= f64::from(f32::MAX)).then_some(v as f32)
    }
}

pub(crate) fn to_float<T: Float>(
    leaf: &Leaf<'_>,
    strategy: &NonConformingFloatStrategy,
    path: &CodingPath,
) -> Result<T, DecodeError> {
    let literal = match leaf {
        Leaf::String(s) => Some(*s),
        Leaf::Text(t) => Some(&**t),
        _ => None,
    };
    if let (
        Some(literal),
        NonConformingFloatStrategy::ConvertFromString {
            positive_infinity,
            negative_infinity,
            nan,
        },
    ) = (literal, strategy)
    {
        if literal == positive_infinity {
            return Ok(T::INFINITY);
        }
        if literal == negative_infinity {
            return Ok(T::NEG_INFINITY);
        }
        if literal == nan {
            return Ok(T::NAN);
        }
    }

    let text = number_text(leaf).ok_or_else(|| leaf.mismatch(path, T::NAME))?;
    if let Ok(v) = text.parse::<T>() {
        if v.is_finite() {
            return Ok(v);
        }
    }

    // Rust's float parser also accepts "inf" and "NaN"; those words are only
    // valid through the non-conforming strategy handled above.
    if !text.bytes().any(|b| b.is_ascii_digit()) {
        return Err(leaf.mismatch(path, T::NAME));
    }
    match text.parse::<f64>() {
        Ok(wide) if wide.is_finite() => T::from_f64(wide).ok_or_else(|| {
            DecodeError::corrupted(
                path,
                format!("parsed number <{}> does not fit in {}", text, T::NAME),
            )
        }),
        Ok(_) => Err(DecodeError::corrupted(
            path,
            format!("parsed number <{}> does not fit in {}", text, T::NAME),
        )),
        Err(_) => Err(leaf.mismatch(path, T::NAME)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeErrorKind;
    use proptest::prelude::*;

    fn num(text: &str) -> Leaf<'_> {
        Leaf::Number(text)
    }

    fn root() -> CodingPath {
        CodingPath::root()
    }

    #[test]
    fn test_integer_boundaries() {
        assert_eq!(to_integer::<i8>(&num("127"), &root()).unwrap(), 127);
        assert_eq!(to_integer::<i8>(&num("-128"), &root()).unwrap(), -128);
        let err = to_integer::<i8>(&num("128"), &root()).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::ValueCorrupted);
        let err = to_integer::<i8>(&num("-129"), &root()).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::ValueCorrupted);

        assert_eq!(
            to_integer::<u64>(&num("18446744073709551615"), &root()).unwrap(),
            u64::MAX
        );
        let err = to_integer::<u64>(&num("18446744073709551616"), &root()).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::ValueCorrupted);
        assert!(err.to_string().contains("does not fit in u64"));
    }

    #[test]
    fn test_negative_into_unsigned_is_corrupted() {
        let err = to_integer::<u32>(&num("-1"), &root()).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::ValueCorrupted);
    }

    #[test]
    fn test_integer_through_float_reading() {
        assert_eq!(to_integer::<i32>(&num("1e3"), &root()).unwrap(), 1000);
        assert_eq!(to_integer::<u8>(&num("2.0"), &root()).unwrap(), 2);
        let err = to_integer::<i32>(&num("1.5"), &root()).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::ValueCorrupted);
        let err = to_integer::<i64>(&num("1e300"), &root()).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::ValueCorrupted);
    }

    #[test]
    fn test_integer_from_non_number_is_mismatch() {
        let err = to_integer::<i32>(&Leaf::String("12"), &root()).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::TypeMismatch);
        let err = to_integer::<i32>(&Leaf::Text("twelve".into()), &root()).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::TypeMismatch);
        let err = to_integer::<i32>(&Leaf::Text("nan".into()), &root()).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::TypeMismatch);
        let err = to_integer::<i32>(&Leaf::Null, &root()).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::TypeMismatch);
    }

    #[test]
    fn test_xml_text_integer() {
        assert_eq!(to_integer::<u16>(&Leaf::Text("60".into()), &root()).unwrap(), 60);
    }

    #[test]
    fn test_widening_table_order() {
        assert_eq!(widen_i128("-5"), Some(Widened::Signed(-5)));
        assert_eq!(widen_i128("340282366920938463463374607431768211455"), None);
        assert_eq!(
            widen_u128("340282366920938463463374607431768211455"),
            Some(Widened::Unsigned(u128::MAX))
        );
        assert_eq!(widen_decimal("0.25"), Some(Widened::Fractional));
        assert_eq!(widen_decimal("1e200"), Some(Widened::OutOfRange));
        assert_eq!(widen_decimal("inf"), None);
        assert_eq!(widen_decimal("abc"), None);
    }

    #[test]
    fn test_decimal_reading_is_exact() {
        assert_eq!(widen_decimal("1.50e2"), Some(Widened::Signed(150)));
        assert_eq!(widen_decimal("-0.0"), Some(Widened::Signed(0)));
        assert_eq!(widen_decimal("12000e-3"), Some(Widened::Signed(12)));
        assert_eq!(widen_decimal("1.5e-1"), Some(Widened::Fractional));
        assert_eq!(widen_decimal("1e-99999999999999999999"), Some(Widened::Fractional));
        assert_eq!(widen_decimal("0e99999999999999999999"), Some(Widened::Signed(0)));
        assert_eq!(
            widen_decimal("1.70141183460469231731687303715884105728E38"),
            Some(Widened::Unsigned(1u128 << 127))
        );
        assert_eq!(
            widen_decimal("-1.70141183460469231731687303715884105728E38"),
            Some(Widened::Signed(i128::MIN))
        );
        assert_eq!(widen_decimal("-3.5e38"), Some(Widened::OutOfRange));
        assert_eq!(widen_decimal("4e38"), Some(Widened::OutOfRange));
        assert_eq!(widen_decimal("."), None);
        assert_eq!(widen_decimal("1e"), None);
        assert_eq!(widen_decimal("1.2.3"), None);
        assert_eq!(widen_decimal("--1"), None);
    }

    #[test]
    fn test_integers_beyond_f64_precision() {
        assert_eq!(
            to_integer::<i64>(&num("9007199254740993.0"), &root()).unwrap(),
            9_007_199_254_740_993
        );
        assert_eq!(
            to_integer::<i64>(&num("9223372036854775807.0"), &root()).unwrap(),
            i64::MAX
        );
        assert_eq!(
            to_integer::<u128>(&num("340282366920938463463374607431768211455.000"), &root())
                .unwrap(),
            u128::MAX
        );
        let err = to_integer::<i32>(&num("1.00000000000000001"), &root()).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::ValueCorrupted);
        let err = to_integer::<i64>(&num("9223372036854775807.5"), &root()).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::ValueCorrupted);
        let err = to_integer::<i64>(&num("9.223372036854775808e18"), &root()).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::ValueCorrupted);
    }

    #[test]
    fn test_floats() {
        let throw = NonConformingFloatStrategy::Throw;
        assert_eq!(to_float::<f64>(&num("1.5"), &throw, &root()).unwrap(), 1.5);
        assert_eq!(to_float::<f32>(&num("3"), &throw, &root()).unwrap(), 3.0);
        let err = to_float::<f32>(&num("1e39"), &throw, &root()).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::ValueCorrupted);
        let err = to_float::<f64>(&num("1e400"), &throw, &root()).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::ValueCorrupted);
    }

    #[test]
    fn test_non_conforming_floats_need_strategy() {
        let throw = NonConformingFloatStrategy::Throw;
        let err = to_float::<f64>(&Leaf::String("inf"), &throw, &root()).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::TypeMismatch);
        let err = to_float::<f64>(&Leaf::Text("NaN".into()), &throw, &root()).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::TypeMismatch);

        let convert = NonConformingFloatStrategy::ConvertFromString {
            positive_infinity: "inf".to_string(),
            negative_infinity: "-inf".to_string(),
            nan: "nan".to_string(),
        };
        let v: f64 = to_float(&Leaf::String("inf"), &convert, &root()).unwrap();
        assert_eq!(v, f64::INFINITY);
        let v: f32 = to_float(&Leaf::Text("-inf".into()), &convert, &root()).unwrap();
        assert_eq!(v, f32::NEG_INFINITY);
        let v: f64 = to_float(&Leaf::String("nan"), &convert, &root()).unwrap();
        assert!(v.is_nan());
        // Literals are matched exactly.
        let err = to_float::<f64>(&Leaf::String("Infinity"), &convert, &root()).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::TypeMismatch);
    }

    #[test]
    fn test_bool_and_string() {
        assert!(to_bool(&Leaf::Bool(true), &root()).unwrap());
        assert!(!to_bool(&Leaf::Text("0".into()), &root()).unwrap());
        let err = to_bool(&Leaf::String("true"), &root()).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::TypeMismatch);

        assert_eq!(to_string(&Leaf::String("x"), &root()).unwrap(), "x");
        let err = to_string(&num("1"), &root()).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::TypeMismatch);
        assert_eq!(to_char(&Leaf::Text("é".into()), &root()).unwrap(), 'é');
        assert!(to_char(&Leaf::Text("ab".into()), &root()).is_err());
    }

    proptest! {
        #[test]
        fn prop_i32_in_range_roundtrips(v in any::<i32>()) {
            let text = v.to_string();
            prop_assert_eq!(to_integer::<i32>(&Leaf::Number(&text), &CodingPath::root()).unwrap(), v);
        }

        #[test]
        fn prop_u16_overflow_never_wraps(v in (u16::MAX as u64 + 1)..u64::MAX) {
            let text = v.to_string();
            let err = to_integer::<u16>(&Leaf::Number(&text), &CodingPath::root()).unwrap_err();
            prop_assert_eq!(err.kind(), DecodeErrorKind::ValueCorrupted);
        }
    }
}
