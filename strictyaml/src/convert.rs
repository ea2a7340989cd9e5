//! Conversions between scalar strings and typed values.
//!
//! The tree only stores raw strings; typed reads and writes go through the [`DecodeScalar`] and
//! [`EncodeScalar`] traits. Implement them on your own types to plug domain codecs into
//! [`Node::decode`] and the assignment methods.
//!
//! Built-in codecs cover all integer widths (base-prefix aware: `0x`, `0o` and `0b` after an
//! optional sign), floating point, and strings. All of them reject trailing characters.
//!
//! [`Node::decode`]: crate::Node::decode

use crate::error::ConvertError;

/// Conversion from a typed value to the scalar string stored in the tree.
pub trait EncodeScalar {
    /// Encode `self` into its scalar string form.
    ///
    /// # Errors
    /// Returns a [`ConvertError`] when the value has no scalar representation.
    fn encode(&self) -> Result<String, ConvertError>;
}

/// Conversion from a scalar string to a typed value.
pub trait DecodeScalar: Sized {
    /// Decode a value from its scalar string form.
    ///
    /// # Errors
    /// Returns a [`ConvertError`] when `text` does not represent a valid value.
    fn decode(text: &str) -> Result<Self, ConvertError>;
}

/// Split an integer literal into its sign, radix and digits.
fn int_parts(text: &str) -> (bool, u32, &str) {
    let (negative, body) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = body.strip_prefix(prefix) {
            return (negative, radix, digits);
        }
    }
    (negative, 10, body)
}

macro_rules! impl_int_codec (
    ($label:expr => $($ty:ty),*) => ($(
impl EncodeScalar for $ty {
    fn encode(&self) -> Result<String, ConvertError> {
        Ok(self.to_string())
    }
}

impl DecodeScalar for $ty {
    fn decode(text: &str) -> Result<Self, ConvertError> {
        let (negative, radix, digits) = int_parts(text);
        let parsed = if radix == 10 {
            text.parse::<$ty>().ok()
        } else {
            <$ty>::from_str_radix(digits, radix)
                .ok()
                .and_then(|value| if negative { value.checked_neg() } else { Some(value) })
        };
        parsed.ok_or_else(|| {
            ConvertError::new(format!(
                "unable to convert the string into {}: '{text}'",
                $label
            ))
        })
    }
}
    )*);
);

impl_int_codec!("a signed integer" => i8, i16, i32, i64, isize);
impl_int_codec!("an unsigned integer" => u8, u16, u32, u64, usize);

macro_rules! impl_float_codec (
    ($($ty:ty),*) => ($(
impl EncodeScalar for $ty {
    fn encode(&self) -> Result<String, ConvertError> {
        Ok(self.to_string())
    }
}

impl DecodeScalar for $ty {
    fn decode(text: &str) -> Result<Self, ConvertError> {
        text.parse::<$ty>().map_err(|_| {
            ConvertError::new(format!(
                "unable to convert the string into a floating point: '{text}'"
            ))
        })
    }
}
    )*);
);

impl_float_codec!(f32, f64);

impl EncodeScalar for String {
    fn encode(&self) -> Result<String, ConvertError> {
        Ok(self.clone())
    }
}

impl DecodeScalar for String {
    fn decode(text: &str) -> Result<Self, ConvertError> {
        Ok(text.to_owned())
    }
}

impl EncodeScalar for &str {
    fn encode(&self) -> Result<String, ConvertError> {
        Ok((*self).to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_radix_prefixes() {
        assert_eq!(i64::decode("42").unwrap(), 42);
        assert_eq!(i64::decode("+42").unwrap(), 42);
        assert_eq!(i64::decode("-42").unwrap(), -42);
        assert_eq!(i64::decode("0x2A").unwrap(), 42);
        assert_eq!(u32::decode("0o52").unwrap(), 42);
        assert_eq!(u32::decode("0b101010").unwrap(), 42);
        assert_eq!(i32::decode("-0x2a").unwrap(), -42);
    }

    #[test]
    fn int_rejects_trailing_characters() {
        assert!(i64::decode("42 ").is_err());
        assert!(i64::decode("42abc").is_err());
        assert!(u64::decode("0x").is_err());
        assert!(i64::decode("").is_err());
    }

    #[test]
    fn unsigned_rejects_negative() {
        assert!(u32::decode("-1").is_err());
        assert!(u32::decode("-0x1").is_err());
    }

    #[test]
    fn float_roundtrip() {
        assert_eq!(f64::decode("1.5").unwrap(), 1.5);
        assert_eq!(f64::decode("-3e2").unwrap(), -300.0);
        assert!(f64::decode("1.5x").is_err());
        assert_eq!(1.5_f64.encode().unwrap(), "1.5");
    }

    #[test]
    fn error_names_the_input() {
        let err = i64::decode("oops").unwrap_err();
        assert!(err.to_string().contains("'oops'"));
        assert!(err.to_string().starts_with("Convert error: "));
    }
}
