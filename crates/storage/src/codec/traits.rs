//! Value codec trait definitions.

use std::fmt::Write;

/// A value that can be stored in an index file line.
///
/// `encode_value` must produce text with no raw newline and no raw `;`, so
/// that a line can always be split on its first `;`. Use the field helpers in
/// [`crate::codec`] rather than writing free text.
pub trait IndexValue: Sized {
    /// Append the encoded value to `out`.
    fn encode_value(&self, out: &mut String);

    /// Decode a value from the text after the first `;` of a line.
    ///
    /// Returns an error if the text is not a complete encoding; trailing
    /// bytes after a complete value are an error too.
    fn decode_value(input: &str) -> Result<Self, CodecError>;
}

/// Codec errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// Input ended before a complete value was read.
    #[error("Unexpected end of input while reading {0}")]
    UnexpectedEnd(&'static str),

    /// A count or length prefix was not a decimal number.
    #[error("Invalid number while reading {what}: {found:?}")]
    InvalidNumber {
        /// What was being read
        what: &'static str,
        /// The offending text
        found: String,
    },

    /// A length prefix does not land on a character boundary.
    #[error("Length {0} splits a character")]
    BadBoundary(usize),

    /// A backslash was followed by an unknown character.
    #[error("Invalid escape sequence: \\{0}")]
    InvalidEscape(char),

    /// A separator other than the expected one was found.
    #[error("Expected {expected:?} at byte {at}")]
    ExpectedSeparator {
        /// The separator that should have appeared
        expected: char,
        /// Byte offset into the value text
        at: usize,
    },

    /// A complete value was followed by more text.
    #[error("Trailing data after value: {0:?}")]
    TrailingData(String),
}

impl IndexValue for String {
    fn encode_value(&self, out: &mut String) {
        super::write_field(out, self);
    }

    fn decode_value(input: &str) -> Result<Self, CodecError> {
        let mut reader = super::FieldReader::new(input);
        let value = reader.read_field("string")?;
        reader.finish()?;
        Ok(value)
    }
}

impl IndexValue for Vec<String> {
    fn encode_value(&self, out: &mut String) {
        super::write_list(out, self);
    }

    fn decode_value(input: &str) -> Result<Self, CodecError> {
        let mut reader = super::FieldReader::new(input);
        let value = reader.read_list("list")?;
        reader.finish()?;
        Ok(value)
    }
}

impl IndexValue for u64 {
    fn encode_value(&self, out: &mut String) {
        let _ = write!(out, "{}", self);
    }

    fn decode_value(input: &str) -> Result<Self, CodecError> {
        input.parse().map_err(|_| CodecError::InvalidNumber {
            what: "u64",
            found: input.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_value() {
        let mut out = String::new();
        "New York; NY".to_string().encode_value(&mut out);
        assert!(!out.contains(';'));
        assert_eq!(String::decode_value(&out).unwrap(), "New York; NY");
    }

    #[test]
    fn test_list_value() {
        let names = vec!["Ada Lovelace".to_string(), "".to_string(), "x".to_string()];
        let mut out = String::new();
        names.encode_value(&mut out);
        assert_eq!(Vec::<String>::decode_value(&out).unwrap(), names);
    }

    #[test]
    fn test_trailing_data_rejected() {
        let result = String::decode_value("3:abc extra");
        assert!(matches!(result, Err(CodecError::TrailingData(_))));
    }

    #[test]
    fn test_u64_value() {
        let mut out = String::new();
        42u64.encode_value(&mut out);
        assert_eq!(u64::decode_value(&out).unwrap(), 42);
        assert!(u64::decode_value("forty").is_err());
    }
}
