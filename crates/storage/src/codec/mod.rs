//! Line codec for index files.
//!
//! Every index file line is `<escaped key>;<encoded value>`. Strings are
//! escaped so they never contain a raw newline or `;`, then written as
//! length-prefixed fields, so a field may hold spaces, punctuation or a
//! whole article without swallowing the fields that follow it.
//!
//! # Grammar
//!
//! ```text
//! field := <byte length of escaped text> ':' <escaped text>
//! list  := <count> (' ' field)*
//! ```
//!
//! Escapes: `\\` backslash, `\n` newline, `\r` carriage return, `\s` semicolon.
//!
//! # Usage
//!
//! ```
//! use supersearch_storage::codec::{write_field, FieldReader};
//!
//! let mut line = String::new();
//! write_field(&mut line, "two words; one line");
//!
//! let mut reader = FieldReader::new(&line);
//! assert_eq!(reader.read_field("title").unwrap(), "two words; one line");
//! reader.finish().unwrap();
//! ```

mod traits;

pub use traits::{CodecError, IndexValue};

use std::fmt::Write;

/// Escape a string so it contains no newline, carriage return or `;`.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            ';' => out.push_str("\\s"),
            other => out.push(other),
        }
    }
    out
}

/// Reverse [`escape`].
pub fn unescape(escaped: &str) -> Result<String, CodecError> {
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('s') => out.push(';'),
            Some(other) => return Err(CodecError::InvalidEscape(other)),
            None => return Err(CodecError::UnexpectedEnd("escape sequence")),
        }
    }
    Ok(out)
}

/// Append one length-prefixed, escaped field.
pub fn write_field(out: &mut String, raw: &str) {
    let escaped = escape(raw);
    let _ = write!(out, "{}:{}", escaped.len(), escaped);
}

/// Append a count followed by each item as a field.
pub fn write_list<S: AsRef<str>>(out: &mut String, items: &[S]) {
    let _ = write!(out, "{}", items.len());
    for item in items {
        out.push(' ');
        write_field(out, item.as_ref());
    }
}

/// Sequential reader over an encoded value.
#[derive(Debug)]
pub struct FieldReader<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> FieldReader<'a> {
    /// Start reading at the beginning of `input`
    pub fn new(input: &'a str) -> Self {
        FieldReader { input, pos: 0 }
    }

    /// Bytes not yet consumed
    pub fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// Read a decimal count.
    pub fn read_count(&mut self, what: &'static str) -> Result<usize, CodecError> {
        let rest = self.remaining();
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            if rest.is_empty() {
                return Err(CodecError::UnexpectedEnd(what));
            }
            return Err(CodecError::InvalidNumber {
                what,
                found: rest.chars().take(16).collect(),
            });
        }
        let number = &rest[..digits];
        let value = number.parse().map_err(|_| CodecError::InvalidNumber {
            what,
            found: number.to_string(),
        })?;
        self.pos += digits;
        Ok(value)
    }

    /// Consume one expected separator character.
    pub fn expect(&mut self, separator: char) -> Result<(), CodecError> {
        match self.remaining().chars().next() {
            Some(c) if c == separator => {
                self.pos += c.len_utf8();
                Ok(())
            }
            Some(_) => Err(CodecError::ExpectedSeparator {
                expected: separator,
                at: self.pos,
            }),
            None => Err(CodecError::UnexpectedEnd("separator")),
        }
    }

    /// Read one length-prefixed field and unescape it.
    pub fn read_field(&mut self, what: &'static str) -> Result<String, CodecError> {
        let len = self.read_count(what)?;
        self.expect(':')?;
        let rest = self.remaining();
        if rest.len() < len {
            return Err(CodecError::UnexpectedEnd(what));
        }
        let escaped = rest.get(..len).ok_or(CodecError::BadBoundary(len))?;
        self.pos += len;
        unescape(escaped)
    }

    /// Read a counted list of fields.
    pub fn read_list(&mut self, what: &'static str) -> Result<Vec<String>, CodecError> {
        let count = self.read_count(what)?;
        let mut items = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            self.expect(' ')?;
            items.push(self.read_field(what)?);
        }
        Ok(items)
    }

    /// Succeed only if the whole input was consumed.
    pub fn finish(&self) -> Result<(), CodecError> {
        let rest = self.remaining();
        if rest.is_empty() {
            Ok(())
        } else {
            Err(CodecError::TrailingData(rest.chars().take(32).collect()))
        }
    }
}
