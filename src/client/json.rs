//! JSON encoding and decoding of request and response bodies.
//!
//! Decoding failures are classified so callers can tell a truncated response
//! from one that nests too deeply or isn't UTF-8 at all.

use serde_json::{error::Category, Value};
use std::{fmt, str};
use thiserror::Error;

/// What went wrong while encoding or decoding JSON
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Nesting went past the decoder's recursion limit
    Depth,
    /// The input ended before the value was complete
    StateMismatch,
    /// A raw control character appeared inside a string
    ControlCharacter,
    /// Malformed JSON
    Syntax,
    /// The input wasn't valid UTF-8, or contained an invalid unicode escape
    Encoding,
    Unknown,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = match self {
            ParseErrorKind::Depth => "maximum nesting depth exceeded",
            ParseErrorKind::StateMismatch => "unexpected end of input",
            ParseErrorKind::ControlCharacter => "unexpected control character",
            ParseErrorKind::Syntax => "syntax error",
            ParseErrorKind::Encoding => "malformed UTF-8 or unicode escape",
            ParseErrorKind::Unknown => "unknown error",
        };
        f.write_str(description)
    }
}

#[derive(Error, Debug)]
#[error("json {kind}: {detail}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub detail: String,
}

impl ParseError {
    fn new(kind: ParseErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

impl From<serde_json::Error> for ParseError {
    fn from(error: serde_json::Error) -> Self {
        let detail = error.to_string();

        let kind = match error.classify() {
            Category::Eof => ParseErrorKind::StateMismatch,
            Category::Syntax if detail.starts_with("recursion limit exceeded") => {
                ParseErrorKind::Depth
            }
            Category::Syntax if detail.starts_with("control character") => {
                ParseErrorKind::ControlCharacter
            }
            Category::Syntax
                if detail.starts_with("invalid unicode code point")
                    || detail.starts_with("lone leading surrogate") =>
            {
                ParseErrorKind::Encoding
            }
            Category::Syntax => ParseErrorKind::Syntax,
            Category::Io | Category::Data => ParseErrorKind::Unknown,
        };

        Self::new(kind, detail)
    }
}

/// Serialize a value into the text that goes on the wire
pub fn encode(value: &Value) -> Result<String, ParseError> {
    Ok(serde_json::to_string(value)?)
}

/// Decode a response body.
///
/// An empty body (Github's `204 No Content`) decodes to `Value::Null`.
pub fn decode(body: &[u8]) -> Result<Value, ParseError> {
    let text = str::from_utf8(body)
        .map_err(|e| ParseError::new(ParseErrorKind::Encoding, e.to_string()))?;

    if text.trim().is_empty() {
        return Ok(Value::Null);
    }

    Ok(serde_json::from_str(text)?)
}
