//! Response parser: pulls one candidate record out of free-form model output.
//!
//! Models wrap the record in prose, code fences or both. The parser takes the first
//! balanced `{ ... }` span (ignoring braces inside JSON strings), decodes it as an object
//! and maps the four recognised keys. It never invents a default record.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::tagging::models::CandidateRecord;

/// Longest excerpt of model output attached to a parse error.
const EXCERPT_CHARS: usize = 200;

/// String values the model uses to mean "no value".
const NULL_LITERALS: &[&str] = &["null", "none"];

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no JSON object found in model output: {excerpt}")]
    NoRecord { excerpt: String },

    #[error("unterminated JSON object in model output: {excerpt}")]
    Unterminated { excerpt: String },

    #[error("malformed JSON object in model output ({source}): {excerpt}")]
    Malformed {
        excerpt: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ParseError {
    /// The piece of model output that could not be decoded.
    pub fn excerpt(&self) -> &str {
        match self {
            ParseError::NoRecord { excerpt }
            | ParseError::Unterminated { excerpt }
            | ParseError::Malformed { excerpt, .. } => excerpt,
        }
    }
}

/// Decodes the first embedded JSON object in `raw` into a candidate record.
pub fn parse_response(raw: &str) -> Result<CandidateRecord, ParseError> {
    let span = find_object_span(raw)?;
    let object: Map<String, Value> =
        serde_json::from_str(span).map_err(|source| ParseError::Malformed {
            excerpt: excerpt(span),
            source,
        })?;

    Ok(CandidateRecord {
        country: normalize(object.get("country")),
        degree: normalize(object.get("degree")),
        major: normalize(object.get("major")),
        sub_major: normalize(object.get("sub_major")),
    })
}

/// Returns the first balanced brace-delimited span of `raw`.
fn find_object_span(raw: &str) -> Result<&str, ParseError> {
    let start = raw.find('{').ok_or_else(|| ParseError::NoRecord {
        excerpt: excerpt(raw),
    })?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in raw[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(&raw[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    Err(ParseError::Unterminated {
        excerpt: excerpt(&raw[start..]),
    })
}

/// Maps a decoded value to an optional tag. `null`, empty and null-literal strings are
/// absent; other non-string values keep their JSON text so validation can reject them.
fn normalize(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() || NULL_LITERALS.iter().any(|n| s.eq_ignore_ascii_case(n)) {
                None
            } else {
                Some(s.to_string())
            }
        }
        other => Some(other.to_string()),
    }
}

fn excerpt(text: &str) -> String {
    let text = text.trim();
    match text.char_indices().nth(EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}
