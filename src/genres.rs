//! Genre codec.
//!
//! Venue and artist genres are stored as a single text column holding a
//! brace-delimited, comma-separated list such as `{Jazz,Blues,Rock}`.
//! Reading a record decodes that text back into an ordered list of names.

use serde_json::Value;

use crate::error::{AppError, Result};

/// Decodes raw genre text into trimmed genre names.
///
/// One leading `{` and one trailing `}` are removed when present, the rest
/// is split on `,` and every piece is trimmed. Order is kept and empty
/// pieces survive, so `""` decodes to `[""]`.
pub fn decode_genres(raw: &str) -> Vec<String> {
    let inner = raw.strip_prefix('{').unwrap_or(raw);
    let inner = inner.strip_suffix('}').unwrap_or(inner);

    inner.split(',').map(|genre| genre.trim().to_string()).collect()
}

/// Same as [`decode_genres`] for a raw value delivered as a character sequence.
pub fn decode_genre_chars<I>(chars: I) -> Vec<String>
where
    I: IntoIterator<Item = char>,
{
    let joined: String = chars.into_iter().collect();
    decode_genres(&joined)
}

/// Decodes a loosely typed raw value: a JSON string, or an array of string
/// fragments that concatenate into the raw text.
pub fn decode_genre_value(value: &Value) -> Result<Vec<String>> {
    match value {
        Value::String(raw) => Ok(decode_genres(raw)),
        Value::Array(parts) => {
            let mut joined = String::new();
            for part in parts {
                match part {
                    Value::String(fragment) => joined.push_str(fragment),
                    other => {
                        return Err(AppError::InvalidInput(format!(
                            "genre fragment must be a string, got {}",
                            other
                        )))
                    }
                }
            }
            Ok(decode_genres(&joined))
        }
        other => Err(AppError::InvalidInput(format!(
            "genres must be a string or a sequence of characters, got {}",
            other
        ))),
    }
}

/// Encodes genre names into the stored raw form.
pub fn encode_genres<S: AsRef<str>>(genres: &[S]) -> String {
    let joined = genres
        .iter()
        .map(|genre| genre.as_ref().trim())
        .collect::<Vec<_>>()
        .join(",");
    format!("{{{}}}", joined)
}
