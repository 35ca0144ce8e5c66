//! Header codec
//!
//! Serializes a multi-valued header mapping into the single string stored in
//! the `requests.headers` column, and back.
//!
//! ## Stored Format (version 1)
//! ```text
//! {"v":1,"h":{"<name>":["<value>", ...], ...}}
//! ```
//!
//! Stored rows must stay decodable forever: changing the layout requires a new
//! version number and a decode arm for every older one.

use serde::{Deserialize, Serialize};

use crate::error::{ReqbinError, Result};
use crate::model::Headers;

/// Current stored format version
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    v: u32,
    h: &'a Headers,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Envelope {
    v: u32,
    h: Headers,
}

/// Encode a header mapping for storage
pub fn encode(headers: &Headers) -> Result<String> {
    serde_json::to_string(&EnvelopeRef {
        v: FORMAT_VERSION,
        h: headers,
    })
    .map_err(|e| ReqbinError::Serialization(format!("header encode failed: {}", e)))
}

/// Decode a stored header string
///
/// Fails with `CorruptEncoding` for anything `encode` could not have produced,
/// including valid JSON in a different layout (whitespace, key order,
/// duplicate names, escapes).
pub fn decode(encoded: &str) -> Result<Headers> {
    let envelope: Envelope = serde_json::from_str(encoded)
        .map_err(|e| ReqbinError::CorruptEncoding(e.to_string()))?;

    if envelope.v != FORMAT_VERSION {
        return Err(ReqbinError::CorruptEncoding(format!(
            "unknown header format version {}",
            envelope.v
        )));
    }

    if encode(&envelope.h)? != encoded {
        return Err(ReqbinError::CorruptEncoding(
            "non-canonical header encoding".to_string(),
        ));
    }

    Ok(envelope.h)
}
