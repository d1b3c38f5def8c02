#![forbid(unsafe_code)]

//! Base64 framing for `CipherValue` content.

use base64::Engine;
use ulriksdal_core::Error;

const ENGINE: base64::engine::GeneralPurpose = base64::engine::general_purpose::STANDARD;

pub fn encode(data: &[u8]) -> String {
    ENGINE.encode(data)
}

/// Decode base64 text, ignoring whitespace and line breaks.
///
/// Producers commonly wrap `CipherValue` at 64 or 76 columns.
pub fn decode(text: &str) -> Result<Vec<u8>, Error> {
    let clean: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    ENGINE
        .decode(clean.as_bytes())
        .map_err(|e| Error::Base64(e.to_string()))
}
