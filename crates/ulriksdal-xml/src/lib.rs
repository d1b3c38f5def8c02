#![forbid(unsafe_code)]

//! XML handling for the Ulriksdal XML Encryption library.
//!
//! Parsing is done with `roxmltree`; the encrypted document is small and
//! fixed in shape, so it is rendered from text fragments.

pub mod codec;
pub mod document;
pub mod writer;

pub use codec::{parse, parse_key_info, ParsedDocument, ParsedKeyInfo};
pub use writer::{render_encrypted_data, render_key_info, EncryptedDataFragment, KeyInfoFragment};

/// Return roxmltree parsing options that allow DTD.
///
/// roxmltree does not expand external entities, so a DTD in a third-party
/// document is harmless.
pub fn parsing_options() -> roxmltree::ParsingOptions {
    roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    }
}
