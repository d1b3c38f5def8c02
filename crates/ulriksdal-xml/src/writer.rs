#![forbid(unsafe_code)]

//! Rendering of the `KeyInfo` and `EncryptedData` fragments.
//!
//! The output shape is fixed, so the fragments are produced from text
//! templates. Every interpolated value goes through [`escape_attr`] or
//! [`escape_text`].

use ulriksdal_core::{algorithm, ns};

/// Values carried by the `KeyInfo` / `EncryptedKey` fragment.
#[derive(Debug, Clone, Copy)]
pub struct KeyInfoFragment<'a> {
    /// Base64 of the RSA-wrapped symmetric key.
    pub wrapped_key_b64: &'a str,
    /// Key transport URI for the `EncryptedKey`'s `EncryptionMethod`.
    pub key_transport_uri: &'a str,
    /// Base64 body of the sender certificate, without PEM delimiters.
    pub certificate_body: &'a str,
}

/// Values carried by the outer `EncryptedData` fragment.
#[derive(Debug, Clone, Copy)]
pub struct EncryptedDataFragment<'a> {
    pub content_algorithm_uri: &'a str,
    /// An already rendered `KeyInfo` fragment, embedded verbatim.
    pub key_info: &'a str,
    /// Base64 of IV || ciphertext.
    pub cipher_payload_b64: &'a str,
}

/// Render `<KeyInfo>` holding an `<e:EncryptedKey>`.
///
/// A `DigestMethod` child is emitted under the key's `EncryptionMethod` only
/// for RSA-OAEP, which is the one transport that takes a digest.
pub fn render_key_info(fragment: &KeyInfoFragment<'_>) -> String {
    let digest = if fragment.key_transport_uri == algorithm::RSA_OAEP {
        format!(
            "\n      <DigestMethod Algorithm=\"{}\" />",
            escape_attr(algorithm::SHA1)
        )
    } else {
        String::new()
    };

    format!(
        "<KeyInfo xmlns=\"{dsig}\">\n  \
         <e:EncryptedKey xmlns:e=\"{enc}\">\n    \
         <e:EncryptionMethod Algorithm=\"{transport}\">{digest}\n    \
         </e:EncryptionMethod>\n    \
         <KeyInfo>\n      \
         <X509Data><X509Certificate>{cert}</X509Certificate></X509Data>\n    \
         </KeyInfo>\n    \
         <e:CipherData>\n      \
         <e:CipherValue>{wrapped}</e:CipherValue>\n    \
         </e:CipherData>\n  \
         </e:EncryptedKey>\n\
         </KeyInfo>",
        dsig = ns::DSIG,
        enc = ns::ENC,
        transport = escape_attr(fragment.key_transport_uri),
        digest = digest,
        cert = escape_text(fragment.certificate_body),
        wrapped = escape_text(fragment.wrapped_key_b64),
    )
}

/// Render the complete `<xenc:EncryptedData>` document.
pub fn render_encrypted_data(fragment: &EncryptedDataFragment<'_>) -> String {
    format!(
        "<xenc:EncryptedData Type=\"{ty}\" xmlns:xenc=\"{enc}\">\n\
         <xenc:EncryptionMethod Algorithm=\"{content}\" />\n\
         {key_info}\n\
         <xenc:CipherData>\n  \
         <xenc:CipherValue>{payload}</xenc:CipherValue>\n\
         </xenc:CipherData>\n\
         </xenc:EncryptedData>",
        ty = ns::ENC_TYPE_ELEMENT,
        enc = ns::ENC,
        content = escape_attr(fragment.content_algorithm_uri),
        key_info = fragment.key_info,
        payload = escape_text(fragment.cipher_payload_b64),
    )
}

/// Escape a value for use inside a double-quoted attribute.
pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' => out.push_str("&#9;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape a value for use as element text.
pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#13;"),
            _ => out.push(c),
        }
    }
    out
}
