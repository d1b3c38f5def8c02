#![forbid(unsafe_code)]

//! Parsing of XMLENC documents into the values the decrypt pipeline needs.
//!
//! Elements are located by local name so that any prefix, and producers that
//! put XMLENC elements in an unexpected namespace, are accepted. The one
//! exception is `KeyInfo`, which must be in the XML-Signature namespace.

use ulriksdal_core::ns::{self, attr, node};
use ulriksdal_core::Error;

use crate::document::{self, collect_text_content, find_child_element, find_descendant};

/// Key transport details read from an `EncryptedKey`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedKeyInfo {
    pub key_transport_algorithm: String,
    /// Base64 of the wrapped key, whitespace removed.
    pub wrapped_key_b64: String,
    /// `X509Certificate` body embedded under the key, if any.
    pub certificate: Option<String>,
}

/// Everything needed to decrypt an `EncryptedData` document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocument {
    /// `None` when the producer omitted `EncryptionMethod`.
    pub content_algorithm: Option<String>,
    /// Base64 of IV || ciphertext, whitespace removed.
    pub cipher_payload_b64: String,
    pub key_info: ParsedKeyInfo,
}

/// Parse a complete encrypted document.
pub fn parse(xml: &str) -> Result<ParsedDocument, Error> {
    let doc = document::parse(xml)?;

    let enc_data = document::find_element(&doc, node::ENCRYPTED_DATA)
        .ok_or_else(|| Error::MalformedDocument("EncryptedData element not found".into()))?;

    let content_algorithm = match find_child_element(enc_data, node::ENCRYPTION_METHOD) {
        Some(method) => Some(required_algorithm(method, node::ENCRYPTED_DATA)?),
        None => None,
    };
    let cipher_payload_b64 = read_cipher_value(enc_data, node::ENCRYPTED_DATA)?;
    let key_info = read_encrypted_key(&doc)?;

    Ok(ParsedDocument {
        content_algorithm,
        cipher_payload_b64,
        key_info,
    })
}

/// Parse only the key transport part.
///
/// Accepts a bare `KeyInfo` fragment as produced by the key-info encrypt
/// operation, or a full document.
pub fn parse_key_info(xml: &str) -> Result<ParsedKeyInfo, Error> {
    let doc = document::parse(xml)?;
    read_encrypted_key(&doc)
}

fn read_encrypted_key(doc: &roxmltree::Document<'_>) -> Result<ParsedKeyInfo, Error> {
    let enc_key = locate_encrypted_key(doc).ok_or_else(|| {
        Error::MalformedDocument("KeyInfo with EncryptedKey not found".into())
    })?;

    let method = find_child_element(enc_key, node::ENCRYPTION_METHOD).ok_or_else(|| {
        Error::MalformedDocument("EncryptionMethod not found on EncryptedKey".into())
    })?;
    let key_transport_algorithm = required_algorithm(method, node::ENCRYPTED_KEY)?;
    let wrapped_key_b64 = read_cipher_value(enc_key, node::ENCRYPTED_KEY)?;

    let certificate = find_descendant(enc_key, node::X509_CERTIFICATE)
        .map(|n| strip_whitespace(&collect_text_content(n)))
        .filter(|body| !body.is_empty());

    Ok(ParsedKeyInfo {
        key_transport_algorithm,
        wrapped_key_b64,
        certificate,
    })
}

/// The `EncryptedKey` under the first dsig `KeyInfo` that has one. Failing
/// that, the first `EncryptedKey` not held by a foreign `KeyInfo`.
fn locate_encrypted_key<'a>(doc: &'a roxmltree::Document<'a>) -> Option<roxmltree::Node<'a, 'a>> {
    let under_key_info = document::find_elements_ns(doc, ns::DSIG, node::KEY_INFO)
        .into_iter()
        .find_map(|ki| find_child_element(ki, node::ENCRYPTED_KEY));
    if under_key_info.is_some() {
        return under_key_info;
    }

    doc.descendants().find(|n| {
        n.is_element()
            && n.tag_name().name() == node::ENCRYPTED_KEY
            && !n.parent_element().is_some_and(is_foreign_key_info)
    })
}

fn is_foreign_key_info(n: roxmltree::Node<'_, '_>) -> bool {
    n.tag_name().name() == node::KEY_INFO && n.tag_name().namespace() != Some(ns::DSIG)
}

fn required_algorithm(method: roxmltree::Node<'_, '_>, owner: &str) -> Result<String, Error> {
    method
        .attribute(attr::ALGORITHM)
        .map(str::to_owned)
        .ok_or_else(|| {
            Error::MalformedDocument(format!("EncryptionMethod on {owner} has no Algorithm"))
        })
}

fn read_cipher_value(parent: roxmltree::Node<'_, '_>, owner: &str) -> Result<String, Error> {
    let cipher_value = find_child_element(parent, node::CIPHER_DATA)
        .and_then(|cd| find_child_element(cd, node::CIPHER_VALUE))
        .ok_or_else(|| {
            Error::MalformedDocument(format!("CipherData/CipherValue not found on {owner}"))
        })?;
    let value = strip_whitespace(&collect_text_content(cipher_value));
    if value.is_empty() {
        return Err(Error::MalformedDocument(format!("empty CipherValue on {owner}")));
    }
    Ok(value)
}

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_ascii_whitespace()).collect()
}
