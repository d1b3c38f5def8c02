#![forbid(unsafe_code)]

//! XML-Enc decryption.
//!
//! Parses the document, resolves both algorithms, unwraps the content key
//! with the recipient's private key, then decrypts the cipher payload. No
//! partial plaintext is returned on failure.

use log::debug;
use rsa::RsaPrivateKey;
use ulriksdal_core::Error;
use ulriksdal_crypto::{b64, cipher, keytransport, AlgorithmRegistry, SymmetricKey};
use ulriksdal_xml::ParsedKeyInfo;
use zeroize::Zeroizing;

use crate::context::DecryptionOptions;

/// Decrypt a document whose content is UTF-8 text.
pub fn decrypt(xml: &str, options: &DecryptionOptions) -> Result<String, Error> {
    let plaintext = decrypt_to_bytes(xml, options)?;
    String::from_utf8(plaintext)
        .map_err(|e| Error::Encoding(format!("decrypted content is not UTF-8: {e}")))
}

/// Decrypt a document and return the raw plaintext bytes.
pub fn decrypt_to_bytes(xml: &str, options: &DecryptionOptions) -> Result<Vec<u8>, Error> {
    let private_key = private_key(options)?;

    let parsed = ulriksdal_xml::parse(xml)?;
    let content_alg = AlgorithmRegistry::content(parsed.content_algorithm.as_deref())?;
    let transport = AlgorithmRegistry::key_transport(&parsed.key_info.key_transport_algorithm)?;
    debug!(
        "decrypt: content {}, key transport {}, sender certificate {}",
        content_alg.uri(),
        transport.uri(),
        if parsed.key_info.certificate.is_some() { "embedded" } else { "absent" }
    );

    let raw_key = keytransport::unwrap(&parsed.key_info.wrapped_key_b64, private_key, transport)?;
    let key = SymmetricKey::from_bytes(content_alg, &raw_key)?;

    let payload = b64::decode(&parsed.cipher_payload_b64)?;
    debug!("decrypt: cipher payload is {} bytes", payload.len());
    let plaintext = cipher::decrypt(
        content_alg,
        key.as_bytes(),
        &payload,
        options.auto_padding_enabled(),
    )?;
    debug!("decrypt: recovered {} bytes", plaintext.len());
    Ok(plaintext)
}

/// Unwrap the symmetric key from a `KeyInfo` fragment or a full document.
pub fn decrypt_key_info(
    xml: &str,
    options: &DecryptionOptions,
) -> Result<Zeroizing<Vec<u8>>, Error> {
    let private_key = private_key(options)?;
    let ParsedKeyInfo {
        key_transport_algorithm,
        wrapped_key_b64,
        ..
    } = ulriksdal_xml::parse_key_info(xml)?;
    let transport = AlgorithmRegistry::key_transport(&key_transport_algorithm)?;
    keytransport::unwrap(&wrapped_key_b64, private_key, transport)
}

/// Return the sender certificate body embedded under the `EncryptedKey`.
///
/// No key is needed; the certificate travels in clear text. `None` when the
/// producer did not embed one.
pub fn sender_certificate(xml: &str) -> Result<Option<String>, Error> {
    Ok(ulriksdal_xml::parse_key_info(xml)?.certificate)
}

fn private_key(options: &DecryptionOptions) -> Result<&RsaPrivateKey, Error> {
    options
        .rsa_private_key
        .as_ref()
        .ok_or_else(|| Error::Configuration("recipient RSA private key is required".into()))
}
