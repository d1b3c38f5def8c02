#![forbid(unsafe_code)]

//! XML-Enc encryption.
//!
//! Stages run in order and the first failure aborts the rest:
//! 1. validate options, resolve both algorithms, extract the certificate body
//! 2. generate the content key
//! 3. encrypt the content (IV prefixed)
//! 4. wrap the content key for the recipient
//! 5. render `KeyInfo`, then `EncryptedData`
//!
//! Nothing random is drawn until stage 1 has succeeded.

use log::debug;
use rand::{CryptoRng, RngCore};
use rsa::RsaPublicKey;
use ulriksdal_core::Error;
use ulriksdal_crypto::{b64, cipher, keytransport, AlgorithmRegistry, KeyTransport, SymmetricKey};
use ulriksdal_xml::{render_encrypted_data, render_key_info, EncryptedDataFragment, KeyInfoFragment};

use crate::context::EncryptionOptions;

/// Encrypt `content` into an `EncryptedData` document.
pub fn encrypt(content: &str, options: &EncryptionOptions) -> Result<String, Error> {
    encrypt_with_rng(content, options, &mut rand::thread_rng())
}

/// Encrypt `content`, drawing the content key and IV from `rng`.
pub fn encrypt_with_rng<R: RngCore + CryptoRng>(
    content: &str,
    options: &EncryptionOptions,
    rng: &mut R,
) -> Result<String, Error> {
    let recipient = Recipient::from_options(options)?;
    let content_alg = AlgorithmRegistry::content(options.content_algorithm.as_deref())?;
    let plaintext = options.input_encoding.decode(content)?;
    debug!(
        "encrypt: {} bytes with {}, key transport {}",
        plaintext.len(),
        content_alg.uri(),
        recipient.transport.uri()
    );

    let key = SymmetricKey::generate(content_alg, rng);

    let payload = cipher::encrypt(content_alg, key.as_bytes(), &plaintext, rng)?;
    debug!("encrypt: cipher payload is {} bytes", payload.len());

    let key_info = recipient.render_key_info(key.as_bytes(), rng)?;

    let payload_b64 = b64::encode(&payload);
    Ok(render_encrypted_data(&EncryptedDataFragment {
        content_algorithm_uri: content_alg.uri(),
        key_info: &key_info,
        cipher_payload_b64: &payload_b64,
    }))
}

/// Wrap a caller-supplied symmetric key and render only the `KeyInfo`.
pub fn encrypt_key_info(key: &[u8], options: &EncryptionOptions) -> Result<String, Error> {
    encrypt_key_info_with_rng(key, options, &mut rand::thread_rng())
}

pub fn encrypt_key_info_with_rng<R: RngCore + CryptoRng>(
    key: &[u8],
    options: &EncryptionOptions,
    rng: &mut R,
) -> Result<String, Error> {
    let recipient = Recipient::from_options(options)?;
    if key.is_empty() {
        return Err(Error::Configuration("symmetric key is empty".into()));
    }
    recipient.render_key_info(key, rng)
}

/// The validated key transport half of [`EncryptionOptions`].
struct Recipient<'a> {
    public_key: &'a RsaPublicKey,
    certificate_body: String,
    transport: KeyTransport,
}

impl<'a> Recipient<'a> {
    fn from_options(options: &'a EncryptionOptions) -> Result<Self, Error> {
        let public_key = options
            .rsa_public_key
            .as_ref()
            .ok_or_else(|| Error::Configuration("recipient RSA public key is required".into()))?;
        let certificate_pem = options
            .certificate_pem
            .as_deref()
            .ok_or_else(|| Error::Configuration("sender certificate is required".into()))?;
        let transport_uri = options.key_transport_algorithm.as_deref().ok_or_else(|| {
            Error::Configuration("key transport algorithm is required".into())
        })?;

        let transport = AlgorithmRegistry::key_transport(transport_uri)?;
        let certificate_body = ulriksdal_keys::extract_certificate_body(certificate_pem)?;

        Ok(Self {
            public_key,
            certificate_body,
            transport,
        })
    }

    fn render_key_info<R: RngCore + CryptoRng>(
        &self,
        key: &[u8],
        rng: &mut R,
    ) -> Result<String, Error> {
        let wrapped = keytransport::wrap(key, self.public_key, self.transport, rng)?;
        debug!("encrypt: wrapped {} byte key with {}", key.len(), self.transport);
        Ok(render_key_info(&KeyInfoFragment {
            wrapped_key_b64: &wrapped,
            key_transport_uri: self.transport.uri(),
            certificate_body: &self.certificate_body,
        }))
    }
}
