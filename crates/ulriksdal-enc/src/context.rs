#![forbid(unsafe_code)]

//! Encryption and decryption options: keys and per-call configuration.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use rsa::{RsaPrivateKey, RsaPublicKey};
use ulriksdal_core::Error;

/// How content text is turned into bytes before encryption.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputEncoding {
    #[default]
    Utf8,
    /// One byte per character; characters above U+00FF are rejected.
    Latin1,
    Base64,
    Hex,
}

impl InputEncoding {
    pub fn decode(&self, content: &str) -> Result<Vec<u8>, Error> {
        match self {
            Self::Utf8 => Ok(content.as_bytes().to_vec()),
            Self::Latin1 => content
                .chars()
                .map(|c| {
                    u8::try_from(u32::from(c)).map_err(|_| {
                        Error::Encoding(format!("character {c:?} is not representable in latin1"))
                    })
                })
                .collect(),
            Self::Base64 => {
                let cleaned: String = content.chars().filter(|c| !c.is_whitespace()).collect();
                base64::engine::general_purpose::STANDARD
                    .decode(cleaned)
                    .map_err(|e| Error::Encoding(format!("invalid base64 content: {e}")))
            }
            Self::Hex => hex::decode(content.trim())
                .map_err(|e| Error::Encoding(format!("invalid hex content: {e}"))),
        }
    }
}

impl FromStr for InputEncoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(Self::Utf8),
            "latin1" | "latin-1" | "iso-8859-1" | "binary" => Ok(Self::Latin1),
            "base64" => Ok(Self::Base64),
            "hex" => Ok(Self::Hex),
            other => Err(Error::Configuration(format!("unknown input encoding: {other}"))),
        }
    }
}

/// Options for the encrypt pipeline.
#[derive(Debug, Clone, Default)]
pub struct EncryptionOptions {
    /// Recipient key the content key is wrapped for.
    pub rsa_public_key: Option<RsaPublicKey>,
    /// Sender certificate PEM, embedded in the output.
    pub certificate_pem: Option<String>,
    /// Content algorithm URI. `None` means AES-256-CBC.
    pub content_algorithm: Option<String>,
    /// Key transport algorithm URI. Required.
    pub key_transport_algorithm: Option<String>,
    pub input_encoding: InputEncoding,
}

impl EncryptionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build options from a recipient public key PEM (SPKI or PKCS#1) and
    /// the sender certificate PEM.
    pub fn from_pem(public_key_pem: &str, certificate_pem: &str) -> Result<Self, Error> {
        let public_key = ulriksdal_keys::load_rsa_public_pem(public_key_pem.as_bytes())?;
        Ok(Self::new()
            .with_public_key(public_key)
            .with_certificate_pem(certificate_pem))
    }

    /// Build options that encrypt to the holder of `certificate_pem`, which
    /// is also embedded as the sender certificate.
    pub fn from_certificate_pem(certificate_pem: &str) -> Result<Self, Error> {
        let public_key = ulriksdal_keys::load_x509_cert_pem(certificate_pem.as_bytes())?;
        Ok(Self::new()
            .with_public_key(public_key)
            .with_certificate_pem(certificate_pem))
    }

    pub fn with_public_key(mut self, key: RsaPublicKey) -> Self {
        self.rsa_public_key = Some(key);
        self
    }

    pub fn with_certificate_pem(mut self, pem: impl Into<String>) -> Self {
        self.certificate_pem = Some(pem.into());
        self
    }

    pub fn with_content_algorithm(mut self, uri: impl Into<String>) -> Self {
        self.content_algorithm = Some(uri.into());
        self
    }

    pub fn with_key_transport_algorithm(mut self, uri: impl Into<String>) -> Self {
        self.key_transport_algorithm = Some(uri.into());
        self
    }

    pub fn with_input_encoding(mut self, encoding: InputEncoding) -> Self {
        self.input_encoding = encoding;
        self
    }
}

/// Options for the decrypt pipeline.
#[derive(Clone, Default)]
pub struct DecryptionOptions {
    pub rsa_private_key: Option<RsaPrivateKey>,
    /// `Some(false)` leaves block padding in the plaintext.
    pub auto_padding: Option<bool>,
}

impl DecryptionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build options from a private key PEM (PKCS#8 or PKCS#1).
    pub fn from_pem(private_key_pem: &str) -> Result<Self, Error> {
        let key = ulriksdal_keys::load_rsa_private_pem(private_key_pem.as_bytes())?;
        Ok(Self::new().with_private_key(key))
    }

    pub fn with_private_key(mut self, key: RsaPrivateKey) -> Self {
        self.rsa_private_key = Some(key);
        self
    }

    pub fn with_auto_padding(mut self, enabled: bool) -> Self {
        self.auto_padding = Some(enabled);
        self
    }

    /// Padding removal is on unless explicitly disabled.
    pub fn auto_padding_enabled(&self) -> bool {
        self.auto_padding.unwrap_or(true)
    }
}

impl fmt::Debug for DecryptionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecryptionOptions")
            .field(
                "rsa_private_key",
                &self.rsa_private_key.as_ref().map(|_| "<redacted>"),
            )
            .field("auto_padding", &self.auto_padding)
            .finish()
    }
}
