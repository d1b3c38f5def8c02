#![forbid(unsafe_code)]

//! Algorithm registry mapping URIs to concrete cipher parameters.

use std::fmt;

use log::warn;
use ulriksdal_core::{algorithm, Error};

/// Symmetric algorithms used to encrypt the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentAlgorithm {
    Aes128Cbc,
    Aes256Cbc,
    TripleDesCbc,
}

impl ContentAlgorithm {
    /// Used when a producer does not name a content algorithm.
    pub const LEGACY_DEFAULT: Self = Self::Aes256Cbc;

    pub fn from_uri(uri: &str) -> Result<Self, Error> {
        match uri {
            algorithm::AES128_CBC => Ok(Self::Aes128Cbc),
            algorithm::AES256_CBC => Ok(Self::Aes256Cbc),
            algorithm::TRIPLEDES_CBC => Ok(Self::TripleDesCbc),
            _ => Err(Error::UnsupportedAlgorithm(format!("cipher: {uri}"))),
        }
    }

    pub fn uri(&self) -> &'static str {
        match self {
            Self::Aes128Cbc => algorithm::AES128_CBC,
            Self::Aes256Cbc => algorithm::AES256_CBC,
            Self::TripleDesCbc => algorithm::TRIPLEDES_CBC,
        }
    }

    /// The conventional (OpenSSL style) cipher name.
    pub fn cipher_name(&self) -> &'static str {
        match self {
            Self::Aes128Cbc => "aes-128-cbc",
            Self::Aes256Cbc => "aes-256-cbc",
            Self::TripleDesCbc => "des-ede3-cbc",
        }
    }

    /// Required symmetric key length in bytes.
    pub fn key_size(&self) -> usize {
        match self {
            Self::Aes128Cbc => 16,
            Self::Aes256Cbc => 32,
            Self::TripleDesCbc => 24,
        }
    }

    /// IV length in bytes. In CBC mode this is also the block size.
    pub fn iv_size(&self) -> usize {
        match self {
            Self::Aes128Cbc | Self::Aes256Cbc => 16,
            Self::TripleDesCbc => 8,
        }
    }

    pub fn block_size(&self) -> usize {
        self.iv_size()
    }
}

impl fmt::Display for ContentAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cipher_name())
    }
}

/// RSA padding schemes used to transport the content key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyTransport {
    /// RSAES-OAEP with SHA-1 and MGF1-SHA-1.
    RsaOaepMgf1p,
    /// RSAES-PKCS1-v1_5.
    RsaPkcs1v15,
}

impl KeyTransport {
    pub fn from_uri(uri: &str) -> Result<Self, Error> {
        match uri {
            algorithm::RSA_OAEP => Ok(Self::RsaOaepMgf1p),
            algorithm::RSA_PKCS1 => Ok(Self::RsaPkcs1v15),
            _ => Err(Error::UnsupportedAlgorithm(format!("key transport: {uri}"))),
        }
    }

    pub fn uri(&self) -> &'static str {
        match self {
            Self::RsaOaepMgf1p => algorithm::RSA_OAEP,
            Self::RsaPkcs1v15 => algorithm::RSA_PKCS1,
        }
    }

    pub fn scheme_name(&self) -> &'static str {
        match self {
            Self::RsaOaepMgf1p => "RSA-OAEP",
            Self::RsaPkcs1v15 => "RSAES-PKCS1-V1_5",
        }
    }
}

impl fmt::Display for KeyTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scheme_name())
    }
}

/// Central lookup for the algorithms an encrypted document may name.
pub struct AlgorithmRegistry;

impl AlgorithmRegistry {
    /// Resolve a content algorithm. An absent identifier resolves to
    /// AES-256-CBC for compatibility with older producers.
    pub fn content(uri: Option<&str>) -> Result<ContentAlgorithm, Error> {
        match uri {
            Some(uri) => ContentAlgorithm::from_uri(uri),
            None => {
                warn!(
                    "no content encryption algorithm given, defaulting to {}",
                    ContentAlgorithm::LEGACY_DEFAULT.uri()
                );
                Ok(ContentAlgorithm::LEGACY_DEFAULT)
            }
        }
    }

    /// Resolve a key transport algorithm.
    pub fn key_transport(uri: &str) -> Result<KeyTransport, Error> {
        KeyTransport::from_uri(uri)
    }
}
