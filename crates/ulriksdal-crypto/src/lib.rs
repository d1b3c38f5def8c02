#![forbid(unsafe_code)]

//! Cryptographic building blocks for XML Encryption.
//!
//! - [`registry`]: algorithm URI → cipher / key transport parameters
//! - [`cipher`]: CBC content encryption with the IV prefixed to the ciphertext
//! - [`keytransport`]: RSA wrapping of the symmetric content key
//! - [`b64`]: base64 framing used by `CipherValue`

pub mod b64;
pub mod cipher;
pub mod keytransport;
pub mod registry;

pub use cipher::SymmetricKey;
pub use registry::{AlgorithmRegistry, ContentAlgorithm, KeyTransport};
