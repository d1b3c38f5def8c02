#![forbid(unsafe_code)]

//! XML Encryption (XML-Enc) pipelines.
//!
//! Content is encrypted with a fresh symmetric key, and that key is wrapped
//! for the recipient's RSA key. The result is a single `EncryptedData`
//! document carrying both.

pub mod context;
pub mod decrypt;
pub mod encrypt;

pub use context::{DecryptionOptions, EncryptionOptions, InputEncoding};
pub use decrypt::{decrypt, decrypt_key_info, decrypt_to_bytes, sender_certificate};
pub use encrypt::{encrypt, encrypt_key_info, encrypt_key_info_with_rng, encrypt_with_rng};
