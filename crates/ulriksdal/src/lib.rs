#![forbid(unsafe_code)]

pub use ulriksdal_core as core;
pub use ulriksdal_crypto as crypto;
pub use ulriksdal_enc as enc;
pub use ulriksdal_keys as keys;
pub use ulriksdal_xml as xml;

pub use ulriksdal_core::{Error, Result};
pub use ulriksdal_enc::{
    decrypt, decrypt_key_info, decrypt_to_bytes, encrypt, encrypt_key_info, sender_certificate,
    DecryptionOptions, EncryptionOptions, InputEncoding,
};
