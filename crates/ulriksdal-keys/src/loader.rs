#![forbid(unsafe_code)]

//! RSA key loading from PEM (PKCS#8, SPKI, PKCS#1).

use rsa::{RsaPrivateKey, RsaPublicKey};
use ulriksdal_core::Error;

/// Load an RSA private key from PEM data.
pub fn load_rsa_private_pem(pem_data: &[u8]) -> Result<RsaPrivateKey, Error> {
    use pkcs8::DecodePrivateKey;
    let pem_str = std::str::from_utf8(pem_data)
        .map_err(|e| Error::Key(format!("invalid PEM encoding: {e}")))?;

    // Try PKCS#8 first
    if let Ok(pk) = RsaPrivateKey::from_pkcs8_pem(pem_str) {
        return Ok(pk);
    }

    // Try PKCS#1
    use pkcs1::DecodeRsaPrivateKey;
    RsaPrivateKey::from_pkcs1_pem(pem_str)
        .map_err(|e| Error::Key(format!("failed to parse RSA private key PEM: {e}")))
}

/// Load an RSA public key from PEM data.
pub fn load_rsa_public_pem(pem_data: &[u8]) -> Result<RsaPublicKey, Error> {
    use pkcs8::DecodePublicKey;
    let pem_str = std::str::from_utf8(pem_data)
        .map_err(|e| Error::Key(format!("invalid PEM encoding: {e}")))?;

    // Try SPKI first
    if let Ok(pk) = RsaPublicKey::from_public_key_pem(pem_str) {
        return Ok(pk);
    }

    use pkcs1::DecodeRsaPublicKey;
    RsaPublicKey::from_pkcs1_pem(pem_str)
        .map_err(|e| Error::Key(format!("failed to parse RSA public key PEM: {e}")))
}
